//! Per-unit outcomes threaded through batch stages.
//!
//! A batch stage (counting a population of graphs, building one correlation
//! matrix per region) never aborts because one unit fails. Each unit instead
//! ends in exactly one [`UnitOutcome`]; a unit that never ran (for example
//! after cancellation) simply has no outcome.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::error::{ErrorCode, StreetprintError};

/// Why a unit was not computed even though it ran.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SkipReason {
    /// The region contains no nodes.
    EmptyRegion,
}

impl SkipReason {
    /// Stable machine-readable representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyRegion => "EMPTY_REGION",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded unit failure.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitFailure {
    error: StreetprintError,
}

impl UnitFailure {
    /// Wraps `error`.
    #[must_use]
    #[rustfmt::skip]
    pub const fn new(error: StreetprintError) -> Self { Self { error } }

    /// The underlying error.
    #[must_use]
    #[rustfmt::skip]
    pub const fn error(&self) -> &StreetprintError { &self.error }

    /// Stable code of the underlying error.
    #[must_use]
    #[rustfmt::skip]
    pub const fn code(&self) -> ErrorCode { self.error.code() }

    /// Consumes the failure and returns the underlying error.
    #[must_use]
    #[rustfmt::skip]
    pub fn into_error(self) -> StreetprintError { self.error }
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.error)
    }
}

impl From<StreetprintError> for UnitFailure {
    fn from(error: StreetprintError) -> Self {
        Self::new(error)
    }
}

/// Terminal state of one unit of a batch stage.
///
/// # Examples
/// ```
/// use streetprint_core::{SkipReason, UnitOutcome};
///
/// let done: UnitOutcome<u32> = UnitOutcome::Computed(3);
/// assert_eq!(done.computed(), Some(&3));
///
/// let skipped: UnitOutcome<u32> = UnitOutcome::Skipped(SkipReason::EmptyRegion);
/// assert!(skipped.computed().is_none());
/// assert_eq!(skipped.status(), "skipped");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum UnitOutcome<T> {
    /// The unit produced a value.
    Computed(T),
    /// The unit failed; the batch carried on.
    Failed(UnitFailure),
    /// The unit ran but had nothing to compute.
    Skipped(SkipReason),
}

impl<T> UnitOutcome<T> {
    /// The computed value, if any.
    #[must_use]
    pub const fn computed(&self) -> Option<&T> {
        match self {
            Self::Computed(value) => Some(value),
            Self::Failed(_) | Self::Skipped(_) => None,
        }
    }

    /// The failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&UnitFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Computed(_) | Self::Skipped(_) => None,
        }
    }

    /// Returns `true` for [`Self::Failed`].
    ///
    /// Failed outcomes are reported but never written to a result store, so
    /// a later run retries the unit.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Lower-case status name, used in reports.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Computed(_) => "computed",
            Self::Failed(_) => "failed",
            Self::Skipped(_) => "skipped",
        }
    }

    /// Maps the computed value, keeping failures and skips.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> UnitOutcome<U> {
        match self {
            Self::Computed(value) => UnitOutcome::Computed(f(value)),
            Self::Failed(failure) => UnitOutcome::Failed(failure),
            Self::Skipped(reason) => UnitOutcome::Skipped(reason),
        }
    }
}

/// Outcome of one named unit.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitResult<T> {
    /// Unit identifier (source name or region id).
    pub unit: Arc<str>,
    /// What happened to the unit.
    pub outcome: UnitOutcome<T>,
}

/// Cooperative cancellation flag shared by batch stages.
///
/// Stages check the token before starting each unit. Units already running
/// finish and record their outcomes; the rest are left without one.
///
/// # Examples
/// ```
/// use streetprint_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`Self::cancel`] was called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

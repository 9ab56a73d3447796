//! Result-count policy applied before disambiguation.

use crate::error::SearchError;

/// Largest result set that is scanned for a match.
pub const MAX_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Proceed,
    NoResults,
    TooMany,
}

pub struct ResultGate;

impl ResultGate {
    /// Classify a result count. Negative counts are a caller bug.
    pub fn evaluate(count: i64) -> Result<GateOutcome, SearchError> {
        match count {
            c if c < 0 => Err(SearchError::InvalidResultCount(c)),
            0 => Ok(GateOutcome::NoResults),
            c if c > MAX_THRESHOLD => Ok(GateOutcome::TooMany),
            _ => Ok(GateOutcome::Proceed),
        }
    }
}

use std::error;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, MatchError>;

/// Fatal matcher errors. Running out of continuations is not an error, see
/// [`crate::MatchResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// The pattern library or the frame stack broke a structural invariant.
    /// Feeding more tokens will not recover from this.
    InvariantViolation(String),
}

impl MatchError {
    pub(crate) fn violation(msg: impl Into<String>) -> Self {
        MatchError::InvariantViolation(msg.into())
    }
}

impl Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MatchError::InvariantViolation(ref s) => write!(f, "invariant violation: {}", s),
        }
    }
}

impl error::Error for MatchError {}

use std::error::Error as StdError;
use std::fmt::{self, Display};

use cite_agent_model::ModelProviderError;

/// The error type of one `ask` invocation.
#[derive(Debug)]
pub enum AskError {
    /// The model backend could not be reached, rejected the
    /// credentials, or rate-limited the request. Not retried
    /// internally; the caller decides whether to retry the whole ask.
    Backend(Box<dyn ModelProviderError>),
    /// The model produced a final output that does not conform to the
    /// answer schema.
    Schema {
        /// Why the decode was rejected.
        reason: String,
    },
    /// The iteration cap was reached without a final answer.
    Exhausted {
        /// The configured cap that was hit.
        iterations: usize,
    },
}

impl Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AskError::Backend(err) => {
                write!(f, "model backend unavailable: {err}")
            }
            AskError::Schema { reason } => {
                write!(f, "model output failed schema validation: {reason}")
            }
            AskError::Exhausted { iterations } => {
                write!(
                    f,
                    "no final answer after {iterations} model calls"
                )
            }
        }
    }
}

impl StdError for AskError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AskError::Backend(err) => {
                Some(err.as_ref() as &(dyn StdError + 'static))
            }
            _ => None,
        }
    }
}

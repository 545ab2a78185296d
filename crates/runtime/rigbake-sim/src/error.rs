use rigbake_core::FunctionPath;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Unknown function {path}")]
    UnknownFunction { path: FunctionPath },

    #[error("Call depth exceeded {limit} while entering {path}")]
    RecursionLimit { path: FunctionPath, limit: usize },

    #[error("Malformed function tag {path}: {reason}")]
    InvalidTag { path: String, reason: String },

    #[error("{path} did not summon a root entity")]
    NothingSummoned { path: FunctionPath },

    #[error("Objective '{objective}' was used before it was created")]
    UnknownObjective { objective: String },
}

pub type Result<T> = std::result::Result<T, SimError>;

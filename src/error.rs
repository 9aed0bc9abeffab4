use thiserror::Error;

/// Unified error type for devflow operations
#[derive(Error, Debug)]
pub enum DevflowError {
    #[error("Malformed branch name '{branch}', cannot classify as one of {allowed}")]
    UnknownBranchType { branch: String, allowed: String },

    #[error("Branch name '{0}' should contain version")]
    MissingVersionInBranchName(String),

    #[error("Malformed version '{version}' in branch name '{branch}'")]
    MalformedBranchVersion { version: String, branch: String },

    #[error("Base version '{version}' unsuitable for branch name '{branch}': {reason}")]
    BaseVersionMismatch {
        version: String,
        branch: String,
        reason: String,
    },

    #[error("Invalid mode '{mode}' in branch type '{branch_type}'")]
    IllegalModeForBranch { mode: String, branch_type: String },

    #[error("Malformed base version file '{path}': {reason}")]
    MalformedBaseVersionFile { path: String, reason: String },

    #[error("Cannot access repository: {0}")]
    NoRepositoryAccess(String),

    #[error("Malformed version '{version}': {reason}")]
    MalformedVersion { version: String, reason: String },

    #[error("Commit {commit} has more than 2 parents")]
    TooManyParents { commit: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in devflow
pub type Result<T> = std::result::Result<T, DevflowError>;

impl DevflowError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        DevflowError::Config(msg.into())
    }

    /// Create a template error with context
    pub fn template(msg: impl Into<String>) -> Self {
        DevflowError::Template(msg.into())
    }

    /// Create a repository access error with context
    pub fn no_repository(msg: impl Into<String>) -> Self {
        DevflowError::NoRepositoryAccess(msg.into())
    }

    pub fn malformed_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        DevflowError::MalformedVersion {
            version: version.into(),
            reason: reason.into(),
        }
    }
}

use thiserror::Error;

/// Failures that abort the process (exit status 1).
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid port number. Must be between 1024 and 65535.")]
    InvalidPort,

    #[error("Invalid password. No spaces or non-printable characters allowed.")]
    InvalidPassword,

    #[error("Failed to load configuration '{path}': {reason}")]
    Config { path: String, reason: String },

    #[error("Failed to initialize server: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire-level parse failures. Protocol violations by a client are not
/// errors; they become numeric replies and the connection carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrcError {
    #[error("Parsing error: '{0}'")]
    ParsingError(String),
}

//! Error types for rbus

use thiserror::Error;

/// Main error type for rbus operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed ({status}): {stderr}")]
    RemoteCommand {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Unexpected introspection line: keyword={keyword:?} value={value:?} brace={brace:?}")]
    MalformedLine {
        keyword: String,
        value: String,
        brace: String,
    },

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a spawn error for `program`
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Error::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a remote command error
    pub fn remote_command(
        command: impl Into<String>,
        status: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Error::RemoteCommand {
            command: command.into(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    /// Create an XML error
    pub fn xml(msg: impl Into<String>) -> Self {
        Error::Xml(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_reports_tokens() {
        let err = Error::MalformedLine {
            keyword: "foo".to_string(),
            value: "bar".to_string(),
            brace: "{".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"foo\""));
        assert!(msg.contains("\"bar\""));
        assert!(msg.contains("\"{\""));
    }

    #[test]
    fn test_remote_command_message() {
        let err = Error::remote_command("ssh pi gdbus", "exit status: 255", "Connection refused");
        assert_eq!(
            err.to_string(),
            "Command `ssh pi gdbus` failed (exit status: 255): Connection refused"
        );
    }
}

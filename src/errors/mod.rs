use core::fmt;
use std::error::Error;
use std::fmt::Display;

/// Classifies an error so that callers can pick the fallback transition without parsing text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum ErrorKind {
    #[display(fmt = "stale term")]
    StaleTerm,
    #[display(fmt = "already voted differently")]
    AlreadyVotedDifferently,
    #[display(fmt = "configuration in progress")]
    ConfigurationInProgress,
    #[display(fmt = "insufficient votes")]
    InsufficientVotes,
    #[display(fmt = "timeout")]
    Timeout,
    #[display(fmt = "cancelled")]
    Cancelled,
    #[display(fmt = "storage failure")]
    Storage,
    #[display(fmt = "communication failure")]
    Communication,
    #[display(fmt = "invalid role")]
    InvalidRole,
}

#[derive(Clone, Debug)]
pub struct RaftError {
    kind: ErrorKind,
    text: String,
    cause: String,
}

pub(crate) type Result<T> = std::result::Result<T, RaftError>;

pub fn new_err<T>(kind: ErrorKind, text: String, cause: String) -> Result<T> {
    Err(RaftError { kind, text, cause })
}

impl RaftError {
    pub fn new(kind: ErrorKind, text: String) -> RaftError {
        RaftError { kind, text, cause: String::new() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Display for RaftError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cause_word = {
            if !self.cause.is_empty() {
                " Cause: ".to_string()
            } else {
                String::new()
            }
        };
        write!(f, "[{}] {}.{}{}", self.kind, self.text, cause_word, self.cause)
    }
}

impl Error for RaftError {}

pub(crate) fn new_multiple_err<T>(kind: ErrorKind, text: String, causes: Vec<RaftError>) -> Result<T> {
    let mut error_string = String::new();

    if !causes.is_empty() {
        error_string.push_str("Errors: ");
    }

    for (error_index, err) in causes.into_iter().enumerate() {
        error_string.push_str(&format!("{}) {} ", error_index + 1, err));
    }
    Err(RaftError { kind, text, cause: error_string })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_contains_kind_and_cause() {
        let err: Result<()> = new_err(ErrorKind::Storage, "cannot save vote".to_string(), "disk full".to_string());
        let text = err.unwrap_err().to_string();

        assert_eq!("[storage failure] cannot save vote. Cause: disk full", text);
    }

    #[test]
    fn test_multiple_errors_are_enumerated() {
        let causes = vec![
            RaftError::new(ErrorKind::Communication, "node 2 unreachable".to_string()),
            RaftError::new(ErrorKind::Timeout, "node 3 timed out".to_string()),
        ];
        let err = new_multiple_err::<()>(ErrorKind::Communication, "freshness scan failed".to_string(), causes)
            .unwrap_err();

        assert_eq!(ErrorKind::Communication, err.kind());
        assert!(err.to_string().contains("1) [communication failure] node 2 unreachable."));
        assert!(err.to_string().contains("2) [timeout] node 3 timed out."));
    }
}

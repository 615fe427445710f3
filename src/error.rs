//! Application error type.
//!
//! Every fallible stage returns `AppError`. The kind decides the process exit
//! code; the message is what the user sees.

/// What went wrong, coarsely. Drives the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An expected input table/file is absent.
    MissingInput,
    /// A required column is absent.
    SchemaMismatch,
    /// Global blend weights are unusable (all ≤ 0, or negative).
    InvalidWeightConfiguration,
    /// Some other configuration value is out of range.
    InvalidConfig,
    /// Reading or writing outputs failed.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::MissingInput | ErrorKind::SchemaMismatch | ErrorKind::InvalidConfig => 2,
            ErrorKind::InvalidWeightConfiguration => 3,
            ErrorKind::Io => 4,
        }
    }
}

#[derive(Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingInput, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaMismatch, message)
    }

    pub fn weights(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidWeightConfiguration, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::missing_input("x").exit_code(), 2);
        assert_eq!(AppError::schema("x").exit_code(), 2);
        assert_eq!(AppError::weights("x").exit_code(), 3);
        assert_eq!(AppError::io("x").exit_code(), 4);
        assert_eq!(AppError::weights("bad").to_string(), "bad");
    }
}

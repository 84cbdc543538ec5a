use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Mandatory signature not found: {0}")]
    SignatureMissing(String),

    #[error("Mandatory property marker not found: {0}=")]
    PropertyMissing(String),

    #[error(
        "Cannot set {name} to '{desired}': value is {} bytes but only {capacity} fit",
        desired.len()
    )]
    CapacityExceeded {
        name: String,
        desired: String,
        capacity: usize,
    },

    #[error(
        "Patched buffer size {after} differs from original size {before}; \
         this is a patcher defect, the file was not written"
    )]
    SizeInvariantViolated { before: usize, after: usize },

    #[error(
        "Signature '{name}' has a {pattern}-byte pattern but a {replacement}-byte replacement"
    )]
    LengthMismatch {
        name: String,
        pattern: usize,
        replacement: usize,
    },

    #[error("Unknown property in config: {0}")]
    UnknownProperty(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error signals a patcher defect rather than bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::SizeInvariantViolated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_mentions_lengths() {
        let err = Error::CapacityExceeded {
            name: "loginWebService".to_string(),
            desired: "x".repeat(30),
            capacity: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("loginWebService"));
        assert!(msg.contains("30"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn test_error_is_defect() {
        let err = Error::SizeInvariantViolated {
            before: 100,
            after: 99,
        };
        assert!(err.is_defect());

        let err2 = Error::SignatureMissing("rsa".to_string());
        assert!(!err2.is_defect());
    }
}

//! Error types for lazyboot
//!
//! The loading engine itself never fails: missing platform features and
//! failed decodes degrade silently. These errors only surface at the edges,
//! where a page is parsed, a configuration is read or the command line is
//! interpreted.

use thiserror::Error;

/// Main error type for lazyboot operations
#[derive(Debug, Error)]
pub enum LazyError {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// HTML parsing error
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    /// Configuration file could not be decoded
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    /// Bad command line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience Result type for lazyboot operations
pub type Result<T> = std::result::Result<T, LazyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = LazyError::InvalidArgument("--viewport".into());
        assert_eq!(err.to_string(), "Invalid argument: --viewport");

        let err = LazyError::HtmlParse("unexpected eof".into());
        assert!(err.to_string().starts_with("HTML parse error"));
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.html");
        let err: LazyError = io.into();
        assert!(matches!(err, LazyError::Io(_)));
    }
}

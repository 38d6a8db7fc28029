//! Custom error types for the application.
//!
//! This module defines the primary error type, `AppError`, for the entire
//! application. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different failure classes the panel can hit.
//!
//! ## Error Hierarchy
//!
//! - **`Config`**: Wraps errors from `figment`, typically related to file
//!   parsing or malformed values in the settings file.
//! - **`Configuration`**: Semantic errors in the settings, such as values that
//!   parse but are logically invalid (e.g., an unknown log level). These are
//!   caught by the validation step after loading.
//! - **`Catalog`**: Shape errors in the selection catalogue — index-misaligned
//!   tables, empty lists, duplicate flavour names. A broken catalogue is a
//!   fatal startup condition for the events screen, so these surface early
//!   with a descriptive message instead of failing deep inside validation.
//! - **`CatalogFormat`**: Wraps `serde_json` errors from parsing the
//!   catalogue file itself.
//! - **`Io`**: Wraps standard `std::io::Error` for file access.
//! - **`Logging`**: Failure to install the global logger at startup.
//!
//! By using `#[from]`, `AppError` can be seamlessly created from underlying
//! error types, simplifying error handling throughout the application with
//! the `?` operator.
//!
//! Selection-level failures (unknown energy, rejected input) are deliberately
//! NOT part of this hierarchy: they are recovered locally — a default limit
//! substitution or a cleared field — and never propagate. See the
//! [`selection`](crate::selection) module for those types.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Top-level application error.
#[derive(Error, Debug)]
pub enum AppError {
    /// Settings file could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Settings loaded but failed semantic validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// Selection catalogue failed shape validation.
    #[error("Catalogue error: {0}")]
    Catalog(String),

    /// Selection catalogue file is not valid JSON.
    #[error("Catalogue parse error: {0}")]
    CatalogFormat(#[from] serde_json::Error),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Global logger installation failed.
    #[error("Logging setup error: {0}")]
    Logging(#[from] log::SetLoggerError),
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Catalog("energy/evs length mismatch".to_string());
        assert_eq!(err.to_string(), "Catalogue error: energy/evs length mismatch");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "select.json");
        let err: AppError = io.into();
        assert!(err.to_string().contains("I/O error"));
    }
}

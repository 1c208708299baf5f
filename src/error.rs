//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rsprime operations
#[derive(Error, Debug)]
pub enum SprimeError {
    /// I/O errors (file missing, permission denied, read/write failures)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// VCF content errors (missing genotypes, no records in the selected interval)
    #[error("VCF error: {message}")]
    Vcf { message: String },

    /// Invalid data errors (records from mixed chromosomes, unmapped chromosome)
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Rate/density estimator failures (zero local cM/bp, too few variants)
    #[error("Estimator error: {message}")]
    Estimator { message: String },

    /// Configuration errors (invalid CLI arguments, output path collisions)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File not found errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Parse errors with the offending line number
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Type alias for Results using SprimeError
pub type Result<T> = std::result::Result<T, SprimeError>;

impl SprimeError {
    /// Create a VCF error with a message
    pub fn vcf(message: impl Into<String>) -> Self {
        Self::Vcf {
            message: message.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create an estimator error
    pub fn estimator(message: impl Into<String>) -> Self {
        Self::Estimator {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

// Convert noodles VCF errors to SprimeError
impl From<noodles::vcf::header::ParseError> for SprimeError {
    fn from(err: noodles::vcf::header::ParseError) -> Self {
        Self::Vcf {
            message: err.to_string(),
        }
    }
}

//! Rich diagnostic error types for chainer.
//!
//! The inference loop itself never fails. Errors only come from the edges:
//! reading and parsing rule files, and loading or validating configuration.
//! Each variant carries a miette error code and help text.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for chainer.
#[derive(Debug, Error, Diagnostic)]
pub enum ChainerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Rule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("rule parse error in {source_name} at line {line}: {message}")]
    #[diagnostic(
        code(chainer::rules::parse),
        help(
            "Rules start with `@rule [name]`, followed by indented `when: A, B` \
             and `then: C` lines. Lines starting with `#` are comments."
        )
    )]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("invalid JSON rule set in {source_name}: {message}")]
    #[diagnostic(
        code(chainer::rules::json),
        help(
            "Expected an array of objects with optional `name`, `conditions` \
             (array of strings) and `conclusion` (string) fields."
        )
    )]
    Json { source_name: String, message: String },

    #[error("failed to read {path}: {source}")]
    #[diagnostic(
        code(chainer::rules::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("max_iterations must be at least 1")]
    #[diagnostic(
        code(chainer::config::zero_iterations),
        help("Set max_iterations to a positive number of rounds (the default is 100).")
    )]
    ZeroIterations,

    #[error("failed to read config {path}: {source}")]
    #[diagnostic(
        code(chainer::config::read),
        help("Check that the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    #[diagnostic(
        code(chainer::config::parse),
        help("Run `chainer config` to print a valid default configuration.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config {path}: {source}")]
    #[diagnostic(
        code(chainer::config::write),
        help("Check that the target directory is writable and the disk is not full.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for rule loading.
pub type RuleResult<T> = std::result::Result<T, RuleError>;

/// Result type for configuration handling.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for anything that can fail in chainer.
pub type ChainerResult<T> = std::result::Result<T, ChainerError>;

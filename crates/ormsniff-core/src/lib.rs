//! # ormsniff-core
//!
//! Core framework for PHP code sniffing based on a token stream.
//!
//! This crate provides the foundational pieces for building sniffs:
//!
//! - [`tokenize`] and [`PhpFile`] for the token stream and its navigation queries
//! - [`Fixer`] for atomic, changeset-based autofixes
//! - [`Sniff`] trait and [`SniffContext`] for reporting violations
//! - [`Analyzer`] for orchestrating sniff execution over a directory
//! - [`Violation`] for representing findings
//!
//! ## Example
//!
//! ```ignore
//! use ormsniff_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .sniff(MySniff::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! println!("{}", result.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod file;
mod fixer;
mod sniff;
mod token;
mod tokenizer;
mod types;

/// Utility modules for sniff implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, SniffConfig};
pub use context::SniffContext;
pub use file::{MemberProperties, MethodParameter, MethodProperties, PhpFile, Visibility};
pub use fixer::{Fixer, FixerError};
pub use sniff::{Sniff, SniffBox};
pub use token::{Token, TokenKind};
pub use tokenizer::{tokenize, TokenizeError};
pub use types::{
    FixedFile, LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic,
};
pub use utils::ignore::IgnoreSet;

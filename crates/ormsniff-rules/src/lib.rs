//! # ormsniff-rules
//!
//! Built-in sniffs for ormsniff.
//!
//! The main sniff validates Doctrine ORM entity mappings written as
//! doc-comment annotations or native PHP attributes. Two small style sniffs
//! from the same rule set come along with it.
//!
//! ## Available Sniffs
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | `Ormsniff.Commenting.DoctrineEntity` | `doctrine-entity` | Validates ORM annotations, column naming and types, and the accessors a mapping implies |
//! | `Ormsniff.NamingConventions.InterfaceSuffix` | `interface-suffix` | Requires interface names to end in `Interface` |
//! | `Ormsniff.Formatting.BlankLineBeforeReturn` | `blank-line-before-return` | Requires a blank line before `return` |
//!
//! ## Usage
//!
//! ```ignore
//! use ormsniff_core::Analyzer;
//! use ormsniff_rules::DoctrineEntitySniff;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src/Entity")
//!     .sniff(DoctrineEntitySniff::new().with_base_type("AdminUser", "User"))
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod blank_line_before_return;
pub mod doctrine_entity;
pub mod interface_suffix;
mod presets;

pub use blank_line_before_return::BlankLineBeforeReturnSniff;
pub use doctrine_entity::DoctrineEntitySniff;
pub use interface_suffix::InterfaceSuffixSniff;
pub use presets::{all_sniffs, doctrine_sniffs, sniffs_from_config, Preset};

/// Re-export core types for convenience.
pub use ormsniff_core::{Severity, Sniff, Violation};

//! # ormsniff
//!
//! Doctrine ORM entity mapping linter for PHP sources.
//!
//! This is the facade crate that re-exports the engine and the sniffs, and
//! adds config-file resolution plus a one-call directory run.
//!
//! ## Configuration
//!
//! ```toml
//! [analyzer]
//! exclude = ["**/vendor/**"]
//!
//! [sniffs.doctrine-entity]
//! concrete_type_to_base_type_map = { AdminUser = "User" }
//! use_dynamical_calculation_for_enum_column_type = true
//!
//! [sniffs.blank-line-before-return]
//! enabled = false
//! ```
//!
//! The file is looked up as described in [`config_resolver`].
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! let report = ormsniff::run(Path::new("."), None, false)?;
//! println!("{}", report.result.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use ormsniff_core::*;

/// Built-in sniffs and presets.
pub mod sniffs {
    pub use ormsniff_rules::*;
}

pub mod config_resolver;
mod runner;

pub use config_resolver::ConfigSource;
pub use runner::{run, RunError, RunReport};

//! Sniff presets for common configurations.

use crate::{blank_line_before_return, doctrine_entity, interface_suffix};
use crate::{BlankLineBeforeReturnSniff, DoctrineEntitySniff, InterfaceSuffixSniff};
use ormsniff_core::{Config, SniffBox};
use tracing::debug;

/// Preset configurations for ormsniff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Entity mapping validation only.
    Doctrine,
    /// Entity mapping validation plus the formatting and naming sniffs.
    Full,
}

impl Preset {
    /// Returns the sniffs for this preset.
    #[must_use]
    pub fn sniffs(self) -> Vec<SniffBox> {
        match self {
            Self::Doctrine => doctrine_sniffs(),
            Self::Full => all_sniffs(),
        }
    }
}

/// Returns the entity mapping sniff with default settings.
#[must_use]
pub fn doctrine_sniffs() -> Vec<SniffBox> {
    vec![Box::new(DoctrineEntitySniff::new())]
}

/// Returns all available sniffs with default settings.
#[must_use]
pub fn all_sniffs() -> Vec<SniffBox> {
    vec![
        Box::new(DoctrineEntitySniff::new()),
        Box::new(InterfaceSuffixSniff::new()),
        Box::new(BlankLineBeforeReturnSniff::new()),
    ]
}

/// Returns every sniff not disabled in `config`, built from its section.
#[must_use]
pub fn sniffs_from_config(config: &Config) -> Vec<SniffBox> {
    let mut sniffs: Vec<SniffBox> = Vec::new();
    if config.is_sniff_enabled(doctrine_entity::NAME) {
        let sniff = config
            .sniff(doctrine_entity::NAME)
            .map(DoctrineEntitySniff::from_config)
            .unwrap_or_default();
        sniffs.push(Box::new(sniff));
    }
    if config.is_sniff_enabled(interface_suffix::NAME) {
        sniffs.push(Box::new(InterfaceSuffixSniff::new()));
    }
    if config.is_sniff_enabled(blank_line_before_return::NAME) {
        sniffs.push(Box::new(BlankLineBeforeReturnSniff::new()));
    }
    debug!(count = sniffs.len(), "sniffs from config");
    sniffs
}

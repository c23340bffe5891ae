//! Sniff validating Doctrine ORM entity mappings.
//!
//! # Rationale
//!
//! Doctrine reads mappings from doc-comment annotations (`@ORM\Column(...)`)
//! or native attributes (`#[ORM\Column(...)]`). Neither is checked by PHP
//! itself, so a typo in an attribute name, a column type that disagrees with
//! the property type, or a missing accessor only shows up at runtime. This
//! sniff checks each annotated property:
//!
//! - attribute syntax and whitespace
//! - attributes against the reference table of each annotation
//! - column naming and type agreement with `@var` and the native type
//! - getters, setters, adders and removers implied by the mapping
//! - collection initialization in the constructor for to-many relations
//!
//! Column and join column names are fixable.
//!
//! # Configuration
//!
//! - `concrete_type_to_base_type_map`: table of `Concrete = "Base"` pairs.
//!   An accessor argument typed with the base class is accepted where the
//!   mapping names the concrete class.
//! - `use_dynamical_calculation_for_enum_column_type`: derive an enum class
//!   name from column types like `order_enum_status` (`OrderStatus`).
//!
//! # Suppression
//!
//! ```text
//! /**
//!  * @codingStandardsIgnoreError Ormsniff.Commenting.DoctrineEntity.ColumnGetterRequired
//!  */
//! ```

pub mod attribute_parser;
pub mod cache;
pub mod extractor;
mod handlers;
pub mod inference;
pub mod method_contract;
pub mod naming;
pub mod reference;
pub mod schema;
pub mod types;

use cache::FileCache;
use handlers::MemberCheck;
use ormsniff_core::{Sniff, SniffConfig, SniffContext};
use std::collections::HashMap;
use tracing::debug;

/// Sniff code for doctrine-entity.
pub const CODE: &str = "Ormsniff.Commenting.DoctrineEntity";

/// Sniff name for doctrine-entity.
pub const NAME: &str = "doctrine-entity";

/// Validates Doctrine ORM mappings of class properties.
#[derive(Debug, Clone, Default)]
pub struct DoctrineEntitySniff {
    /// Concrete class name to the base class accepted in its place.
    pub concrete_type_to_base_type_map: HashMap<String, String>,
    /// Derive enum class names from `_enum_` column types.
    pub use_dynamical_calculation_for_enum_column_type: bool,
}

impl DoctrineEntitySniff {
    /// Creates a sniff with no base type overrides and static enum types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `base` wherever `concrete` is expected as an argument type.
    #[must_use]
    pub fn with_base_type(mut self, concrete: impl Into<String>, base: impl Into<String>) -> Self {
        self.concrete_type_to_base_type_map
            .insert(concrete.into(), base.into());
        self
    }

    /// Enables enum class names derived from `_enum_` column types.
    #[must_use]
    pub fn with_dynamic_enum_types(mut self, enabled: bool) -> Self {
        self.use_dynamical_calculation_for_enum_column_type = enabled;
        self
    }

    /// Builds the sniff from its configuration section.
    #[must_use]
    pub fn from_config(config: &SniffConfig) -> Self {
        Self {
            concrete_type_to_base_type_map: config
                .get_option("concrete_type_to_base_type_map")
                .unwrap_or_default(),
            use_dynamical_calculation_for_enum_column_type: config
                .get_bool("use_dynamical_calculation_for_enum_column_type", false),
        }
    }

    fn is_mapped_to_base_type(&self, expected: &str, hint: &str) -> bool {
        self.concrete_type_to_base_type_map
            .get(expected)
            .is_some_and(|base| base == hint)
    }
}

impl Sniff for DoctrineEntitySniff {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Validates Doctrine ORM annotations and the accessors they imply"
    }

    fn process(&self, ctx: &mut SniffContext<'_>) {
        let file = ctx.file();
        let mut cache = FileCache::new(file);

        for member in file.member_vars() {
            let annotations = extractor::extract(file, member, CODE);
            if annotations.tags.is_empty() {
                continue;
            }
            debug!(
                member = %file.tokens()[member].content,
                line = file.tokens()[member].line,
                tags = annotations.tags.len(),
                "checking mapped member"
            );
            MemberCheck::new(self, ctx, &mut cache, member, annotations).run();
        }
    }
}

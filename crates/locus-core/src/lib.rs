pub mod builder;
pub mod builtin;
pub mod config;
pub mod definition;
pub mod error;
pub mod field;
pub mod filter;
pub mod format;
pub mod locator;
pub mod matchers;
pub mod registry;
pub mod selector;

pub use builder::{QueryBuilder, builder_for};
pub use config::{ConfigError, ConfigLoader, LocusConfig, SelectorConfig};
pub use definition::{DefinitionBuilder, SelectorDefinition};
pub use error::{LocatorShapeWarning, SelectorError};
pub use field::locate_field;
pub use filter::{FilterOptions, FilterValue, FilterValueType};
pub use format::{Format, QueryExpression};
pub use locator::{Capability, Locator, LocatorKind, LocatorType};
pub use matchers::{match_attribute, match_class_attribute};
pub use registry::{SelectorRegistry, global};
pub use selector::Selector;

pub use locus_xpath::{Expression, MatchMode};

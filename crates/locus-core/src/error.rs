use crate::format::Format;
use std::fmt;
use thiserror::Error;

/// Fatal errors raised while looking up or compiling a selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Unknown selector type (:{0})")]
    UnknownSelectorKind(String),

    #[error("Selector :{selector} does not support {format}")]
    UnsupportedFormat { selector: String, format: Format },

    #[error("Unsupported value for the :{filter} filter: {reason}")]
    UnsupportedFilterValue { filter: String, reason: String },

    #[error("Expected a {expected} expression but got {found}")]
    FormatMismatch { expected: Format, found: Format },
}

/// A locator that does not satisfy the selector's accepted locator types.
///
/// Never aborts compilation; it is logged and kept on the selector instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorShapeWarning {
    pub selector: String,
    pub locator: String,
    pub expected: String,
}

impl fmt::Display for LocatorShapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Locator {} for selector :{} must {}. This will raise an error in a future version.",
            self.locator, self.selector, self.expected
        )
    }
}

//! Locator values and the type descriptors selectors accept.
//!
//! A selector declares which locator shapes it understands either by concrete
//! kind ("be an instance of Text") or by capability ("respond to to_xpath").
//! A locator outside that set still compiles; the mismatch is only reported.

use locus_xpath::Expression;
use regex::Regex;
use std::fmt;

/// The primary matching value handed to a selector.
#[derive(Debug, Clone)]
pub enum Locator {
    Text(String),
    Symbol(String),
    Integer(i64),
    Pattern(Regex),
    XPath(Expression),
}

/// Concrete locator type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorKind {
    Text,
    Symbol,
    Integer,
    Pattern,
    XPath,
}

/// Something a locator can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Has a textual form.
    ToString,
    /// Usable as a symbolic name.
    ToSymbol,
    /// Is, or converts to, an XPath expression.
    ToXPath,
}

/// One entry of a selector's accepted locator type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorType {
    Kind(LocatorKind),
    Capability(Capability),
}

impl Locator {
    pub fn kind(&self) -> LocatorKind {
        match self {
            Locator::Text(_) => LocatorKind::Text,
            Locator::Symbol(_) => LocatorKind::Symbol,
            Locator::Integer(_) => LocatorKind::Integer,
            Locator::Pattern(_) => LocatorKind::Pattern,
            Locator::XPath(_) => LocatorKind::XPath,
        }
    }

    pub fn responds_to(&self, capability: Capability) -> bool {
        match capability {
            Capability::ToString => !matches!(self, Locator::Pattern(_)),
            Capability::ToSymbol => matches!(self, Locator::Text(_) | Locator::Symbol(_)),
            Capability::ToXPath => matches!(self, Locator::XPath(_)),
        }
    }

    pub fn matches_type(&self, locator_type: LocatorType) -> bool {
        match locator_type {
            LocatorType::Kind(kind) => self.kind() == kind,
            LocatorType::Capability(capability) => self.responds_to(capability),
        }
    }

    /// Textual form used when a selector interpolates the locator into an
    /// attribute comparison. Patterns yield their source.
    pub fn to_text(&self) -> String {
        match self {
            Locator::Text(s) | Locator::Symbol(s) => s.clone(),
            Locator::Integer(i) => i.to_string(),
            Locator::Pattern(re) => re.as_str().to_string(),
            Locator::XPath(expr) => expr.to_xpath(),
        }
    }

    /// `Kind:value` form used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Locator::Text(s) => format!("Text:{s:?}"),
            Locator::Symbol(s) => format!("Symbol::{s}"),
            Locator::Integer(i) => format!("Integer:{i}"),
            Locator::Pattern(re) => format!("Pattern:/{}/", re.as_str()),
            Locator::XPath(expr) => format!("XPath:{}", expr.to_xpath()),
        }
    }
}

impl From<&str> for Locator {
    fn from(value: &str) -> Self {
        Locator::Text(value.to_string())
    }
}

impl From<String> for Locator {
    fn from(value: String) -> Self {
        Locator::Text(value)
    }
}

impl From<i64> for Locator {
    fn from(value: i64) -> Self {
        Locator::Integer(value)
    }
}

impl From<Regex> for Locator {
    fn from(value: Regex) -> Self {
        Locator::Pattern(value)
    }
}

impl From<Expression> for Locator {
    fn from(value: Expression) -> Self {
        Locator::XPath(value)
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocatorKind::Text => "Text",
            LocatorKind::Symbol => "Symbol",
            LocatorKind::Integer => "Integer",
            LocatorKind::Pattern => "Pattern",
            LocatorKind::XPath => "XPath",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ToString => "to_string",
            Capability::ToSymbol => "to_symbol",
            Capability::ToXPath => "to_xpath",
        };
        f.write_str(name)
    }
}

/// Whether `locator` satisfies `types`. An absent locator, or a selector that
/// declares no types, is always valid.
pub fn locator_valid(types: Option<&[LocatorType]>, locator: Option<&Locator>) -> bool {
    let (Some(types), Some(locator)) = (types, locator) else {
        return true;
    };
    types.iter().any(|t| locator.matches_type(*t))
}

/// Human readable description of an accepted type set, e.g.
/// `be an instance of Text or Symbol or respond to to_xpath`.
///
/// Kinds and capabilities are grouped; groups appear in the order their first
/// member was declared.
pub fn describe_locator_types(types: &[LocatorType]) -> String {
    let kinds: Vec<String> = types
        .iter()
        .filter_map(|t| match t {
            LocatorType::Kind(k) => Some(k.to_string()),
            LocatorType::Capability(_) => None,
        })
        .collect();
    let capabilities: Vec<String> = types
        .iter()
        .filter_map(|t| match t {
            LocatorType::Capability(c) => Some(c.to_string()),
            LocatorType::Kind(_) => None,
        })
        .collect();

    let kinds = (!kinds.is_empty()).then(|| format!("be an instance of {}", kinds.join(" or ")));
    let capabilities =
        (!capabilities.is_empty()).then(|| format!("respond to {}", capabilities.join(" or ")));

    let capability_first = matches!(types.first(), Some(LocatorType::Capability(_)));
    let groups = if capability_first {
        [capabilities, kinds]
    } else {
        [kinds, capabilities]
    };
    groups.into_iter().flatten().collect::<Vec<_>>().join(" or ")
}

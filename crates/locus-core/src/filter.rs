use locus_xpath::Expression;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Value of a single filter option.
#[derive(Debug, Clone)]
pub enum FilterValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
    Pattern(Regex),
    XPath(Expression),
}

impl FilterValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FilterValue::Bool(_) => "boolean",
            FilterValue::Text(_) => "text",
            FilterValue::List(_) => "list",
            FilterValue::Pattern(_) => "pattern",
            FilterValue::XPath(_) => "xpath",
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Text(s) => write!(f, "{s:?}"),
            FilterValue::List(items) => write!(f, "{items:?}"),
            FilterValue::Pattern(re) => write!(f, "/{}/", re.as_str()),
            FilterValue::XPath(expr) => write!(f, "{expr}"),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(value: Vec<String>) -> Self {
        FilterValue::List(value)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(value: Vec<&str>) -> Self {
        FilterValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(value: [&str; N]) -> Self {
        FilterValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Regex> for FilterValue {
    fn from(value: Regex) -> Self {
        FilterValue::Pattern(value)
    }
}

impl From<Expression> for FilterValue {
    fn from(value: Expression) -> Self {
        FilterValue::XPath(value)
    }
}

/// Secondary constraints passed alongside a locator, keyed by filter name.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    values: BTreeMap<String, FilterValue>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FilterValue::as_bool)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FilterValue::as_text)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterOptions
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = FilterOptions::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}

/// Constraint on the values a declared filter accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValueType {
    Any,
    Boolean,
    Text,
    TextOrPattern,
    /// Text restricted to a fixed set of values.
    OneOf(Vec<String>),
}

impl FilterValueType {
    pub fn one_of(values: &[&str]) -> Self {
        FilterValueType::OneOf(values.iter().map(|v| v.to_string()).collect())
    }

    pub fn accepts(&self, value: &FilterValue) -> bool {
        match self {
            FilterValueType::Any => true,
            FilterValueType::Boolean => matches!(value, FilterValue::Bool(_)),
            FilterValueType::Text => matches!(value, FilterValue::Text(_)),
            FilterValueType::TextOrPattern => {
                matches!(value, FilterValue::Text(_) | FilterValue::Pattern(_))
            }
            FilterValueType::OneOf(allowed) => {
                value.as_text().is_some_and(|v| allowed.iter().any(|a| a == v))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FilterValueType::Any => "any value".to_string(),
            FilterValueType::Boolean => "true or false".to_string(),
            FilterValueType::Text => "a text value".to_string(),
            FilterValueType::TextOrPattern => "a text value or a pattern".to_string(),
            FilterValueType::OneOf(allowed) => format!("one of {}", allowed.join(", ")),
        }
    }
}

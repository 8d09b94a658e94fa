use locus_xpath::{Expression, MatchMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output query language of a compiled selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Css,
    XPath,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Css => f.write_str("css"),
            Format::XPath => f.write_str("xpath"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Format::Css),
            "xpath" => Ok(Format::XPath),
            other => Err(format!("unknown format '{other}', expected css or xpath")),
        }
    }
}

/// The compiled output: a CSS selector string or an XPath expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpression {
    Css(String),
    XPath(Expression),
}

impl QueryExpression {
    pub fn format(&self) -> Format {
        match self {
            QueryExpression::Css(_) => Format::Css,
            QueryExpression::XPath(_) => Format::XPath,
        }
    }

    pub fn as_css(&self) -> Option<&str> {
        match self {
            QueryExpression::Css(css) => Some(css),
            QueryExpression::XPath(_) => None,
        }
    }

    pub fn as_xpath(&self) -> Option<&Expression> {
        match self {
            QueryExpression::XPath(expr) => Some(expr),
            QueryExpression::Css(_) => None,
        }
    }

    pub fn into_xpath(self) -> Option<Expression> {
        match self {
            QueryExpression::XPath(expr) => Some(expr),
            QueryExpression::Css(_) => None,
        }
    }

    /// Text form of the expression. `mode` only affects XPath `is` tests.
    pub fn render(&self, mode: MatchMode) -> String {
        match self {
            QueryExpression::Css(css) => css.clone(),
            QueryExpression::XPath(expr) => expr.to_xpath_with(mode),
        }
    }
}

impl From<Expression> for QueryExpression {
    fn from(expr: Expression) -> Self {
        QueryExpression::XPath(expr)
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(MatchMode::Exact))
    }
}

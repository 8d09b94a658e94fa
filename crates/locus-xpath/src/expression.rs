use crate::renderer::{MatchMode, Renderer};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// A node in an XPath expression tree.
///
/// Trees are built with the free functions in [`crate::dsl`] and the
/// chaining methods below, then turned into text by a [`Renderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// The context node, `.`.
    Current,
    /// `on//name`, or `on//*[self::a | self::b]` for several names.
    Descendant {
        on: Box<Expression>,
        names: Vec<String>,
    },
    /// `on/name`.
    Child {
        on: Box<Expression>,
        names: Vec<String>,
    },
    /// `on/axis::name`.
    Axis {
        on: Box<Expression>,
        axis: String,
        names: Vec<String>,
    },
    /// `//name`, rooted at the document.
    Anywhere(Vec<String>),
    /// `on[condition]`.
    Where {
        on: Box<Expression>,
        condition: Box<Expression>,
    },
    /// `on/@name`.
    Attribute { on: Box<Expression>, name: String },
    /// A quoted string literal.
    Literal(String),
    /// `string(on)`.
    StringOf(Box<Expression>),
    /// `normalize-space(on)`.
    NormalizeSpace(Box<Expression>),
    Equality(Box<Expression>, Box<Expression>),
    /// Equality in exact mode, `contains()` in fuzzy mode.
    Is(Box<Expression>, Box<Expression>),
    Contains(Box<Expression>, Box<Expression>),
    StartsWith(Box<Expression>, Box<Expression>),
    /// Whitespace-separated word membership, as used for `class`.
    ContainsWord(Box<Expression>, String),
    OneOf(Box<Expression>, Vec<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Uppercase(Box<Expression>),
    Function { name: String, args: Vec<Expression> },
    /// `outer//inner`: `inner` evaluated below every node `outer` selects.
    Nested {
        outer: Box<Expression>,
        inner: Box<Expression>,
    },
    Union(Vec<Expression>),
    /// Pre-rendered XPath text, emitted verbatim.
    Raw(String),
}

fn names_of(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl Expression {
    pub fn descendant(self, names: &[&str]) -> Self {
        Self::Descendant {
            on: Box::new(self),
            names: names_of(names),
        }
    }

    pub fn child(self, names: &[&str]) -> Self {
        Self::Child {
            on: Box::new(self),
            names: names_of(names),
        }
    }

    pub fn axis(self, axis: &str, names: &[&str]) -> Self {
        Self::Axis {
            on: Box::new(self),
            axis: axis.to_string(),
            names: names_of(names),
        }
    }

    /// `on/self::name`, narrowing a node set to the given element names.
    pub fn self_axis(self, names: &[&str]) -> Self {
        self.axis("self", names)
    }

    /// Add a predicate. `None` is the identity: the expression comes back
    /// unchanged. On a union the predicate is pushed into every member.
    pub fn filter(self, condition: impl Into<Option<Expression>>) -> Self {
        let Some(condition) = condition.into() else {
            return self;
        };
        match self {
            Self::Union(members) => Self::Union(
                members
                    .into_iter()
                    .map(|m| m.filter(condition.clone()))
                    .collect(),
            ),
            on => Self::Where {
                on: Box::new(on),
                condition: Box::new(condition),
            },
        }
    }

    pub fn attr(self, name: &str) -> Self {
        Self::Attribute {
            on: Box::new(self),
            name: name.to_string(),
        }
    }

    pub fn string_of(self) -> Self {
        Self::StringOf(Box::new(self))
    }

    /// `normalize-space(self)`.
    pub fn normalize(self) -> Self {
        Self::NormalizeSpace(Box::new(self))
    }

    pub fn equals(self, other: impl Into<Expression>) -> Self {
        Self::Equality(Box::new(self), Box::new(other.into()))
    }

    pub fn is(self, other: impl Into<Expression>) -> Self {
        Self::Is(Box::new(self), Box::new(other.into()))
    }

    pub fn contains(self, other: impl Into<Expression>) -> Self {
        Self::Contains(Box::new(self), Box::new(other.into()))
    }

    pub fn starts_with(self, other: impl Into<Expression>) -> Self {
        Self::StartsWith(Box::new(self), Box::new(other.into()))
    }

    pub fn contains_word(self, word: impl Into<String>) -> Self {
        Self::ContainsWord(Box::new(self), word.into())
    }

    pub fn one_of<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Expression>,
    {
        Self::OneOf(Box::new(self), values.into_iter().map(Into::into).collect())
    }

    pub fn and(self, other: Expression) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expression) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    pub fn uppercase(self) -> Self {
        Self::Uppercase(Box::new(self))
    }

    /// Select `inner` below every node of `self`. A union on the inner side
    /// is distributed so each branch keeps its own path.
    pub fn nested(self, inner: Expression) -> Self {
        match inner {
            Self::Union(members) => Self::Union(
                members
                    .into_iter()
                    .map(|m| self.clone().nested(m))
                    .collect(),
            ),
            inner => Self::Nested {
                outer: Box::new(self),
                inner: Box::new(inner),
            },
        }
    }

    /// Set union. Nested unions are flattened.
    pub fn union(self, other: Expression) -> Self {
        let mut members = match self {
            Self::Union(members) => members,
            single => vec![single],
        };
        match other {
            Self::Union(more) => members.extend(more),
            single => members.push(single),
        }
        Self::Union(members)
    }

    /// Members of a union, or the expression itself.
    pub fn union_members(&self) -> &[Expression] {
        match self {
            Self::Union(members) => members,
            single => std::slice::from_ref(single),
        }
    }

    pub fn to_xpath(&self) -> String {
        Renderer::new(MatchMode::Exact).render(self)
    }

    pub fn to_xpath_with(&self, mode: MatchMode) -> String {
        Renderer::new(mode).render(self)
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<&String> for Expression {
    fn from(value: &String) -> Self {
        Self::Literal(value.clone())
    }
}

impl Not for Expression {
    type Output = Expression;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

impl BitAnd for Expression {
    type Output = Expression;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Expression {
    type Output = Expression;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath())
    }
}

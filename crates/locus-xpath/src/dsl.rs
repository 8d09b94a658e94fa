//! Free-standing constructors rooted at the context node.

use crate::expression::Expression;

pub fn current() -> Expression {
    Expression::Current
}

pub fn descendant(names: &[&str]) -> Expression {
    current().descendant(names)
}

pub fn child(names: &[&str]) -> Expression {
    current().child(names)
}

pub fn axis(axis: &str, names: &[&str]) -> Expression {
    current().axis(axis, names)
}

pub fn anywhere(names: &[&str]) -> Expression {
    Expression::Anywhere(names.iter().map(|n| n.to_string()).collect())
}

pub fn attr(name: &str) -> Expression {
    current().attr(name)
}

/// `string(.)`
pub fn string() -> Expression {
    current().string_of()
}

/// XPath text taken as is.
pub fn raw(xpath: impl Into<String>) -> Expression {
    Expression::Raw(xpath.into())
}

pub fn literal(value: impl Into<String>) -> Expression {
    Expression::Literal(value.into())
}

/// `local-name(.)`
pub fn local_name() -> Expression {
    function("local-name", vec![current()])
}

pub fn function(name: &str, args: Vec<Expression>) -> Expression {
    Expression::Function {
        name: name.to_string(),
        args,
    }
}

/// Union of all expressions, `None` when the iterator is empty.
pub fn union_all(exprs: impl IntoIterator<Item = Expression>) -> Option<Expression> {
    exprs.into_iter().reduce(Expression::union)
}

/// Disjunction of all conditions, `None` when the iterator is empty.
pub fn any_of(conditions: impl IntoIterator<Item = Expression>) -> Option<Expression> {
    conditions.into_iter().reduce(Expression::or)
}

/// Conjunction of all conditions, `None` when the iterator is empty.
pub fn all_of(conditions: impl IntoIterator<Item = Expression>) -> Option<Expression> {
    conditions.into_iter().reduce(Expression::and)
}

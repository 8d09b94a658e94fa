use crate::expression::Expression;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// How `is` comparisons are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// `is` renders as `=`.
    #[default]
    Exact,
    /// `is` renders as `contains()`.
    Fuzzy,
}

/// Turns an [`Expression`] into XPath 1.0 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    mode: MatchMode,
}

impl Renderer {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn render(&self, expr: &Expression) -> String {
        match expr {
            Expression::Current => ".".to_string(),
            Expression::Raw(text) => text.clone(),
            Expression::Descendant { on, names } => {
                element_step(&format!("{}//", self.render(on)), names)
            }
            Expression::Child { on, names } => {
                element_step(&format!("{}/", self.render(on)), names)
            }
            Expression::Axis { on, axis, names } => {
                element_step(&format!("{}/{}::", self.render(on), axis), names)
            }
            Expression::Anywhere(names) => element_step("//", names),
            Expression::Where { on, condition } => {
                let on = match on.as_ref() {
                    union @ Expression::Union(_) => format!("({})", self.render(union)),
                    Expression::Raw(text) if text.contains('|') => format!("({text})"),
                    other => self.render(other),
                };
                format!("{}[{}]", on, self.render(condition))
            }
            Expression::Attribute { on, name } => format!("{}/@{}", self.render(on), name),
            Expression::Literal(value) => quote(value),
            Expression::StringOf(on) => format!("string({})", self.render(on)),
            Expression::NormalizeSpace(on) => format!("normalize-space({})", self.render(on)),
            Expression::Equality(a, b) => format!("{} = {}", self.render(a), self.render(b)),
            Expression::Is(a, b) => match self.mode {
                MatchMode::Exact => format!("{} = {}", self.render(a), self.render(b)),
                MatchMode::Fuzzy => {
                    format!("contains({}, {})", self.render(a), self.render(b))
                }
            },
            Expression::Contains(a, b) => {
                format!("contains({}, {})", self.render(a), self.render(b))
            }
            Expression::StartsWith(a, b) => {
                format!("starts-with({}, {})", self.render(a), self.render(b))
            }
            Expression::ContainsWord(on, word) => format!(
                "contains(concat(' ', normalize-space({}), ' '), {})",
                self.render(on),
                quote(&format!(" {word} "))
            ),
            Expression::OneOf(on, values) => {
                if values.is_empty() {
                    return "false()".to_string();
                }
                let on = self.render(on);
                let alternatives: Vec<String> = values
                    .iter()
                    .map(|v| format!("{} = {}", on, self.render(v)))
                    .collect();
                format!("({})", alternatives.join(" or "))
            }
            Expression::And(a, b) => format!("({} and {})", self.render(a), self.render(b)),
            Expression::Or(a, b) => format!("({} or {})", self.render(a), self.render(b)),
            Expression::Not(on) => format!("not({})", self.render(on)),
            Expression::Uppercase(on) => format!(
                "translate({}, {}, {})",
                self.render(on),
                quote(LOWERCASE),
                quote(UPPERCASE)
            ),
            Expression::Function { name, args } => {
                let args: Vec<String> = args.iter().map(|a| self.render(a)).collect();
                format!("{}({})", name, args.join(", "))
            }
            Expression::Nested { outer, inner } => {
                format!("{}//{}", self.render(outer), self.render(inner))
            }
            Expression::Union(members) => members
                .iter()
                .map(|m| self.render(m))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

fn element_step(prefix: &str, names: &[String]) -> String {
    match names {
        [] => format!("{prefix}*"),
        [name] => format!("{prefix}{name}"),
        many => {
            let tests: Vec<String> = many.iter().map(|n| format!("self::{n}")).collect();
            format!("{prefix}*[{}]", tests.join(" | "))
        }
    }
}

/// Quote a string as an XPath literal. Values holding both quote characters
/// are split into a `concat()` call.
pub fn quote(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let mut pieces = Vec::new();
    for (i, part) in value.split('\'').enumerate() {
        if i > 0 {
            pieces.push("\"'\"".to_string());
        }
        if !part.is_empty() {
            pieces.push(format!("'{part}'"));
        }
    }
    format!("concat({})", pieces.join(", "))
}

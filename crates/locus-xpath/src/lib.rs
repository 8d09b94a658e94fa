pub mod dsl;
pub mod expression;
pub mod renderer;

pub use expression::Expression;
pub use renderer::{MatchMode, Renderer, quote};

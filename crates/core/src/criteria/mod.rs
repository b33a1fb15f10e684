//! Criteria compilation.
//!
//! Turns predicate trees into filter expressions and change sets into
//! aliased update expressions.

mod compiler;
mod error;
mod types;
mod update;

pub use compiler::{compile, CriteriaCompiler};
pub use error::{CriteriaError, Result};
pub use types::{BooleanOperator, ComparisonOperator, CompiledPredicate, Predicate};
pub use update::{build_update_expression, UpdateExpression};

use std::collections::BTreeMap;

use crate::codec::{Item, WireValue};

/// An aliased `SET` update expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, WireValue>,
}

impl UpdateExpression {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Builds a `SET` expression assigning every attribute of `changes`.
///
/// Each attribute gets its own `#fN` name alias and `:uN` value placeholder,
/// so reserved words are safe as field names. Returns an empty expression
/// when there is nothing to set.
pub fn build_update_expression(changes: &Item) -> UpdateExpression {
    let mut update = UpdateExpression::default();
    let mut assignments = Vec::with_capacity(changes.len());

    for (position, (field, value)) in changes.iter().enumerate() {
        let name = format!("#f{position}");
        let placeholder = format!(":u{position}");
        assignments.push(format!("{name} = {placeholder}"));
        update.names.insert(name, field.clone());
        update.values.insert(placeholder, value.clone());
    }

    if !assignments.is_empty() {
        update.expression = format!("SET {}", assignments.join(", "));
    }

    update
}

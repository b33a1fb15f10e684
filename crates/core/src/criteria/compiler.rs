//! Criteria compiler.
//!
//! Walks a [`Predicate`] tree and produces filter-expression text plus a
//! parameter table. Field names stay in the text; every literal is replaced
//! by a generated token so caller input never reaches the expression itself.

use std::collections::BTreeMap;

use crate::codec::{marshal, WireValue};
use crate::schema::{EntitySchema, SemanticType};

use super::{ComparisonOperator, CompiledPredicate, CriteriaError, Predicate, Result};

/// Compiles `predicate` against `schema` with a fresh token sequence.
pub fn compile(predicate: &Predicate, schema: &EntitySchema) -> Result<CompiledPredicate> {
    CriteriaCompiler::new(schema).compile(predicate)
}

/// Stateful compiler. Tokens are unique for the lifetime of the compiler.
pub struct CriteriaCompiler<'a> {
    schema: &'a EntitySchema,
    next_token: usize,
}

impl<'a> CriteriaCompiler<'a> {
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self {
            schema,
            next_token: 0,
        }
    }

    pub fn compile(&mut self, predicate: &Predicate) -> Result<CompiledPredicate> {
        let mut values = BTreeMap::new();
        let expression = self.walk(predicate, &mut values)?;
        Ok(CompiledPredicate { expression, values })
    }

    fn walk(
        &mut self,
        predicate: &Predicate,
        values: &mut BTreeMap<String, WireValue>,
    ) -> Result<String> {
        match predicate {
            Predicate::Comparison {
                field,
                operator,
                value,
            } => {
                let operator: ComparisonOperator = operator.parse()?;
                // Encoded with the declared type, not the literal's own.
                let semantic_type = self
                    .schema
                    .field(field)
                    .map(|f| f.semantic_type())
                    .unwrap_or(&SemanticType::String);
                let token = self.fresh_token();
                values.insert(token.clone(), marshal(value, semantic_type)?);
                Ok(format!("{field} {operator} {token}"))
            }
            Predicate::Composite { operator, children } => {
                if children.is_empty() {
                    return Err(CriteriaError::EmptyPredicate);
                }
                let parts = children
                    .iter()
                    .map(|child| self.walk(child, values))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("( {} )", parts.join(&format!(" {operator} "))))
            }
        }
    }

    fn fresh_token(&mut self) -> String {
        let token = format!(":v{}", self.next_token);
        self.next_token += 1;
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Value;

    fn schema() -> EntitySchema {
        EntitySchema::builder("oauth_users")
            .hash_key("username", SemanticType::String)
            .field("age", SemanticType::Number)
            .field("email_verified", SemanticType::Boolean)
            .field("a", SemanticType::Number)
            .field("b", SemanticType::Number)
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_comparison_has_no_parentheses() {
        let compiled = compile(&Predicate::eq("age", 30), &schema()).unwrap();

        assert_eq!(compiled.expression, "age = :v0");
        assert_eq!(compiled.values.len(), 1);
        assert_eq!(compiled.values[":v0"], WireValue::Num("30".to_string()));
    }

    #[test]
    fn test_composite_is_wrapped() {
        let predicate = Predicate::and([Predicate::eq("a", 1), Predicate::eq("b", 2)]);

        let compiled = compile(&predicate, &schema()).unwrap();

        assert_eq!(compiled.expression, "( a = :v0 AND b = :v1 )");
        assert_eq!(compiled.values[":v0"], WireValue::Num("1".to_string()));
        assert_eq!(compiled.values[":v1"], WireValue::Num("2".to_string()));
    }

    #[test]
    fn test_composite_with_one_child_is_wrapped() {
        let predicate = Predicate::or([Predicate::eq("a", 1)]);

        let compiled = compile(&predicate, &schema()).unwrap();

        assert_eq!(compiled.expression, "( a = :v0 )");
        assert_eq!(compiled.values.len(), 1);
    }

    #[test]
    fn test_nested_composites_merge_parameters() {
        let predicate = Predicate::or([
            Predicate::eq("username", "john"),
            Predicate::and([Predicate::gte("age", 18), Predicate::lt("age", 30)]),
        ]);

        let compiled = compile(&predicate, &schema()).unwrap();

        assert_eq!(
            compiled.expression,
            "( username = :v0 OR ( age >= :v1 AND age < :v2 ) )"
        );
        assert_eq!(compiled.values.len(), 3);
    }

    #[test]
    fn test_literal_encoded_with_declared_type() {
        let compiled = compile(&Predicate::eq("age", "30"), &schema()).unwrap();
        assert_eq!(compiled.values[":v0"], WireValue::Num("30".to_string()));

        let compiled = compile(&Predicate::eq("email_verified", 1), &schema()).unwrap();
        assert_eq!(compiled.values[":v0"], WireValue::Bool(true));

        let compiled = compile(&Predicate::eq("username", 42), &schema()).unwrap();
        assert_eq!(compiled.values[":v0"], WireValue::Str("42".to_string()));
    }

    #[test]
    fn test_undeclared_field_encoded_as_string() {
        let compiled = compile(&Predicate::eq("nickname", 7), &schema()).unwrap();
        assert_eq!(compiled.values[":v0"], WireValue::Str("7".to_string()));
    }

    #[test]
    fn test_null_literal() {
        let compiled = compile(&Predicate::eq("age", Value::Null), &schema()).unwrap();
        assert_eq!(compiled.values[":v0"], WireValue::Null);
    }

    #[test]
    fn test_empty_composite_rejected() {
        let error = compile(&Predicate::and(Vec::new()), &schema()).unwrap_err();
        assert_eq!(error, CriteriaError::EmptyPredicate);

        let nested = Predicate::or([Predicate::eq("a", 1), Predicate::and(Vec::new())]);
        let error = compile(&nested, &schema()).unwrap_err();
        assert_eq!(error, CriteriaError::EmptyPredicate);
    }

    #[test]
    fn test_unsupported_operator_rejected() {
        let predicate = Predicate::compare("age", "LIKE", 3);

        let error = compile(&predicate, &schema()).unwrap_err();

        assert_eq!(
            error,
            CriteriaError::UnsupportedOperator {
                op: "LIKE".to_string()
            }
        );
    }

    #[test]
    fn test_operator_aliases_normalised() {
        let compiled = compile(&Predicate::compare("age", "!=", 3), &schema()).unwrap();
        assert_eq!(compiled.expression, "age <> :v0");
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let predicate = Predicate::and([Predicate::eq("a", 1), Predicate::eq("b", 2)]);

        let first = compile(&predicate, &schema()).unwrap();
        let second = compile(&predicate, &schema()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_tokens_unique_across_compilations_on_one_compiler() {
        let schema = schema();
        let mut compiler = CriteriaCompiler::new(&schema);

        let first = compiler.compile(&Predicate::eq("a", 1)).unwrap();
        let second = compiler.compile(&Predicate::eq("a", 1)).unwrap();

        assert_ne!(first.expression, second.expression);
        assert_eq!(
            first.values.values().collect::<Vec<_>>(),
            second.values.values().collect::<Vec<_>>()
        );
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::codec::{Value, WireValue};

use super::CriteriaError;

/// Operator joining the children of a composite expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOperator {
    And,
    Or,
}

impl BooleanOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators understood by the store's filter language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = CriteriaError;

    fn from_str(op: &str) -> Result<Self, Self::Err> {
        match op.trim().to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Ok(Self::Eq),
            "<>" | "!=" | "neq" => Ok(Self::Neq),
            "<" | "lt" => Ok(Self::Lt),
            "<=" | "lte" => Ok(Self::Lte),
            ">" | "gt" => Ok(Self::Gt),
            ">=" | "gte" => Ok(Self::Gte),
            _ => Err(CriteriaError::UnsupportedOperator { op: op.to_string() }),
        }
    }
}

/// A boolean expression tree over field comparisons.
///
/// Operators are kept as written and only checked at compile time, so a tree
/// built from caller input can carry an operator the store does not support.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison {
        field: String,
        operator: String,
        value: Value,
    },
    Composite {
        operator: BooleanOperator,
        children: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn compare(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::Comparison {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Eq.as_str(), value)
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Neq.as_str(), value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Lt.as_str(), value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Lte.as_str(), value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Gt.as_str(), value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Gte.as_str(), value)
    }

    pub fn and(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Composite {
            operator: BooleanOperator::And,
            children: children.into_iter().collect(),
        }
    }

    pub fn or(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Composite {
            operator: BooleanOperator::Or,
            children: children.into_iter().collect(),
        }
    }
}

/// Filter expression text plus the parameter table its tokens refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPredicate {
    pub expression: String,
    pub values: BTreeMap<String, WireValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_aliases() {
        let op = |s: &str| s.parse::<ComparisonOperator>().unwrap();

        assert_eq!(op("="), ComparisonOperator::Eq);
        assert_eq!(op("=="), ComparisonOperator::Eq);
        assert_eq!(op("!="), ComparisonOperator::Neq);
        assert_eq!(op("NEQ"), ComparisonOperator::Neq);
        assert_eq!(op(">="), ComparisonOperator::Gte);
    }

    #[test]
    fn test_unknown_operator() {
        let error = "IN".parse::<ComparisonOperator>().unwrap_err();
        assert_eq!(
            error,
            CriteriaError::UnsupportedOperator {
                op: "IN".to_string()
            }
        );
    }

    #[test]
    fn test_helpers_build_tree() {
        let predicate = Predicate::and([Predicate::eq("a", 1), Predicate::gt("b", 2)]);

        match predicate {
            Predicate::Composite { operator, children } => {
                assert_eq!(operator, BooleanOperator::And);
                assert_eq!(children.len(), 2);
                assert_eq!(
                    children[1],
                    Predicate::Comparison {
                        field: "b".to_string(),
                        operator: ">".to_string(),
                        value: Value::from(2),
                    }
                );
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }
}

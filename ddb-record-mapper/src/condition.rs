/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Filter expressions and their translation into classified wire conditions.
//!
//! A filter is a list of `(attribute, condition)` pairs, all ANDed; there is
//! no OR. Translation classifies each pair by the attribute's key role:
//! hash-key and range-key conditions become key conditions that select the
//! query access path, everything else becomes a generic filter condition the
//! store evaluates after the key conditions narrow the candidate set.

use crate::error::Error;
use ddb_record_mapper_core::codec;
use ddb_record_mapper_core::{ConversionError, ModelDefinition, Value, WireValue};
use std::str::FromStr;

/// Comparison operators understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// Equal. With a multi-element operand list: match any.
    Eq,
    /// Not equal.
    Ne,
    /// Less than or equal.
    Le,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Ge,
    /// Greater than.
    Gt,
    /// Member of the operand list.
    In,
    /// String contains.
    Contains,
    /// String does not contain.
    NotContains,
    /// String prefix match.
    BeginsWith,
}

impl ComparisonOperator {
    /// The operator's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "EQ",
            ComparisonOperator::Ne => "NE",
            ComparisonOperator::Le => "LE",
            ComparisonOperator::Lt => "LT",
            ComparisonOperator::Ge => "GE",
            ComparisonOperator::Gt => "GT",
            ComparisonOperator::In => "IN",
            ComparisonOperator::Contains => "CONTAINS",
            ComparisonOperator::NotContains => "NOT_CONTAINS",
            ComparisonOperator::BeginsWith => "BEGINS_WITH",
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = ConversionError;

    /// Parses the ORM-side operator names, normalizing the usual aliases
    /// (`gte` for `ge`, `inq` for `in`, and so on).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Ok(ComparisonOperator::Eq),
            "ne" | "neq" => Ok(ComparisonOperator::Ne),
            "le" | "lte" => Ok(ComparisonOperator::Le),
            "lt" => Ok(ComparisonOperator::Lt),
            "ge" | "gte" => Ok(ComparisonOperator::Ge),
            "gt" => Ok(ComparisonOperator::Gt),
            "in" | "inq" => Ok(ComparisonOperator::In),
            "contains" => Ok(ComparisonOperator::Contains),
            "notcontains" | "nin" => Ok(ComparisonOperator::NotContains),
            "beginswith" | "begins_with" => Ok(ComparisonOperator::BeginsWith),
            other => Err(ConversionError::invalid_value(format!(
                "unknown comparison operator '{}'",
                other
            ))),
        }
    }
}

/// A single condition on one attribute, shaped once at the ORM boundary.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Bare value: equality.
    Eq(Value),
    /// Value list: match any element.
    In(Vec<Value>),
    /// Explicit operator and operand.
    Op(ComparisonOperator, Value),
}

impl Condition {
    fn operator(&self) -> ComparisonOperator {
        match self {
            Condition::Eq(_) => ComparisonOperator::Eq,
            Condition::In(_) => ComparisonOperator::In,
            Condition::Op(op, _) => *op,
        }
    }

    /// True when the operand is a disjunction of values. A list-valued hash
    /// condition cannot use the query path: the store's query operation
    /// accepts a single hash value only.
    fn has_list_operand(&self) -> bool {
        matches!(
            self,
            Condition::In(_) | Condition::Eq(Value::List(_)) | Condition::Op(_, Value::List(_))
        )
    }

    fn wire_operands(&self) -> Result<Vec<WireValue>, ConversionError> {
        match self {
            Condition::In(values) => codec::encode_list(values),
            Condition::Eq(Value::List(values)) | Condition::Op(_, Value::List(values)) => {
                codec::encode_list(values)
            }
            Condition::Eq(value) | Condition::Op(_, value) => Ok(vec![codec::encode(value)?]),
        }
    }
}

/// A condition in wire form: operator plus one operand entry per value.
/// A multi-element operand list is never collapsed; the store treats it as
/// "match any of these".
#[derive(Debug, Clone)]
pub struct WireCondition {
    /// The comparison operator.
    pub operator: ComparisonOperator,
    /// The encoded operands.
    pub operands: Vec<WireValue>,
}

/// Sort direction for client-side result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// A complete filter: conditions plus client-side result shaping.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub(crate) conditions: Vec<(String, Condition)>,
    pub(crate) order: Option<(String, SortOrder)>,
    pub(crate) offset: Option<usize>,
    pub(crate) limit: Option<usize>,
}

impl Filter {
    /// An empty filter: everything, default order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition on an attribute.
    pub fn condition(mut self, attribute: impl Into<String>, condition: Condition) -> Self {
        self.conditions.push((attribute.into(), condition));
        self
    }

    /// Adds an equality condition.
    pub fn eq(self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(attribute, Condition::Eq(value.into()))
    }

    /// Sorts results by the given attribute. Defaults to the hash (or
    /// composite) key, ascending.
    pub fn order_by(mut self, attribute: impl Into<String>, order: SortOrder) -> Self {
        self.order = Some((attribute.into(), order));
        self
    }

    /// Drops the first `offset` results after ordering.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Keeps at most `limit` results after the offset.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The access path chosen for a translated filter.
#[derive(Debug)]
pub(crate) enum AccessPlan {
    /// Key conditions present: use the store's query operation.
    Query {
        key_conditions: Vec<(String, WireCondition)>,
        filter_conditions: Vec<(String, WireCondition)>,
    },
    /// No usable hash condition: fall back to a full-collection scan.
    Scan {
        filter_conditions: Vec<(String, WireCondition)>,
    },
}

/// Classifies a filter's conditions and picks the access path.
pub(crate) fn translate(
    model: &ModelDefinition,
    conditions: &[(String, Condition)],
) -> Result<AccessPlan, Error> {
    let hash_attr = model.hash_key().name().to_string();
    let range_attr = model.range_key().map(|a| a.name().to_string());

    let mut key_conditions = Vec::new();
    let mut filter_conditions = Vec::new();
    let mut hash_condition_usable = false;

    for (attribute, condition) in conditions {
        let wire = WireCondition {
            operator: condition.operator(),
            operands: condition.wire_operands()?,
        };
        if *attribute == hash_attr {
            if condition.has_list_operand() {
                // A disjunction of hash values cannot be queried; demote it
                // and everything else to scan filters.
                filter_conditions.push((attribute.clone(), wire));
                continue;
            }
            if wire.operator != ComparisonOperator::Eq {
                tracing::warn!(
                    attribute = attribute.as_str(),
                    operator = wire.operator.as_str(),
                    "non-equality operator on a hash key; the store will reject this query"
                );
            }
            hash_condition_usable = true;
            key_conditions.push((attribute.clone(), wire));
        } else if range_attr.as_deref() == Some(attribute.as_str()) {
            key_conditions.push((attribute.clone(), wire));
        } else {
            filter_conditions.push((attribute.clone(), wire));
        }
    }

    if hash_condition_usable {
        Ok(AccessPlan::Query {
            key_conditions,
            filter_conditions,
        })
    } else {
        // Without a hash equality the range condition cannot narrow
        // anything; it is evaluated as an ordinary filter.
        filter_conditions.extend(key_conditions);
        Ok(AccessPlan::Scan { filter_conditions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddb_record_mapper_core::{AttributeDefinition, KeyRole, NativeType};

    fn post_model() -> ModelDefinition {
        ModelDefinition::builder("Post")
            .attribute(
                AttributeDefinition::new("author", NativeType::String).key_role(KeyRole::Hash),
            )
            .attribute(
                AttributeDefinition::new("title", NativeType::String).key_role(KeyRole::Range),
            )
            .attribute(
                AttributeDefinition::new("id", NativeType::String)
                    .key_role(KeyRole::CompositePrimary),
            )
            .attribute(AttributeDefinition::new("views", NativeType::Number))
            .build()
            .unwrap()
    }

    #[test]
    fn hash_equality_selects_the_query_path() {
        let plan = translate(
            &post_model(),
            &[
                ("author".to_string(), Condition::Eq("ann".into())),
                ("views".to_string(), Condition::Op(ComparisonOperator::Gt, 10.into())),
            ],
        )
        .unwrap();
        match plan {
            AccessPlan::Query {
                key_conditions,
                filter_conditions,
            } => {
                assert_eq!(key_conditions.len(), 1);
                assert_eq!(key_conditions[0].0, "author");
                assert_eq!(filter_conditions.len(), 1);
                assert_eq!(filter_conditions[0].0, "views");
            }
            AccessPlan::Scan { .. } => panic!("expected query path"),
        }
    }

    #[test]
    fn range_conditions_join_the_key_conditions() {
        let plan = translate(
            &post_model(),
            &[
                ("author".to_string(), Condition::Eq("ann".into())),
                (
                    "title".to_string(),
                    Condition::Op(ComparisonOperator::BeginsWith, "How to".into()),
                ),
            ],
        )
        .unwrap();
        match plan {
            AccessPlan::Query { key_conditions, .. } => {
                assert_eq!(key_conditions.len(), 2);
            }
            AccessPlan::Scan { .. } => panic!("expected query path"),
        }
    }

    #[test]
    fn missing_hash_condition_selects_scan() {
        let plan = translate(
            &post_model(),
            &[("views".to_string(), Condition::Eq(3.into()))],
        )
        .unwrap();
        assert!(matches!(plan, AccessPlan::Scan { filter_conditions } if filter_conditions.len() == 1));
    }

    #[test]
    fn list_valued_hash_condition_falls_back_to_scan() {
        let plan = translate(
            &post_model(),
            &[(
                "author".to_string(),
                Condition::In(vec!["ann".into(), "ben".into()]),
            )],
        )
        .unwrap();
        match plan {
            AccessPlan::Scan { filter_conditions } => {
                assert_eq!(filter_conditions.len(), 1);
                // Both operands survive; never collapsed to one equality.
                assert_eq!(filter_conditions[0].1.operands.len(), 2);
            }
            AccessPlan::Query { .. } => panic!("expected scan fallback"),
        }
    }

    #[test]
    fn lone_range_condition_is_demoted_to_a_filter() {
        let plan = translate(
            &post_model(),
            &[(
                "title".to_string(),
                Condition::Op(ComparisonOperator::Ge, "M".into()),
            )],
        )
        .unwrap();
        assert!(matches!(plan, AccessPlan::Scan { filter_conditions } if filter_conditions.len() == 1));
    }

    #[test]
    fn operator_aliases_normalize() {
        assert_eq!(
            "gte".parse::<ComparisonOperator>().unwrap(),
            ComparisonOperator::Ge
        );
        assert_eq!(
            "inq".parse::<ComparisonOperator>().unwrap(),
            ComparisonOperator::In
        );
        assert!("between".parse::<ComparisonOperator>().is_err());
    }
}

// ordermart-core/src/domain/quality/contract.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::model::{ColumnType, order, user};

/// What a raw table must look like before any transformation touches it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableContract {
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
    #[serde(default)]
    pub not_null: Vec<String>,
    #[serde(default)]
    pub unique: Vec<String>,
    #[serde(default)]
    pub types: BTreeMap<String, ColumnType>,
    /// Reject columns that are neither required nor optional.
    #[serde(default)]
    pub strict: bool,
}

impl TableContract {
    pub fn orders(strict: bool) -> Self {
        let required = [
            order::ORDER_ID,
            order::USER_ID,
            order::AMOUNT,
            order::STATUS,
            order::TIMESTAMP,
        ];
        Self {
            required: required.iter().map(|c| c.to_string()).collect(),
            optional: vec![],
            not_null: [order::ORDER_ID, order::USER_ID, order::TIMESTAMP]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            unique: vec![order::ORDER_ID.to_string()],
            types: BTreeMap::from([
                (order::AMOUNT.to_string(), ColumnType::Float),
                (order::TIMESTAMP.to_string(), ColumnType::Timestamp),
            ]),
            strict,
        }
    }

    pub fn users(
        required_attributes: &[String],
        attribute_types: &BTreeMap<String, ColumnType>,
        strict: bool,
    ) -> Self {
        let mut required = vec![user::USER_ID.to_string()];
        required.extend(
            required_attributes
                .iter()
                .filter(|c| c.as_str() != user::USER_ID)
                .cloned(),
        );
        Self {
            required,
            optional: attribute_types
                .keys()
                .filter(|c| !required_attributes.contains(c))
                .cloned()
                .collect(),
            not_null: vec![user::USER_ID.to_string()],
            unique: vec![user::USER_ID.to_string()],
            types: attribute_types.clone(),
            strict,
        }
    }

    pub fn declares(&self, column: &str) -> bool {
        self.required.iter().any(|c| c == column) || self.optional.iter().any(|c| c == column)
    }

    /// Declared types as an ordered list, for record conversion.
    pub fn typed_columns(&self) -> Vec<(String, ColumnType)> {
        self.types.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

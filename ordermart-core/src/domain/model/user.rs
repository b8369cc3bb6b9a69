// ordermart-core/src/domain/model/user.rs

use crate::domain::error::DomainError;
use crate::domain::model::table::{ColumnDef, ColumnType, Table, Value};

pub const USER_ID: &str = "user_id";

/// A user row: the key plus attribute cells aligned with
/// [`UserTable::attributes`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: String,
    pub attributes: Vec<Value>,
}

/// Users keep their attribute columns dynamic (segment, country, signup
/// date...), only `user_id` is structural.
#[derive(Debug, Clone, PartialEq)]
pub struct UserTable {
    pub attributes: Vec<ColumnDef>,
    pub users: Vec<User>,
}

impl UserTable {
    /// Split a gated users table into key + attributes. Attribute types come
    /// from `declared`; undeclared attributes stay text.
    pub fn from_table(
        table: &Table,
        declared: &[(String, ColumnType)],
    ) -> Result<UserTable, DomainError> {
        let key_index = table
            .column_index(USER_ID)
            .ok_or_else(|| DomainError::SchemaError {
                table: table.name.clone(),
                missing: vec![USER_ID.to_string()],
                unexpected: vec![],
            })?;

        let attributes: Vec<(usize, ColumnDef)> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_index)
            .map(|(i, col)| {
                let ty = declared
                    .iter()
                    .find(|(name, _)| *name == col.name)
                    .map(|(_, ty)| *ty)
                    .unwrap_or(col.data_type);
                (i, ColumnDef::new(col.name.clone(), ty))
            })
            .collect();

        let mut users = Vec::with_capacity(table.len());
        for (row_no, row) in table.rows.iter().enumerate() {
            let user_id = row
                .get(key_index)
                .and_then(Value::as_key)
                .ok_or_else(|| DomainError::InvalidValue {
                    table: table.name.clone(),
                    column: USER_ID.to_string(),
                    row: row_no,
                    reason: "missing key".into(),
                })?;

            let mut cells = Vec::with_capacity(attributes.len());
            for (i, def) in &attributes {
                let raw = row.get(*i).unwrap_or(&Value::Null);
                let value = raw
                    .coerce(def.data_type)
                    .map_err(|reason| DomainError::InvalidValue {
                        table: table.name.clone(),
                        column: def.name.clone(),
                        row: row_no,
                        reason,
                    })?;
                cells.push(value);
            }
            users.push(User {
                user_id,
                attributes: cells,
            });
        }

        Ok(UserTable {
            attributes: attributes.into_iter().map(|(_, def)| def).collect(),
            users,
        })
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn to_table(&self, name: &str) -> Table {
        let mut columns = vec![ColumnDef::new(USER_ID, ColumnType::Text)];
        columns.extend(self.attributes.iter().cloned());

        let mut table = Table::new(name, columns);
        for user in &self.users {
            let mut row = Vec::with_capacity(user.attributes.len() + 1);
            row.push(Value::Text(user.user_id.clone()));
            row.extend(user.attributes.iter().cloned());
            table.push_row(row);
        }
        table
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_table_applies_declared_types() {
        let table = Table::from_text_rows(
            "users",
            &["user_id", "country", "signup_date"],
            &[vec![Some("u1"), Some("SA"), Some("2024-01-01")]],
        );
        let declared = vec![("signup_date".to_string(), ColumnType::Date)];

        let users = UserTable::from_table(&table, &declared).unwrap();
        assert_eq!(users.attributes.len(), 2);
        assert_eq!(users.attributes[1].data_type, ColumnType::Date);
        assert!(matches!(users.users[0].attributes[1], Value::Date(_)));
        assert_eq!(users.users[0].attributes[0], Value::Text("SA".into()));
    }
}

//! Host catalog contract.
//!
//! These structs mirror the parts of a MySQL Workbench catalog the generator
//! reads. A host adapter (or a JSON export) fills them in; nothing else in
//! the crate touches the host object model.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

/// Sentinel for an unset length or precision.
pub const UNSET: i64 = -1;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub schemata: Vec<SchemaDef>,
}

impl Catalog {
    pub fn from_json(input: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&input)
    }

    /// Find a schema by name, or the first schema when `name` is `None`.
    pub fn schema(&self, name: Option<&str>) -> Option<&SchemaDef> {
        match name {
            Some(name) => self.schemata.iter().find(|s| s.name == name),
            None => self.schemata.first(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDef {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub indices: Vec<IndexDef>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDef>,
}

impl TableDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn index(mut self, index: IndexDef) -> Self {
        self.indices.push(index);
        self
    }

    pub fn foreign_key(mut self, fk: ForeignKeyDef) -> Self {
        self.foreign_keys.push(fk);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub name: String,
    /// Built-in type; takes precedence over `user_type`.
    #[serde(default)]
    pub simple_type: Option<TypeRef>,
    #[serde(default)]
    pub user_type: Option<TypeRef>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub is_not_null: bool,
    #[serde(default, deserialize_with = "de_flag")]
    pub auto_increment: bool,
    #[serde(default = "unset")]
    pub length: i64,
    #[serde(default = "unset")]
    pub precision: i64,
    #[serde(default)]
    pub default_value: String,
    #[serde(default, deserialize_with = "de_flag")]
    pub default_value_is_null: bool,
    #[serde(default)]
    pub comment: String,
}

impl ColumnDef {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            simple_type: Some(TypeRef {
                name: type_name.to_string(),
            }),
            user_type: None,
            flags: Vec::new(),
            is_not_null: false,
            auto_increment: false,
            length: UNSET,
            precision: UNSET,
            default_value: String::new(),
            default_value_is_null: false,
            comment: String::new(),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_not_null = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.flags.push("UNSIGNED".to_string());
        self
    }

    pub fn length(mut self, length: i64) -> Self {
        self.length = length;
        self
    }

    pub fn precision(mut self, precision: i64) -> Self {
        self.precision = precision;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = value.to_string();
        self
    }

    pub fn default_null(mut self) -> Self {
        self.default_value_is_null = true;
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    /// Resolved type name, if the host supplied one.
    pub fn type_name(&self) -> Option<&str> {
        self.simple_type
            .as_ref()
            .or(self.user_type.as_ref())
            .map(|t| t.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDef {
    pub name: String,
    /// `PRIMARY`, `UNIQUE` or `INDEX`
    pub index_type: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

impl IndexDef {
    pub fn new(name: &str, index_type: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            index_type: index_type.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDef {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<String>,
    /// Many-side cardinality on the owning table.
    #[serde(default, deserialize_with = "de_flag")]
    pub many: bool,
    pub referenced_table: String,
    #[serde(default)]
    pub referenced_columns: Vec<String>,
}

impl ForeignKeyDef {
    pub fn new(columns: &[&str], referenced_table: &str, referenced_columns: &[&str]) -> Self {
        Self {
            name: String::new(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            many: false,
            referenced_table: referenced_table.to_string(),
            referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }
}

fn unset() -> i64 {
    UNSET
}

/// Workbench exports flags as `0`/`1`; accept booleans too.
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_catalog() {
        let input = r#"{
            "schemata": [{
                "name": "shop",
                "tables": [{
                    "name": "user",
                    "columns": [
                        {"name": "id", "simpleType": {"name": "INT"}, "isNotNull": 1, "autoIncrement": 1},
                        {"name": "email", "simpleType": {"name": "VARCHAR"}, "length": 100, "isNotNull": true}
                    ],
                    "indices": [{"name": "PRIMARY", "indexType": "PRIMARY", "columns": ["id"]}]
                }]
            }]
        }"#;
        let catalog = Catalog::from_json(input).unwrap();
        let schema = catalog.schema(None).unwrap();
        assert_eq!(schema.name, "shop");

        let user = &schema.tables[0];
        assert_eq!(user.columns.len(), 2);
        assert!(user.columns[0].is_not_null);
        assert!(user.columns[0].auto_increment);
        assert_eq!(user.columns[0].length, UNSET);
        assert_eq!(user.columns[1].length, 100);
        assert_eq!(user.columns[1].precision, UNSET);
        assert!(user.foreign_keys.is_empty());
    }

    #[test]
    fn test_user_type_fallback() {
        let input = r#"{"name": "status", "userType": {"name": "ENUM"}}"#;
        let column: ColumnDef = serde_json::from_str(input).unwrap();
        assert_eq!(column.type_name(), Some("ENUM"));

        let untyped: ColumnDef = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(untyped.type_name(), None);
    }

    #[test]
    fn test_missing_required_field() {
        let input = r#"{"schemata": [{"tables": []}]}"#;
        assert!(matches!(Catalog::from_json(input), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_schema_lookup() {
        let catalog = Catalog {
            schemata: vec![
                SchemaDef { name: "a".into(), tables: vec![] },
                SchemaDef { name: "b".into(), tables: vec![] },
            ],
        };
        assert_eq!(catalog.schema(None).map(|s| s.name.as_str()), Some("a"));
        assert_eq!(catalog.schema(Some("b")).map(|s| s.name.as_str()), Some("b"));
        assert!(catalog.schema(Some("c")).is_none());
    }

    #[test]
    fn test_builders() {
        let column = ColumnDef::new("price", "DECIMAL").not_null().unsigned().precision(10);
        assert!(column.is_not_null);
        assert_eq!(column.flags, vec!["UNSIGNED".to_string()]);
        assert_eq!(column.precision, 10);

        let fk = ForeignKeyDef::new(&["user_id"], "user", &["id"]).many(true);
        assert!(fk.many);
        assert_eq!(fk.referenced_columns, vec!["id".to_string()]);
    }
}

//! Intermediate schema model.
//!
//! Built from the host catalog in two passes: every table classifies its own
//! indexes, foreign keys and columns, then the inverse side of each
//! many-valued foreign key is attached to the referenced table.

use crate::catalog::{ColumnDef, ForeignKeyDef, IndexDef, SchemaDef, TableDef, UNSET};
use crate::naming::{pluralize, to_pascal_case};
use crate::types::{self, MetaType, ScalarType};
use indexmap::IndexMap;
use thiserror::Error;

/// Conventional suffix of foreign key columns.
pub const FOREIGN_SUFFIX: &str = "_id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Column {table}.{column} has no type")]
    MissingType { table: String, column: String },
    #[error("Foreign key {name:?} on {table} has no local columns")]
    EmptyForeignKey { table: String, name: String },
    #[error("Foreign key {name:?} on {table} pairs {local} local columns with {referenced} referenced columns")]
    ReferenceArity {
        table: String,
        name: String,
        local: usize,
        referenced: usize,
    },
    #[error("Foreign key on {table} uses unknown column {column}")]
    UnknownColumn { table: String, column: String },
    #[error("Foreign key on {table} references unknown table {referenced}")]
    UnknownTable { table: String, referenced: String },
    #[error("Table {0} is defined twice")]
    DuplicateTable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    None,
    Null,
    Literal(String),
}

impl DefaultValue {
    fn from_def(def: &ColumnDef) -> Self {
        let raw = def.default_value.trim();
        if def.default_value_is_null || raw.eq_ignore_ascii_case("NULL") {
            Self::Null
        } else if raw.is_empty() {
            Self::None
        } else {
            Self::Literal(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Primary,
    Unique,
    Plain,
}

impl IndexKind {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PRIMARY" => Self::Primary,
            "UNIQUE" => Self::Unique,
            _ => Self::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub kind: IndexKind,
    pub columns: Vec<String>,
}

impl Index {
    fn from_def(def: &IndexDef) -> Self {
        Self {
            name: def.name.clone(),
            kind: IndexKind::from_str(&def.index_type),
            columns: def.columns.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "OneToOne",
            Self::ManyToOne => "ManyToOne",
            Self::OneToMany => "OneToMany",
            Self::ManyToMany => "ManyToMany",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub owner: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub many: bool,
}

impl ForeignKey {
    fn from_def(def: &ForeignKeyDef, owner: &str) -> Self {
        Self {
            name: def.name.clone(),
            columns: def.columns.clone(),
            owner: owner.to_string(),
            referenced_table: def.referenced_table.clone(),
            referenced_columns: def.referenced_columns.clone(),
            many: def.many,
        }
    }

    pub fn kind(&self) -> RelationKind {
        let composite = self.referenced_columns.len() > 1;
        match (self.many, composite) {
            (true, true) => RelationKind::ManyToMany,
            (true, false) => RelationKind::ManyToOne,
            (false, true) => RelationKind::OneToMany,
            (false, false) => RelationKind::OneToOne,
        }
    }

    /// Class name of the referenced table.
    pub fn target_entity(&self) -> String {
        to_pascal_case(&self.referenced_table)
    }

    /// Collection property name on the referenced side.
    pub fn inverse_property(&self) -> String {
        pluralize(&self.owner.to_lowercase())
    }

    /// Property name on the owning side.
    pub fn owning_property(&self) -> String {
        self.columns
            .first()
            .map(|c| strip_foreign_suffix(c).to_string())
            .unwrap_or_default()
    }

    /// Referenced column paired with a local column by position.
    pub fn referenced_column_for(&self, local: &str) -> Option<&str> {
        let pos = self.columns.iter().position(|c| c == local)?;
        self.referenced_columns.get(pos).map(|c| c.as_str())
    }
}

/// Reverse (collection) side of a many-valued foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct InvertedKey {
    /// Table owning the forward key.
    pub owner: String,
    /// Plural collection property, e.g. `order_items`.
    pub property: String,
    /// Property on the owning entity pointing back here.
    pub mapped_by: String,
}

impl InvertedKey {
    fn from_foreign_key(fk: &ForeignKey) -> Self {
        Self {
            owner: fk.owner.clone(),
            property: fk.inverse_property(),
            mapped_by: fk.owning_property(),
        }
    }

    pub fn target_entity(&self) -> String {
        to_pascal_case(&self.owner)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub type_name: String,
    pub flags: Vec<String>,
    pub not_null: bool,
    pub auto_increment: bool,
    pub length: Option<i64>,
    pub precision: Option<i64>,
    pub default: DefaultValue,
    pub comment: String,
    pub is_primary: bool,
    pub is_unique: bool,
    /// Owning foreign key when the column is a local side of one.
    pub foreign: Option<ForeignKey>,
}

impl Column {
    fn from_def(def: &ColumnDef, table: &str) -> Result<Self, ModelError> {
        let type_name = def.type_name().ok_or_else(|| ModelError::MissingType {
            table: table.to_string(),
            column: def.name.clone(),
        })?;

        if !types::is_known(type_name) {
            tracing::debug!(table, column = %def.name, type_name, "unknown column type, mapping to string");
        }

        Ok(Self {
            name: def.name.clone(),
            type_name: type_name.to_string(),
            flags: def.flags.clone(),
            not_null: def.is_not_null,
            auto_increment: def.auto_increment,
            length: declared(def.length),
            precision: declared(def.precision),
            default: DefaultValue::from_def(def),
            comment: def.comment.trim().to_string(),
            is_primary: false,
            is_unique: false,
            foreign: None,
        })
    }

    pub fn meta_type(&self) -> MetaType {
        types::meta_type(&self.type_name)
    }

    pub fn scalar_type(&self) -> ScalarType {
        types::scalar_type(&self.type_name)
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags.iter().any(|f| f.to_uppercase().contains("UNSIGNED"))
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign.is_some()
    }

    pub fn has_default(&self) -> bool {
        self.default != DefaultValue::None
    }

    /// Property name: foreign columns lose their `_id` suffix.
    pub fn final_name(&self) -> &str {
        if self.is_foreign() {
            strip_foreign_suffix(&self.name)
        } else {
            &self.name
        }
    }

    /// PHP type of the property; the related class for foreign columns.
    pub fn accessor_type(&self) -> String {
        match &self.foreign {
            Some(fk) => fk.target_entity(),
            None => self.scalar_type().as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
    pub inverted_keys: Vec<InvertedKey>,
    pub has_timestamps: bool,
}

impl Table {
    /// First pass: classify indexes, then foreign keys, then columns.
    pub fn from_def(def: &TableDef) -> Result<Self, ModelError> {
        let indexes: Vec<Index> = def.indices.iter().map(Index::from_def).collect();

        let primaries: Vec<&str> = indexes
            .iter()
            .filter(|i| i.kind == IndexKind::Primary)
            .flat_map(|i| i.columns.iter().map(|c| c.as_str()))
            .collect();

        // Composite unique indexes only become table-level constraints.
        let uniques: Vec<&str> = indexes
            .iter()
            .filter(|i| i.kind == IndexKind::Unique && i.columns.len() == 1)
            .map(|i| i.columns[0].as_str())
            .collect();

        let mut foreign_keys = Vec::with_capacity(def.foreign_keys.len());
        for fk_def in &def.foreign_keys {
            if fk_def.columns.is_empty() {
                return Err(ModelError::EmptyForeignKey {
                    table: def.name.clone(),
                    name: fk_def.name.clone(),
                });
            }
            if fk_def.referenced_columns.len() != fk_def.columns.len() {
                return Err(ModelError::ReferenceArity {
                    table: def.name.clone(),
                    name: fk_def.name.clone(),
                    local: fk_def.columns.len(),
                    referenced: fk_def.referenced_columns.len(),
                });
            }
            if let Some(missing) = fk_def
                .columns
                .iter()
                .find(|c| !def.columns.iter().any(|col| &col.name == *c))
            {
                return Err(ModelError::UnknownColumn {
                    table: def.name.clone(),
                    column: missing.clone(),
                });
            }
            foreign_keys.push(ForeignKey::from_def(fk_def, &def.name));
        }

        let mut columns = Vec::with_capacity(def.columns.len());
        for col_def in &def.columns {
            let mut column = Column::from_def(col_def, &def.name)?;
            column.is_primary = primaries.contains(&column.name.as_str());
            column.is_unique = uniques.contains(&column.name.as_str());
            column.foreign = foreign_keys
                .iter()
                .find(|fk| fk.columns.contains(&column.name))
                .cloned();
            columns.push(column);
        }

        let has_timestamps = [CREATED_AT, UPDATED_AT]
            .iter()
            .all(|name| columns.iter().any(|c| c.name == *name));

        Ok(Self {
            name: def.name.clone(),
            columns,
            indexes,
            foreign_keys,
            inverted_keys: Vec::new(),
            has_timestamps,
        })
    }

    pub fn class_name(&self) -> String {
        to_pascal_case(&self.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn indexes_of(&self, kind: IndexKind) -> impl Iterator<Item = &Index> {
        self.indexes.iter().filter(move |i| i.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    pub fn build(def: &SchemaDef) -> Result<Self, ModelError> {
        let mut tables: IndexMap<String, Table> = IndexMap::with_capacity(def.tables.len());
        for table_def in &def.tables {
            let table = Table::from_def(table_def)?;
            if tables.insert(table.name.clone(), table).is_some() {
                return Err(ModelError::DuplicateTable(table_def.name.clone()));
            }
        }

        // Second pass: inverse sides need every forward key in place.
        let mut inverted: Vec<(String, InvertedKey)> = Vec::new();
        for table in tables.values() {
            for fk in &table.foreign_keys {
                if !tables.contains_key(&fk.referenced_table) {
                    return Err(ModelError::UnknownTable {
                        table: table.name.clone(),
                        referenced: fk.referenced_table.clone(),
                    });
                }
                if fk.many {
                    inverted.push((fk.referenced_table.clone(), InvertedKey::from_foreign_key(fk)));
                }
            }
        }

        for (target, key) in inverted {
            if let Some(table) = tables.get_mut(&target) {
                table.inverted_keys.push(key);
            }
        }

        Ok(Self {
            name: def.name.clone(),
            tables,
        })
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

fn declared(value: i64) -> Option<i64> {
    if value == UNSET || value < 0 {
        None
    } else {
        Some(value)
    }
}

fn strip_foreign_suffix(name: &str) -> &str {
    name.strip_suffix(FOREIGN_SUFFIX).unwrap_or(name)
}

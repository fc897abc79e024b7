//! Column type to Doctrine/PHP type mapping.

use std::fmt;

/// Doctrine mapping type used in `@ORM\Column(type=...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaType {
    Integer,
    String,
    Float,
    Boolean,
    DateTime,
    Object,
}

impl MetaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PHP scalar type used in docblocks and default-value rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int,
    String,
    Float,
    Bool,
    DateTime,
    Object,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::DateTime => "\\DateTime",
            Self::Object => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw column type name to its Doctrine type.
///
/// Unknown names map to `string` so generation never stops on an exotic type.
pub fn meta_type(type_name: &str) -> MetaType {
    match type_name {
        // Integer types
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "INT1" | "INT2" | "INT3"
        | "INT4" | "INT8" | "INTEGER" | "MIDDLEINT" | "LONG" | "YEAR" | "BIT" => MetaType::Integer,

        // Floating point
        "FLOAT" | "float" | "DOUBLE" | "FIXED" | "FLOAT4" | "FLOAT8" | "NUMERIC" | "DEC" => {
            MetaType::Float
        }

        // Character, text and binary
        "CHAR" | "CHARACTER" | "VARCHAR" | "BINARY" | "VARBINARY" | "TINYTEXT" | "TEXT"
        | "MEDIUMTEXT" | "LONGTEXT" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
        | "LONGVARBINARY" | "LONGVARCHAR" | "ENUM" | "SET" => MetaType::String,

        // Date/time
        "DATETIME" | "DATE" | "TIME" | "TIMESTAMP" => MetaType::DateTime,

        // Boolean
        "BOOLEAN" | "BOOL" => MetaType::Boolean,

        // Spatial
        "GEOMETRY" | "POINT" | "LINESTRING" | "POLYGON" | "MULTIPOINT" | "MULTILINESTRING"
        | "MULTIPOLYGON" | "GEOMETRYCOLLECTION" => MetaType::Object,

        _ => MetaType::String,
    }
}

/// Map a raw column type name to its PHP scalar type.
pub fn scalar_type(type_name: &str) -> ScalarType {
    match type_name {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "INT1" | "INT2" | "INT3"
        | "INT4" | "INT8" | "INTEGER" | "MIDDLEINT" | "LONG" | "YEAR" | "BIT" => ScalarType::Int,

        "FLOAT" | "float" | "DOUBLE" | "FIXED" | "FLOAT4" | "FLOAT8" | "NUMERIC" | "DEC" => {
            ScalarType::Float
        }

        "CHAR" | "CHARACTER" | "VARCHAR" | "BINARY" | "VARBINARY" | "TINYTEXT" | "TEXT"
        | "MEDIUMTEXT" | "LONGTEXT" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
        | "LONGVARBINARY" | "LONGVARCHAR" | "ENUM" | "SET" => ScalarType::String,

        "DATETIME" | "DATE" | "TIME" | "TIMESTAMP" => ScalarType::DateTime,

        "BOOLEAN" | "BOOL" => ScalarType::Bool,

        "GEOMETRY" | "POINT" | "LINESTRING" | "POLYGON" | "MULTIPOINT" | "MULTILINESTRING"
        | "MULTIPOLYGON" | "GEOMETRYCOLLECTION" => ScalarType::Object,

        _ => ScalarType::String,
    }
}

/// Whether either table knows this type name.
pub fn is_known(type_name: &str) -> bool {
    !matches!(meta_type(type_name), MetaType::String) || is_known_string(type_name)
}

fn is_known_string(type_name: &str) -> bool {
    matches!(
        type_name,
        "CHAR"
            | "CHARACTER"
            | "VARCHAR"
            | "BINARY"
            | "VARBINARY"
            | "TINYTEXT"
            | "TEXT"
            | "MEDIUMTEXT"
            | "LONGTEXT"
            | "TINYBLOB"
            | "BLOB"
            | "MEDIUMBLOB"
            | "LONGBLOB"
            | "LONGVARBINARY"
            | "LONGVARCHAR"
            | "ENUM"
            | "SET"
    )
}

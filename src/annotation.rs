//! Doctrine/Symfony annotation rendering.

use indexmap::IndexMap;
use std::fmt;

/// Annotation namespace alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prefix {
    /// `@ORM\` (Doctrine mapping)
    #[default]
    Orm,
    /// `@Assert\` (Symfony validation constraints)
    Assert,
}

impl Prefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orm => "@ORM\\",
            Self::Assert => "@Assert\\",
        }
    }
}

/// Ordered `key=value` attribute list.
pub type Attributes = IndexMap<String, Value>;

/// Attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    Map(Attributes),
    List(Vec<Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Attributes> for Value {
    fn from(v: Attributes) -> Self {
        Value::Map(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// Nested annotations are carried as their rendered text.
impl From<Annotation> for Value {
    fn from(v: Annotation) -> Self {
        Value::Str(v.render())
    }
}

/// A single annotation such as `@ORM\Column(type="string", length=100)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    prefix: Prefix,
    name: String,
    attributes: Attributes,
}

impl Annotation {
    /// Doctrine mapping annotation.
    pub fn orm(name: &str) -> Self {
        Self::with_prefix(Prefix::Orm, name)
    }

    /// Symfony constraint annotation.
    pub fn assert(name: &str) -> Self {
        Self::with_prefix(Prefix::Assert, name)
    }

    pub fn with_prefix(prefix: Prefix, name: &str) -> Self {
        Self {
            prefix,
            name: name.to_string(),
            attributes: Attributes::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn render(&self) -> String {
        render_annotation(self.prefix, &self.name, &self.attributes)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render `<prefix><name>` followed by `(key=value, ...)` when attributes
/// are present.
pub fn render_annotation(prefix: Prefix, name: &str, attributes: &Attributes) -> String {
    let mut out = format!("{}{}", prefix.as_str(), name);
    if !attributes.is_empty() {
        out.push('(');
        out.push_str(&render_attributes(prefix, attributes));
        out.push(')');
    }
    out
}

fn render_attributes(prefix: Prefix, attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(key, value)| format!("{}={}", key, render_value(prefix, value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_value(prefix: Prefix, value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        // Already-rendered nested annotation
        Value::Str(s) if s.starts_with(prefix.as_str()) => s.clone(),
        Value::Str(s) => format!("\"{}\"", s),
        Value::Map(map) => format!("{{{}}}", render_attributes(prefix, map)),
        Value::List(items) => {
            let inner: Vec<String> = items.iter().map(|v| render_value(prefix, v)).collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

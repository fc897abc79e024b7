//! Doctrine entity class rendering.

use crate::annotation::{Annotation, Attributes, Value};
use crate::docblock::{MEMBER_INDENT, render_comment};
use crate::model::{CREATED_AT, Column, DefaultValue, Index, IndexKind, InvertedKey, Table, UPDATED_AT};
use crate::naming::{to_camel_case, to_pascal_case};
use crate::types::ScalarType;

const ORM_IMPORT: &str = "use Doctrine\\ORM\\Mapping as ORM;";
const ASSERT_IMPORT: &str = "use Symfony\\Component\\Validator\\Constraints as Assert;";
const COLLECTION_IMPORT: &str = "use Doctrine\\Common\\Collections\\ArrayCollection;";
const COLLECTION_TYPE: &str = "ArrayCollection";
const BODY_INDENT: &str = "        ";

/// Renders one PHP entity class per table.
pub struct EntityRenderer {
    namespace: String,
}

impl EntityRenderer {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.trim().trim_matches('\\').to_string(),
        }
    }

    pub fn render(&self, table: &Table) -> String {
        let mut out = String::new();

        self.render_header(&mut out, table);

        for column in &table.columns {
            render_column(&mut out, column);
        }
        for key in &table.inverted_keys {
            render_inverse(&mut out, key);
        }

        render_constructor(&mut out, table);
        render_to_string(&mut out, table);

        let class_name = table.class_name();
        for column in &table.columns {
            render_column_accessors(&mut out, column, &class_name);
        }
        for key in &table.inverted_keys {
            render_inverse_accessors(&mut out, key, &class_name);
        }

        if table.has_timestamps {
            render_timestamps(&mut out);
        }

        let mut content = out.trim().to_string();
        content.push_str("\n}");
        content.trim().to_string()
    }

    fn render_header(&self, out: &mut String, table: &Table) {
        let class_name = table.class_name();

        out.push_str("<?php\n\n");
        out.push_str(&format!("namespace {};\n\n", self.namespace));
        out.push_str(ORM_IMPORT);
        out.push('\n');
        out.push_str(ASSERT_IMPORT);
        out.push('\n');

        let mut related: Vec<String> = Vec::new();
        for key in &table.inverted_keys {
            let entity = key.target_entity();
            if entity != class_name && !related.contains(&entity) {
                related.push(entity);
            }
        }
        for entity in &related {
            out.push_str(&format!("use {}\\{};\n", self.namespace, entity));
        }
        if !table.inverted_keys.is_empty() {
            out.push_str(COLLECTION_IMPORT);
            out.push('\n');
        }
        out.push('\n');

        let mut lines = vec![class_name.clone(), String::new(), table_annotation(table).render()];
        lines.push(Annotation::orm("Entity").render());
        if table.has_timestamps {
            lines.push(Annotation::orm("HasLifecycleCallbacks").render());
        }
        out.push_str(&render_comment(&lines, ""));

        out.push_str(&format!("class {}\n{{\n", class_name));
    }
}

fn table_annotation(table: &Table) -> Annotation {
    let indexes: Vec<Value> = table
        .indexes_of(IndexKind::Plain)
        .map(|i| index_annotation("Index", i))
        .collect();
    let uniques: Vec<Value> = table
        .indexes_of(IndexKind::Unique)
        .map(|i| index_annotation("UniqueConstraint", i))
        .collect();

    let mut annotation = Annotation::orm("Table").attr("name", table.name.as_str());
    if !indexes.is_empty() {
        annotation = annotation.attr("indexes", indexes);
    }
    if !uniques.is_empty() {
        annotation = annotation.attr("uniqueConstraints", uniques);
    }
    annotation
}

fn index_annotation(name: &str, index: &Index) -> Value {
    let columns: Vec<Value> = index.columns.iter().map(|c| Value::from(c.as_str())).collect();
    Annotation::orm(name)
        .attr("name", index.name.as_str())
        .attr("columns", columns)
        .into()
}

/// Annotation lines for a column property, without the docblock envelope.
pub fn column_annotations(column: &Column) -> Vec<String> {
    let mut lines = Vec::new();

    if !column.comment.is_empty() {
        lines.extend(column.comment.lines().map(|l| l.trim_end().to_string()));
        lines.push(String::new());
    }
    lines.push(format!("@var {}", column.accessor_type()));

    if let Some(fk) = &column.foreign {
        let mut relation = Annotation::orm(fk.kind().as_str()).attr("targetEntity", fk.target_entity());
        if fk.many {
            relation = relation.attr("inversedBy", fk.inverse_property());
        }
        lines.push(relation.render());

        let mut join = Annotation::orm("JoinColumn").attr("name", column.name.as_str());
        if let Some(referenced) = fk.referenced_column_for(&column.name) {
            join = join.attr("referencedColumnName", referenced);
        }
        lines.push(join.render());
        return lines;
    }

    if column.is_primary {
        lines.push(Annotation::orm("Id").render());
    }

    let mut def = Annotation::orm("Column").attr("type", column.meta_type().as_str());
    if let Some(length) = column.length {
        def = def.attr("length", length);
    }
    if !column.not_null {
        def = def.attr("nullable", true);
    }
    if column.is_unique {
        def = def.attr("unique", true);
    }
    if let Some(precision) = column.precision {
        def = def.attr("precision", precision);
    }
    if column.is_unsigned() {
        let mut options = Attributes::new();
        options.insert("unsigned".to_string(), Value::Bool(true));
        def = def.attr("options", options);
    }
    lines.push(def.render());

    if column.auto_increment {
        lines.push(Annotation::orm("GeneratedValue").attr("strategy", "AUTO").render());
    }

    if !column.is_primary {
        lines.extend(validation_annotations(column).iter().map(|a| a.render()));
    }

    lines
}

/// Symfony constraints for a plain (non-primary, non-foreign) column.
pub fn validation_annotations(column: &Column) -> Vec<Annotation> {
    let scalar = column.scalar_type();
    let mut constraints = Vec::new();

    if let Some(length) = column.length {
        constraints.push(Annotation::assert("Length").attr("min", 0).attr("max", length));
    }
    if column.not_null {
        if scalar == ScalarType::String {
            constraints.push(Annotation::assert("NotBlank"));
        } else {
            constraints.push(Annotation::assert("NotNull"));
        }
    }
    if column.is_unsigned() {
        constraints.push(Annotation::assert("GreaterThanOrEqual").attr("value", 0));
    }
    if column.name == "email" {
        constraints.push(Annotation::assert("Email"));
    }
    if scalar.is_numeric() {
        constraints.push(Annotation::assert("Type").attr("type", "numeric"));
    }
    if scalar == ScalarType::String {
        constraints.push(Annotation::assert("Type").attr("type", "string"));
    }
    if scalar == ScalarType::DateTime {
        constraints.push(Annotation::assert("DateTime"));
    }

    constraints
}

fn render_column(out: &mut String, column: &Column) {
    out.push_str(&render_comment(&column_annotations(column), MEMBER_INDENT));
    out.push_str(&format!("{}protected ${};\n\n", MEMBER_INDENT, column.final_name()));
}

fn render_inverse(out: &mut String, key: &InvertedKey) {
    let lines = vec![
        format!("@var {}", COLLECTION_TYPE),
        Annotation::orm("OneToMany")
            .attr("targetEntity", key.target_entity())
            .attr("mappedBy", key.mapped_by.as_str())
            .render(),
    ];
    out.push_str(&render_comment(&lines, MEMBER_INDENT));
    out.push_str(&format!("{}protected ${};\n\n", MEMBER_INDENT, key.property));
}

/// PHP expression initialising a column from its declared default, or
/// `None` when the column has no default.
pub fn default_expression(column: &Column) -> Option<String> {
    let raw = match &column.default {
        DefaultValue::None => return None,
        DefaultValue::Null => return Some("null".to_string()),
        DefaultValue::Literal(raw) => raw,
    };

    let expr = match column.scalar_type() {
        ScalarType::Bool => {
            let truthy = raw == "1";
            truthy.to_string()
        }
        ScalarType::String => format!("\"{}\"", escape_php(unquote(raw))),
        ScalarType::DateTime => {
            let value = unquote(raw);
            if is_current_timestamp(value) {
                "new \\DateTime()".to_string()
            } else {
                format!("new \\DateTime(\"{}\")", escape_php(value))
            }
        }
        _ => raw.clone(),
    };
    Some(expr)
}

fn render_constructor(out: &mut String, table: &Table) {
    // A foreign property holds an entity, so any declared default starts it as null.
    let defaults: Vec<(&Column, String)> = table
        .columns
        .iter()
        .filter(|c| c.has_default())
        .filter_map(|c| {
            if c.is_foreign() {
                Some((c, "null".to_string()))
            } else {
                default_expression(c).map(|expr| (c, expr))
            }
        })
        .collect();

    if defaults.is_empty() && table.inverted_keys.is_empty() {
        return;
    }

    let mut body = Vec::new();
    for key in &table.inverted_keys {
        body.push(format!("$this->{} = new {}();", key.property, COLLECTION_TYPE));
    }
    for (column, expr) in defaults {
        body.push(format!("$this->{} = {};", column.final_name(), expr));
    }

    push_method(out, &["Constructor".to_string()], "public function __construct()", &body);
}

fn render_to_string(out: &mut String, table: &Table) {
    if table.column("name").is_none() {
        return;
    }
    push_method(
        out,
        &["@return string".to_string()],
        "public function __toString()",
        &["return (string) ($this->name ?: \"-\");".to_string()],
    );
}

fn render_column_accessors(out: &mut String, column: &Column, class_name: &str) {
    let name = column.final_name();
    let pascal = to_pascal_case(name);
    let typ = column.accessor_type();

    push_method(
        out,
        &[format!("Get {}", name), String::new(), format!("@return {}", typ)],
        &format!("public function get{}()", pascal),
        &[format!("return $this->{};", name)],
    );

    push_method(
        out,
        &[
            format!("Set {}", name),
            String::new(),
            format!("@param {} ${}", typ, name),
            format!("@return {}", class_name),
        ],
        &format!("public function set{}(${})", pascal, name),
        &[
            format!("$this->{} = ${};", name, name),
            String::new(),
            "return $this;".to_string(),
        ],
    );
}

fn render_inverse_accessors(out: &mut String, key: &InvertedKey, class_name: &str) {
    let property = key.property.as_str();
    let plural = to_pascal_case(property);
    let entity = key.target_entity();
    let var = to_camel_case(&key.owner);
    let back_setter = format!("set{}", to_pascal_case(&key.mapped_by));

    push_method(
        out,
        &[
            format!("Set {}", property),
            String::new(),
            format!("@param {} ${}", COLLECTION_TYPE, property),
            format!("@return {}", class_name),
        ],
        &format!("public function set{}(${})", plural, property),
        &[
            format!("$this->{} = ${};", property, property),
            String::new(),
            "return $this;".to_string(),
        ],
    );

    push_method(
        out,
        &[
            format!("Add {}", var),
            String::new(),
            format!("@param {} ${}", entity, var),
            format!("@return {}", class_name),
        ],
        &format!("public function add{}({} ${})", entity, entity, var),
        &[
            format!("if (!$this->{}->contains(${})) {{", property, var),
            format!("    $this->{}->add(${});", property, var),
            format!("    ${}->{}($this);", var, back_setter),
            "}".to_string(),
            String::new(),
            "return $this;".to_string(),
        ],
    );

    push_method(
        out,
        &[
            format!("Remove {}", var),
            String::new(),
            format!("@param {} ${}", entity, var),
            format!("@return {}", class_name),
        ],
        &format!("public function remove{}({} ${})", entity, entity, var),
        &[
            format!("if ($this->{}->contains(${})) {{", property, var),
            format!("    $this->{}->removeElement(${});", property, var),
            format!("    ${}->{}(null);", var, back_setter),
            "}".to_string(),
            String::new(),
            "return $this;".to_string(),
        ],
    );

    push_method(
        out,
        &[
            format!("Get {}", property),
            String::new(),
            format!("@return {}", COLLECTION_TYPE),
        ],
        &format!("public function get{}()", plural),
        &[format!("return $this->{};", property)],
    );
}

fn render_timestamps(out: &mut String) {
    push_method(
        out,
        &[
            Annotation::orm("PrePersist").render(),
            Annotation::orm("PreUpdate").render(),
        ],
        "public function updateTimestamps()",
        &[
            format!("$this->{} = new \\DateTime();", UPDATED_AT),
            String::new(),
            format!("if ($this->{} === null) {{", CREATED_AT),
            format!("    $this->{} = new \\DateTime();", CREATED_AT),
            "}".to_string(),
        ],
    );
}

fn push_method(out: &mut String, doc: &[String], signature: &str, body: &[String]) {
    out.push_str(&render_comment(doc, MEMBER_INDENT));
    out.push_str(MEMBER_INDENT);
    out.push_str(signature);
    out.push('\n');
    out.push_str(MEMBER_INDENT);
    out.push_str("{\n");
    for line in body {
        if !line.is_empty() {
            out.push_str(BODY_INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
    out.push_str(MEMBER_INDENT);
    out.push_str("}\n\n");
}

/// Strips one surrounding pair of matching quotes.
fn unquote(raw: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = raw.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    raw
}

fn escape_php(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
}

fn is_current_timestamp(value: &str) -> bool {
    matches!(
        value.to_uppercase().as_str(),
        "CURRENT_TIMESTAMP" | "CURRENT_TIMESTAMP()" | "NOW()"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, ForeignKeyDef, IndexDef, SchemaDef, TableDef};
    use crate::model::Schema;

    fn render_one(def: TableDef) -> String {
        let schema = Schema::build(&SchemaDef {
            name: "s".into(),
            tables: vec![def.clone()],
        })
        .unwrap();
        EntityRenderer::new("App\\Entity").render(schema.table(&def.name).unwrap())
    }

    fn column(def: ColumnDef) -> Column {
        let table = Table::from_def(&TableDef::new("t").column(def)).unwrap();
        table.columns[0].clone()
    }

    fn user() -> TableDef {
        TableDef::new("user")
            .column(ColumnDef::new("id", "INT").not_null().auto_increment())
            .column(ColumnDef::new("email", "VARCHAR").length(100).not_null())
            .index(IndexDef::new("PRIMARY", "PRIMARY", &["id"]))
    }

    #[test]
    fn test_header() {
        let out = render_one(user());
        assert!(out.starts_with(
            "<?php\n\nnamespace App\\Entity;\n\nuse Doctrine\\ORM\\Mapping as ORM;\nuse Symfony\\Component\\Validator\\Constraints as Assert;\n\n/**\n * User\n *\n * @ORM\\Table(name=\"user\")\n * @ORM\\Entity\n */\nclass User\n{\n"
        ));
        assert!(!out.contains("ArrayCollection"));
    }

    #[test]
    fn test_primary_key_block() {
        let out = render_one(user());
        assert!(out.contains(
            "    /**\n     * @var int\n     * @ORM\\Id\n     * @ORM\\Column(type=\"integer\")\n     * @ORM\\GeneratedValue(strategy=\"AUTO\")\n     */\n    protected $id;\n"
        ));
    }

    #[test]
    fn test_email_validation() {
        let out = render_one(user());
        assert!(out.contains("@ORM\\Column(type=\"string\", length=100)"));
        assert!(out.contains("@Assert\\Length(min=0, max=100)"));
        assert!(out.contains("@Assert\\NotBlank"));
        assert!(out.contains("@Assert\\Email"));
        assert!(out.contains("@Assert\\Type(type=\"string\")"));
        assert!(!out.contains("@Assert\\NotNull"));
    }

    #[test]
    fn test_validation_order() {
        let col = column(ColumnDef::new("qty", "INT").length(11).not_null().unsigned());
        let rendered: Vec<String> = validation_annotations(&col).iter().map(|a| a.render()).collect();
        assert_eq!(
            rendered,
            vec![
                "@Assert\\Length(min=0, max=11)",
                "@Assert\\NotNull",
                "@Assert\\GreaterThanOrEqual(value=0)",
                "@Assert\\Type(type=\"numeric\")",
            ]
        );
    }

    #[test]
    fn test_datetime_validation() {
        let col = column(ColumnDef::new("born_on", "DATE"));
        let rendered: Vec<String> = validation_annotations(&col).iter().map(|a| a.render()).collect();
        assert_eq!(rendered, vec!["@Assert\\DateTime"]);
    }

    #[test]
    fn test_column_attributes() {
        let col = column(ColumnDef::new("price", "DECIMAL").precision(10).unsigned());
        let lines = column_annotations(&col);
        assert_eq!(lines[0], "@var string");
        assert_eq!(
            lines[1],
            "@ORM\\Column(type=\"string\", nullable=true, precision=10, options={unsigned=true})"
        );
    }

    #[test]
    fn test_column_comment() {
        let col = column(ColumnDef::new("sku", "VARCHAR").comment("Stock keeping unit"));
        let lines = column_annotations(&col);
        assert_eq!(lines[0], "Stock keeping unit");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "@var string");
    }

    #[test]
    fn test_defaults() {
        let cases = [
            (ColumnDef::new("a", "INT").default_value("0"), "0"),
            (ColumnDef::new("a", "BOOL").default_value("1"), "true"),
            (ColumnDef::new("a", "BOOL").default_value("0"), "false"),
            (ColumnDef::new("a", "VARCHAR").default_value("'it\"s'"), "\"it\\\"s\""),
            (ColumnDef::new("a", "VARCHAR").default_value("'\"hi\"'"), "\"\\\"hi\\\"\""),
            (ColumnDef::new("a", "VARCHAR").default_value("\"''\""), "\"''\""),
            (ColumnDef::new("a", "VARCHAR").default_value("'open"), "\"'open\""),
            (ColumnDef::new("a", "VARCHAR").default_null(), "null"),
            (ColumnDef::new("a", "DATETIME").default_value("CURRENT_TIMESTAMP"), "new \\DateTime()"),
            (ColumnDef::new("a", "DATE").default_value("'2020-01-01'"), "new \\DateTime(\"2020-01-01\")"),
        ];
        for (def, expected) in cases {
            assert_eq!(default_expression(&column(def)).as_deref(), Some(expected));
        }
        assert_eq!(default_expression(&column(ColumnDef::new("a", "INT"))), None);
    }

    #[test]
    fn test_no_constructor_without_defaults_or_relations() {
        let out = render_one(user());
        assert!(!out.contains("__construct"));
    }

    #[test]
    fn test_constructor_with_defaults() {
        let out = render_one(user().column(ColumnDef::new("status", "VARCHAR").default_value("'new'")));
        assert!(out.contains(
            "    /**\n     * Constructor\n     */\n    public function __construct()\n    {\n        $this->status = \"new\";\n    }\n"
        ));
    }

    #[test]
    fn test_to_string_only_for_name_column() {
        assert!(!render_one(user()).contains("__toString"));
        let out = render_one(user().column(ColumnDef::new("name", "VARCHAR")));
        assert!(out.contains("return (string) ($this->name ?: \"-\");"));
    }

    #[test]
    fn test_accessors() {
        let out = render_one(user());
        assert!(out.contains(
            "    /**\n     * Get email\n     *\n     * @return string\n     */\n    public function getEmail()\n    {\n        return $this->email;\n    }\n"
        ));
        assert!(out.contains(
            "    public function setEmail($email)\n    {\n        $this->email = $email;\n\n        return $this;\n    }\n"
        ));
        assert!(out.contains("     * @return User\n"));
    }

    #[test]
    fn test_footer_has_no_trailing_whitespace() {
        let out = render_one(user());
        assert!(out.ends_with("    }\n}"));
        let bare = render_one(TableDef::new("empty"));
        assert!(bare.ends_with("class Empty\n{\n}"));
    }

    #[test]
    fn test_timestamps_hook() {
        let def = user()
            .column(ColumnDef::new("created_at", "DATETIME"))
            .column(ColumnDef::new("updated_at", "DATETIME"));
        let out = render_one(def);
        assert!(out.contains(" * @ORM\\HasLifecycleCallbacks\n"));
        assert!(out.contains(
            "    /**\n     * @ORM\\PrePersist\n     * @ORM\\PreUpdate\n     */\n    public function updateTimestamps()\n    {\n        $this->updated_at = new \\DateTime();\n\n        if ($this->created_at === null) {\n            $this->created_at = new \\DateTime();\n        }\n    }\n}"
        ));

        let partial = render_one(user().column(ColumnDef::new("created_at", "DATETIME")));
        assert!(!partial.contains("updateTimestamps"));
        assert!(!partial.contains("HasLifecycleCallbacks"));
    }

    #[test]
    fn test_table_indexes() {
        let def = user()
            .column(ColumnDef::new("first", "VARCHAR"))
            .column(ColumnDef::new("last", "VARCHAR"))
            .index(IndexDef::new("idx_name", "INDEX", &["last", "first"]))
            .index(IndexDef::new("uq_email", "UNIQUE", &["email"]));
        let out = render_one(def);
        assert!(out.contains(
            " * @ORM\\Table(name=\"user\", indexes={@ORM\\Index(name=\"idx_name\", columns={\"last\", \"first\"})}, uniqueConstraints={@ORM\\UniqueConstraint(name=\"uq_email\", columns={\"email\"})})\n"
        ));
        assert!(out.contains("@ORM\\Column(type=\"string\", length=100, unique=true)"));
    }

    #[test]
    fn test_self_reference_skips_own_import() {
        let def = TableDef::new("category")
            .column(ColumnDef::new("id", "INT"))
            .column(ColumnDef::new("parent_id", "INT"))
            .foreign_key(ForeignKeyDef::new(&["parent_id"], "category", &["id"]).many(true));
        let out = render_one(def);
        assert!(!out.contains("use App\\Entity\\Category;"));
        assert!(out.contains("@ORM\\ManyToOne(targetEntity=\"Category\", inversedBy=\"categories\")"));
        assert!(out.contains("@ORM\\OneToMany(targetEntity=\"Category\", mappedBy=\"parent\")"));
        assert!(out.contains("$category->setParent($this);"));
    }

    #[test]
    fn test_namespace_is_trimmed() {
        assert_eq!(EntityRenderer::new(" App\\Entity\\ ").namespace, "App\\Entity");
        let out = render_one(user());
        assert!(out.contains("\nnamespace App\\Entity;\n"));
    }

    #[test]
    fn test_one_to_one_relation() {
        let schema = Schema::build(&SchemaDef {
            name: "s".into(),
            tables: vec![
                TableDef::new("account").column(ColumnDef::new("code", "VARCHAR")),
                TableDef::new("profile")
                    .column(ColumnDef::new("account_id", "VARCHAR"))
                    .foreign_key(ForeignKeyDef::new(&["account_id"], "account", &["code"])),
            ],
        })
        .unwrap();
        let renderer = EntityRenderer::new("App\\Entity");

        let profile = renderer.render(schema.table("profile").unwrap());
        assert!(profile.contains(
            "    /**\n     * @var Account\n     * @ORM\\OneToOne(targetEntity=\"Account\")\n     * @ORM\\JoinColumn(name=\"account_id\", referencedColumnName=\"code\")\n     */\n    protected $account;\n"
        ));
        assert!(!profile.contains("inversedBy"));

        let account = renderer.render(schema.table("account").unwrap());
        assert!(!account.contains("OneToMany"));
        assert!(!account.contains("ArrayCollection"));
    }

    #[test]
    fn test_constructor_for_foreign_default() {
        let schema = Schema::build(&SchemaDef {
            name: "s".into(),
            tables: vec![
                TableDef::new("a").column(ColumnDef::new("id", "INT")),
                TableDef::new("b")
                    .column(ColumnDef::new("a_id", "INT").default_null())
                    .column(ColumnDef::new("owner_id", "INT").default_value("1"))
                    .foreign_key(ForeignKeyDef::new(&["a_id"], "a", &["id"]))
                    .foreign_key(ForeignKeyDef::new(&["owner_id"], "a", &["id"])),
            ],
        })
        .unwrap();
        let out = EntityRenderer::new("App\\Entity").render(schema.table("b").unwrap());
        assert!(out.contains(
            "    public function __construct()\n    {\n        $this->a = null;\n        $this->owner = null;\n    }\n"
        ));
    }
}

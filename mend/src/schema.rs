//! Declarative schema descriptions.
//!
//! A [`Schema`] enumerates the named fields a structured value must carry,
//! the kind of each field and, for sequences, a minimum length. Schemas
//! nest through [`FieldKind::Object`] and are interpreted by the validator
//! in [`crate::validate`].
//!
//! # Example
//!
//! ```rust
//! use mend::schema::{Field, FieldKind, Schema};
//!
//! let citation = Schema::new("Citation")
//!     .field(Field::required("source_id", FieldKind::Text))
//!     .field(Field::required("quote", FieldKind::Text));
//!
//! let answer = Schema::new("QaResponse")
//!     .field(Field::required("answer", FieldKind::Text))
//!     .field(Field::required("citations", FieldKind::list_of(citation).min_items(1)));
//! ```

use std::fmt;

use serde_json::{Map, Value, json};

/// The kind of value a field holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string.
    Text,
    /// A JSON number (integer or float).
    Number,
    /// A JSON boolean.
    Boolean,
    /// A JSON array whose elements all have the `item` kind.
    Sequence {
        /// Kind of every element.
        item: Box<FieldKind>,
        /// Minimum number of elements.
        min_items: usize,
    },
    /// A nested mapping described by its own schema.
    Object(Schema),
}

impl FieldKind {
    /// A sequence of nested schema instances with no length constraint.
    #[must_use]
    pub fn list_of(schema: Schema) -> Self {
        Self::Sequence {
            item: Box::new(Self::Object(schema)),
            min_items: 0,
        }
    }

    /// A sequence of `item` values with no length constraint.
    #[must_use]
    pub fn sequence(item: Self) -> Self {
        Self::Sequence {
            item: Box::new(item),
            min_items: 0,
        }
    }

    /// Set the minimum length of a sequence. No effect on other kinds.
    #[must_use]
    pub fn min_items(self, min: usize) -> Self {
        match self {
            Self::Sequence { item, .. } => Self::Sequence {
                item,
                min_items: min,
            },
            other => other,
        }
    }

    /// Human-readable name used in validation messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Text => "text".to_owned(),
            Self::Number => "number".to_owned(),
            Self::Boolean => "boolean".to_owned(),
            Self::Sequence { item, .. } => format!("sequence of {}", item.describe()),
            Self::Object(schema) => format!("mapping ({})", schema.name()),
        }
    }

    /// Whether `value` has this kind at the top level (elements and nested
    /// fields are not inspected).
    #[must_use]
    pub const fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Text, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Sequence { .. }, Value::Array(_))
                | (Self::Object(_), Value::Object(_))
        )
    }

    fn json_schema(&self) -> Value {
        match self {
            Self::Text => json!({ "type": "string" }),
            Self::Number => json!({ "type": "number" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Sequence { item, min_items } => {
                let mut out = json!({ "type": "array", "items": item.json_schema() });
                if *min_items > 0 {
                    out["minItems"] = json!(min_items);
                }
                out
            }
            Self::Object(schema) => schema.json_schema(),
        }
    }
}

/// The observed kind of a candidate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Any JSON number.
    Number,
    /// A JSON string.
    Text,
    /// A JSON array.
    Sequence,
    /// A JSON object.
    Mapping,
}

impl Kind {
    /// Classify a JSON value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::Text,
            Value::Array(_) => Self::Sequence,
            Value::Object(_) => Self::Mapping,
        }
    }

    /// Lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Text => "text",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named field of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    kind: FieldKind,
    required: bool,
    description: Option<String>,
}

impl Field {
    /// A field that must be present.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: None,
        }
    }

    /// A field that may be absent or `null`.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: None,
        }
    }

    /// Attach a description, rendered into the JSON Schema.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared kind.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Declarative description of an expected structured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field. Fields are validated in declaration order.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Schema name, used in logs and messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render as a JSON Schema object.
    ///
    /// Suitable for the Ollama `format` parameter or for embedding in a
    /// prompt.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = field.kind.json_schema();
            if let (Some(desc), Value::Object(obj)) = (&field.description, &mut prop) {
                obj.insert("description".to_owned(), Value::String(desc.clone()));
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation() -> Schema {
        Schema::new("Citation")
            .field(Field::required("source_id", FieldKind::Text))
            .field(Field::required("quote", FieldKind::Text).describe("Exact quote"))
    }

    #[test]
    fn builder_keeps_declaration_order() {
        let schema = citation();
        let names: Vec<&str> = schema.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["source_id", "quote"]);
        assert!(schema.get("quote").is_some_and(Field::is_required));
        assert!(schema.get("missing").is_none());
    }

    #[test]
    fn min_items_only_applies_to_sequences() {
        let seq = FieldKind::list_of(citation()).min_items(1);
        assert!(matches!(seq, FieldKind::Sequence { min_items: 1, .. }));
        assert_eq!(FieldKind::Text.min_items(3), FieldKind::Text);
    }

    #[test]
    fn kind_matches_top_level_only() {
        assert!(FieldKind::Text.matches(&json!("x")));
        assert!(!FieldKind::Text.matches(&json!(1)));
        assert!(FieldKind::sequence(FieldKind::Number).matches(&json!(["not a number"])));
        assert!(FieldKind::Object(citation()).matches(&json!({})));
    }

    #[test]
    fn kind_of_values() {
        assert_eq!(Kind::of(&json!(null)), Kind::Null);
        assert_eq!(Kind::of(&json!(1.5)), Kind::Number);
        assert_eq!(Kind::of(&json!([1])), Kind::Sequence);
        assert_eq!(Kind::of(&json!({"a": 1})).to_string(), "mapping");
    }

    #[test]
    fn json_schema_rendering() {
        let schema = Schema::new("QaResponse")
            .field(Field::required("answer", FieldKind::Text))
            .field(Field::optional("confidence", FieldKind::Number))
            .field(Field::required(
                "citations",
                FieldKind::list_of(citation()).min_items(1),
            ));

        let rendered = schema.json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["answer", "citations"]));
        assert_eq!(rendered["properties"]["citations"]["minItems"], 1);
        assert_eq!(
            rendered["properties"]["citations"]["items"]["properties"]["quote"]["description"],
            "Exact quote"
        );
        assert!(rendered["properties"]["confidence"].get("minItems").is_none());
    }
}

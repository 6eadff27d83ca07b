//! Schema validation of candidate values.
//!
//! [`validate`] walks a [`Schema`] against a generic [`serde_json::Value`]
//! and either returns a [`Validated`] instance or a [`ValidationFailure`]
//! listing every violation found. All violations are collected (not just
//! the first) so a corrective prompt can name each broken field at once.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::schema::{FieldKind, Kind, Schema};

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Violation {
    /// A required field is absent.
    Missing {
        /// Location of the missing field.
        path: String,
    },
    /// A field is present with the wrong kind.
    WrongKind {
        /// Location of the field.
        path: String,
        /// Expected kind description.
        expected: String,
        /// Observed kind.
        actual: Kind,
    },
    /// A sequence is shorter than its minimum.
    TooFew {
        /// Location of the sequence.
        path: String,
        /// Minimum number of elements.
        min: usize,
        /// Observed number of elements.
        actual: usize,
    },
    /// A value that must be a mapping is not one.
    NotAnObject {
        /// Location of the value (`$` for the root).
        path: String,
        /// Observed kind.
        actual: Kind,
    },
}

impl Violation {
    /// Location of the offending value.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Missing { path }
            | Self::WrongKind { path, .. }
            | Self::TooFew { path, .. }
            | Self::NotAnObject { path, .. } => path,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { path } => write!(f, "{path}: field required"),
            Self::WrongKind {
                path,
                expected,
                actual,
            } => write!(f, "{path}: expected {expected}, got {actual}"),
            Self::TooFew { path, min, actual } => write!(
                f,
                "{path}: must contain at least {min} item{}, got {actual}",
                if *min == 1 { "" } else { "s" }
            ),
            Self::NotAnObject { path, actual } => {
                write!(f, "{path}: expected a mapping, got {actual}")
            }
        }
    }
}

/// Validation failed with one or more violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    schema: String,
    violations: Vec<Violation>,
}

impl ValidationFailure {
    /// Name of the schema that rejected the value.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    /// All violations, in field declaration order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation concerns `path` exactly.
    #[must_use]
    pub fn mentions(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path() == path)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.violations.len();
        write!(
            f,
            "{n} validation error{} for {}",
            if n == 1 { "" } else { "s" },
            self.schema
        )?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// A value proven to conform to a schema.
///
/// Owns its own copy of the data and exposes it read-only, so the guarantee
/// cannot be invalidated after the fact.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    schema: String,
    value: Value,
}

impl Validated {
    /// Name of the schema the value conforms to.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    /// Borrow the validated value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Take ownership of the value, dropping the guarantee.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Convert into a typed struct.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` is stricter than the schema (for example it
    /// expects an integer where the schema allows any number).
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.value)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization fails, which cannot happen
    /// for values that came from JSON.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.value)
    }
}

/// Something that can turn a candidate value into a [`Validated`] one.
///
/// The repair loop only depends on this capability, so any schema language
/// can be plugged in.
pub trait Validator: Send + Sync {
    /// Name used in logs and messages.
    fn name(&self) -> &str;

    /// Validate a candidate.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    fn validate(&self, candidate: &Value) -> Result<Validated, ValidationFailure>;
}

impl Validator for Schema {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn validate(&self, candidate: &Value) -> Result<Validated, ValidationFailure> {
        validate(self, candidate)
    }
}

/// Validate `candidate` against `schema`.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] listing every missing field, wrong kind
/// and violated length constraint, depth first in declaration order.
pub fn validate(schema: &Schema, candidate: &Value) -> Result<Validated, ValidationFailure> {
    let mut violations = Vec::new();
    check_object(schema, candidate, "$", &mut violations);

    if violations.is_empty() {
        Ok(Validated {
            schema: schema.name().to_owned(),
            value: candidate.clone(),
        })
    } else {
        Err(ValidationFailure {
            schema: schema.name().to_owned(),
            violations,
        })
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent == "$" {
        name.to_owned()
    } else {
        format!("{parent}.{name}")
    }
}

fn check_object(schema: &Schema, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Value::Object(map) = value else {
        out.push(Violation::NotAnObject {
            path: path.to_owned(),
            actual: Kind::of(value),
        });
        return;
    };

    for field in schema.fields() {
        let field_path = join(path, field.name());
        match map.get(field.name()) {
            None | Some(Value::Null) if !field.is_required() => {}
            None => out.push(Violation::Missing { path: field_path }),
            Some(v) => check_kind(field.kind(), v, &field_path, out),
        }
    }
}

fn check_kind(kind: &FieldKind, value: &Value, path: &str, out: &mut Vec<Violation>) {
    if !kind.matches(value) {
        out.push(Violation::WrongKind {
            path: path.to_owned(),
            expected: kind.describe(),
            actual: Kind::of(value),
        });
        return;
    }

    match (kind, value) {
        (FieldKind::Sequence { item, min_items }, Value::Array(items)) => {
            if items.len() < *min_items {
                out.push(Violation::TooFew {
                    path: path.to_owned(),
                    min: *min_items,
                    actual: items.len(),
                });
            }
            for (i, element) in items.iter().enumerate() {
                check_kind(item, element, &format!("{path}[{i}]"), out);
            }
        }
        (FieldKind::Object(schema), _) => check_object(schema, value, path, out),
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::Field;

    fn qa_schema() -> Schema {
        let citation = Schema::new("Citation")
            .field(Field::required("source_id", FieldKind::Text))
            .field(Field::required("quote", FieldKind::Text));
        Schema::new("QaResponse")
            .field(Field::required("answer", FieldKind::Text))
            .field(Field::required(
                "citations",
                FieldKind::list_of(citation).min_items(1),
            ))
            .field(Field::optional("confident", FieldKind::Boolean))
    }

    #[test]
    fn valid_candidate_is_returned_unchanged() {
        let candidate = json!({
            "answer": "Paris",
            "citations": [{"source_id": "doc1", "quote": "Paris is the capital"}],
            "extra": 42
        });
        let validated = validate(&qa_schema(), &candidate).unwrap();
        assert_eq!(validated.value(), &candidate);
        assert_eq!(validated.schema_name(), "QaResponse");
    }

    #[test]
    fn missing_required_field_is_named() {
        let err = validate(&qa_schema(), &json!({"answer": "Paris"})).unwrap_err();
        assert_eq!(
            err.violations(),
            [Violation::Missing {
                path: "citations".to_owned()
            }]
        );
        assert!(err.to_string().contains("citations: field required"));
    }

    #[test]
    fn all_violations_are_reported() {
        let candidate = json!({
            "answer": 7,
            "citations": [{"source_id": "doc1"}, {"quote": 3, "source_id": "doc2"}]
        });
        let err = validate(&qa_schema(), &candidate).unwrap_err();
        let paths: Vec<&str> = err.violations().iter().map(Violation::path).collect();
        assert_eq!(paths, ["answer", "citations[0].quote", "citations[1].quote"]);
        assert!(err.to_string().starts_with("3 validation errors for QaResponse"));
    }

    #[test]
    fn wrong_kind_cites_expected_and_actual() {
        let err = validate(&qa_schema(), &json!({"answer": 1, "citations": []})).unwrap_err();
        let first = &err.violations()[0];
        assert_eq!(first.to_string(), "answer: expected text, got number");
    }

    #[test]
    fn min_items_is_enforced() {
        let err = validate(&qa_schema(), &json!({"answer": "x", "citations": []})).unwrap_err();
        assert!(err.mentions("citations"));
        assert!(
            err.to_string()
                .contains("citations: must contain at least 1 item, got 0")
        );
    }

    #[test]
    fn optional_field_may_be_null_or_absent() {
        let ok = json!({
            "answer": "x",
            "citations": [{"source_id": "a", "quote": "b"}],
            "confident": null
        });
        assert!(validate(&qa_schema(), &ok).is_ok());

        let bad = json!({
            "answer": "x",
            "citations": [{"source_id": "a", "quote": "b"}],
            "confident": "yes"
        });
        assert!(validate(&qa_schema(), &bad).unwrap_err().mentions("confident"));
    }

    #[test]
    fn required_null_is_a_wrong_kind() {
        let candidate = json!({
            "answer": null,
            "citations": [{"source_id": "a", "quote": "b"}]
        });
        let err = validate(&qa_schema(), &candidate).unwrap_err();
        assert!(matches!(
            err.violations()[0],
            Violation::WrongKind {
                actual: Kind::Null,
                ..
            }
        ));
    }

    #[test]
    fn root_must_be_a_mapping() {
        let err = validate(&qa_schema(), &json!(["Paris"])).unwrap_err();
        assert_eq!(
            err.violations()[0].to_string(),
            "$: expected a mapping, got sequence"
        );
    }

    #[test]
    fn nested_element_must_be_a_mapping() {
        let err =
            validate(&qa_schema(), &json!({"answer": "x", "citations": ["doc1"]})).unwrap_err();
        assert_eq!(
            err.violations()[0].to_string(),
            "citations[0]: expected mapping (Citation), got text"
        );
    }

    #[test]
    fn sequences_of_scalars() {
        let schema = Schema::new("Tags").field(Field::required(
            "tags",
            FieldKind::sequence(FieldKind::Text).min_items(2),
        ));
        assert!(validate(&schema, &json!({"tags": ["a", "b"]})).is_ok());
        let err = validate(&schema, &json!({"tags": ["a", 1]})).unwrap_err();
        assert!(err.mentions("tags[1]"));
    }

    #[test]
    fn validated_deserializes_into_typed_struct() {
        #[derive(serde::Deserialize)]
        struct Answer {
            answer: String,
        }
        let candidate = json!({
            "answer": "Paris",
            "citations": [{"source_id": "a", "quote": "b"}]
        });
        let validated = qa_schema().validate(&candidate).unwrap();
        let typed: Answer = validated.deserialize().unwrap();
        assert_eq!(typed.answer, "Paris");
    }
}

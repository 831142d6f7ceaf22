//! Output schema description and validation.
//!
//! Any `T: JsonSchema + DeserializeOwned` can serve as an output model. The
//! generated JSON schema supplies the field names for the format hint. serde
//! decides whether a value is accepted; when it is not, the schema is walked
//! to list every problem instead of only the first one serde hit.

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, ObjectValidation, RootSchema, Schema, SingleOrVec};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::{DecodeError, FieldIssue, InputError, OutputError, SchemaViolation};

/// A type the model's JSON answer can be validated into.
pub trait OutputSchema: Sized {
    /// Human-readable name used in errors.
    fn name() -> String;

    /// Field names in declaration order.
    fn field_names() -> Result<Vec<String>, InputError>;

    /// Validates a decoded JSON value and builds the output.
    fn from_json(value: Value) -> Result<Self, SchemaViolation>;
}

impl<T: JsonSchema + DeserializeOwned> OutputSchema for T {
    fn name() -> String {
        <T as JsonSchema>::schema_name()
    }

    fn field_names() -> Result<Vec<String>, InputError> {
        let root = root_schema::<T>();
        match object_validation(&root) {
            Some(obj) if !obj.properties.is_empty() => Ok(obj.properties.keys().cloned().collect()),
            _ => Err(InputError::UnsupportedSchema(Self::name())),
        }
    }

    fn from_json(value: Value) -> Result<Self, SchemaViolation> {
        match serde_json::from_value(value.clone()) {
            Ok(output) => Ok(output),
            Err(e) => {
                let mut issues = structural_issues(&root_schema::<T>(), &value);
                if issues.is_empty() {
                    issues.push(FieldIssue::Invalid(e.to_string()));
                }
                Err(SchemaViolation {
                    schema: Self::name(),
                    issues,
                })
            }
        }
    }
}

/// Decodes `json_text` and validates it against `T`.
pub fn parse_output<T: OutputSchema>(json_text: &str) -> Result<T, OutputError> {
    let value: Value =
        serde_json::from_str(json_text).map_err(|e| DecodeError::new(json_text, e))?;
    Ok(T::from_json(value)?)
}

fn root_schema<T: JsonSchema>() -> RootSchema {
    SchemaGenerator::default().into_root_schema_for::<T>()
}

fn object_validation(root: &RootSchema) -> Option<&ObjectValidation> {
    root.schema.object.as_deref()
}

fn structural_issues(root: &RootSchema, value: &Value) -> Vec<FieldIssue> {
    let Some(map) = value.as_object() else {
        return vec![FieldIssue::NotAnObject {
            found: json_type_name(value),
        }];
    };
    let Some(obj) = object_validation(root) else {
        return Vec::new();
    };

    let mut issues = Vec::new();
    for (name, schema) in &obj.properties {
        match map.get(name) {
            None if obj.required.contains(name) => issues.push(FieldIssue::Missing(name.clone())),
            None => {}
            Some(field) => {
                if let Some(expected) = declared_types(schema) {
                    if !expected.iter().any(|ty| type_matches(ty, field)) {
                        issues.push(FieldIssue::Mistyped {
                            field: name.clone(),
                            expected: expected
                                .iter()
                                .map(instance_type_name)
                                .collect::<Vec<_>>()
                                .join(" or "),
                            found: json_type_name(field),
                        });
                    }
                }
            }
        }
    }

    if matches!(obj.additional_properties.as_deref(), Some(Schema::Bool(false))) {
        issues.extend(
            map.keys()
                .filter(|key| !obj.properties.contains_key(*key))
                .map(|key| FieldIssue::Unexpected(key.clone())),
        );
    }

    issues
}

fn declared_types(schema: &Schema) -> Option<Vec<InstanceType>> {
    let Schema::Object(obj) = schema else {
        return None;
    };
    match obj.instance_type.as_ref()? {
        SingleOrVec::Single(ty) => Some(vec![**ty]),
        SingleOrVec::Vec(tys) => Some(tys.clone()),
    }
}

fn type_matches(ty: &InstanceType, value: &Value) -> bool {
    match ty {
        InstanceType::Null => value.is_null(),
        InstanceType::Boolean => value.is_boolean(),
        InstanceType::Object => value.is_object(),
        InstanceType::Array => value.is_array(),
        InstanceType::Number => value.is_number(),
        InstanceType::String => value.is_string(),
        InstanceType::Integer => value.is_i64() || value.is_u64(),
    }
}

fn instance_type_name(ty: &InstanceType) -> &'static str {
    match ty {
        InstanceType::Null => "null",
        InstanceType::Boolean => "boolean",
        InstanceType::Object => "object",
        InstanceType::Array => "array",
        InstanceType::Number => "number",
        InstanceType::String => "string",
        InstanceType::Integer => "integer",
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

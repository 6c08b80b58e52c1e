//! Typed resource fields and the coercion of loosely typed arguments into them.

use crate::core::Error;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::fmt;

/// The value type the appliance expects for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Bool,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Str => "str",
            FieldKind::Int => "int",
            FieldKind::Bool => "bool",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named, typed attribute of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn str(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::Str,
        }
    }

    pub const fn int(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::Int,
        }
    }

    pub const fn bool(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::Bool,
        }
    }

    /// The same field, reinterpreted as a flag. `unset_*` functions take every field this way.
    pub const fn as_flag(self) -> Self {
        Field::bool(self.name)
    }

    /// Converts an `unset_*` argument. Any scalar is accepted, and a truthy one asks for the field
    /// to be reset, so `policyname: p1` and `policyname: true` both send `"policyname": true`.
    pub fn flag(&self, value: &YamlValue) -> Result<Option<JsonValue>, Error> {
        match value {
            YamlValue::Tagged(tagged) => self.flag(&tagged.value),
            YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(Error::InvalidValue {
                field: self.name.to_owned(),
                expected: "scalar",
                value: display_yaml(value),
            }),
            scalar => Ok(is_truthy(scalar).then_some(JsonValue::Bool(true))),
        }
    }

    /// Converts an argument to the JSON value the appliance expects for this field.
    ///
    /// Returns `Ok(None)` for a null argument, which callers treat as if it had not been supplied.
    ///
    /// # Coercion rules
    ///
    /// * [FieldKind::Str] accepts any scalar and uses its textual form, so `port: 80` and
    ///   `name: 80` both work.
    /// * [FieldKind::Int] accepts integers and strings that parse as integers.
    /// * [FieldKind::Bool] accepts booleans and the strings `true` and `false` in any case.
    ///
    /// Sequences and mappings are never valid.
    pub fn coerce(&self, value: &YamlValue) -> Result<Option<JsonValue>, Error> {
        let invalid = || Error::InvalidValue {
            field: self.name.to_owned(),
            expected: self.kind.as_str(),
            value: display_yaml(value),
        };

        let coerced = match (self.kind, value) {
            (_, YamlValue::Null) => return Ok(None),
            (_, YamlValue::Tagged(tagged)) => return self.coerce(&tagged.value),

            (FieldKind::Str, YamlValue::String(s)) => JsonValue::String(s.clone()),
            (FieldKind::Str, YamlValue::Number(n)) => JsonValue::String(n.to_string()),
            (FieldKind::Str, YamlValue::Bool(b)) => JsonValue::String(b.to_string()),

            (FieldKind::Int, YamlValue::Number(n)) => {
                JsonValue::from(n.as_i64().ok_or_else(invalid)?)
            }
            (FieldKind::Int, YamlValue::String(s)) => {
                JsonValue::from(s.trim().parse::<i64>().map_err(|_| invalid())?)
            }

            (FieldKind::Bool, YamlValue::Bool(b)) => JsonValue::Bool(*b),
            (FieldKind::Bool, YamlValue::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => JsonValue::Bool(true),
                "false" => JsonValue::Bool(false),
                _ => return Err(invalid()),
            },

            _ => return Err(invalid()),
        };
        Ok(Some(coerced))
    }
}

/// Whether an argument counts as "supplied".
///
/// Payloads and search filters only carry truthy arguments: non-empty strings, non-zero numbers,
/// `true`, and non-empty collections. This is decided on the argument as written, before coercion,
/// so `comment: 0` is dropped even though the field is a string. A caller cannot send `0`, `false`,
/// or an empty string to an appliance.
pub fn is_truthy(value: &YamlValue) -> bool {
    match value {
        YamlValue::Null => false,
        YamlValue::Bool(b) => *b,
        YamlValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        YamlValue::String(s) => !s.is_empty(),
        YamlValue::Sequence(seq) => !seq.is_empty(),
        YamlValue::Mapping(map) => !map.is_empty(),
        YamlValue::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

/// Renders a YAML value on one line for error messages.
fn display_yaml(value: &YamlValue) -> String {
    match value {
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

//! The result of one operation against one appliance.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// The status of the save step that can follow a successful change.
#[derive(Clone, Debug, PartialEq)]
pub enum SaveStatus {
    /// The caller did not ask for a save.
    NotRequested,
    Saved,

    /// The save call itself failed. The change was still applied.
    Failed(Value),
}

/// What an operation produced.
///
/// Serializes to the same shapes the appliance's users already script against:
///
/// | Variant | Serialized |
/// |---|---|
/// | `Changed` | `{"result": "True", "save": "False" \| "True" \| <fault>}` |
/// | `Saved` | `{"result": "True"}` |
/// | `Records` | the records themselves |
/// | `Failed` | `{"result": "False", "error": <fault>}` |
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// A mutating call succeeded.
    Changed { save: SaveStatus },

    /// `save_config` succeeded.
    Saved,

    /// A `get_*` call succeeded.
    Records(Value),

    /// The operation failed. Nothing after the failing call was attempted.
    Failed(Value),
}

impl Outcome {
    pub fn failed(error: impl Into<Value>) -> Self {
        Outcome::Failed(error.into())
    }

    /// Returns `false` only for [Outcome::Failed]. A failed save after a successful change still
    /// counts as success, as the change itself was applied.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    pub fn to_value(&self) -> Value {
        // Serializing into a `Value` cannot fail: every key is a string.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Changed { save } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("result", "True")?;
                match save {
                    SaveStatus::NotRequested => map.serialize_entry("save", "False")?,
                    SaveStatus::Saved => map.serialize_entry("save", "True")?,
                    SaveStatus::Failed(fault) => map.serialize_entry("save", fault)?,
                }
                map.end()
            }
            Outcome::Saved => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("result", "True")?;
                map.end()
            }
            Outcome::Records(records) => records.serialize(serializer),
            Outcome::Failed(error) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("result", "False")?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

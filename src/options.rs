use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADER: &str = "// DO NOT MODIFY THIS FILE: AUTOGENERATED BY vuextcg";

/// Settings of the generated module. Deserializable from camelCase JSON, so
/// Node callers can pass `{ "header": "..." }` and leave the rest out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// First line of the output.
    pub header: String,
    /// Log a warning when two paths of one group map to the same constant.
    pub warn_on_collisions: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            warn_on_collisions: true,
        }
    }
}

impl GenerateOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }
}

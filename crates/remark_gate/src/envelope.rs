use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

use crate::types::EnvelopeError;

/// The JSON document a PreToolUse hook receives on stdin.
///
/// `tool_input` stays untyped until the tool is known to be one the gate scans,
/// so payloads of other tools never fail to parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: String,
    pub new_string: Option<String>,
    pub old_string: Option<String>,
    pub edits: Option<Vec<EditOperation>>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditOperation {
    #[serde(default)]
    pub old_string: String,
    #[serde(default)]
    pub new_string: String,
}

impl HookInput {
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, EnvelopeError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads `tool_input` as an edit payload. A missing payload is an empty edit.
    pub fn edit_input(&self) -> Result<ToolInput, EnvelopeError> {
        if self.tool_input.is_null() {
            return Ok(ToolInput::default());
        }
        Ok(ToolInput::deserialize(&self.tool_input)?)
    }
}

impl ToolInput {
    /// The text this edit introduces, as far as the tool payload reveals it.
    ///
    /// Text that was already present (the replaced `old_string`, or sub-edits that
    /// only rewrap existing code) is left out so that pre-existing comments don't
    /// block unrelated edits.
    pub fn candidate_text(&self, tool_name: &str) -> String {
        match tool_name {
            "Edit" => {
                let new = self.new_string.as_deref().unwrap_or_default();
                let old = self.old_string.as_deref().unwrap_or_default();
                if new.contains(old) {
                    new.replacen(old, "", 1).trim().to_string()
                } else {
                    new.to_string()
                }
            }
            "MultiEdit" => self
                .edits
                .iter()
                .flatten()
                .filter(|edit| edit.old_string.is_empty() || !edit.new_string.contains(&edit.old_string))
                .map(|edit| edit.new_string.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            "Write" => self.content.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }
}

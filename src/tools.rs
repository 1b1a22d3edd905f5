//! File-operation vocabulary shared with the virtual file system and the UI.
//!
//! The model never touches files. It emits tool calls whose arguments decode
//! into one of the commands below, and the caller executes them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::InferenceError;
use crate::types::ToolCall;

pub const EDITOR_TOOL: &str = "str_replace_editor";
pub const FILE_MANAGER_TOOL: &str = "file_manager";

/// Commands understood by the `str_replace_editor` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    View {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_range: Option<[i64; 2]>,
    },
    Create {
        path: String,
        file_text: String,
    },
    StrReplace {
        path: String,
        old_str: String,
        new_str: String,
    },
    Insert {
        path: String,
        insert_line: u32,
        new_str: String,
    },
}

/// Commands understood by the `file_manager` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum FileManagerCommand {
    Rename { path: String, new_path: String },
    Delete { path: String },
}

/// A decoded file operation from either tool family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    Editor(EditorCommand),
    FileManager(FileManagerCommand),
}

impl FileOperation {
    pub fn create(path: impl Into<String>, file_text: impl Into<String>) -> Self {
        Self::Editor(EditorCommand::Create {
            path: path.into(),
            file_text: file_text.into(),
        })
    }

    pub fn str_replace(
        path: impl Into<String>,
        old_str: impl Into<String>,
        new_str: impl Into<String>,
    ) -> Self {
        Self::Editor(EditorCommand::StrReplace {
            path: path.into(),
            old_str: old_str.into(),
            new_str: new_str.into(),
        })
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Editor(_) => EDITOR_TOOL,
            Self::FileManager(_) => FILE_MANAGER_TOOL,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Editor(EditorCommand::View { path, .. })
            | Self::Editor(EditorCommand::Create { path, .. })
            | Self::Editor(EditorCommand::StrReplace { path, .. })
            | Self::Editor(EditorCommand::Insert { path, .. })
            | Self::FileManager(FileManagerCommand::Rename { path, .. })
            | Self::FileManager(FileManagerCommand::Delete { path }) => path,
        }
    }

    /// Encode as a tool call with the given id.
    pub fn to_tool_call(&self, id: impl Into<String>) -> Result<ToolCall, InferenceError> {
        let arguments = match self {
            Self::Editor(cmd) => serde_json::to_string(cmd)?,
            Self::FileManager(cmd) => serde_json::to_string(cmd)?,
        };
        Ok(ToolCall {
            id: id.into(),
            name: self.tool_name().to_string(),
            arguments,
        })
    }
}

impl ToolCall {
    /// Decode the arguments into a typed file operation.
    pub fn operation(&self) -> Result<FileOperation, InferenceError> {
        let parse = |e: serde_json::Error| InferenceError::Parse(format!("{}: {e}", self.name));
        match self.name.as_str() {
            EDITOR_TOOL => serde_json::from_str(&self.arguments)
                .map(FileOperation::Editor)
                .map_err(parse),
            FILE_MANAGER_TOOL => serde_json::from_str(&self.arguments)
                .map(FileOperation::FileManager)
                .map_err(parse),
            other => Err(InferenceError::Parse(format!("unknown tool: {other}"))),
        }
    }

    /// Short human-readable status line, e.g. `Created /App.jsx`.
    ///
    /// Works on partial arguments too, since the UI renders calls that are
    /// still streaming in.
    pub fn status_label(&self) -> String {
        let args: Value = serde_json::from_str(&self.arguments).unwrap_or(Value::Null);
        let command = args["command"].as_str();
        let path = args["path"].as_str().unwrap_or("file");

        match (self.name.as_str(), command) {
            (EDITOR_TOOL, Some("create")) => format!("Created {path}"),
            (EDITOR_TOOL, Some("str_replace" | "insert")) => format!("Edited {path}"),
            (EDITOR_TOOL, Some("view")) => format!("Viewed {path}"),
            (FILE_MANAGER_TOOL, Some("rename")) => {
                let new_path = args["new_path"].as_str().unwrap_or("new file");
                format!("Renamed {path} → {new_path}")
            }
            (FILE_MANAGER_TOOL, Some("delete")) => format!("Deleted {path}"),
            _ => self.name.clone(),
        }
    }
}

/// Tool definitions (name, description, input_schema) for a real backend.
pub fn tool_schemas() -> Vec<Value> {
    vec![
        json!({
            "name": EDITOR_TOOL,
            "description": "View, create and edit files in the virtual file system.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "command": { "type": "string", "enum": ["view", "create", "str_replace", "insert"] },
                    "path": { "type": "string" },
                    "file_text": { "type": "string" },
                    "old_str": { "type": "string" },
                    "new_str": { "type": "string" },
                    "insert_line": { "type": "integer" },
                    "view_range": { "type": "array", "items": { "type": "integer" } }
                },
                "required": ["command", "path"]
            }
        }),
        json!({
            "name": FILE_MANAGER_TOOL,
            "description": "Rename or delete files in the virtual file system.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "command": { "type": "string", "enum": ["rename", "delete"] },
                    "path": { "type": "string" },
                    "new_path": { "type": "string" }
                },
                "required": ["command", "path"]
            }
        }),
    ]
}

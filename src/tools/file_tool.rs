//! Line-oriented file editing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::resolve_path;
use crate::capabilities::{
    json_list, Arguments, Capability, CapabilityDescriptor, CapabilityError, CapabilityFactory,
    CapabilityResult,
};
use crate::config::Settings;
use crate::dispatch::Dispatcher;

const SUCCESS: &str = "File operations executed successfully.";

/// Kind of edit applied by one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    /// Replace the whole file with `content`.
    Create,
    /// Insert `content` before `line_number` (1-based, clamped).
    Insert,
    /// Replace line `line_number`.
    Update,
    /// Delete line `line_number`.
    Delete,
    /// Delete the file.
    Remove,
}

impl FileAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Remove => "remove",
        }
    }

    fn needs_line(self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Delete)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FileOperation {
    action: FileAction,
    path: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    line_number: Option<i64>,
}

/// Applies a sequence of file operations in order.
///
/// Operations run until the first failure; earlier edits stay on disk.
pub struct FileTool {
    descriptor: CapabilityDescriptor,
    working_dir: Option<PathBuf>,
}

impl FileTool {
    pub const NAME: &'static str = "FileTool";

    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new(Self::NAME)
            .with_description(
                "Execute a sequence of file operations (create, insert, update, delete, remove).\n\
                 Line numbers are 1-based. Example input: \
                 [{\"action\": \"create\", \"path\": \"new.txt\", \"content\": \"hello\"}, \
                 {\"action\": \"insert\", \"path\": \"new.txt\", \"line_number\": 1, \
                 \"content\": \"first\"}]",
            )
            .with_param(
                "input",
                "JSON list of operations, each \
                 {\"action\", \"path\", \"content\"?, \"line_number\"?}",
            )
    }

    pub fn new(settings: &Settings) -> Self {
        Self {
            descriptor: Self::descriptor(),
            working_dir: settings.working_dir.clone(),
        }
    }

    pub fn factory() -> CapabilityFactory {
        CapabilityFactory::new(Self::descriptor(), |services| {
            Ok(Box::new(Self::new(&services.settings)) as Box<dyn Capability>)
        })
    }

    fn apply(&self, op: &FileOperation) -> CapabilityResult<()> {
        let path = resolve_path(self.working_dir.as_deref(), &op.path);

        if op.action == FileAction::Remove {
            fs::remove_file(&path)?;
            return Ok(());
        }

        let line_number = match (op.action.needs_line(), op.line_number) {
            (true, None) => {
                return Err(CapabilityError::invalid(
                    "line_number",
                    format!("Line number is required for {}", op.action.as_str()),
                ))
            }
            (_, n) => n.unwrap_or(0),
        };

        if op.action == FileAction::Create || !path.exists() {
            fs::write(&path, "")?;
        }

        let mut lines = read_lines(&path)?;
        let content = format!("{}\n", op.content.as_deref().unwrap_or_default());

        match op.action {
            FileAction::Create => lines = vec![content],
            FileAction::Insert => {
                let clamped = line_number.clamp(1, (lines.len() as i64).max(1));
                lines.insert((clamped - 1) as usize, content);
            }
            FileAction::Update => {
                let index = line_index(line_number, lines.len())?;
                lines[index] = content;
            }
            FileAction::Delete => {
                let index = line_index(line_number, lines.len())?;
                lines.remove(index);
            }
            FileAction::Remove => unreachable!("handled above"),
        }

        fs::write(&path, lines.concat())?;
        Ok(())
    }
}

fn read_lines(path: &Path) -> CapabilityResult<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text.split_inclusive('\n').map(str::to_string).collect())
}

fn line_index(line_number: i64, len: usize) -> CapabilityResult<usize> {
    if line_number < 1 || line_number > len as i64 {
        return Err(CapabilityError::invalid(
            "line_number",
            format!("Line number out of range: {} (file has {} lines)", line_number, len),
        ));
    }
    Ok((line_number - 1) as usize)
}

impl Capability for FileTool {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    fn invoke(&self, args: &Arguments, _dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value> {
        let operations = json_list(args, "input")?
            .into_iter()
            .map(serde_json::from_value::<FileOperation>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CapabilityError::invalid("input", e.to_string()))?;

        for op in &operations {
            log::debug!("FileTool: {} {}", op.action.as_str(), op.path);
            self.apply(op)?;
        }

        Ok(Value::String(SUCCESS.to_string()))
    }
}

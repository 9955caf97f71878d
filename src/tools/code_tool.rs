//! Model-driven file rewriting.
//!
//! Composes `GptTool` and `FileTool` through the dispatcher rather than
//! holding either directly.

use std::path::PathBuf;

use serde_json::{json, Value};

use super::{resolve_path, FileTool, GptTool};
use crate::capabilities::{
    required_str, Arguments, Capability, CapabilityDescriptor, CapabilityError, CapabilityFactory,
    CapabilityResult,
};
use crate::config::Settings;
use crate::dispatch::{DispatchError, Dispatcher};

const SYSTEM_PROMPT: &str = "You rewrite source files. Reply with the complete new file contents \
                             only, without commentary or Markdown fences.";

/// Rewrites a file according to instructions.
pub struct CodeTool {
    descriptor: CapabilityDescriptor,
    working_dir: Option<PathBuf>,
}

impl CodeTool {
    pub const NAME: &'static str = "CodeTool";

    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new(Self::NAME)
            .with_description(
                "Apply described changes to a file using the chat model.\n\
                 Reads the file, asks GptTool for the revised contents, and writes them back \
                 with FileTool.",
            )
            .depends_on([GptTool::NAME, FileTool::NAME])
            .with_param("path", "Path of the file to modify")
            .with_param("instructions", "Description of the desired changes")
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
}

impl Capability for CodeTool {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    fn invoke(&self, args: &Arguments, dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value> {
        let path = required_str(args, "path")?;
        let instructions = required_str(args, "instructions")?;

        let resolved = resolve_path(self.working_dir.as_deref(), path);
        let original = if resolved.exists() {
            std::fs::read_to_string(&resolved)?
        } else {
            String::new()
        };

        let prompt = format!(
            "File: {}\n\nInstructions:\n{}\n\nCurrent contents:\n{}",
            path, instructions, original
        );
        let gpt_args = arguments(json!({
            "input": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ]
        }));
        let reply = dispatcher
            .try_invoke(GptTool::NAME, &gpt_args)
            .map_err(dependency_failed)?;
        let revised = strip_fences(reply.as_str().unwrap_or_default());

        let file_args = arguments(json!({
            "input": [{"action": "create", "path": path, "content": revised}]
        }));
        dispatcher
            .try_invoke(FileTool::NAME, &file_args)
            .map_err(dependency_failed)?;

        log::info!("CodeTool: rewrote {}", path);
        Ok(Value::String(format!("Updated {}", path)))
    }
}

fn arguments(value: Value) -> Arguments {
    match value {
        Value::Object(map) => map,
        _ => Arguments::new(),
    }
}

fn dependency_failed(err: DispatchError) -> CapabilityError {
    CapabilityError::Dependency {
        name: err.capability().to_string(),
        detail: err.to_string(),
    }
}

/// Drop a surrounding Markdown code fence and the trailing newline.
fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed.trim_end_matches('\n');
    };
    let body = body.split_once('\n').map_or("", |(_, rest)| rest);
    body.strip_suffix("```").unwrap_or(body).trim_end_matches('\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilityRegistry;
    use crate::test_support::{args, services_with, StubChat};
    use std::sync::Arc;

    fn load(dir: &std::path::Path, chat: Arc<StubChat>) -> CapabilityRegistry {
        let mut services = services_with(chat);
        services.settings = Arc::new(Settings {
            working_dir: Some(dir.to_path_buf()),
            ..Settings::default()
        });
        let (registry, report) = CapabilityRegistry::load(
            vec![CodeTool::factory(), GptTool::factory(), FileTool::factory()],
            &services,
        );
        assert!(report.is_complete(), "{}", report);
        registry
    }

    #[test]
    fn test_rewrites_file_through_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();
        let chat = Arc::new(StubChat::replying("```python\nprint('hello')\n```"));
        let registry = load(dir.path(), chat.clone());

        let out = Dispatcher::new(&registry).invoke(
            "CodeTool",
            &args(json!({"path": "main.py", "instructions": "say hello"})),
        );
        assert_eq!(out, json!("Updated main.py"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("main.py")).unwrap(),
            "print('hello')\n"
        );

        let sent = &chat.requests()[0];
        assert!(sent[1].content.contains("say hello"));
        assert!(sent[1].content.contains("print('hi')"));
    }

    #[test]
    fn test_dependency_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let registry = load(dir.path(), Arc::new(StubChat::failing("offline")));
        let out = Dispatcher::new(&registry).invoke(
            "CodeTool",
            &args(json!({"path": "x.py", "instructions": "anything"})),
        );
        let text = out.as_str().unwrap();
        assert!(text.starts_with("Error executing CodeTool: dependency GptTool failed"));
        assert!(text.contains("offline"));
        assert!(!dir.path().join("x.py").exists());
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("plain\n"), "plain");
        assert_eq!(strip_fences("```\na\nb\n```"), "a\nb");
        assert_eq!(strip_fences("```rust\nfn main() {}\n```\n"), "fn main() {}");
    }
}

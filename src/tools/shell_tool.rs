//! Run commands without a shell.

use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Deserialize;
use serde_json::Value;

use super::resolve_path;
use crate::capabilities::{
    json_list, Arguments, Capability, CapabilityDescriptor, CapabilityError, CapabilityFactory,
    CapabilityResult,
};
use crate::config::Settings;
use crate::dispatch::Dispatcher;

/// One command in a `ShellTool` invocation.
#[derive(Debug, Clone, Deserialize)]
struct ShellCommand {
    command: String,
    #[serde(default)]
    args: Vec<Value>,
}

/// Executes a list of commands and returns their concatenated stdout.
///
/// An argument `>` redirects stdout to the path that follows it.
pub struct ShellTool {
    descriptor: CapabilityDescriptor,
    working_dir: Option<PathBuf>,
}

impl ShellTool {
    pub const NAME: &'static str = "ShellTool";

    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new(Self::NAME)
            .with_description(
                "Execute a list of Linux commands and return their concatenated output.\n\
                 Example input: [{\"command\": \"ls\", \"args\": [\"-la\"]}, \
                 {\"command\": \"echo\", \"args\": [\"foo\", \">\", \"foo.txt\"]}]",
            )
            .with_param(
                "input",
                "JSON list of commands, each {\"command\": <name>, \"args\": [<arg>, ...]}",
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

    fn command(&self, program: &str, args: &[String]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn run_one(&self, entry: &ShellCommand) -> std::io::Result<String> {
        let mut args: Vec<String> = entry
            .args
            .iter()
            .map(|a| match a {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();

        match args.iter().position(|a| a == ">") {
            Some(index) => {
                let target = args.get(index + 1).cloned().ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "redirect '>' has no target path",
                    )
                })?;
                args.truncate(index);

                let file = File::create(resolve_path(self.working_dir.as_deref(), &target))?;
                self.command(&entry.command, &args)
                    .stdout(Stdio::from(file))
                    .stderr(Stdio::piped())
                    .output()?;
                Ok(format!("REDIRECTED_TO_FILE: {}\n", target))
            }
            None => {
                let output = self
                    .command(&entry.command, &args)
                    .stdin(Stdio::null())
                    .output()?;
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
        }
    }
}

impl Capability for ShellTool {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    fn invoke(&self, args: &Arguments, _dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value> {
        let commands = json_list(args, "input")?
            .into_iter()
            .map(serde_json::from_value::<ShellCommand>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CapabilityError::invalid("input", e.to_string()))?;

        let mut out = String::new();
        for entry in &commands {
            log::debug!("ShellTool: running {} {:?}", entry.command, entry.args);
            match self.run_one(entry) {
                Ok(text) => out.push_str(&text),
                Err(e) => {
                    log::warn!("ShellTool: {} failed: {}", entry.command, e);
                    out.push_str(&format!("An unexpected error occurred: {}\n", e));
                }
            }
            out.push('\n');
        }

        Ok(Value::String(out.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilityRegistry;
    use crate::test_support::{args, services};
    use serde_json::json;

    fn tool_in(dir: &std::path::Path) -> ShellTool {
        ShellTool::new(&Settings {
            working_dir: Some(dir.to_path_buf()),
            ..Settings::default()
        })
    }

    fn invoke(tool: &ShellTool, input: Value) -> CapabilityResult<Value> {
        let registry = CapabilityRegistry::new();
        tool.invoke(&args(json!({"input": input})), &Dispatcher::new(&registry))
    }

    #[test]
    fn test_concatenates_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = invoke(
            &tool_in(dir.path()),
            json!(r#"[{"command": "echo", "args": ["one"]},
                      {"command": "echo", "args": ["two"]}]"#),
        )
        .unwrap();
        assert_eq!(out, json!("one\n\ntwo"));
    }

    #[test]
    fn test_single_object_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = json!({"command": "echo", "args": ["solo"]});
        let out = invoke(&tool_in(dir.path()), input).unwrap();
        assert_eq!(out, json!("solo"));
    }

    #[test]
    fn test_redirect_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = invoke(
            &tool_in(dir.path()),
            json!([{"command": "echo", "args": ["foo", ">", "foo.txt"]}]),
        )
        .unwrap();
        assert_eq!(out, json!("REDIRECTED_TO_FILE: foo.txt"));
        let written = std::fs::read_to_string(dir.path().join("foo.txt")).unwrap();
        assert_eq!(written, "foo\n");
    }

    #[test]
    fn test_spawn_failure_is_reported_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let out = invoke(
            &tool_in(dir.path()),
            json!([
                {"command": "definitely-not-a-real-binary-xyz"},
                {"command": "echo", "args": ["after"]}
            ]),
        )
        .unwrap();
        let text = out.as_str().unwrap();
        assert!(text.starts_with("An unexpected error occurred:"));
        assert!(text.ends_with("after"));
    }

    #[test]
    fn test_invalid_json_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = invoke(&tool_in(dir.path()), json!("not json")).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON input"));

        let err = invoke(&tool_in(dir.path()), json!([{"args": []}])).unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidArgument { .. }));
    }

    #[test]
    fn test_factory_builds_from_services() {
        let tool = ShellTool::factory().build(&services()).unwrap();
        assert_eq!(tool.name(), ShellTool::NAME);
    }
}

//! Run source code through an external interpreter.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_json::Value;

use crate::capabilities::{
    required_str, Arguments, Capability, CapabilityDescriptor, CapabilityFactory, CapabilityResult,
};
use crate::config::Settings;
use crate::dispatch::Dispatcher;

/// Executes `input` as `<interpreter> -c <input>` and returns stdout.
///
/// A non-zero exit is not a capability failure: the result text starts
/// with `Got error executing` and carries stderr, so the caller can read
/// and correct the code.
pub struct ExecTool {
    descriptor: CapabilityDescriptor,
    interpreter: String,
    working_dir: Option<PathBuf>,
}

impl ExecTool {
    pub const NAME: &'static str = "ExecTool";

    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new(Self::NAME)
            .with_description(
                "Execute the given source code and return what it prints to stdout.\n\
                 The source must be one or more statements for the configured interpreter.",
            )
            .with_param("input", "Source code to execute")
    }

    pub fn new(settings: &Settings) -> Self {
        Self {
            descriptor: Self::descriptor(),
            interpreter: settings.exec_interpreter.clone(),
            working_dir: settings.working_dir.clone(),
        }
    }

    pub fn factory() -> CapabilityFactory {
        CapabilityFactory::new(Self::descriptor(), |services| {
            Ok(Box::new(Self::new(&services.settings)) as Box<dyn Capability>)
        })
    }
}

impl Capability for ExecTool {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    fn invoke(&self, args: &Arguments, _dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value> {
        let source = required_str(args, "input")?;

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-c").arg(source).stdin(Stdio::null());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        log::debug!("ExecTool: running {} bytes with {}", source.len(), self.interpreter);
        let output = cmd.output()?;

        if output.status.success() {
            Ok(Value::String(
                String::from_utf8_lossy(&output.stdout).into_owned(),
            ))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(Value::String(format!(
                "Got error executing {}: {}",
                source,
                stderr.trim()
            )))
        }
    }
}

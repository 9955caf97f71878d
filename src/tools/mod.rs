//! Built-in capabilities.
//!
//! [`builtin_capabilities`] is the registration list used by the binary.
//! Each tool builds its own [`CapabilityFactory`], so a caller can also
//! assemble a custom list.

pub mod code_tool;
pub mod exec_tool;
pub mod file_tool;
pub mod gpt_tool;
pub mod pipeline_tool;
pub mod registry_tool;
pub mod shell_tool;

use std::path::{Path, PathBuf};

use crate::capabilities::{CapabilityFactory, CapabilitySource};

pub use code_tool::CodeTool;
pub use exec_tool::ExecTool;
pub use file_tool::FileTool;
pub use gpt_tool::GptTool;
pub use pipeline_tool::PipelineTool;
pub use registry_tool::RegistryTool;
pub use shell_tool::ShellTool;

/// Every built-in capability, in discovery order.
pub fn builtin_capabilities() -> Vec<CapabilityFactory> {
    vec![
        ShellTool::factory(),
        FileTool::factory(),
        ExecTool::factory(),
        GptTool::factory(),
        CodeTool::factory(),
        PipelineTool::factory(),
        RegistryTool::factory(),
    ]
}

/// [`CapabilitySource`] yielding [`builtin_capabilities`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtins;

impl CapabilitySource for Builtins {
    fn factories(self) -> Vec<CapabilityFactory> {
        builtin_capabilities()
    }
}

/// Resolve `path` against an optional working directory.
pub(crate) fn resolve_path(working_dir: Option<&Path>, path: &str) -> PathBuf {
    let path = Path::new(path);
    match working_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

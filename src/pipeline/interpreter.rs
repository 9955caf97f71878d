//! Sequential pipeline execution.

use serde_json::Value;
use uuid::Uuid;

use super::context::PipelineContext;
use super::error::PipelineError;
use super::step::{parse_pipeline, PipelineStep};
use super::substitute::substitute;
use crate::capabilities::Arguments;
use crate::dispatch::{is_error_result, Dispatcher};

/// Runs pipelines through a [`Dispatcher`].
///
/// Steps execute strictly in order. A step only sees results from the
/// steps before it. Tool failures are stored as ordinary results; only an
/// unresolved placeholder stops the run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInterpreter<'r> {
    dispatcher: Dispatcher<'r>,
}

impl<'r> PipelineInterpreter<'r> {
    pub fn new(dispatcher: Dispatcher<'r>) -> Self {
        Self { dispatcher }
    }

    /// Execute `steps` and return the accumulated context.
    pub fn run(&self, steps: &[PipelineStep]) -> Result<PipelineContext, PipelineError> {
        let run_id = Uuid::new_v4();
        let mut context = PipelineContext::new();

        log::info!("Pipeline {}: starting with {} step(s)", run_id, steps.len());

        for (index, step) in steps.iter().enumerate() {
            let arguments = resolve_arguments(index, step, &context).map_err(|e| {
                log::error!("Pipeline {}: aborted at step {}: {}", run_id, index, e);
                e
            })?;

            log::debug!(
                "Pipeline {}: step {} -> {} (id: {})",
                run_id,
                index,
                step.capability,
                step.result_id().unwrap_or("-"),
            );

            let result = self.dispatcher.invoke(&step.capability, &arguments);

            if is_error_result(&result) {
                log::warn!("Pipeline {}: step {} reported an error", run_id, index);
            }

            if let Some(id) = step.result_id() {
                context.insert(id, result);
            }
        }

        log::info!(
            "Pipeline {}: finished with {} stored result(s)",
            run_id,
            context.len()
        );

        Ok(context)
    }

    /// Parse and execute a JSON pipeline.
    pub fn run_value(&self, pipeline: &Value) -> Result<PipelineContext, PipelineError> {
        let steps = parse_pipeline(pipeline)?;
        self.run(&steps)
    }
}

fn resolve_arguments(
    index: usize,
    step: &PipelineStep,
    context: &PipelineContext,
) -> Result<Arguments, PipelineError> {
    step.arguments
        .iter()
        .map(|(name, value)| {
            substitute(value, context)
                .map(|v| (name.clone(), v))
                .map_err(|e| PipelineError::UnresolvedPlaceholder {
                    step: index,
                    capability: step.capability.clone(),
                    id: e.id,
                })
        })
        .collect()
}

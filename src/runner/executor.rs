//! Sequential plan execution

use crate::args::Value;
use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::plan::ExecutionPlan;
use crate::runner::Context;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What to do after a task body fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure
    #[default]
    FailFast,
    /// Record failures and run the remaining steps
    KeepGoing,
}

/// Outcome of one executed step
#[derive(Debug)]
pub struct StepOutcome {
    pub task: String,
    /// 1-based position in the plan
    pub position: usize,
    pub duration: Duration,
    pub result: anyhow::Result<Option<Value>>,
}

/// Per-step outcomes, in plan order
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<StepOutcome>,
    total: usize,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    /// The first failure as an error, or the report itself
    pub fn into_result(mut self) -> ExecutionResult<RunReport> {
        let Some(index) = self.outcomes.iter().position(|o| o.result.is_err()) else {
            return Ok(self);
        };
        let outcome = self.outcomes.remove(index);
        let source = match outcome.result {
            Err(e) => e,
            Ok(_) => unreachable!("position() matched an error"),
        };
        Err(ExecutionError::Task {
            task: outcome.task,
            position: outcome.position,
            total: self.total,
            source,
        })
    }
}

/// Runs plan steps in order against one shared context
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    policy: FailurePolicy,
}

impl Executor {
    pub fn new(policy: FailurePolicy) -> Self {
        Executor { policy }
    }

    /// Execute every step; under fail-fast the first failure is returned as an error
    pub fn run(&self, plan: &ExecutionPlan, ctx: &mut Context) -> ExecutionResult<RunReport> {
        let total = plan.len();
        let mut report = RunReport {
            outcomes: Vec::with_capacity(total),
            total,
        };

        for (index, step) in plan.steps().iter().enumerate() {
            let position = index + 1;
            ctx.print_task_start(&step.name);
            info!(task = %step.name, position, total, "starting task");

            ctx.set_current_task(Some(step.name.clone()));
            let started = Instant::now();
            let result = step.task.call(ctx, &step.args);
            let duration = started.elapsed();
            ctx.set_current_task(None);

            match &result {
                Ok(_) => {
                    ctx.print_task_complete(&step.name);
                    debug!(task = %step.name, ?duration, "task finished");
                }
                Err(e) => {
                    ctx.print_error(&format!("Task '{}' failed: {:#}", step.name, e));
                    debug!(task = %step.name, ?duration, error = %e, "task failed");
                }
            }

            let failed = result.is_err();
            report.outcomes.push(StepOutcome {
                task: step.name.clone(),
                position,
                duration,
                result,
            });

            if failed && self.policy == FailurePolicy::FailFast {
                return report.into_result();
            }
        }

        let failed = report.failures().count();
        if failed > 0 {
            ctx.print_info(&format!("{} of {} tasks failed", failed, total));
        }
        Ok(report)
    }
}

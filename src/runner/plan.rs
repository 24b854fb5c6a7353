//! Dependency expansion
//!
//! Turns requested tasks into an ordered [`ExecutionPlan`]: pre dependencies
//! first, then the task, then post dependencies, depth-first and transitively.

use crate::args::{ArgumentBinder, Args};
use crate::error::{RegistryError, Result};
use crate::registry::{Call, ResolvedTask, TaskDefinition, TaskRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// A task requested on the command line, with its bound arguments
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Qualified display name
    pub name: String,
    /// Canonical path segments
    pub path: Vec<String>,
    pub task: Arc<TaskDefinition>,
    pub args: Args,
}

impl Invocation {
    fn scope(&self) -> &[String] {
        &self.path[..self.path.len().saturating_sub(1)]
    }
}

/// One step of an execution plan
#[derive(Debug, Clone)]
pub struct PlanStep {
    pub name: String,
    pub task: Arc<TaskDefinition>,
    pub args: Args,
}

/// Ordered steps to execute
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Display names in execution order
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Bookkeeping for one planning pass
#[derive(Default)]
struct Expansion {
    dedupe: bool,
    placed: HashSet<*const TaskDefinition>,
    stack: Vec<(*const TaskDefinition, String)>,
    steps: Vec<PlanStep>,
}

/// Expands task dependencies into execution plans
pub struct DependencyResolver<'a> {
    registry: &'a TaskRegistry,
    binder: ArgumentBinder,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(registry: &'a TaskRegistry) -> Self {
        DependencyResolver {
            registry,
            binder: ArgumentBinder::new(*registry.style()),
        }
    }

    /// Resolve `name` from the root and bind `raw` against its parameters
    pub fn invocation(&self, name: &str, raw: &[String]) -> Result<Invocation> {
        let resolved = self.registry.resolve(name)?;
        self.bind(resolved, raw)
    }

    /// Plan a single target
    pub fn plan(&self, target: &Invocation, dedupe: bool) -> Result<ExecutionPlan> {
        self.plan_all(std::slice::from_ref(target), dedupe)
    }

    /// Plan several targets into one sequence; dedupe spans all of them
    pub fn plan_all(&self, targets: &[Invocation], dedupe: bool) -> Result<ExecutionPlan> {
        let mut expansion = Expansion {
            dedupe,
            ..Expansion::default()
        };
        for target in targets {
            self.expand(target.clone(), &mut expansion)?;
        }

        debug!(steps = expansion.steps.len(), dedupe, "planned execution");
        Ok(ExecutionPlan {
            steps: expansion.steps,
        })
    }

    fn bind(&self, resolved: ResolvedTask, raw: &[String]) -> Result<Invocation> {
        let args = self.binder.bind(&resolved.task.params, raw)?;
        Ok(Invocation {
            name: resolved.display_name(self.registry.style()),
            path: resolved.path,
            task: resolved.task,
            args,
        })
    }

    fn dependency(&self, scope: &[String], call: &Call) -> Result<Invocation> {
        let resolved = self.registry.resolve_from(scope, &call.task)?;
        self.bind(resolved, &call.args)
    }

    fn expand(&self, invocation: Invocation, expansion: &mut Expansion) -> Result<()> {
        let id = Arc::as_ptr(&invocation.task);

        if let Some(start) = expansion.stack.iter().position(|(entry, _)| *entry == id) {
            let mut cycle: Vec<String> = expansion.stack[start..]
                .iter()
                .map(|(_, name)| name.clone())
                .collect();
            cycle.push(invocation.name);
            return Err(RegistryError::CyclicDependency(cycle).into());
        }

        if expansion.dedupe && expansion.placed.contains(&id) {
            debug!(task = %invocation.name, "skipping already planned task");
            return Ok(());
        }

        expansion.stack.push((id, invocation.name.clone()));

        for call in &invocation.task.pre {
            let dep = self.dependency(invocation.scope(), call)?;
            self.expand(dep, expansion)?;
        }

        let post = invocation.task.post.clone();
        let scope = invocation.scope().to_vec();

        expansion.placed.insert(id);
        expansion.steps.push(PlanStep {
            name: invocation.name,
            task: invocation.task,
            args: invocation.args,
        });

        for call in &post {
            let dep = self.dependency(&scope, call)?;
            self.expand(dep, expansion)?;
        }

        expansion.stack.pop();
        Ok(())
    }
}

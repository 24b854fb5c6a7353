//! Task definitions
//!
//! A [`TaskDefinition`] is an immutable value built with [`TaskBuilder`] and
//! handed to a [`Namespace`](crate::registry::Namespace) or
//! [`TaskRegistry`](crate::registry::TaskRegistry) at composition time.

use crate::args::{Args, ParamSpec, Value};
use crate::runner::Context;
use std::fmt;
use std::sync::Arc;

/// What a task body returns: an optional value, or any error
pub type TaskOutput = anyhow::Result<Option<Value>>;

/// The callable part of a task
pub trait TaskBody: Send + Sync {
    fn call(&self, ctx: &mut Context, args: &Args) -> TaskOutput;
}

impl<F> TaskBody for F
where
    F: Fn(&mut Context, &Args) -> TaskOutput + Send + Sync,
{
    fn call(&self, ctx: &mut Context, args: &Args) -> TaskOutput {
        self(ctx, args)
    }
}

/// A reference to another task, with optional arguments
///
/// Argument values are raw strings; they are parsed against the callee's
/// parameters when the plan is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Task name, possibly qualified (`dependencies.build`)
    pub task: String,
    /// Raw flag tokens passed to the callee
    pub args: Vec<String>,
}

impl Call {
    pub fn new(task: impl Into<String>) -> Self {
        Call {
            task: task.into(),
            args: Vec::new(),
        }
    }

    /// Pass `value` to the callee's parameter `name`
    pub fn arg(mut self, name: &str, value: impl ToString) -> Self {
        self.args.push(format!("--{}={}", name, value.to_string()));
        self
    }

    /// Set a boolean or counter parameter of the callee
    pub fn flag(mut self, name: &str) -> Self {
        self.args.push(format!("--{}", name));
        self
    }
}

impl From<&str> for Call {
    fn from(task: &str) -> Self {
        Call::new(task)
    }
}

impl From<String> for Call {
    fn from(task: String) -> Self {
        Call::new(task)
    }
}

/// A named, invokable unit of work
pub struct TaskDefinition {
    /// Declared name (before aliasing)
    pub name: String,

    /// Help text; the first line is shown in listings
    pub doc: Option<String>,

    /// Tasks that run before this one
    pub pre: Vec<Call>,

    /// Tasks that run after this one
    pub post: Vec<Call>,

    /// Declared parameters, in order
    pub params: Vec<ParamSpec>,

    /// Whether this is the default task of its namespace
    pub is_default: bool,

    body: Box<dyn TaskBody>,
}

impl TaskDefinition {
    /// Start building a task
    pub fn builder(name: impl Into<String>) -> TaskBuilder {
        TaskBuilder::new(name)
    }

    /// Run the body
    pub fn call(&self, ctx: &mut Context, args: &Args) -> TaskOutput {
        self.body.call(ctx, args)
    }

    /// First line of the doc string
    pub fn summary(&self) -> Option<&str> {
        self.doc
            .as_deref()
            .and_then(|doc| doc.lines().map(str::trim).find(|line| !line.is_empty()))
    }

    /// Look up a declared parameter
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        let key = crate::registry::naming::canonical(name);
        self.params.iter().find(|p| p.name == key)
    }
}

impl fmt::Debug for TaskDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDefinition")
            .field("name", &self.name)
            .field("pre", &self.pre)
            .field("post", &self.post)
            .field("params", &self.params)
            .field("is_default", &self.is_default)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TaskDefinition`]
pub struct TaskBuilder {
    name: String,
    doc: Option<String>,
    pre: Vec<Call>,
    post: Vec<Call>,
    params: Vec<ParamSpec>,
    is_default: bool,
    body: Option<Box<dyn TaskBody>>,
}

impl TaskBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        TaskBuilder {
            name: crate::registry::naming::canonical(&name.into()),
            doc: None,
            pre: Vec::new(),
            post: Vec::new(),
            params: Vec::new(),
            is_default: false,
            body: None,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn pre(mut self, call: impl Into<Call>) -> Self {
        self.pre.push(call.into());
        self
    }

    pub fn post(mut self, call: impl Into<Call>) -> Self {
        self.post.push(call.into());
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Mark as the default task of whichever namespace it is added to
    pub fn default_task(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Context, &Args) -> TaskOutput + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    /// Finish the definition; a task without a body only runs its dependencies
    pub fn build(self) -> Arc<TaskDefinition> {
        let body: Box<dyn TaskBody> = match self.body {
            Some(body) => body,
            None => Box::new(no_op),
        };

        Arc::new(TaskDefinition {
            name: self.name,
            doc: self.doc,
            pre: self.pre,
            post: self.post,
            params: self.params,
            is_default: self.is_default,
            body,
        })
    }
}

fn no_op(_: &mut Context, _: &Args) -> TaskOutput {
    Ok(None)
}

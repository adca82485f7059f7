// src/core/tool.rs
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::core::error::ToolCallError;
use crate::core::schema::ParameterSchema;

/// Future produced by a tool invocation.
pub type ToolFuture = BoxFuture<'static, Result<Value, ToolCallError>>;

/// Closure a descriptor dispatches validated arguments into.
pub type ExecuteFn = Arc<dyn Fn(Value) -> ToolFuture + Send + Sync>;

/// The uniform shape every invocable operation is normalized to: a
/// unique public name, human-readable description, parameter schema and
/// an execute closure already bound to its wallet context.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    schema: ParameterSchema,
    execute: ExecuteFn,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ParameterSchema,
        execute: ExecuteFn,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            execute,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Runs the bound operation. Arguments must already have passed the
    /// schema check; deserialization failures still surface as
    /// `ToolCallError::Rehydration`.
    pub fn call(&self, args: Value) -> ToolFuture {
        (self.execute)(args)
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

// src/core/registration.rs
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::{RegistryError, ToolCallError};
use crate::core::schema::{ParameterSchema, ToolParameters};
use crate::core::tool::{ExecuteFn, ToolDescriptor, ToolFuture};
use crate::utils::is_snake_case;

type WalletFn<W> = Arc<dyn Fn(Arc<W>, Value) -> ToolFuture + Send + Sync>;
type PlainFn = Arc<dyn Fn(Value) -> ToolFuture + Send + Sync>;

/// Handler stored by a registration. The variant records whether the
/// operation receives the bound wallet alongside its parameters, so no
/// positional inspection happens at dispatch time.
pub enum ToolHandler<W> {
    WithWallet(WalletFn<W>),
    Plain(PlainFn),
}

/// One declared operation: public name, description, raw schema
/// document and the handler it dispatches to. Built by the typed
/// constructors below; binding to a wallet happens when the owning
/// plugin's arena is sealed.
pub struct ToolRegistration<W> {
    name: String,
    description: String,
    schema: Value,
    handler: ToolHandler<W>,
}

impl<W: Send + Sync + 'static> ToolRegistration<W> {
    /// Declares an operation whose handler needs the bound wallet.
    pub fn with_wallet<P, F, Fut, T>(name: &str, description: &str, handler: F) -> Self
    where
        P: ToolParameters,
        F: Fn(Arc<W>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize,
    {
        let tool = name.to_string();
        let handler = Arc::new(handler);
        let call: WalletFn<W> = Arc::new(move |wallet: Arc<W>, args: Value| {
            let handler = Arc::clone(&handler);
            let tool = tool.clone();
            Box::pin(async move {
                let params = rehydrate::<P>(&tool, args)?;
                let output = (handler)(wallet, params)
                    .await
                    .map_err(|reason| ToolCallError::Execution {
                        tool: tool.clone(),
                        reason,
                    })?;
                serialize_output(&tool, output)
            })
        });

        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema: P::json_schema(),
            handler: ToolHandler::WithWallet(call),
        }
    }

    /// Declares an operation that runs on its parameters alone.
    pub fn plain<P, F, Fut, T>(name: &str, description: &str, handler: F) -> Self
    where
        P: ToolParameters,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize,
    {
        let tool = name.to_string();
        let handler = Arc::new(handler);
        let call: PlainFn = Arc::new(move |args: Value| {
            let handler = Arc::clone(&handler);
            let tool = tool.clone();
            Box::pin(async move {
                let params = rehydrate::<P>(&tool, args)?;
                let output = (handler)(params)
                    .await
                    .map_err(|reason| ToolCallError::Execution {
                        tool: tool.clone(),
                        reason,
                    })?;
                serialize_output(&tool, output)
            })
        });

        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema: P::json_schema(),
            handler: ToolHandler::Plain(call),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Compiles the schema and closes the handler over one wallet,
    /// producing a dispatch-ready descriptor.
    pub fn bind(&self, plugin: &str, wallet: &Arc<W>) -> Result<ToolDescriptor, RegistryError> {
        let schema =
            ParameterSchema::compile(self.schema.clone()).map_err(|message| {
                RegistryError::InvalidSchema {
                    plugin: plugin.to_string(),
                    tool: self.name.clone(),
                    message,
                }
            })?;

        let execute: ExecuteFn = match &self.handler {
            ToolHandler::WithWallet(call) => {
                let call = Arc::clone(call);
                let wallet = Arc::clone(wallet);
                Arc::new(move |args| (call)(Arc::clone(&wallet), args))
            }
            ToolHandler::Plain(call) => {
                let call = Arc::clone(call);
                Arc::new(move |args| (call)(args))
            }
        };

        Ok(ToolDescriptor::new(
            &self.name,
            &self.description,
            schema,
            execute,
        ))
    }
}

/// Name checks run when a plugin's arena is sealed, before any binding.
/// Within-plugin duplicates and malformed names are fatal.
pub fn validate_registrations<W>(
    plugin: &str,
    registrations: &[ToolRegistration<W>],
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for registration in registrations {
        if !is_snake_case(&registration.name) {
            return Err(RegistryError::InvalidToolName {
                plugin: plugin.to_string(),
                name: registration.name.clone(),
            });
        }
        if !seen.insert(registration.name.as_str()) {
            return Err(RegistryError::DuplicateToolName {
                tool: registration.name.clone(),
                first: plugin.to_string(),
                second: plugin.to_string(),
            });
        }
    }
    Ok(())
}

fn rehydrate<P: ToolParameters>(tool: &str, args: Value) -> Result<P, ToolCallError> {
    serde_json::from_value(args).map_err(|source| ToolCallError::Rehydration {
        tool: tool.to_string(),
        source,
    })
}

fn serialize_output<T: Serialize>(tool: &str, output: T) -> Result<Value, ToolCallError> {
    serde_json::to_value(output).map_err(|err| ToolCallError::Execution {
        tool: tool.to_string(),
        reason: err.into(),
    })
}

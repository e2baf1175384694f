use crate::error::ToolError;
use crate::schema::{self, JsonObject};
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use jsonschema::Validator;
use moviepilot_client::AuthSession;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

pub type ToolHandler =
    Arc<dyn Fn(Value, Arc<AuthSession>) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// A named, schema-typed tool. Immutable once built.
pub struct ToolDefinition {
    name: &'static str,
    description: &'static str,
    read_only: bool,
    input_schema: Arc<JsonObject>,
    output_schema: Arc<JsonObject>,
    input_validator: Validator,
    output_validator: Validator,
    handler: ToolHandler,
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    /// Declares a tool from a typed handler: schemas come from `A` and `O`.
    pub fn new<A, O, F, Fut>(
        name: &'static str,
        description: &'static str,
        handler: F,
    ) -> Result<Self>
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        O: Serialize + JsonSchema + Send + 'static,
        F: Fn(A, Arc<AuthSession>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    {
        let input_schema = schema::schema_object_for::<A>()?;
        let output_schema = schema::schema_object_for::<O>()?;
        let input_validator = schema::compile(&input_schema)
            .map_err(|e| anyhow!("input schema of {name}: {e}"))?;
        let output_validator = schema::compile(&output_schema)
            .map_err(|e| anyhow!("output schema of {name}: {e}"))?;

        let handler: ToolHandler = Arc::new(
            move |args: Value,
                  session: Arc<AuthSession>|
                  -> BoxFuture<'static, Result<Value, ToolError>> {
                let future = serde_json::from_value::<A>(args)
                    .map(|a| handler(a, session))
                    .map_err(|e| ToolError::Validation {
                        field: None,
                        message: e.to_string(),
                    });
                Box::pin(async move {
                    let output = future?.await?;
                    serde_json::to_value(output)
                        .map_err(|e| ToolError::Schema(format!("cannot serialize output: {e}")))
                })
            },
        );

        Ok(Self {
            name,
            description,
            read_only: true,
            input_schema: Arc::new(input_schema),
            output_schema: Arc::new(output_schema),
            input_validator,
            output_validator,
            handler,
        })
    }

    /// Marks the tool as changing server state (subscriptions, downloads).
    pub fn mutating(mut self) -> Self {
        self.read_only = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn description(&self) -> &'static str {
        self.description
    }
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
    pub fn input_schema(&self) -> &Arc<JsonObject> {
        &self.input_schema
    }
    pub fn output_schema(&self) -> &Arc<JsonObject> {
        &self.output_schema
    }

    pub fn validate_input(&self, arguments: &Value) -> Result<(), ToolError> {
        match schema::violations(&self.input_validator, arguments) {
            None => Ok(()),
            Some(messages) => Err(ToolError::Validation {
                field: schema::offending_field(&self.input_schema, arguments),
                message: messages.join("; "),
            }),
        }
    }

    pub fn validate_output(&self, output: &Value) -> Result<(), ToolError> {
        match schema::violations(&self.output_validator, output) {
            None => Ok(()),
            Some(messages) => Err(ToolError::Schema(format!(
                "output of {} does not match its schema: {}",
                self.name,
                messages.join("; ")
            ))),
        }
    }

    /// Runs the handler on already validated arguments.
    pub fn invoke(
        &self,
        arguments: Value,
        session: Arc<AuthSession>,
    ) -> BoxFuture<'static, Result<Value, ToolError>> {
        (self.handler)(arguments, session)
    }
}

/// Static tool name -> definition map, built once at startup.
#[derive(Debug)]
pub struct ToolCatalog {
    tools: BTreeMap<&'static str, ToolDefinition>,
}

impl ToolCatalog {
    pub fn new(definitions: Vec<ToolDefinition>) -> Result<Self> {
        let mut tools = BTreeMap::new();
        for def in definitions {
            let name = def.name();
            if tools.insert(name, def).is_some() {
                return Err(anyhow!("duplicate tool name: {name}"));
            }
        }
        Ok(Self { tools })
    }

    /// Every MoviePilot tool this server exposes.
    pub fn moviepilot() -> Result<Self> {
        Self::new(crate::tools::all()?)
    }

    pub fn resolve(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

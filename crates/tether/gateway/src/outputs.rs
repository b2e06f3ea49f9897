//! Deployment stack outputs
//!
//! Durable function identifiers are not declared; they are read back from
//! the outputs of the stack the host framework deployed.

use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tether_types::naming;

/// One stack output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    #[serde(rename = "OutputKey")]
    pub output_key: String,
    #[serde(rename = "OutputValue")]
    pub output_value: String,
}

impl StackOutput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            output_key: key.into(),
            output_value: value.into(),
        }
    }
}

/// Source of stack outputs
#[async_trait]
pub trait StackOutputSource: Send + Sync {
    /// Outputs of the named stack
    async fn describe_outputs(&self, stack_name: &str) -> Result<Vec<StackOutput>>;
}

/// In-memory stack outputs
pub struct InMemoryStackOutputs {
    stacks: DashMap<String, Vec<StackOutput>>,
}

impl InMemoryStackOutputs {
    pub fn new() -> Self {
        Self {
            stacks: DashMap::new(),
        }
    }

    /// Register a stack, possibly without outputs
    pub fn insert_stack(&self, stack_name: &str) {
        self.stacks.entry(stack_name.to_string()).or_default();
    }

    /// Add a raw output to a stack
    pub fn insert(&self, stack_name: &str, output: StackOutput) {
        self.stacks
            .entry(stack_name.to_string())
            .or_default()
            .push(output);
    }

    /// Record a function's durable id under its deterministic output key
    pub fn insert_function(&self, stack_name: &str, function_name: &str, durable_id: &str) {
        self.insert(
            stack_name,
            StackOutput::new(naming::output_key_for(function_name), durable_id),
        );
    }
}

impl Default for InMemoryStackOutputs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StackOutputSource for InMemoryStackOutputs {
    async fn describe_outputs(&self, stack_name: &str) -> Result<Vec<StackOutput>> {
        self.stacks
            .get(stack_name)
            .map(|outputs| outputs.clone())
            .ok_or_else(|| {
                GatewayError::from_provider(
                    "ValidationError",
                    format!("Stack with id {} does not exist", stack_name),
                )
            })
    }
}

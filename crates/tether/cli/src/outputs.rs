//! Stack outputs file
//!
//! Accepts either a bare list of outputs or a stack description with an
//! `Outputs` field, as printed by the provider's describe call.

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use std::path::Path;
use tether_gateway::{InMemoryStackOutputs, StackOutput};

#[derive(Deserialize)]
#[serde(untagged)]
enum OutputsFile {
    List(Vec<StackOutput>),
    Described {
        #[serde(rename = "Outputs")]
        outputs: Vec<StackOutput>,
    },
}

/// Load the outputs file as the outputs of `stack_name`
pub fn load(path: &Path, stack_name: &str) -> CliResult<InMemoryStackOutputs> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: OutputsFile = serde_json::from_str(&raw).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let outputs = match parsed {
        OutputsFile::List(outputs) | OutputsFile::Described { outputs } => outputs,
    };

    let source = InMemoryStackOutputs::new();
    // Register the stack even when it has no outputs
    source.insert_stack(stack_name);
    for output in outputs {
        source.insert(stack_name, output);
    }
    Ok(source)
}

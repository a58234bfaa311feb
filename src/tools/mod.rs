// ABOUTME: Declared tools and dispatch of model tool calls to local executors
// ABOUTME: Tool calls are decoded into a tagged enum; anything undeclared is an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Tools
//!
//! The set of functions offered to the model is closed: [`declarations`] lists
//! them for the completion request and [`DeclaredTool`] decodes a returned call
//! into one of them. A call naming any other function, or carrying arguments
//! that do not parse, fails with [`ToolError`].

pub mod errors;
pub mod weather;

pub use errors::ToolError;
pub use weather::{GetWeatherArgs, WeatherResult};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::llm::{FunctionDeclaration, ToolCall};

/// Every tool advertised to the model
#[must_use]
pub fn declarations() -> Vec<FunctionDeclaration> {
    vec![weather::declaration()]
}

/// A decoded tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredTool {
    /// `getWeather(city)`
    GetWeather(GetWeatherArgs),
}

impl DeclaredTool {
    /// Decode a model tool call
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] for undeclared names and
    /// [`ToolError::InvalidArguments`] when the arguments do not parse.
    pub fn from_call(call: &ToolCall) -> Result<Self, ToolError> {
        match call.function.name.as_str() {
            weather::TOOL_NAME => {
                parse_arguments(weather::TOOL_NAME, &call.function.arguments).map(Self::GetWeather)
            }
            other => Err(ToolError::not_found(other)),
        }
    }

    /// Name of the tool
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetWeather(_) => weather::TOOL_NAME,
        }
    }

    /// Run the tool, returning its result as the JSON text sent back to the model
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ExecutionFailed`] if the result cannot be encoded.
    pub fn execute(self) -> Result<String, ToolError> {
        let name = self.name();
        let output = match self {
            Self::GetWeather(args) => serde_json::to_string(&weather::get_weather(args)),
        };
        let output = output.map_err(|e| ToolError::execution_failed(name, e.to_string()))?;
        debug!(tool = name, output_len = output.len(), "Tool executed");
        Ok(output)
    }
}

fn parse_arguments<T: DeserializeOwned>(
    tool_name: &str,
    arguments: &str,
) -> Result<T, ToolError> {
    // Some models send an empty string instead of `{}` for no arguments
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };

    let value: Value = serde_json::from_str(arguments)
        .map_err(|e| ToolError::invalid_arguments(tool_name, format!("not JSON: {e}")))?;
    serde_json::from_value(value)
        .map_err(|e| ToolError::invalid_arguments(tool_name, e.to_string()))
}

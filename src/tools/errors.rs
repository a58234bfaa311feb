// ABOUTME: Tool dispatch and execution errors for model-requested function calls
// ABOUTME: Converts into AppError with the TOOL_EXECUTION_ERROR code
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Tool Error Types

use std::error::Error;
use std::fmt;

use crate::errors::AppError;

/// Errors raised while turning a model tool call into a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The model asked for a tool that was never declared
    NotFound {
        /// Name the model used
        tool_name: String,
    },
    /// The JSON-encoded arguments do not match the tool's parameters
    InvalidArguments {
        /// Name of the tool
        tool_name: String,
        /// Parse failure details
        reason: String,
    },
    /// Arguments parsed but the tool could not produce a result
    ExecutionFailed {
        /// Name of the tool that failed
        tool_name: String,
        /// Details about the failure
        details: String,
    },
}

impl ToolError {
    /// Create a "not found" error
    #[must_use]
    pub fn not_found(tool_name: impl Into<String>) -> Self {
        Self::NotFound {
            tool_name: tool_name.into(),
        }
    }

    /// Create an "invalid arguments" error
    #[must_use]
    pub fn invalid_arguments(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool_name: tool_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an "execution failed" error
    #[must_use]
    pub fn execution_failed(tool_name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool_name: tool_name.into(),
            details: details.into(),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { tool_name } => write!(f, "Tool '{tool_name}' is not declared"),
            Self::InvalidArguments { tool_name, reason } => {
                write!(f, "Invalid arguments for tool '{tool_name}': {reason}")
            }
            Self::ExecutionFailed { tool_name, details } => {
                write!(f, "Tool '{tool_name}' execution failed: {details}")
            }
        }
    }
}

impl Error for ToolError {}

impl From<ToolError> for AppError {
    fn from(error: ToolError) -> Self {
        Self::tool_execution(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_converts_to_tool_execution_error() {
        let app_error: AppError = ToolError::not_found("launchCannons").into();
        assert_eq!(app_error.code, ErrorCode::ToolExecutionError);
        assert!(app_error.message.contains("launchCannons"));
    }
}

// ABOUTME: The getWeather tool: declaration, argument type, and fixed-result executor
// ABOUTME: Always reports sunny weather at 22 degrees for the requested city
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::llm::FunctionDeclaration;

/// Name the model uses to call this tool
pub const TOOL_NAME: &str = "getWeather";

const DESCRIPTION: &str = "指定した都市の現在の天気情報を取得します。";
const CITY_DESCRIPTION: &str = "天気を知りたい都市の名前";
const FIXED_DESCRIPTION: &str = "晴れ";
const FIXED_TEMPERATURE: i32 = 22;

/// Arguments of a `getWeather` call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetWeatherArgs {
    /// City to report on
    pub city: String,
}

/// Result returned to the model; fields serialize in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherResult {
    /// Echo of the requested city
    pub city: String,
    /// Weather description
    pub description: String,
    /// Temperature in degrees Celsius
    pub temperature: i32,
}

/// Declaration advertised in the initial completion request
#[must_use]
pub fn declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: TOOL_NAME.to_owned(),
        description: DESCRIPTION.to_owned(),
        parameters: Some(json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": CITY_DESCRIPTION
                }
            },
            "required": ["city"]
        })),
    }
}

/// Produce the weather for `args.city`
#[must_use]
pub fn get_weather(args: GetWeatherArgs) -> WeatherResult {
    WeatherResult {
        city: args.city,
        description: FIXED_DESCRIPTION.to_owned(),
        temperature: FIXED_TEMPERATURE,
    }
}

use crate::registry::{InMemoryToolRegistry, ToolRegistryError};
use crate::standard::{
    Arithmetic, ArithmeticTool, CurrencyConvertTool, DivideTool, HttpConfig, PercentOfTool,
    UnitConversionTool, WeatherTool, WebSearchTool, WikipediaTool,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use switchboard_core::FailureReason;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolsetError {
    #[error("unknown toolset '{0}' (expected one of: math, units, currency, weather, websearch, wikipedia)")]
    Unknown(String),

    #[error(transparent)]
    Registry(#[from] ToolRegistryError),

    #[error("failed to initialise tool: {0}")]
    Tool(FailureReason),
}

impl From<FailureReason> for ToolsetError {
    fn from(reason: FailureReason) -> Self {
        ToolsetError::Tool(reason)
    }
}

/// A named group of standard tools served by one provider process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toolset {
    Math,
    Units,
    Currency,
    Weather,
    WebSearch,
    Wikipedia,
}

impl Toolset {
    pub fn name(&self) -> &'static str {
        match self {
            Toolset::Math => "math",
            Toolset::Units => "units",
            Toolset::Currency => "currency",
            Toolset::Weather => "weather",
            Toolset::WebSearch => "websearch",
            Toolset::Wikipedia => "wikipedia",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let toolset = match name.trim().to_ascii_lowercase().as_str() {
            "math" => Toolset::Math,
            "units" | "unitconverter" => Toolset::Units,
            "currency" | "currencyconverter" => Toolset::Currency,
            "weather" => Toolset::Weather,
            "websearch" | "web_search" => Toolset::WebSearch,
            "wikipedia" => Toolset::Wikipedia,
            _ => return None,
        };
        Some(toolset)
    }

    pub fn all() -> &'static [Toolset] {
        &[
            Toolset::Math,
            Toolset::Weather,
            Toolset::WebSearch,
            Toolset::Currency,
            Toolset::Wikipedia,
            Toolset::Units,
        ]
    }

    /// Build the registry this toolset's provider serves.
    pub fn registry(&self, settings: &ToolsetSettings) -> Result<InMemoryToolRegistry, ToolsetError> {
        let http = &settings.http;
        let registry = match self {
            Toolset::Math => InMemoryToolRegistry::new()
                .try_with_tool(Arc::new(ArithmeticTool::new(Arithmetic::Add)))?
                .try_with_tool(Arc::new(ArithmeticTool::new(Arithmetic::Subtract)))?
                .try_with_tool(Arc::new(ArithmeticTool::new(Arithmetic::Multiply)))?
                .try_with_tool(Arc::new(DivideTool))?
                .try_with_tool(Arc::new(PercentOfTool))?,
            Toolset::Units => {
                InMemoryToolRegistry::new().try_with_tool(Arc::new(UnitConversionTool))?
            }
            Toolset::Currency => InMemoryToolRegistry::new()
                .try_with_tool(Arc::new(CurrencyConvertTool::new(http)?))?,
            Toolset::Weather => {
                InMemoryToolRegistry::new().try_with_tool(Arc::new(WeatherTool::new(http)?))?
            }
            Toolset::WebSearch => InMemoryToolRegistry::new().try_with_tool(Arc::new(
                WebSearchTool::new(http)?.with_serpapi_key(settings.serpapi_key.clone()),
            ))?,
            Toolset::Wikipedia => {
                InMemoryToolRegistry::new().try_with_tool(Arc::new(WikipediaTool::new(http)?))?
            }
        };
        Ok(registry)
    }
}

impl fmt::Display for Toolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Toolset {
    type Err = ToolsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ToolsetError::Unknown(s.to_string()))
    }
}

/// Settings the network toolsets need at construction time.
#[derive(Debug, Clone, Default)]
pub struct ToolsetSettings {
    pub http: HttpConfig,
    pub serpapi_key: Option<String>,
}

impl ToolsetSettings {
    /// Read `SERPAPI_API_KEY` and `SWITCHBOARD_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut settings = Self {
            serpapi_key: std::env::var("SERPAPI_API_KEY").ok(),
            ..Self::default()
        };
        if let Some(secs) = std::env::var("SWITCHBOARD_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            settings.http = settings.http.with_timeout(secs);
        }
        settings
    }
}

//! # Standard Tool Library
//!
//! The operations served by the bundled providers.
//!
//! - **Math**: integer arithmetic, division, percentages
//! - **Units**: distance, mass and temperature conversion
//! - **Network**: currency rates, weather, web search and Wikipedia

pub mod math;
pub mod network;
pub mod units;

pub use math::{Arithmetic, ArithmeticTool, DivideTool, PercentOfTool};
pub use network::{
    CurrencyConvertTool, HttpConfig, WeatherTool, WebSearchTool, WikipediaTool,
    normalize_currency, normalize_query, normalize_topic,
};
pub use units::{Unit, UnitConversionTool};

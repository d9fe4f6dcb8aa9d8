//! # Unit Conversion
//!
//! Distance, mass and temperature conversions between a fixed set of
//! unit pairs.

use async_trait::async_trait;
use switchboard_core::{Arguments, ExecutionResult, FailureReason, ParamSpec, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Mile,
    Kilometer,
    Kilogram,
    Pound,
    Celsius,
    Fahrenheit,
}

impl Unit {
    /// Case-insensitive lookup, accepting common plurals and abbreviations
    pub fn parse(name: &str) -> Option<Self> {
        let unit = match name.trim().to_lowercase().as_str() {
            "mile" | "miles" | "mi" => Unit::Mile,
            "kilometer" | "kilometers" | "kilometre" | "kilometres" | "km" => Unit::Kilometer,
            "kg" | "kgs" | "kilogram" | "kilograms" => Unit::Kilogram,
            "lb" | "lbs" | "pound" | "pounds" => Unit::Pound,
            "celsius" | "c" | "°c" => Unit::Celsius,
            "fahrenheit" | "f" | "°f" => Unit::Fahrenheit,
            _ => return None,
        };
        Some(unit)
    }
}

/// Convert `amount` from one unit to another. `None` for unsupported pairs.
pub fn convert(amount: f64, from: Unit, to: Unit) -> Option<f64> {
    let converted = match (from, to) {
        (Unit::Mile, Unit::Kilometer) => amount * 1.60934,
        (Unit::Kilometer, Unit::Mile) => amount * 0.621371,
        (Unit::Kilogram, Unit::Pound) => amount * 2.20462,
        (Unit::Pound, Unit::Kilogram) => amount * 0.453592,
        (Unit::Celsius, Unit::Fahrenheit) => amount * 9.0 / 5.0 + 32.0,
        (Unit::Fahrenheit, Unit::Celsius) => (amount - 32.0) * 5.0 / 9.0,
        _ => return None,
    };
    Some(converted)
}

// Trims binary floating point noise (16.093400000000003) from results.
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// `unit_conversion(amount, from_unit, to_unit)`
pub struct UnitConversionTool;

#[async_trait]
impl Tool for UnitConversionTool {
    fn name(&self) -> &str {
        "unit_conversion"
    }

    fn description(&self) -> &str {
        "Convert between units (mile/kilometer, kg/lb, celsius/fahrenheit)."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("amount"),
            ParamSpec::string("from_unit"),
            ParamSpec::string("to_unit"),
        ]
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        let run = || -> Result<String, FailureReason> {
            let amount = arguments.float("amount")?;
            let from_unit = arguments.string("from_unit")?;
            let to_unit = arguments.string("to_unit")?;

            let unsupported = || {
                FailureReason::unsupported(format!(
                    "Conversion from {from_unit} to {to_unit} not supported."
                ))
            };
            let from = Unit::parse(from_unit).ok_or_else(unsupported)?;
            let to = Unit::parse(to_unit).ok_or_else(unsupported)?;
            let result = convert(amount, from, to).ok_or_else(unsupported)?;

            Ok(format!(
                "{amount} {from_unit} = {} {to_unit}",
                round6(result)
            ))
        };
        run().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(amount: f64, from: &str, to: &str) -> Arguments {
        Arguments::new()
            .with("amount", amount)
            .with("from_unit", from)
            .with("to_unit", to)
    }

    #[tokio::test]
    async fn test_miles_to_kilometers() {
        let result = UnitConversionTool
            .call(args(10.0, "mile", "kilometer"))
            .await;
        let text = result.render();
        assert_eq!(text, "10 mile = 16.0934 kilometer");
    }

    #[rstest]
    #[case(100.0, "celsius", "fahrenheit", "100 celsius = 212 fahrenheit")]
    #[case(212.0, "F", "C", "212 F = 100 C")]
    #[case(2.0, "kg", "lb", "2 kg = 4.40924 lb")]
    #[case(1.5, "Miles", "KM", "1.5 Miles = 2.41401 KM")]
    #[tokio::test]
    async fn test_supported_pairs(
        #[case] amount: f64,
        #[case] from: &str,
        #[case] to: &str,
        #[case] expected: &str,
    ) {
        let result = UnitConversionTool.call(args(amount, from, to)).await;
        assert_eq!(result.render(), expected);
    }

    #[tokio::test]
    async fn test_unsupported_pair_fails() {
        let result = UnitConversionTool.call(args(1.0, "mile", "kg")).await;
        assert!(result.is_failure());
        assert_eq!(result.render(), "Conversion from mile to kg not supported.");

        let result = UnitConversionTool.call(args(1.0, "parsec", "mile")).await;
        assert!(matches!(
            result.failure_reason(),
            Some(FailureReason::Unsupported { .. })
        ));
    }

    #[test]
    fn test_same_unit_is_not_a_listed_pair() {
        assert_eq!(convert(1.0, Unit::Mile, Unit::Mile), None);
    }
}

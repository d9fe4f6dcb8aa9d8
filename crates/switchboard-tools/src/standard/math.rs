//! # Arithmetic Tools
//!
//! Integer arithmetic with overflow detection, plus division and
//! percentages in floating point.

use async_trait::async_trait;
use switchboard_core::{Arguments, ExecutionResult, FailureReason, ParamSpec, Tool};

/// Binary integer operation served by [`ArithmeticTool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    Add,
    Subtract,
    Multiply,
}

impl Arithmetic {
    fn name(&self) -> &'static str {
        match self {
            Arithmetic::Add => "add",
            Arithmetic::Subtract => "subtract",
            Arithmetic::Multiply => "multiply",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Arithmetic::Add => "Add two integers",
            Arithmetic::Subtract => "Subtract b from a",
            Arithmetic::Multiply => "Multiply two integers",
        }
    }

    fn apply(&self, a: i64, b: i64) -> Option<i64> {
        match self {
            Arithmetic::Add => a.checked_add(b),
            Arithmetic::Subtract => a.checked_sub(b),
            Arithmetic::Multiply => a.checked_mul(b),
        }
    }
}

/// `add`, `subtract` or `multiply` over two integer parameters `a` and `b`.
pub struct ArithmeticTool {
    op: Arithmetic,
}

impl ArithmeticTool {
    pub fn new(op: Arithmetic) -> Self {
        Self { op }
    }
}

#[async_trait]
impl Tool for ArithmeticTool {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn description(&self) -> &str {
        self.op.description()
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::integer("a"), ParamSpec::integer("b")]
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        let run = || -> Result<i64, FailureReason> {
            let a = arguments.integer("a")?;
            let b = arguments.integer("b")?;
            self.op.apply(a, b).ok_or_else(|| {
                FailureReason::invalid_input(format!("{} of {a} and {b} overflows", self.op.name()))
            })
        };
        run().into()
    }
}

/// `divide(a, b)`: true division of two integers.
pub struct DivideTool;

#[async_trait]
impl Tool for DivideTool {
    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divide a by b"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::integer("a"), ParamSpec::integer("b")]
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        let run = || -> Result<f64, FailureReason> {
            let a = arguments.integer("a")?;
            let b = arguments.integer("b")?;
            if b == 0 {
                return Err(FailureReason::invalid_input("division by zero"));
            }
            Ok(a as f64 / b as f64)
        };
        run().into()
    }
}

/// `percent_of(percent, value)`: `percent`% of `value`.
pub struct PercentOfTool;

#[async_trait]
impl Tool for PercentOfTool {
    fn name(&self) -> &str {
        "percent_of"
    }

    fn description(&self) -> &str {
        "Calculate X% of Y, e.g. percent_of(10, 50) returns 5. Chain calls for nested \
         percentages: 10% of 50% of 100 is percent_of(10, percent_of(50, 100))."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("percent").describe("Percentage, e.g. 15 for 15%"),
            ParamSpec::float("value"),
        ]
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        let run = || -> Result<f64, FailureReason> {
            let percent = arguments.float("percent")?;
            let value = arguments.float("value")?;
            Ok(percent / 100.0 * value)
        };
        run().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn ab(a: impl Into<serde_json::Value>, b: impl Into<serde_json::Value>) -> Arguments {
        Arguments::new().with("a", a).with("b", b)
    }

    #[rstest]
    #[case(Arithmetic::Add, 3, 5, 8)]
    #[case(Arithmetic::Subtract, 3, 5, -2)]
    #[case(Arithmetic::Multiply, 8, 12, 96)]
    #[tokio::test]
    async fn test_integer_arithmetic(
        #[case] op: Arithmetic,
        #[case] a: i64,
        #[case] b: i64,
        #[case] expected: i64,
    ) {
        let result = ArithmeticTool::new(op).call(ab(a, b)).await;
        assert_eq!(result.success_output(), Some(&json!(expected)));
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let add = ArithmeticTool::new(Arithmetic::Add);
        let first = add.call(ab(3, 5)).await;
        let second = add.call(ab(3, 5)).await;
        assert_eq!(first, second);
        assert_eq!(first.render(), "8");
    }

    #[tokio::test]
    async fn test_overflow_is_a_failure() {
        let result = ArithmeticTool::new(Arithmetic::Multiply)
            .call(ab(i64::MAX, 2))
            .await;
        assert!(matches!(
            result.failure_reason(),
            Some(FailureReason::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let result = ArithmeticTool::new(Arithmetic::Add)
            .call(Arguments::new().with("a", 1))
            .await;
        assert_eq!(
            result.render(),
            "Invalid input: missing parameter 'b'"
        );
    }

    #[tokio::test]
    async fn test_divide() {
        assert_eq!(DivideTool.call(ab(10, 4)).await.render(), "2.5");
        let by_zero = DivideTool.call(ab(1, 0)).await;
        assert_eq!(by_zero.render(), "Invalid input: division by zero");
    }

    #[tokio::test]
    async fn test_percent_of() {
        let args = Arguments::new().with("percent", 10).with("value", 50);
        assert_eq!(
            PercentOfTool.call(args).await.success_output(),
            Some(&json!(5.0))
        );
    }
}

use super::{HttpConfig, fetch_json, trim_base};
use async_trait::async_trait;
use reqwest::Client;
use switchboard_core::{Arguments, ExecutionResult, FailureReason, ParamSpec, Tool};

pub const DEFAULT_EXCHANGE_API: &str = "https://api.exchangerate.host";

const CURRENCY_ALIASES: &[(&str, &str)] = &[
    ("dollar", "USD"),
    ("dollars", "USD"),
    ("usd", "USD"),
    ("euro", "EUR"),
    ("euros", "EUR"),
    ("eur", "EUR"),
    ("pound", "GBP"),
    ("pounds", "GBP"),
    ("gbp", "GBP"),
    ("yen", "JPY"),
    ("jpy", "JPY"),
    ("rupee", "INR"),
    ("rupees", "INR"),
    ("inr", "INR"),
    ("cad", "CAD"),
    ("aud", "AUD"),
    ("cny", "CNY"),
    ("yuan", "CNY"),
    ("franc", "CHF"),
    ("francs", "CHF"),
    ("chf", "CHF"),
];

/// Map a currency name or code to its ISO code.
///
/// Non-letters are stripped first; unknown names are upper-cased as-is.
///
/// ```rust
/// use switchboard_tools::standard::normalize_currency;
///
/// assert_eq!(normalize_currency(" Euro "), "EUR");
/// assert_eq!(normalize_currency("US$"), "US");
/// assert_eq!(normalize_currency("sek"), "SEK");
/// ```
pub fn normalize_currency(name: &str) -> String {
    let letters: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    CURRENCY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == letters)
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| letters.to_uppercase())
}

/// `convert_currency(amount, from_currency, to_currency)` via exchangerate.host
pub struct CurrencyConvertTool {
    client: Client,
    base_url: String,
}

impl CurrencyConvertTool {
    pub fn new(config: &HttpConfig) -> Result<Self, FailureReason> {
        Ok(Self {
            client: config.client()?,
            base_url: DEFAULT_EXCHANGE_API.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn convert(&self, arguments: &Arguments) -> Result<String, FailureReason> {
        let amount = arguments.float("amount")?;
        let from = normalize_currency(arguments.string("from_currency")?);
        let to = normalize_currency(arguments.string("to_currency")?);
        if from.is_empty() || to.is_empty() {
            return Err(FailureReason::invalid_input("currency names must contain letters"));
        }

        let url = format!("{}/convert", trim_base(&self.base_url));
        let amount_param = amount.to_string();
        let request = self.client.get(&url).query(&[
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("amount", amount_param.as_str()),
        ]);
        let data = fetch_json(request).await?;

        match data.get("result").filter(|r| !r.is_null()) {
            Some(result) => Ok(format!("{amount} {from} = {result} {to}")),
            None => Err(FailureReason::upstream(format!(
                "Could not fetch conversion. API response: {data}"
            ))),
        }
    }
}

#[async_trait]
impl Tool for CurrencyConvertTool {
    fn name(&self) -> &str {
        "convert_currency"
    }

    fn description(&self) -> &str {
        "Convert an amount from one currency to another. Accepts currency names or codes."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("amount"),
            ParamSpec::string("from_currency").describe("Currency name or ISO code, e.g. 'dollar' or 'USD'"),
            ParamSpec::string("to_currency"),
        ]
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        self.convert(&arguments).await.into()
    }
}

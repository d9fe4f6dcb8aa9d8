use super::{HttpConfig, fetch_json, trim_base};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use switchboard_core::{Arguments, ExecutionResult, FailureReason, ParamSpec, Tool};

pub const DEFAULT_GEOCODER: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_FORECAST_API: &str = "https://api.open-meteo.com";

/// `get_weather(location)`: geocode with Nominatim, then read the current
/// conditions from Open-Meteo.
pub struct WeatherTool {
    client: Client,
    geocoder_url: String,
    forecast_url: String,
}

impl WeatherTool {
    pub fn new(config: &HttpConfig) -> Result<Self, FailureReason> {
        Ok(Self {
            client: config.client()?,
            geocoder_url: DEFAULT_GEOCODER.to_string(),
            forecast_url: DEFAULT_FORECAST_API.to_string(),
        })
    }

    pub fn with_endpoints(
        mut self,
        geocoder_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Self {
        self.geocoder_url = geocoder_url.into();
        self.forecast_url = forecast_url.into();
        self
    }

    async fn locate(&self, location: &str) -> Result<(String, String), FailureReason> {
        let url = format!("{}/search", trim_base(&self.geocoder_url));
        let request = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", location)]);
        let places = fetch_json(request).await?;

        let place = places
            .as_array()
            .and_then(|p| p.first())
            .ok_or_else(|| FailureReason::not_found(format!("Could not find location: {location}")))?;
        // Nominatim reports coordinates as strings
        let coordinate = |key: &str| match place.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        match (coordinate("lat"), coordinate("lon")) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(FailureReason::upstream(format!(
                "geocoder returned no coordinates for {location}"
            ))),
        }
    }

    async fn current_weather(&self, location: &str) -> Result<String, FailureReason> {
        let (lat, lon) = self.locate(location).await?;
        tracing::debug!(%location, %lat, %lon, "geocoded location");

        let url = format!("{}/v1/forecast", trim_base(&self.forecast_url));
        let request = self.client.get(&url).query(&[
            ("latitude", lat.as_str()),
            ("longitude", lon.as_str()),
            ("current_weather", "true"),
        ]);
        let data = fetch_json(request).await?;

        let current = data
            .get("current_weather")
            .ok_or_else(|| FailureReason::upstream(format!("Could not fetch weather for {location}")))?;
        let (Some(temperature), Some(windspeed)) =
            (current.get("temperature"), current.get("windspeed"))
        else {
            return Err(FailureReason::upstream(format!(
                "Could not fetch weather for {location}"
            )));
        };

        Ok(format!(
            "Current temperature in {location} is {temperature}°C with windspeed {windspeed} km/h."
        ))
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get real-time weather for a location."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string("location").describe("City or place name, e.g. 'Paris'")]
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        match arguments.string("location") {
            Ok(location) => self.current_weather(location).await.into(),
            Err(reason) => ExecutionResult::failed(reason),
        }
    }
}

//! Client of the household grid and EV battery simulator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    core::{
        snapshot::BatterySnapshot,
        telemetry::{Reading, SimulatedTime, Telemetry, TelemetryError},
    },
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    pub fn try_new(base_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, base_url })
    }

    #[instrument(skip_all, name = "Fetching the simulator state…")]
    pub async fn get_info(&self) -> Result<Info> {
        let info: Info = self.get("info").await?;
        ensure!(
            info.max_capacity.0 > 0.0,
            "the battery capacity must be positive, got {}",
            info.max_capacity,
        );
        debug!(?info, "fetched");
        Ok(info)
    }

    #[instrument(skip_all, name = "Fetching the household load…")]
    pub async fn get_base_load(&self) -> Result<Vec<f64>> {
        self.get("baseload").await
    }

    #[instrument(skip_all, name = "Fetching the energy prices…")]
    pub async fn get_prices(&self) -> Result<Vec<f64>> {
        self.get("priceperhour").await
    }

    #[instrument(skip_all, name = "Switching the charger…", fields(is_on = is_on))]
    pub async fn set_charging(&self, is_on: bool) -> Result<String> {
        let request = ChargeRequest { charging: if is_on { Switch::On } else { Switch::Off } };
        self.post("charge", &request).await
    }

    /// Reset the simulated EV battery to 20% and the simulated clock to midnight.
    #[instrument(skip_all, name = "Discharging the EV battery…")]
    pub async fn discharge(&self) -> Result<String> {
        self.post("discharge-ev-battery", &DischargeRequest { discharging: Switch::On }).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.client
            .get(self.base_url.join(path)?)
            .send()
            .await
            .with_context(|| format!("failed to call `/{path}`"))?
            .error_for_status()
            .context("request failed")?
            .json()
            .await
            .context("failed to deserialize the response")
    }

    /// The simulator reports command errors in the body, with a successful status.
    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String> {
        let text = self
            .client
            .post(self.base_url.join(path)?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to call `/{path}`"))?
            .error_for_status()
            .context("request failed")?
            .text()
            .await
            .context("failed to read the response")?;
        if let Ok(CommandResponse { error: Some(error) }) = serde_json::from_str(&text) {
            bail!("the simulator refused: {error}");
        }
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl Telemetry for Api {
    async fn get_current_state(&self) -> Result<Reading, TelemetryError> {
        let info = self.get_info().await.map_err(telemetry_unavailable)?;
        Ok(info.reading())
    }

    async fn get_hourly_load_profile(&self) -> Result<Vec<f64>, TelemetryError> {
        self.get_base_load().await.map_err(telemetry_unavailable)
    }

    async fn get_hourly_price_profile(&self) -> Result<Vec<f64>, TelemetryError> {
        self.get_prices().await.map_err(telemetry_unavailable)
    }

    async fn start_charging(&self) -> Result<String, TelemetryError> {
        self.set_charging(true).await.map_err(control_unavailable)
    }

    async fn stop_charging(&self) -> Result<String, TelemetryError> {
        self.set_charging(false).await.map_err(control_unavailable)
    }
}

fn telemetry_unavailable(error: Error) -> TelemetryError {
    TelemetryError::TelemetryUnavailable(error.into())
}

fn control_unavailable(error: Error) -> TelemetryError {
    TelemetryError::ControlUnavailable(error.into())
}

#[must_use]
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct Info {
    /// Simulated hour, may overflow the day.
    #[serde(rename = "sim_time_hour")]
    pub hour: f64,

    #[serde(rename = "sim_time_min")]
    pub minute: f64,

    /// Current household load without the charger.
    #[serde(rename = "household_load_kwh")]
    pub household_load: Kilowatts,

    #[serde(rename = "battery_energy_kwh", alias = "ev_battery_energy_kwh")]
    pub energy: KilowattHours,

    #[serde(rename = "ev_batt_max_capacity_kwh")]
    pub max_capacity: KilowattHours,

    #[serde(rename = "ev_battery_charge_start_stopp")]
    pub is_charging: bool,
}

impl Info {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn time(&self) -> SimulatedTime {
        SimulatedTime { hour: self.hour.floor().rem_euclid(24.0) as u32, minute: self.minute }
    }

    pub fn reading(&self) -> Reading {
        Reading {
            time: self.time(),
            battery: BatterySnapshot::new(self.energy, self.max_capacity, self.is_charging),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Switch {
    On,
    Off,
}

#[derive(Serialize)]
struct ChargeRequest {
    charging: Switch,
}

#[derive(Serialize)]
struct DischargeRequest {
    discharging: Switch,
}

#[derive(Deserialize)]
struct CommandResponse {
    error: Option<String>,
}

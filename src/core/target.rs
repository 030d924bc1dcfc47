use clap::Parser;

use crate::{
    core::snapshot::BatterySnapshot,
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

/// Charging goal and the electrical limits, fixed for the whole session.
#[must_use]
#[derive(Copy, Clone, Debug, Parser)]
pub struct ChargeTarget {
    /// State of charge to stop at, in percent.
    #[clap(long = "target-percent", default_value = "80", env = "TARGET_PERCENT")]
    pub target_percent: f64,

    /// Ceiling for the household load plus the charger, in kilowatts.
    #[clap(long = "max-total-load-kw", default_value = "11.0", env = "MAX_TOTAL_LOAD_KW")]
    pub max_total_load: Kilowatts,

    /// Charger power, in kilowatts.
    #[clap(long = "charging-power-kw", default_value = "7.4", env = "CHARGING_POWER_KW")]
    pub charging_power: Kilowatts,
}

impl Default for ChargeTarget {
    fn default() -> Self {
        Self {
            target_percent: 80.0,
            max_total_load: Kilowatts::from(11.0),
            charging_power: Kilowatts::from(7.4),
        }
    }
}

impl ChargeTarget {
    pub fn validate(&self) -> Result {
        ensure!(
            self.target_percent > 0.0 && self.target_percent <= 100.0,
            "target percentage must be within (0, 100], got {}",
            self.target_percent,
        );
        ensure!(self.charging_power.0 > 0.0, "charging power must be positive");
        ensure!(self.max_total_load.0 > 0.0, "total load ceiling must be positive");
        Ok(())
    }

    pub fn is_reached(&self, battery: &BatterySnapshot) -> bool {
        battery.percent >= self.target_percent
    }

    /// Energy still missing to reach the target, negative when it is exceeded.
    pub fn energy_gap(&self, battery: &BatterySnapshot) -> KilowattHours {
        battery.max_capacity * (self.target_percent / 100.0) - battery.energy
    }

    /// Whole hours of charging needed to close the gap, at least one.
    #[must_use]
    pub fn hours_needed(&self, battery: &BatterySnapshot) -> usize {
        let hours = (self.energy_gap(battery).0 / self.charging_power.0).max(1.0).ceil();

        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hours = hours as usize;

        hours
    }
}

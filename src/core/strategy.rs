use std::fmt::{Display, Formatter};

use bon::Builder;
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    core::{
        profile::HourlyProfile,
        safety::{SafeHour, safe_hours},
        snapshot::BatterySnapshot,
        target::ChargeTarget,
    },
    prelude::*,
    quantity::{power::Kilowatts, rate::KilowattHourRate},
};

/// How the charging hours get picked among the safe ones.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Strategy {
    /// Every safe hour is eligible, rates are ignored.
    #[value(name = "consumption")]
    ConsumptionBased,

    /// Just enough of the cheapest safe hours to reach the target.
    #[value(name = "price")]
    PriceBased,
}

impl Strategy {
    pub const fn needs_rates(self) -> bool {
        matches!(self, Self::PriceBased)
    }

    #[instrument(skip_all, fields(strategy = ?self))]
    pub fn select_hours(self, context: &SelectionContext<'_>) -> OptimalHourSet {
        let safe_hours = context.safe_hours();
        let hours: Vec<u32> = match self {
            Self::ConsumptionBased => safe_hours.iter().map(|safe_hour| safe_hour.hour).collect(),
            Self::PriceBased => {
                let hours_needed = context.target.hours_needed(context.battery);
                info!(hours_needed, n_safe_hours = safe_hours.len(), "ranking by cost…");
                safe_hours
                    .iter()
                    .sorted_by_key(|safe_hour| (OrderedFloat(safe_hour.cost().0), safe_hour.hour))
                    .take(hours_needed)
                    .map(|safe_hour| safe_hour.hour)
                    .collect()
            }
        };
        let hours = OptimalHourSet(hours);
        info!(%hours, n_hours = hours.len(), "selected");
        hours
    }
}

/// Inputs of the hour selection, all fixed at the session start.
#[derive(Builder)]
pub struct SelectionContext<'a> {
    load: &'a HourlyProfile<Kilowatts>,
    rates: Option<&'a HourlyProfile<KilowattHourRate>>,
    target: &'a ChargeTarget,
    battery: &'a BatterySnapshot,
}

impl SelectionContext<'_> {
    /// Safe hours annotated with the rates, when known.
    pub fn safe_hours(&self) -> Vec<SafeHour> {
        let safe_hours =
            safe_hours(self.load, self.target.charging_power, self.target.max_total_load);
        match self.rates {
            Some(rates) => safe_hours
                .into_iter()
                .map(|safe_hour| safe_hour.with_rate(rates[safe_hour.hour]))
                .collect(),
            None => safe_hours,
        }
    }
}

/// Hours of day selected for charging, in the order of preference.
#[must_use]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OptimalHourSet(Vec<u32>);

impl OptimalHourSet {
    pub fn contains(&self, hour: u32) -> bool {
        self.0.contains(&hour)
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Next selected hour strictly after the specified one, wrapping around midnight.
    pub fn next_after(&self, hour: u32) -> Option<u32> {
        self.iter().filter(|selected| *selected > hour).min().or_else(|| self.iter().min())
    }
}

impl Display for OptimalHourSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::{core::profile::InvalidProfile, quantity::energy::KilowattHours};

    fn profile<V: From<f64>>(
        head: &[f64],
        fill: f64,
    ) -> Result<HourlyProfile<V>, InvalidProfile> {
        let mut values = head.to_vec();
        values.resize(24, fill);
        HourlyProfile::try_from(values)
    }

    fn battery(energy: f64) -> BatterySnapshot {
        BatterySnapshot::new(KilowattHours::from(energy), KilowattHours::from(46.3), false)
    }

    #[test]
    fn consumption_based_returns_every_safe_hour() -> Result<(), InvalidProfile> {
        let load = profile(&[2.0, 5.0, 3.0, 4.0], 6.0)?;
        let rates = profile(&[0.9, 0.1, 0.5, 0.2], 0.1)?;
        let target = ChargeTarget::default();
        let battery = battery(9.26);
        let context = SelectionContext::builder()
            .load(&load)
            .rates(&rates)
            .target(&target)
            .battery(&battery)
            .build();
        let hours = Strategy::ConsumptionBased.select_hours(&context);
        assert_eq!(hours.iter().collect_vec(), [0, 2]);
        Ok(())
    }

    /// Three equally loaded safe hours, one hour needed: the cheapest wins.
    #[test]
    fn price_based_picks_the_cheapest() -> Result<(), InvalidProfile> {
        let load = profile(&[2.0, 2.0, 2.0], 6.0)?;
        let rates = profile(&[0.50, 0.10, 0.80], 0.0)?;
        let target = ChargeTarget::default();
        let battery = battery(34.0);
        assert_eq!(target.hours_needed(&battery), 1);
        let context = SelectionContext::builder()
            .load(&load)
            .rates(&rates)
            .target(&target)
            .battery(&battery)
            .build();
        let hours = Strategy::PriceBased.select_hours(&context);
        assert_eq!(hours.iter().collect_vec(), [1]);
        Ok(())
    }

    #[test]
    fn price_based_ranks_by_cost_then_hour() -> Result<(), InvalidProfile> {
        // Hour 3 is cheaper per kWh than hour 4 but its higher load makes it more expensive:
        let load = profile(&[2.0, 2.0, 2.0, 3.0, 1.0, 2.0], 6.0)?;
        let rates = profile(&[0.5, 0.3, 0.3, 0.29, 0.3, 0.9], 0.0)?;
        let target = ChargeTarget::default();
        let battery = battery(9.26);
        let context = SelectionContext::builder()
            .load(&load)
            .rates(&rates)
            .target(&target)
            .battery(&battery)
            .build();
        let hours = Strategy::PriceBased.select_hours(&context);
        assert_eq!(hours.iter().collect_vec(), [4, 1, 2, 3]);

        // Idempotence:
        assert_eq!(Strategy::PriceBased.select_hours(&context), hours);
        Ok(())
    }

    #[test]
    fn price_based_is_limited_by_the_safe_hours() -> Result<(), InvalidProfile> {
        let load = profile(&[2.0, 2.0], 6.0)?;
        let rates = profile(&[], 0.1)?;
        let target = ChargeTarget::default();
        let battery = battery(0.0);
        let context = SelectionContext::builder()
            .load(&load)
            .rates(&rates)
            .target(&target)
            .battery(&battery)
            .build();
        assert_eq!(Strategy::PriceBased.select_hours(&context).len(), 2);
        Ok(())
    }

    #[test]
    fn no_safe_hours() -> Result<(), InvalidProfile> {
        let load = profile(&[], 5.0)?;
        let target = ChargeTarget::default();
        let battery = battery(9.26);
        let context =
            SelectionContext::builder().load(&load).target(&target).battery(&battery).build();
        assert!(Strategy::ConsumptionBased.select_hours(&context).is_empty());
        assert!(Strategy::PriceBased.select_hours(&context).is_empty());
        Ok(())
    }

    #[test]
    fn next_after_wraps_around() {
        let hours = OptimalHourSet(vec![13, 2, 22]);
        assert_eq!(hours.next_after(1), Some(2));
        assert_eq!(hours.next_after(2), Some(13));
        assert_eq!(hours.next_after(22), Some(2));
        assert_eq!(OptimalHourSet::default().next_after(5), None);
    }

    #[test]
    fn display() {
        assert_eq!(OptimalHourSet(vec![4, 1, 2]).to_string(), "[4, 1, 2]");
    }
}

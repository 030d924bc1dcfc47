use chrono::TimeDelta;

use crate::{
    core::profile::HourlyProfile,
    quantity::{cost::Cost, power::Kilowatts, rate::KilowattHourRate},
};

/// Hour where the household load together with the charger stays within the ceiling.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SafeHour {
    pub hour: u32,

    /// Household load plus the charging power.
    pub total_load: Kilowatts,

    /// Energy rate, zero when the rates are not known.
    pub rate: KilowattHourRate,
}

impl SafeHour {
    pub const fn with_rate(mut self, rate: KilowattHourRate) -> Self {
        self.rate = rate;
        self
    }

    /// Cost of running the combined load for the whole hour.
    pub fn cost(&self) -> Cost {
        self.total_load * TimeDelta::hours(1) * self.rate
    }
}

/// Filter the hours where charging keeps the total load at or below the ceiling.
///
/// The result is ordered by hour.
pub fn safe_hours(
    load: &HourlyProfile<Kilowatts>,
    charging_power: Kilowatts,
    max_total_load: Kilowatts,
) -> Vec<SafeHour> {
    load.iter()
        .map(|(hour, household_load)| SafeHour {
            hour,
            total_load: household_load + charging_power,
            rate: KilowattHourRate::ZERO,
        })
        .filter(|safe_hour| safe_hour.total_load <= max_total_load)
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use itertools::Itertools;

    use super::*;
    use crate::core::profile::InvalidProfile;

    fn profile(values: &[f64]) -> Result<HourlyProfile<Kilowatts>, InvalidProfile> {
        let mut values = values.to_vec();
        values.resize(24, 2.0);
        HourlyProfile::try_from(values)
    }

    #[test]
    fn household_peak_is_unsafe() -> Result<(), InvalidProfile> {
        let hours = safe_hours(&profile(&[2.0, 5.0])?, Kilowatts::from(7.4), Kilowatts::from(11.0));
        let first = hours[0];
        assert_eq!(first.hour, 0);
        assert_abs_diff_eq!(first.total_load.0, 9.4);
        assert!(hours.iter().all(|safe_hour| safe_hour.hour != 1));
        assert_eq!(hours.len(), 23);
        Ok(())
    }

    /// Exactly at the ceiling is still safe.
    #[test]
    fn inclusive_ceiling() -> Result<(), InvalidProfile> {
        let hours = safe_hours(&profile(&[3.5, 3.6])?, Kilowatts::from(7.5), Kilowatts::from(11.0));
        assert_eq!(hours[0].hour, 0);
        assert_eq!(hours[1].hour, 2);
        Ok(())
    }

    #[test]
    fn membership_matches_the_ceiling() -> Result<(), InvalidProfile> {
        let values = (0..24).map(|hour| f64::from(hour) * 0.5).collect_vec();
        let load = profile(&values)?;
        let hours = safe_hours(&load, Kilowatts::from(7.4), Kilowatts::from(11.0))
            .into_iter()
            .map(|safe_hour| safe_hour.hour)
            .collect_vec();
        for (hour, household_load) in load.iter() {
            assert_eq!(hours.contains(&hour), household_load.0 + 7.4 <= 11.0, "hour {hour}");
        }
        assert!(hours.iter().tuple_windows().all(|(lhs, rhs)| lhs < rhs));
        Ok(())
    }

    #[test]
    fn nothing_is_safe() -> Result<(), InvalidProfile> {
        let load = HourlyProfile::try_from(vec![5.0; 24])?;
        assert!(safe_hours(&load, Kilowatts::from(7.4), Kilowatts::from(11.0)).is_empty());
        Ok(())
    }

    #[test]
    fn cost_uses_the_combined_load() {
        let safe_hour = SafeHour {
            hour: 3,
            total_load: Kilowatts::from(10.0),
            rate: KilowattHourRate::ZERO,
        }
        .with_rate(KilowattHourRate::from(0.8));
        assert_abs_diff_eq!(safe_hour.cost().0, 8.0);
    }
}

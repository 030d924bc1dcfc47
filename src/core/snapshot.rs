use crate::quantity::energy::KilowattHours;

/// Battery state read on a single poll, never carried over to the next one.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatterySnapshot {
    pub energy: KilowattHours,
    pub max_capacity: KilowattHours,

    /// State of charge in percent, clamped to `0..=100` and rounded to one decimal.
    pub percent: f64,

    /// Whether the charger relay is on.
    pub is_charging: bool,
}

impl BatterySnapshot {
    /// The maximum capacity is expected to be positive.
    pub fn new(energy: KilowattHours, max_capacity: KilowattHours, is_charging: bool) -> Self {
        let percent = (energy.0 / max_capacity.0 * 100.0).clamp(0.0, 100.0);
        Self { energy, max_capacity, percent: (percent * 10.0).round() / 10.0, is_charging }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::ChargeTarget;

    fn snapshot(energy: f64, max_capacity: f64) -> BatterySnapshot {
        BatterySnapshot::new(KilowattHours::from(energy), KilowattHours::from(max_capacity), false)
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(snapshot(9.26, 46.3).percent, 20.0);
        assert_eq!(snapshot(10.0, 46.3).percent, 21.6);
    }

    /// 37 / 46.3 is 79.91…%, which rounds to 79.9% and stays below an 80% target.
    #[test]
    fn just_below_the_target() {
        let battery = snapshot(37.0, 46.3);
        assert_eq!(battery.percent, 79.9);
        assert!(!ChargeTarget::default().is_reached(&battery));
    }

    /// 37.04 / 46.3 is exactly at the target after rounding.
    #[test]
    fn at_the_target() {
        let battery = snapshot(37.04, 46.3);
        assert_eq!(battery.percent, 80.0);
        assert!(ChargeTarget::default().is_reached(&battery));
    }

    /// 79.96% rounds up and counts as reached.
    #[test]
    fn rounding_reaches_the_target() {
        let battery = snapshot(79.96, 100.0);
        assert_eq!(battery.percent, 80.0);
        assert!(ChargeTarget::default().is_reached(&battery));
    }

    #[test]
    fn clamps_overcharge() {
        assert_eq!(snapshot(50.0, 46.3).percent, 100.0);
    }
}

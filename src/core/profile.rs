use std::ops::Index;

use thiserror::Error;

pub const N_HOURS: usize = 24;

/// One value per hour of day, for example household load or energy rate.
#[must_use]
#[derive(Clone, Debug)]
pub struct HourlyProfile<V>([V; N_HOURS]);

impl<V: Copy> HourlyProfile<V> {
    pub fn iter(&self) -> impl Iterator<Item = (u32, V)> + '_ {
        (0..).zip(self.0.iter().copied())
    }
}

/// Hours outside the day wrap around.
impl<V> Index<u32> for HourlyProfile<V> {
    type Output = V;

    fn index(&self, hour: u32) -> &Self::Output {
        &self.0[hour as usize % N_HOURS]
    }
}

impl<V: From<f64>> TryFrom<Vec<f64>> for HourlyProfile<V> {
    type Error = InvalidProfile;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let values: [f64; N_HOURS] =
            values.try_into().map_err(|values: Vec<f64>| InvalidProfile::Length(values.len()))?;
        if let Some((hour, value)) =
            values.iter().copied().enumerate().find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(InvalidProfile::Value { hour, value });
        }
        Ok(Self(values.map(V::from)))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidProfile {
    #[error("expected {N_HOURS} hourly values, got {0}")]
    Length(usize),

    #[error("hour {hour} has an invalid value: {value}")]
    Value { hour: usize, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::power::Kilowatts;

    #[test]
    fn wraps_around() -> Result<(), InvalidProfile> {
        let profile = HourlyProfile::<Kilowatts>::try_from((0..24).map(f64::from).collect::<Vec<_>>())?;
        assert_eq!(profile[23].0, 23.0);
        assert_eq!(profile[24].0, 0.0);
        assert_eq!(profile[25].0, 1.0);
        Ok(())
    }

    #[test]
    fn rejects_wrong_length() {
        let result = HourlyProfile::<Kilowatts>::try_from(vec![1.0; 23]);
        assert_eq!(result.unwrap_err(), InvalidProfile::Length(23));
    }

    #[test]
    fn rejects_negative_value() {
        let mut values = vec![1.0; 24];
        values[5] = -0.1;
        let result = HourlyProfile::<Kilowatts>::try_from(values);
        assert_eq!(result.unwrap_err(), InvalidProfile::Value { hour: 5, value: -0.1 });
    }

    #[test]
    fn rejects_nan() {
        let mut values = vec![1.0; 24];
        values[0] = f64::NAN;
        assert!(matches!(
            HourlyProfile::<Kilowatts>::try_from(values),
            Err(InvalidProfile::Value { hour: 0, .. })
        ));
    }
}

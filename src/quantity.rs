pub mod cost;
pub mod energy;
pub mod power;
pub mod rate;

use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// Physical quantity with its dimensions encoded in the type.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Quantity<const POWER: isize, const TIME: isize, const COST: isize>(pub f64);

impl<const POWER: isize, const TIME: isize, const COST: isize> Quantity<POWER, TIME, COST> {
    pub const ZERO: Self = Self(0.0);
}

impl<const POWER: isize, const TIME: isize, const COST: isize> Mul<f64>
    for Quantity<POWER, TIME, COST>
{
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Bare = Quantity<0, 0, 0>;

    #[test]
    fn test_scale() {
        assert_eq!((Bare::from(46.3) * 0.5).0, 23.15);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("7.4".parse::<Bare>().unwrap().0, 7.4);
    }
}

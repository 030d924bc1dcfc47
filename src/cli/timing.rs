use clap::Parser;

use crate::{core::session::Timing, prelude::*};

#[derive(Parser)]
pub struct TimingArgs {
    /// Real duration of one simulated hour.
    #[clap(long = "simulated-hour", env = "SIMULATED_HOUR", default_value = "4s")]
    simulated_hour: humantime::Duration,

    /// Simulated minutes to charge before checking the battery again.
    #[clap(
        long = "charge-increment-minutes",
        env = "CHARGE_INCREMENT_MINUTES",
        default_value = "15"
    )]
    charge_increment_minutes: f64,

    /// Pause between retries of a failed call.
    #[clap(long = "retry-backoff", env = "RETRY_BACKOFF", default_value = "1s")]
    retry_backoff: humantime::Duration,

    #[clap(
        long = "max-consecutive-failures",
        env = "MAX_CONSECUTIVE_FAILURES",
        default_value = "3"
    )]
    max_consecutive_failures: usize,

    /// Time limit for the charger to acknowledge a stop.
    #[clap(long = "stop-timeout", env = "STOP_TIMEOUT", default_value = "3s")]
    stop_timeout: humantime::Duration,
}

impl TimingArgs {
    pub fn timing(&self) -> Result<Timing> {
        ensure!(!self.simulated_hour.is_zero(), "the simulated hour must not be empty");
        ensure!(
            self.charge_increment_minutes > 0.0 && self.charge_increment_minutes <= 60.0,
            "the charge increment must be within (0, 60] minutes, got {}",
            self.charge_increment_minutes,
        );
        ensure!(self.max_consecutive_failures != 0, "at least one attempt is needed");
        Ok(Timing {
            simulated_hour: self.simulated_hour.into(),
            charge_increment_minutes: self.charge_increment_minutes,
            retry_backoff: self.retry_backoff.into(),
            max_consecutive_failures: self.max_consecutive_failures,
            stop_timeout: self.stop_timeout.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Parser)]
    struct Wrapper {
        #[clap(flatten)]
        timing: TimingArgs,
    }

    #[test]
    fn test_defaults_ok() -> Result {
        let timing = Wrapper::try_parse_from(["test"])?.timing.timing()?;
        assert_eq!(timing.simulated_hour, Duration::from_secs(4));
        assert_eq!(timing.charge_increment(), Duration::from_secs(1));
        assert_eq!(timing.max_consecutive_failures, 3);
        Ok(())
    }

    #[test]
    fn test_zero_failures_err() -> Result {
        let args = Wrapper::try_parse_from(["test", "--max-consecutive-failures", "0"])?;
        assert!(args.timing.timing().is_err());
        Ok(())
    }
}

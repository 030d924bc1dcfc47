//! Charge session state machine driven against the [`Telemetry`] collaborator.

use std::time::Duration;

use bon::Builder;
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        profile::{HourlyProfile, InvalidProfile},
        strategy::{OptimalHourSet, SelectionContext, Strategy},
        target::ChargeTarget,
        telemetry::{Reading, Telemetry, TelemetryError},
    },
    prelude::*,
    quantity::{power::Kilowatts, rate::KilowattHourRate},
};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    WaitingForOptimalHour,
    Charging,
    TargetReached,
    Aborted(AbortReason),
}

impl SessionState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::TargetReached | Self::Aborted(_))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AbortReason {
    /// Nothing is safe to schedule.
    NoSafeHours,

    Cancelled,

    /// The charger did not acknowledge the start command.
    ControlUnavailable,

    TelemetryUnavailable,
}

/// Session-level failures, everything else ends up in [`SessionState::Aborted`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid profile")]
    InvalidProfile(#[from] InvalidProfile),

    #[error("telemetry is unavailable after {attempts} attempts")]
    TelemetryUnavailable {
        attempts: usize,

        #[source]
        source: TelemetryError,
    },
}

/// Mapping between the simulated clock and the real one.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct Timing {
    /// Real duration of one simulated hour.
    pub simulated_hour: Duration,

    /// Simulated minutes to charge before re-checking the battery.
    pub charge_increment_minutes: f64,

    pub retry_backoff: Duration,
    pub max_consecutive_failures: usize,
    pub stop_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            simulated_hour: Duration::from_secs(4),
            charge_increment_minutes: 15.0,
            retry_backoff: Duration::from_secs(1),
            max_consecutive_failures: 3,
            stop_timeout: Duration::from_secs(3),
        }
    }
}

impl Timing {
    const MIN_WAIT: Duration = Duration::from_millis(100);

    /// Real time left until the next simulated hour starts.
    pub fn until_next_hour(&self, minute: f64) -> Duration {
        let fraction = ((60.0 - minute) / 60.0).clamp(0.0, 1.0);
        self.simulated_hour.mul_f64(fraction).max(Self::MIN_WAIT)
    }

    pub fn charge_increment(&self) -> Duration {
        self.simulated_hour.mul_f64(self.charge_increment_minutes / 60.0)
    }
}

/// Reason to leave the control loop early.
enum Halt {
    Cancelled,
    ControlUnavailable,
    Failed(SessionError),
}

impl From<InvalidProfile> for Halt {
    fn from(error: InvalidProfile) -> Self {
        Self::Failed(error.into())
    }
}

/// Single charge session against one battery.
///
/// The caller must make sure that only one session controls the same charger at a time.
#[derive(Builder)]
pub struct ChargeSession<'a, T: Telemetry> {
    telemetry: &'a T,
    target: ChargeTarget,
    strategy: Strategy,

    #[builder(default)]
    timing: Timing,

    #[builder(default)]
    cancellation: CancellationToken,

    #[builder(skip)]
    state: SessionState,

    #[builder(skip)]
    n_start_failures: usize,
}

impl<T: Telemetry> ChargeSession<'_, T> {
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session to a terminal state.
    ///
    /// The charger is always asked to stop before this returns, unless the profiles were invalid
    /// and nothing has started.
    #[instrument(skip_all, fields(strategy = ?self.strategy))]
    pub async fn run(&mut self) -> Result<SessionState, SessionError> {
        let outcome = self.drive().await;
        match outcome {
            Ok(()) => Ok(self.state),
            Err(Halt::Cancelled) => {
                info!("cancelled");
                Ok(self.abort(AbortReason::Cancelled).await)
            }
            Err(Halt::ControlUnavailable) => Ok(self.abort(AbortReason::ControlUnavailable).await),
            Err(Halt::Failed(error @ SessionError::InvalidProfile(_))) => Err(error),
            Err(Halt::Failed(error)) => {
                error!("{error:#}");
                self.abort(AbortReason::TelemetryUnavailable).await;
                Err(error)
            }
        }
    }

    async fn drive(&mut self) -> Result<(), Halt> {
        let hours = self.plan().await?;
        if hours.is_empty() {
            warn!("no hour is safe to charge in");
            self.abort(AbortReason::NoSafeHours).await;
            return Ok(());
        }
        while !self.state.is_terminal() {
            if self.cancellation.is_cancelled() {
                return Err(Halt::Cancelled);
            }
            let reading = self.poll().await?;
            self.tick(&hours, reading).await?;
        }
        Ok(())
    }

    /// Fetch the profiles and the battery state, and select the charging hours.
    async fn plan(&self) -> Result<OptimalHourSet, Halt> {
        let telemetry = self.telemetry;
        let load = self.retrying("load profile", || telemetry.get_hourly_load_profile()).await?;
        let load = HourlyProfile::<Kilowatts>::try_from(load)?;
        let rates = if self.strategy.needs_rates() {
            let rates =
                self.retrying("price profile", || telemetry.get_hourly_price_profile()).await?;
            Some(HourlyProfile::<KilowattHourRate>::try_from(rates)?)
        } else {
            None
        };
        let reading = self.poll().await?;
        info!(?reading.time, reading.battery.percent, "planning…");
        let context = SelectionContext::builder()
            .load(&load)
            .maybe_rates(rates.as_ref())
            .target(&self.target)
            .battery(&reading.battery)
            .build();
        Ok(self.strategy.select_hours(&context))
    }

    async fn tick(&mut self, hours: &OptimalHourSet, reading: Reading) -> Result<(), Halt> {
        let Reading { time, battery } = reading;
        let is_optimal = hours.contains(time.hour);
        let is_reached = self.target.is_reached(&battery);
        debug!(
            ?time,
            battery.percent,
            battery.is_charging,
            is_optimal,
            is_reached,
            state = ?self.state,
            "tick",
        );

        match self.state {
            SessionState::Idle | SessionState::WaitingForOptimalHour => {
                if is_reached {
                    self.stop_charging().await;
                    self.transition(SessionState::TargetReached);
                } else if is_optimal {
                    if battery.is_charging {
                        debug!("the charger is already on");
                    } else if !self.start_charging().await? {
                        return self.pause(self.timing.retry_backoff).await;
                    }
                    self.transition(SessionState::Charging);
                    self.pause(self.timing.charge_increment()).await?;
                } else {
                    if battery.is_charging {
                        warn!(time.hour, "the charger is on outside of the selected hours");
                        self.stop_charging().await;
                    }
                    self.transition(SessionState::WaitingForOptimalHour);
                    info!(next_hour = ?hours.next_after(time.hour), "waiting…");
                    self.pause(self.timing.until_next_hour(time.minute)).await?;
                }
            }
            SessionState::Charging => {
                if is_reached {
                    self.leave_charging(SessionState::TargetReached).await;
                } else if !is_optimal {
                    self.leave_charging(SessionState::WaitingForOptimalHour).await;
                } else if !battery.is_charging {
                    warn!("the charger is off, starting again");
                    if !self.start_charging().await? {
                        return self.pause(self.timing.retry_backoff).await;
                    }
                    self.pause(self.timing.charge_increment()).await?;
                } else {
                    self.pause(self.timing.charge_increment()).await?;
                }
            }
            SessionState::TargetReached | SessionState::Aborted(_) => {}
        }
        Ok(())
    }

    async fn poll(&self) -> Result<Reading, Halt> {
        let telemetry = self.telemetry;
        self.retrying("state", || telemetry.get_current_state()).await
    }

    /// Call the telemetry until it succeeds or the consecutive failures run out.
    async fn retrying<R, F, Fut>(&self, what: &str, mut call: F) -> Result<R, Halt>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, TelemetryError>>,
    {
        let mut n_failures = 0;
        loop {
            let result = tokio::select! {
                biased;
                () = self.cancellation.cancelled() => return Err(Halt::Cancelled),
                result = call() => result,
            };
            match result {
                Ok(value) => return Ok(value),
                Err(error) => {
                    n_failures += 1;
                    if n_failures >= self.timing.max_consecutive_failures {
                        return Err(Halt::Failed(SessionError::TelemetryUnavailable {
                            attempts: n_failures,
                            source: error,
                        }));
                    }
                    warn!(what, n_failures, "retrying: {error:#}");
                    self.pause(self.timing.retry_backoff).await?;
                }
            }
        }
    }

    /// Returns whether the charger acknowledged the start.
    async fn start_charging(&mut self) -> Result<bool, Halt> {
        let result = tokio::select! {
            biased;
            () = self.cancellation.cancelled() => return Err(Halt::Cancelled),
            result = self.telemetry.start_charging() => result,
        };
        match result {
            Ok(ack) => {
                info!(%ack, "started charging");
                self.n_start_failures = 0;
                Ok(true)
            }
            Err(error) => {
                self.n_start_failures += 1;
                if self.n_start_failures >= self.timing.max_consecutive_failures {
                    error!(n_failures = self.n_start_failures, "giving up on starting: {error:#}");
                    return Err(Halt::ControlUnavailable);
                }
                warn!(n_failures = self.n_start_failures, "failed to start charging: {error:#}");
                Ok(false)
            }
        }
    }

    /// Best-effort stop, bounded by the stop timeout and not cancellable.
    async fn stop_charging(&self) {
        match timeout(self.timing.stop_timeout, self.telemetry.stop_charging()).await {
            Ok(Ok(ack)) => info!(%ack, "stopped charging"),
            Ok(Err(error)) => warn!("failed to stop charging: {error:#}"),
            Err(_) => warn!(timeout = ?self.timing.stop_timeout, "stopping timed out"),
        }
    }

    async fn leave_charging(&mut self, to: SessionState) {
        self.stop_charging().await;
        self.transition(to);
    }

    async fn abort(&mut self, reason: AbortReason) -> SessionState {
        self.stop_charging().await;
        self.transition(SessionState::Aborted(reason));
        self.state
    }

    fn transition(&mut self, to: SessionState) {
        if to == SessionState::WaitingForOptimalHour {
            // Every optimal window gets its own start attempts.
            self.n_start_failures = 0;
        }
        if self.state != to {
            info!(from = ?self.state, ?to, "transition");
            self.state = to;
        }
    }

    /// Sleep unless cancelled.
    async fn pause(&self, duration: Duration) -> Result<(), Halt> {
        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(Halt::Cancelled),
            () = sleep(duration) => Ok(()),
        }
    }
}

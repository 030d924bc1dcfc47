use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::{
    cli::{simulator::SimulatorArgs, timing::TimingArgs},
    core::{
        session::{ChargeSession, SessionState},
        strategy::Strategy,
        target::ChargeTarget,
    },
    prelude::*,
};

#[derive(Parser)]
pub struct HuntArgs {
    #[clap(long, env = "STRATEGY", default_value = "price")]
    strategy: Strategy,

    #[clap(flatten)]
    target: ChargeTarget,

    #[clap(flatten)]
    timing: TimingArgs,

    #[clap(flatten)]
    simulator: SimulatorArgs,
}

impl HuntArgs {
    #[instrument(skip_all)]
    pub async fn run(self, cancellation: CancellationToken) -> Result {
        self.target.validate()?;
        let timing = self.timing.timing()?;
        let simulator = self.simulator.connect()?;

        let mut session = ChargeSession::builder()
            .telemetry(&simulator)
            .target(self.target)
            .strategy(self.strategy)
            .timing(timing)
            .cancellation(cancellation)
            .build();
        let result = session.run().await;
        debug!(state = ?session.state(), "finished");
        match result.context("the charge session failed")? {
            SessionState::TargetReached => info!("the target is reached"),
            SessionState::Aborted(reason) => warn!(?reason, "aborted"),
            _ => {}
        }
        Ok(())
    }
}

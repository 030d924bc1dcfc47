use clap::{Parser, Subcommand};

use crate::{cli::simulator::SimulatorArgs, prelude::*};

#[derive(Parser)]
pub struct BurrowArgs {
    #[command(subcommand)]
    command: BurrowCommand,
}

impl BurrowArgs {
    pub async fn run(self) -> Result {
        match self.command {
            BurrowCommand::Info(args) => args.run().await,
            BurrowCommand::Discharge(args) => args.run().await,
        }
    }
}

#[derive(Subcommand)]
enum BurrowCommand {
    /// Print the current simulator state.
    Info(BurrowInfoArgs),

    /// Reset the simulated EV battery to 20% and the clock to midnight.
    Discharge(BurrowDischargeArgs),
}

#[derive(Parser)]
struct BurrowInfoArgs {
    #[clap(flatten)]
    simulator: SimulatorArgs,
}

impl BurrowInfoArgs {
    #[instrument(skip_all)]
    async fn run(self) -> Result {
        let info = self.simulator.connect()?.get_info().await?;
        let reading = info.reading();
        info!(
            time = ?reading.time,
            household_load = %info.household_load,
            energy = %info.energy,
            max_capacity = %info.max_capacity,
            reading.battery.percent,
            info.is_charging,
            "gotcha",
        );
        Ok(())
    }
}

#[derive(Parser)]
struct BurrowDischargeArgs {
    #[clap(flatten)]
    simulator: SimulatorArgs,
}

impl BurrowDischargeArgs {
    #[instrument(skip_all)]
    async fn run(self) -> Result {
        let ack = self.simulator.connect()?.discharge().await?;
        info!(%ack, "discharged");
        Ok(())
    }
}

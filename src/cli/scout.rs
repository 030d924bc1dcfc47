use clap::Parser;

use crate::{
    cli::simulator::SimulatorArgs,
    core::{
        profile::HourlyProfile,
        strategy::{SelectionContext, Strategy},
        target::ChargeTarget,
    },
    prelude::*,
    quantity::{power::Kilowatts, rate::KilowattHourRate},
    tables::build_plan_table,
};

#[derive(Parser)]
pub struct ScoutArgs {
    #[clap(long, env = "STRATEGY", default_value = "price")]
    strategy: Strategy,

    #[clap(flatten)]
    target: ChargeTarget,

    #[clap(flatten)]
    simulator: SimulatorArgs,
}

impl ScoutArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        self.target.validate()?;
        let simulator = self.simulator.connect()?;

        let load = HourlyProfile::<Kilowatts>::try_from(simulator.get_base_load().await?)
            .context("invalid household load")?;
        let rates = HourlyProfile::<KilowattHourRate>::try_from(simulator.get_prices().await?)
            .context("invalid energy prices")?;
        let reading = simulator.get_info().await?.reading();
        info!(?reading.time, reading.battery.percent, "fetched");

        let context = SelectionContext::builder()
            .load(&load)
            .rates(&rates)
            .target(&self.target)
            .battery(&reading.battery)
            .build();
        let hours = self.strategy.select_hours(&context);
        println!("{}", build_plan_table(&load, &rates, &self.target, &hours, reading.time.hour));
        if hours.is_empty() {
            warn!("no hour is safe to charge in");
        }
        Ok(())
    }
}

mod burrow;
mod hunt;
mod scout;
mod simulator;
mod timing;

use clap::{Parser, Subcommand};

use crate::cli::{burrow::BurrowArgs, hunt::HuntArgs, scout::ScoutArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: plan the charging hours and drive the charge session to the target.
    #[clap(name = "hunt")]
    Hunt(Box<HuntArgs>),

    /// Print the plan without touching the charger (dry run).
    #[clap(name = "scout")]
    Scout(Box<ScoutArgs>),

    /// Development tools.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}

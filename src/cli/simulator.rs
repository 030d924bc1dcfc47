use clap::Parser;
use reqwest::Url;

use crate::{api::Simulator, prelude::*};

#[derive(Parser)]
pub struct SimulatorArgs {
    /// Simulator base URL.
    #[clap(long = "simulator-url", env = "SIMULATOR_URL", default_value = "http://127.0.0.1:5001")]
    url: Url,
}

impl SimulatorArgs {
    pub fn connect(&self) -> Result<Simulator> {
        Simulator::try_new(self.url.clone())
    }
}

pub mod profile;
pub mod safety;
pub mod session;
pub mod snapshot;
pub mod strategy;
pub mod target;
pub mod telemetry;

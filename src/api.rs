mod simulator;

pub use self::simulator::Api as Simulator;

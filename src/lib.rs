pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, OutputFormat};

pub use config::ScenarioConfig;
pub use core::{
    filters::{CompiledFilter, PassengerFilter},
    manager::{RegistrationPolicy, TransportManager},
    report::build_report,
};
pub use domain::model::{Bus, BusReport, Passenger, PassengerId};
pub use domain::ports::PassengerPredicate;
pub use utils::error::{RegistryError, Result};

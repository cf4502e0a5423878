pub mod filters;
pub mod manager;
pub mod report;

pub use crate::domain::model::{Bus, BusReport, Passenger, PassengerId};
pub use crate::domain::ports::PassengerPredicate;
pub use crate::utils::error::Result;

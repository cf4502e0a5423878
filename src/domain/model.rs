use crate::utils::error::Result;
use crate::utils::validation::{validate_non_blank, validate_positive_number};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Marks a bus as created by a particular manager, at a particular position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BusHandle {
    pub(crate) registry: u64,
    pub(crate) index: usize,
}

/// Two buses with the same id and capacity are still distinct when they
/// were created separately: equality includes the creating manager's handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Bus {
    id: String,
    seats: u32,
    #[serde(skip)]
    pub(crate) handle: Option<BusHandle>,
}

impl Bus {
    /// Validates the id and capacity without registering the bus anywhere.
    /// Use `TransportManager::create_bus` to make it known to a registry.
    pub fn new(id: &str, seats: i32) -> Result<Self> {
        validate_non_blank("id", id)?;
        validate_positive_number("seats", i64::from(seats))?;
        Ok(Self {
            id: id.to_string(),
            seats: seats as u32,
            handle: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }
}

/// Opaque handle minted by the manager that created the passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PassengerId {
    pub(crate) registry: u64,
    pub(crate) index: usize,
}

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p#{}.{}", self.registry, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passenger {
    #[serde(skip)]
    pub(crate) id: PassengerId,
    pub(crate) name: String,
    pub(crate) surname: String,
    pub(crate) age: i32,
    pub(crate) seat_no: Option<u32>,
}

impl Passenger {
    pub fn id(&self) -> PassengerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    /// `None` until the passenger is registered on a bus.
    pub fn seat_no(&self) -> Option<u32> {
        self.seat_no
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Per-bus summary produced by `core::report`.
#[derive(Debug, Clone, Serialize)]
pub struct BusReport {
    pub bus_id: String,
    pub seats: u32,
    pub occupied: usize,
    pub free_seats: u32,
    pub passengers: Vec<Passenger>,
    pub oldest: Option<Passenger>,
    pub average_age: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_new_validates() {
        let bus = Bus::new("B1", 40).unwrap();
        assert_eq!(bus.id(), "B1");
        assert_eq!(bus.seats(), 40);

        assert!(Bus::new("", 5).is_err());
        assert!(Bus::new("  ", 5).is_err());
        assert!(Bus::new("X", 0).is_err());
        assert!(Bus::new("X", -1).is_err());
    }

    #[test]
    fn test_bus_serializes_without_handle() {
        let mut bus = Bus::new("B1", 4).unwrap();
        bus.handle = Some(BusHandle {
            registry: 1,
            index: 0,
        });
        let json = serde_json::to_value(&bus).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "B1", "seats": 4 }));
    }

    #[test]
    fn test_passenger_id_display() {
        let id = PassengerId {
            registry: 3,
            index: 7,
        };
        assert_eq!(id.to_string(), "p#3.7");
    }
}

use crate::domain::model::{Bus, BusHandle, Passenger, PassengerId};
use crate::domain::ports::PassengerPredicate;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{validate_non_blank, validate_non_empty};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(1);

/// How much referential checking `register_passenger` and `create_bus` do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Unique bus ids, known buses, seats within capacity, one bus per passenger.
    #[default]
    Strict,
    /// Only the seat-occupied check applies.
    Permissive,
}

#[derive(Debug, Clone, Copy)]
struct Seating {
    passenger: usize,
    seat: u32,
}

/// In-memory owner of buses, passengers and seat registrations.
///
/// Each created bus owns its own seat list, stored at the bus's creation
/// position. Lookups by id scan the created buses in creation order and the
/// first match wins. Registrations on buses this manager never created
/// (permissive policy only) are kept apart and never reached by id queries.
#[derive(Debug)]
pub struct TransportManager {
    registry: u64,
    policy: RegistrationPolicy,
    buses: Vec<Bus>,
    passengers: Vec<Passenger>,
    registrations: Vec<Vec<Seating>>,
    detached: Vec<(Bus, Vec<Seating>)>,
}

impl Default for TransportManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportManager {
    pub fn new() -> Self {
        Self::with_policy(RegistrationPolicy::default())
    }

    pub fn with_policy(policy: RegistrationPolicy) -> Self {
        Self {
            registry: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            policy,
            buses: Vec::new(),
            passengers: Vec::new(),
            registrations: Vec::new(),
            detached: Vec::new(),
        }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    pub fn create_bus(&mut self, id: &str, seats: i32) -> Result<Bus> {
        tracing::info!("Creating bus '{}' with {} seats", id, seats);
        let mut bus = Bus::new(id, seats).inspect_err(|e| {
            tracing::warn!("Rejected bus: {}", e);
        })?;

        if self.policy == RegistrationPolicy::Strict && self.find_bus(id).is_some() {
            tracing::warn!("Rejected bus: id '{}' already exists", id);
            return Err(RegistryError::invalid_argument("id", format!("bus '{}' already exists", id)));
        }

        bus.handle = Some(BusHandle {
            registry: self.registry,
            index: self.buses.len(),
        });
        self.buses.push(bus.clone());
        self.registrations.push(Vec::new());
        Ok(bus)
    }

    pub fn created_buses(&self) -> &[Bus] {
        tracing::debug!("Returning {} buses", self.buses.len());
        &self.buses
    }

    /// First bus whose id equals `id`. A blank id is an invalid argument.
    pub fn bus_by_id(&self, id: &str) -> Result<Option<&Bus>> {
        tracing::debug!("Looking up bus '{}'", id);
        validate_non_blank("id", id).inspect_err(|e| {
            tracing::warn!("Rejected lookup: {}", e);
        })?;
        Ok(self.find_bus(id))
    }

    /// Age is accepted as given, negative values included.
    pub fn create_passenger(&mut self, name: &str, surname: &str, age: i32) -> Result<Passenger> {
        tracing::info!("Creating passenger {} {} ({})", name, surname, age);
        validate_non_empty("name", name)
            .and_then(|_| validate_non_empty("surname", surname))
            .inspect_err(|e| tracing::warn!("Rejected passenger: {}", e))?;

        let passenger = Passenger {
            id: PassengerId {
                registry: self.registry,
                index: self.passengers.len(),
            },
            name: name.to_string(),
            surname: surname.to_string(),
            age,
            seat_no: None,
        };
        self.passengers.push(passenger.clone());
        Ok(passenger)
    }

    pub fn created_passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    /// Current record for a handle, reflecting any registration since it was issued.
    pub fn passenger(&self, id: PassengerId) -> Option<&Passenger> {
        self.passenger_index(id).ok().map(|index| &self.passengers[index])
    }

    /// Seats `passenger` on `bus` at `seat_number`.
    ///
    /// The stored passenger record takes the new seat number; the caller's
    /// copy is left as it was. On failure nothing changes.
    pub fn register_passenger(&mut self, bus: &Bus, seat_number: u32, passenger: &Passenger) -> Result<()> {
        tracing::info!(
            "Registering passenger {} on bus '{}' seat {}",
            passenger.id(),
            bus.id(),
            seat_number
        );
        let index = self.passenger_index(passenger.id())?;

        let slot = self.created_index(bus);

        if self.policy == RegistrationPolicy::Strict {
            self.check_strict(bus, slot, seat_number, index)?;
        }

        let taken: &[Seating] = match slot {
            Some(slot) => &self.registrations[slot],
            None => self
                .detached
                .iter()
                .find(|(known, _)| known == bus)
                .map_or(&[][..], |(_, seated)| seated.as_slice()),
        };
        if taken.iter().any(|s| s.seat == seat_number) {
            tracing::info!("Seat {} on bus '{}' is occupied", seat_number, bus.id());
            return Err(RegistryError::SeatOccupied {
                bus_id: bus.id().to_string(),
                seat: seat_number,
            });
        }

        let seating = Seating {
            passenger: index,
            seat: seat_number,
        };
        match slot {
            Some(slot) => self.registrations[slot].push(seating),
            None => {
                tracing::warn!("Bus '{}' was not created by this registry", bus.id());
                match self.detached.iter_mut().find(|(known, _)| known == bus) {
                    Some((_, seated)) => seated.push(seating),
                    None => self.detached.push((bus.clone(), vec![seating])),
                }
            }
        }
        self.passengers[index].seat_no = Some(seat_number);
        Ok(())
    }

    /// Registered passengers in registration order, each carrying the seat
    /// it holds on this bus. `None` for an unknown bus or an empty one.
    pub fn passengers(&self, bus_id: &str) -> Option<Vec<Passenger>> {
        tracing::debug!("Getting passengers on bus '{}'", bus_id);
        self.seated(bus_id).ok()
    }

    /// Ties go to the passenger registered first.
    pub fn oldest_passenger(&self, bus_id: &str) -> Result<Passenger> {
        tracing::debug!("Getting oldest passenger on bus '{}'", bus_id);
        let seated = self.seated(bus_id)?;
        seated
            .into_iter()
            .reduce(|oldest, p| if p.age > oldest.age { p } else { oldest })
            .ok_or_else(|| RegistryError::NoPassengers {
                bus_id: bus_id.to_string(),
            })
    }

    pub fn average_passenger_age(&self, bus_id: &str) -> Result<f64> {
        tracing::debug!("Getting average passenger age on bus '{}'", bus_id);
        let seated = self.seated(bus_id)?;
        let total: i64 = seated.iter().map(|p| i64::from(p.age)).sum();
        Ok(total as f64 / seated.len() as f64)
    }

    /// Sorted by surname, then name. Equal keys keep registration order.
    pub fn ordered_passengers(&self, bus_id: &str) -> Option<Vec<Passenger>> {
        tracing::debug!("Ordering passengers on bus '{}' by surname and name", bus_id);
        let mut seated = self.seated(bus_id).ok()?;
        seated.sort_by(|a, b| a.surname.cmp(&b.surname).then_with(|| a.name.cmp(&b.name)));
        Some(seated)
    }

    pub fn find_passengers_by<P>(&self, bus_id: &str, predicate: &P) -> Option<Vec<Passenger>>
    where
        P: PassengerPredicate + ?Sized,
    {
        tracing::debug!("Finding passengers on bus '{}' by predicate", bus_id);
        let seated = self.seated(bus_id).ok()?;
        Some(seated.into_iter().filter(|p| predicate.test(p)).collect())
    }

    /// Seats in `1..=seats` that nobody holds, in ascending order.
    /// `None` for an unknown bus.
    pub fn free_seats(&self, bus_id: &str) -> Option<impl Iterator<Item = u32>> {
        let slot = self.find_bus_index(bus_id)?;
        let taken = self.taken_seats(slot);
        Some((1..=self.buses[slot].seats()).filter(move |seat| !taken.contains(seat)))
    }

    /// Number of free seats within capacity, without listing them.
    pub fn free_seat_count(&self, bus_id: &str) -> Option<u32> {
        let slot = self.find_bus_index(bus_id)?;
        let seats = self.buses[slot].seats();
        let taken = self.taken_seats(slot).range(1..=seats).count() as u32;
        Some(seats - taken)
    }

    fn taken_seats(&self, slot: usize) -> BTreeSet<u32> {
        self.registrations[slot].iter().map(|s| s.seat).collect()
    }

    fn find_bus_index(&self, id: &str) -> Option<usize> {
        self.buses.iter().position(|bus| bus.id() == id)
    }

    fn created_index(&self, bus: &Bus) -> Option<usize> {
        bus.handle
            .filter(|handle| handle.registry == self.registry && handle.index < self.buses.len())
            .map(|handle| handle.index)
    }

    fn find_bus(&self, id: &str) -> Option<&Bus> {
        self.buses.iter().find(|bus| bus.id() == id)
    }

    fn passenger_index(&self, id: PassengerId) -> Result<usize> {
        if id.registry != self.registry || id.index >= self.passengers.len() {
            return Err(RegistryError::UnknownPassenger {
                passenger: id.to_string(),
            });
        }
        Ok(id.index)
    }

    fn check_strict(&self, bus: &Bus, slot: Option<usize>, seat_number: u32, index: usize) -> Result<()> {
        let known = slot
            .map(|slot| &self.buses[slot])
            .ok_or_else(|| RegistryError::BusNotFound {
                bus_id: bus.id().to_string(),
            })?;

        if seat_number == 0 || seat_number > known.seats() {
            return Err(RegistryError::SeatOutOfRange {
                bus_id: known.id().to_string(),
                seat: seat_number,
                seats: known.seats(),
            });
        }

        let current = self
            .registrations
            .iter()
            .position(|seated| seated.iter().any(|s| s.passenger == index));
        if let Some(current) = current {
            return Err(RegistryError::AlreadyRegistered {
                passenger: self.passengers[index].id.to_string(),
                bus_id: self.buses[current].id().to_string(),
            });
        }

        Ok(())
    }

    fn seated(&self, bus_id: &str) -> Result<Vec<Passenger>> {
        let slot = self.find_bus_index(bus_id).ok_or_else(|| RegistryError::BusNotFound {
            bus_id: bus_id.to_string(),
        })?;

        let seated = &self.registrations[slot];
        if seated.is_empty() {
            return Err(RegistryError::NoPassengers {
                bus_id: bus_id.to_string(),
            });
        }

        Ok(seated
            .iter()
            .map(|s| Passenger {
                seat_no: Some(s.seat),
                ..self.passengers[s.passenger].clone()
            })
            .collect())
    }
}

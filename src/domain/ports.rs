use crate::domain::model::Passenger;

/// Caller-supplied test used by `TransportManager::find_passengers_by`.
///
/// Closures implement it directly, so most callers never name the trait:
///
/// ```
/// use bus_registry::TransportManager;
///
/// let mut manager = TransportManager::new();
/// let bus = manager.create_bus("B1", 10).unwrap();
/// let ann = manager.create_passenger("Ann", "Zeta", 42).unwrap();
/// manager.register_passenger(&bus, 1, &ann).unwrap();
///
/// let adults = manager.find_passengers_by("B1", &|p: &bus_registry::Passenger| p.age() >= 18);
/// assert_eq!(adults.unwrap().len(), 1);
/// ```
pub trait PassengerPredicate {
    fn test(&self, passenger: &Passenger) -> bool;
}

impl<F> PassengerPredicate for F
where
    F: Fn(&Passenger) -> bool,
{
    fn test(&self, passenger: &Passenger) -> bool {
        self(passenger)
    }
}

use crate::core::filters::CompiledFilter;
use crate::core::manager::TransportManager;
use crate::domain::model::{BusReport, Passenger};
use crate::domain::ports::PassengerPredicate;
use crate::utils::error::{RegistryError, Result};
use chrono::Utc;
use std::fmt;

/// Summarises one bus. An empty bus yields `None` aggregates rather than an error;
/// an unknown id is `BusNotFound`.
pub fn build_report(
    manager: &TransportManager,
    bus_id: &str,
    filter: Option<&CompiledFilter>,
) -> Result<BusReport> {
    let bus = manager
        .bus_by_id(bus_id)?
        .ok_or_else(|| RegistryError::BusNotFound {
            bus_id: bus_id.to_string(),
        })?;

    let passengers = match filter {
        Some(filter) => manager
            .ordered_passengers(bus_id)
            .map(|ordered| ordered.into_iter().filter(|p| filter.test(p)).collect::<Vec<_>>()),
        None => manager.ordered_passengers(bus_id),
    }
    .unwrap_or_default();

    let occupied = manager.passengers(bus_id).map_or(0, |seated| seated.len());

    tracing::debug!(
        "Report for bus '{}': {} of {} seats occupied",
        bus.id(),
        occupied,
        bus.seats()
    );

    Ok(BusReport {
        bus_id: bus.id().to_string(),
        seats: bus.seats(),
        occupied,
        free_seats: manager.free_seat_count(bus_id).unwrap_or_default(),
        passengers,
        oldest: manager.oldest_passenger(bus_id).ok(),
        average_age: manager.average_passenger_age(bus_id).ok(),
        generated_at: Utc::now(),
    })
}

fn write_passenger(f: &mut fmt::Formatter<'_>, p: &Passenger) -> fmt::Result {
    match p.seat_no() {
        Some(seat) => writeln!(f, "  [{:>3}] {} {} ({})", seat, p.surname(), p.name(), p.age()),
        None => writeln!(f, "  [  -] {} {} ({})", p.surname(), p.name(), p.age()),
    }
}

impl fmt::Display for BusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Bus {} - {}/{} seats occupied",
            self.bus_id, self.occupied, self.seats
        )?;
        for p in &self.passengers {
            write_passenger(f, p)?;
        }
        match (&self.oldest, self.average_age) {
            (Some(oldest), Some(avg)) => {
                writeln!(f, "  oldest: {} ({})", oldest.full_name(), oldest.age())?;
                writeln!(f, "  average age: {:.2}", avg)
            }
            _ => writeln!(f, "  no passengers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::PassengerFilter;

    fn manager() -> TransportManager {
        let mut manager = TransportManager::new();
        let bus = manager.create_bus("B1", 4).unwrap();
        manager.create_bus("B2", 2).unwrap();
        for (seat, (name, surname, age)) in [("Ann", "Zeta", 20), ("Bob", "Alpha", 45), ("Cid", "Alpha", 45)]
            .into_iter()
            .enumerate()
        {
            let p = manager.create_passenger(name, surname, age).unwrap();
            manager.register_passenger(&bus, seat as u32 + 1, &p).unwrap();
        }
        manager
    }

    #[test]
    fn test_report_for_seated_bus() {
        let manager = manager();
        let report = build_report(&manager, "B1", None).unwrap();

        assert_eq!(report.occupied, 3);
        assert_eq!(report.free_seats, 1);
        assert_eq!(report.passengers[0].full_name(), "Bob Alpha");
        assert_eq!(report.oldest.as_ref().unwrap().name(), "Bob");
        assert!((report.average_age.unwrap() - 36.666).abs() < 0.01);

        let text = report.to_string();
        assert!(text.contains("Bus B1 - 3/4 seats occupied"));
        assert!(text.contains("average age: 36.67"));
    }

    #[test]
    fn test_report_for_empty_bus() {
        let manager = manager();
        let report = build_report(&manager, "B2", None).unwrap();

        assert_eq!(report.occupied, 0);
        assert!(report.passengers.is_empty());
        assert!(report.oldest.is_none());
        assert!(report.average_age.is_none());
        assert!(report.to_string().contains("no passengers"));
    }

    #[test]
    fn test_report_filter_only_narrows_listing() {
        let manager = manager();
        let filter = PassengerFilter {
            min_age: Some(30),
            ..Default::default()
        }
        .compile()
        .unwrap();
        let report = build_report(&manager, "B1", Some(&filter)).unwrap();

        assert_eq!(report.passengers.len(), 2);
        assert_eq!(report.occupied, 3);
    }

    #[test]
    fn test_report_on_huge_bus_counts_free_seats() {
        let mut manager = TransportManager::new();
        manager.create_bus("X", i32::MAX).unwrap();

        let report = build_report(&manager, "X", None).unwrap();
        assert_eq!(report.free_seats, i32::MAX as u32);
        assert_eq!(report.seats, i32::MAX as u32);
    }

    #[test]
    fn test_report_unknown_bus() {
        let manager = manager();
        assert!(matches!(
            build_report(&manager, "B9", None),
            Err(RegistryError::BusNotFound { .. })
        ));
    }
}

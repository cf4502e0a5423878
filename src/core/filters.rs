use crate::domain::model::Passenger;
use crate::domain::ports::PassengerPredicate;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Declarative passenger predicate, as read from a scenario file or the
/// command line. Every set field must match; an empty filter matches all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassengerFilter {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub surname: Option<String>,
    /// Regex searched in "name surname".
    pub name_pattern: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompiledFilter {
    min_age: Option<i32>,
    max_age: Option<i32>,
    surname: Option<String>,
    pattern: Option<Regex>,
}

impl PassengerFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn compile(&self) -> Result<CompiledFilter> {
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(RegistryError::invalid_argument(
                    "min_age",
                    format!("min_age {} is greater than max_age {}", min, max),
                ));
            }
        }

        let pattern = self
            .name_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| RegistryError::invalid_argument("name_pattern", e.to_string()))?;

        Ok(CompiledFilter {
            min_age: self.min_age,
            max_age: self.max_age,
            surname: self.surname.clone(),
            pattern,
        })
    }
}

impl Validate for PassengerFilter {
    fn validate(&self) -> Result<()> {
        self.compile().map(|_| ())
    }
}

impl PassengerPredicate for CompiledFilter {
    fn test(&self, passenger: &Passenger) -> bool {
        self.min_age.map_or(true, |min| passenger.age() >= min)
            && self.max_age.map_or(true, |max| passenger.age() <= max)
            && self.surname.as_deref().map_or(true, |s| passenger.surname() == s)
            && self
                .pattern
                .as_ref()
                .map_or(true, |re| re.is_match(&passenger.full_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manager::TransportManager;

    fn passengers() -> Vec<Passenger> {
        let mut manager = TransportManager::new();
        vec![
            manager.create_passenger("Ann", "Zeta", 20).unwrap(),
            manager.create_passenger("Bob", "Alpha", 35).unwrap(),
            manager.create_passenger("Cid", "Alpha", 40).unwrap(),
        ]
    }

    fn matching(filter: &PassengerFilter) -> Vec<String> {
        let compiled = filter.compile().unwrap();
        passengers()
            .iter()
            .filter(|p| compiled.test(p))
            .map(Passenger::full_name)
            .collect()
    }

    #[test]
    fn test_empty_filter_matches_everyone() {
        let filter = PassengerFilter::default();
        assert!(filter.is_empty());
        assert_eq!(matching(&filter).len(), 3);
    }

    #[test]
    fn test_fields_combine() {
        let filter = PassengerFilter {
            min_age: Some(30),
            surname: Some("Alpha".to_string()),
            name_pattern: Some("^C".to_string()),
            ..Default::default()
        };
        assert_eq!(matching(&filter), vec!["Cid Alpha"]);

        let filter = PassengerFilter {
            max_age: Some(35),
            ..Default::default()
        };
        assert_eq!(matching(&filter), vec!["Ann Zeta", "Bob Alpha"]);
    }

    #[test]
    fn test_invalid_filters_are_rejected() {
        let bad_regex = PassengerFilter {
            name_pattern: Some("(".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_regex.validate(),
            Err(RegistryError::InvalidArgument { ref field, .. }) if field == "name_pattern"
        ));

        let inverted = PassengerFilter {
            min_age: Some(50),
            max_age: Some(10),
            ..Default::default()
        };
        assert!(inverted.compile().is_err());
    }
}

use crate::core::filters::PassengerFilter;
use crate::core::manager::{RegistrationPolicy, TransportManager};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{validate_non_blank, validate_non_empty, validate_positive_number, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A registry described as TOML: buses, passengers and their seats.
///
/// ```toml
/// [registry]
/// name = "morning run"
/// policy = "strict"
///
/// [[buses]]
/// id = "B1"
/// seats = 40
///
/// [[passengers]]
/// name = "Ann"
/// surname = "Zeta"
/// age = 20
/// bus = "B1"
/// seat = 3
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub buses: Vec<BusEntry>,
    #[serde(default)]
    pub passengers: Vec<PassengerEntry>,
    pub filter: Option<PassengerFilter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySection {
    pub name: Option<String>,
    #[serde(default)]
    pub policy: RegistrationPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEntry {
    pub id: String,
    pub seats: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerEntry {
    pub name: String,
    pub surname: String,
    pub age: i32,
    pub bus: Option<String>,
    pub seat: Option<u32>,
}

impl ScenarioConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| RegistryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay literal.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RegistryError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn name(&self) -> &str {
        self.registry.name.as_deref().unwrap_or("unnamed")
    }

    /// Replays every creation and registration in file order.
    pub fn build_manager(&self) -> Result<TransportManager> {
        let mut manager = TransportManager::with_policy(self.registry.policy);

        for entry in &self.buses {
            manager.create_bus(&entry.id, entry.seats)?;
        }

        for entry in &self.passengers {
            let passenger = manager.create_passenger(&entry.name, &entry.surname, entry.age)?;
            if let (Some(bus_id), Some(seat)) = (&entry.bus, entry.seat) {
                let bus = manager
                    .bus_by_id(bus_id)?
                    .cloned()
                    .ok_or_else(|| RegistryError::BusNotFound {
                        bus_id: bus_id.clone(),
                    })?;
                manager.register_passenger(&bus, seat, &passenger)?;
            }
        }

        tracing::info!(
            "Scenario '{}' loaded: {} buses, {} passengers",
            self.name(),
            manager.created_buses().len(),
            manager.created_passengers().len()
        );
        Ok(manager)
    }
}

impl Validate for ScenarioConfig {
    fn validate(&self) -> Result<()> {
        let mut declared = HashSet::new();
        for (i, bus) in self.buses.iter().enumerate() {
            validate_non_blank(&format!("buses[{}].id", i), &bus.id)?;
            validate_positive_number(&format!("buses[{}].seats", i), i64::from(bus.seats))?;
            declared.insert(bus.id.as_str());
        }

        for (i, p) in self.passengers.iter().enumerate() {
            validate_non_empty(&format!("passengers[{}].name", i), &p.name)?;
            validate_non_empty(&format!("passengers[{}].surname", i), &p.surname)?;

            match (&p.bus, p.seat) {
                (Some(bus), Some(_)) if !declared.contains(bus.as_str()) => {
                    return Err(RegistryError::ConfigError {
                        message: format!("passengers[{}] references undeclared bus '{}'", i, bus),
                    });
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(RegistryError::ConfigError {
                        message: format!("passengers[{}] needs both 'bus' and 'seat'", i),
                    });
                }
                _ => {}
            }
        }

        if let Some(filter) = &self.filter {
            filter.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
[registry]
name = "morning"

[[buses]]
id = "B1"
seats = 3

[[buses]]
id = "B2"
seats = 2

[[passengers]]
name = "Ann"
surname = "Zeta"
age = 20
bus = "B1"
seat = 1

[[passengers]]
name = "Bob"
surname = "Alpha"
age = 30
bus = "B1"
seat = 2

[[passengers]]
name = "Walker"
surname = "Nobody"
age = 50
"#;

    #[test]
    fn test_parse_and_build() {
        let config = ScenarioConfig::from_toml_str(SCENARIO).unwrap();
        config.validate().unwrap();
        assert_eq!(config.name(), "morning");
        assert_eq!(config.registry.policy, RegistrationPolicy::Strict);

        let manager = config.build_manager().unwrap();
        assert_eq!(manager.created_buses().len(), 2);
        assert_eq!(manager.created_passengers().len(), 3);
        assert_eq!(manager.passengers("B1").unwrap().len(), 2);
        assert!(manager.passengers("B2").is_none());
    }

    #[test]
    fn test_policy_parses_lowercase() {
        let config = ScenarioConfig::from_toml_str("[registry]\npolicy = \"permissive\"\n").unwrap();
        assert_eq!(config.registry.policy, RegistrationPolicy::Permissive);
    }

    #[test]
    fn test_half_specified_seat_is_rejected() {
        let config = ScenarioConfig::from_toml_str(
            r#"
[[buses]]
id = "B1"
seats = 3

[[passengers]]
name = "Ann"
surname = "Zeta"
age = 20
bus = "B1"
"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(RegistryError::ConfigError { .. })));
    }

    #[test]
    fn test_undeclared_bus_is_rejected() {
        let config = ScenarioConfig::from_toml_str(
            r#"
[[passengers]]
name = "Ann"
surname = "Zeta"
age = 20
bus = "B7"
seat = 1
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_surfaces_seat_conflicts() {
        let config = ScenarioConfig::from_toml_str(
            r#"
[[buses]]
id = "B1"
seats = 3

[[passengers]]
name = "Ann"
surname = "Zeta"
age = 20
bus = "B1"
seat = 1

[[passengers]]
name = "Bob"
surname = "Alpha"
age = 30
bus = "B1"
seat = 1
"#,
        )
        .unwrap();
        config.validate().unwrap();
        assert!(matches!(
            config.build_manager(),
            Err(RegistryError::SeatOccupied { seat: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ScenarioConfig::from_toml_str("[[buses]\nid ="),
            Err(RegistryError::ConfigError { .. })
        ));
    }
}

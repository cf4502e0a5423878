pub mod scenario;

pub use scenario::ScenarioConfig;

#[cfg(feature = "cli")]
use crate::core::filters::PassengerFilter;
#[cfg(feature = "cli")]
use crate::core::manager::RegistrationPolicy;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_blank, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bus-registry")]
#[command(about = "Seat passengers on buses and query the registry")]
pub struct CliConfig {
    /// Path to the TOML scenario file
    #[arg(short, long, default_value = "registry.toml")]
    pub config: String,

    /// Report a single bus instead of every bus
    #[arg(long)]
    pub bus: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Override the policy from the scenario file
    #[arg(long, value_enum)]
    pub policy: Option<RegistrationPolicy>,

    #[arg(long, allow_negative_numbers = true)]
    pub min_age: Option<i32>,

    #[arg(long, allow_negative_numbers = true)]
    pub max_age: Option<i32>,

    /// Regex matched against "name surname"
    #[arg(long)]
    pub name_pattern: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Filter built from the command line, if any filter flag was given.
    pub fn filter_override(&self) -> Option<PassengerFilter> {
        let filter = PassengerFilter {
            min_age: self.min_age,
            max_age: self.max_age,
            surname: None,
            name_pattern: self.name_pattern.clone(),
        };
        (!filter.is_empty()).then_some(filter)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_blank("config", &self.config)?;
        if let Some(bus) = &self.bus {
            validate_non_blank("bus", bus)?;
        }
        if let Some(filter) = self.filter_override() {
            filter.validate()?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let config = CliConfig::parse_from([
            "bus-registry",
            "--config",
            "fleet.toml",
            "--bus",
            "B1",
            "--format",
            "json",
            "--policy",
            "permissive",
            "--min-age",
            "18",
        ]);
        assert_eq!(config.config, "fleet.toml");
        assert_eq!(config.bus.as_deref(), Some("B1"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.policy, Some(RegistrationPolicy::Permissive));
        assert_eq!(config.filter_override().unwrap().min_age, Some(18));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_filter_flags_means_no_override() {
        let config = CliConfig::parse_from(["bus-registry"]);
        assert!(config.filter_override().is_none());
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn test_blank_bus_is_invalid() {
        let config = CliConfig::parse_from(["bus-registry", "--bus", " "]);
        assert!(config.validate().is_err());
    }
}

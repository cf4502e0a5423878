use anyhow::Context;
use bus_registry::utils::{logger, validation::Validate};
use bus_registry::{build_report, CliConfig, OutputFormat, RegistryError, ScenarioConfig};
use clap::Parser;

fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting bus-registry CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(&config) {
        tracing::error!("❌ {:#}", e);
        eprintln!("❌ {:#}", e);

        let exit_code = e
            .downcast_ref::<RegistryError>()
            .map_or(1, RegistryError::exit_code);
        std::process::exit(exit_code);
    }
}

fn run(config: &CliConfig) -> anyhow::Result<()> {
    config.validate()?;

    let mut scenario = ScenarioConfig::from_file(&config.config)
        .with_context(|| format!("failed to load scenario '{}'", config.config))?;

    if let Some(policy) = config.policy {
        tracing::info!("🔧 Policy overridden to: {:?}", policy);
        scenario.registry.policy = policy;
    }
    if let Some(filter) = config.filter_override() {
        scenario.filter = Some(filter);
    }

    scenario.validate()?;
    let manager = scenario.build_manager()?;
    let filter = scenario.filter.as_ref().map(|f| f.compile()).transpose()?;

    let bus_ids: Vec<String> = match &config.bus {
        Some(id) => vec![id.clone()],
        None => manager
            .created_buses()
            .iter()
            .map(|bus| bus.id().to_string())
            .collect(),
    };

    let reports = bus_ids
        .iter()
        .map(|id| build_report(&manager, id, filter.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    match config.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports).map_err(RegistryError::from)?);
        }
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report);
            }
        }
    }

    tracing::info!("✅ Reported {} bus(es)", reports.len());
    Ok(())
}

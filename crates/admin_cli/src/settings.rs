use std::path::PathBuf;

use clap::Args;
use engine::{Currency, DEFAULT_PAGE_SIZE, SummaryScope};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/admin.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dataset: PathBuf,
    pub page_size: u32,
    pub currency: String,
    pub log_level: String,
    pub summary_scope: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("fixtures/dashboard.json"),
            page_size: DEFAULT_PAGE_SIZE,
            currency: Currency::default().code().to_string(),
            log_level: "info".to_string(),
            summary_scope: SummaryScope::Filtered.as_str().to_string(),
        }
    }
}

impl Settings {
    pub fn currency(&self) -> Result<Currency> {
        Ok(Currency::try_from(self.currency.as_str())?)
    }

    pub fn summary_scope(&self) -> Result<SummaryScope> {
        Ok(SummaryScope::try_from(self.summary_scope.as_str())?)
    }
}

/// Flags shared by every subcommand. They win over file and environment.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override the dataset path (JSON).
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Override the display currency (NGN, USD, EUR).
    #[arg(long, global = true)]
    currency: Option<String>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

pub fn load(args: &GlobalArgs) -> Result<Settings> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("ECOPICK"));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(dataset) = &args.dataset {
        settings.dataset = dataset.clone();
    }
    if let Some(currency) = &args.currency {
        settings.currency = currency.clone();
    }
    if let Some(level) = &args.log_level {
        settings.log_level = level.clone();
    }

    Ok(settings)
}

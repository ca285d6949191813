use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use edu_core::config::Config;
use edu_core::config::ConfigOverrides;
use edu_core::config::parse_cli_override;

/// Flags every front-end accepts to locate and adjust the configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Page URL that relative endpoints and form actions resolve against.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Home directory holding config.toml, local storage and logs.
    #[arg(long = "home", value_name = "DIR", global = true)]
    pub home: Option<PathBuf>,

    /// Override a config.toml value, e.g. `-c search.debounce_ms=300`.
    #[arg(short = 'c', long = "config", value_name = "key=value", global = true)]
    pub raw_overrides: Vec<String>,
}

impl ConfigArgs {
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let cli_overrides = self
            .raw_overrides
            .iter()
            .map(|raw| parse_cli_override(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let overrides = ConfigOverrides {
            base_url: self.base_url.clone(),
            edu_home: self.home.clone(),
        };
        Ok(Config::load_with_cli_overrides(cli_overrides, overrides)?)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Search endpoint the input queries.
    #[arg(long, value_name = "PATH", default_value = "/api/search")]
    pub endpoint: String,
}

use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vitrine_core::config::{ServerConfig, SiteConfig, StorageConfig};

/// Complete configuration merging CLI args, env vars, the config file,
/// and defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VitrineConfig {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl VitrineConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (VITRINE_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = args
            .get_one::<String>("config")
            .cloned()
            .unwrap_or_else(|| "./vitrine.toml".to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::with_name(&config_file.replace(".toml", "")));
        }

        // 3. Add environment variables with VITRINE_ prefix
        builder = builder.add_source(
            Environment::with_prefix("VITRINE")
                .prefix_separator("_")
                .separator("__"), // Double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        let mut cli_overrides = std::collections::HashMap::new();

        if let Some(host) = args.try_get_one::<String>("host").unwrap_or(None) {
            cli_overrides.insert("server.host".to_string(), host.clone());
        }
        if let Some(port) = args.try_get_one::<String>("port").unwrap_or(None) {
            if let Ok(port_num) = port.parse::<u16>() {
                cli_overrides.insert("server.port".to_string(), port_num.to_string());
            }
        }
        if let Some(data_dir) = args.try_get_one::<String>("data-dir").unwrap_or(None) {
            cli_overrides.insert("storage.data_dir".to_string(), data_dir.clone());
        }
        if let Some(uploads) = args.try_get_one::<String>("uploads-dir").unwrap_or(None) {
            cli_overrides.insert("storage.uploads_dir".to_string(), uploads.clone());
        }
        if let Some(static_dir) = args.try_get_one::<String>("static-dir").unwrap_or(None) {
            cli_overrides.insert("storage.static_dir".to_string(), static_dir.clone());
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(config::Config::try_from(&cli_overrides)?);
        }

        let config = builder.build()?;
        let vitrine_config: VitrineConfig = config.try_deserialize()?;

        Ok(vitrine_config)
    }

    pub fn server_options(&self) -> vitrine_server::ServerOptions {
        vitrine_server::ServerOptions {
            host: self.server.host.clone(),
            port: self.server.port,
            data_dir: self.storage.data_dir.clone().into(),
            uploads_dir: self.storage.uploads_dir.clone().into(),
            static_dir: self.storage.static_dir.clone().into(),
            templates: self.storage.templates.clone(),
            site: self.site.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    #[test]
    fn test_default_config() {
        let config = VitrineConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3576);
        assert_eq!(config.storage.data_dir, "./data");
        assert_eq!(config.storage.uploads_dir, "./public/uploads");
    }

    #[test]
    fn test_cli_args_override() {
        let app = Command::new("test")
            .arg(Arg::new("host").long("host").value_name("HOST"))
            .arg(Arg::new("port").long("port").value_name("PORT"))
            .arg(Arg::new("data-dir").long("data-dir").value_name("DIR"))
            .arg(Arg::new("config").long("config").value_name("FILE"));

        let matches = app
            .try_get_matches_from(vec![
                "test",
                "--port",
                "8080",
                "--data-dir",
                "/srv/vitrine/data",
            ])
            .unwrap();

        let config = VitrineConfig::load(&matches).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.data_dir, "/srv/vitrine/data");
        // Non-overridden values keep their defaults
        assert_eq!(config.server.host, "127.0.0.1");
    }
}

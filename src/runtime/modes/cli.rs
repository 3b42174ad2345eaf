//! CLI mode
//!
//! One-shot commands that reuse the service layer without starting the
//! HTTP server.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::{IpGeoError, Result};
use crate::services::client_ip::{RequestSignals, resolve_client_ip_with_step, validate_ip};
use crate::services::{GeoIpProvider, TrustConfig};

const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// Run a CLI command from clap-parsed input
///
/// `Serve` is not handled here; the caller starts the server for it.
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<()> {
    match cmd {
        Commands::Lookup { ip } => lookup(&ip, config).await,
        Commands::Resolve {
            peer,
            ip,
            cf_connecting_ip,
            x_real_ip,
            x_forwarded_for,
        } => {
            let signals = RequestSignals {
                explicit_ip: ip,
                peer_addr: peer,
                connecting_ip: cf_connecting_ip,
                real_ip: x_real_ip,
                forwarded_for: x_forwarded_for,
            };
            resolve(&signals, &TrustConfig::from_proxy_config(&config.proxy));
            Ok(())
        }
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force),
        Commands::Serve => Err(IpGeoError::configuration(
            "serve must be started through the server mode",
        )),
    }
}

async fn lookup(raw_ip: &str, config: &StaticConfig) -> Result<()> {
    let ip = validate_ip(raw_ip)
        .ok_or_else(|| IpGeoError::invalid_address(format!("'{}' is not an IP address", raw_ip)))?;

    let provider = GeoIpProvider::new(&config.geoip);
    let record = provider.lookup_city(&ip).await?;
    let body = crate::api::services::LookupResponse::new(ip, record);

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn resolve(signals: &RequestSignals, trust: &TrustConfig) {
    println!("{} {}", "Trust:".yellow().bold(), trust.describe());

    match resolve_client_ip_with_step(signals, trust) {
        Some((step, ip)) => {
            let validity = if validate_ip(&ip).is_some() {
                "valid".green()
            } else {
                "invalid".red()
            };
            println!(
                "{} {} {} {}",
                "Client IP:".yellow().bold(),
                ip.white(),
                format!("(from {})", step.name()).dimmed(),
                validity
            );
        }
        None => {
            println!("{} {}", "Client IP:".yellow().bold(), "undetermined".red());
        }
    }
}

fn config_generate(output_path: Option<String>, force: bool) -> Result<()> {
    let path = output_path.unwrap_or_else(|| DEFAULT_SAMPLE_PATH.to_string());

    // 文件已存在且未指定 --force 时交互确认
    if !force && Path::new(&path).exists() {
        print!(
            "{} {} {}",
            "File already exists:".yellow(),
            path.blue(),
            "Overwrite? [y/N] ".yellow()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
    }

    StaticConfig::default().save_to_file(&path)?;
    println!(
        "{} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ipgeo.toml");

        let cmd = Commands::Config {
            action: ConfigCommands::Generate {
                output_path: Some(path.display().to_string()),
                force: true,
            },
        };
        run_cli_command(cmd, &StaticConfig::default()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: StaticConfig = toml::from_str(&written).unwrap();
        assert_eq!(parsed.server.port, 8000);
    }

    #[tokio::test]
    async fn test_lookup_rejects_invalid_ip() {
        let cmd = Commands::Lookup {
            ip: "not-an-ip".to_string(),
        };
        let err = run_cli_command(cmd, &StaticConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IpGeoError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_lookup_without_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StaticConfig::default();
        config.geoip.database_path = dir.path().join("absent.mmdb").display().to_string();

        let cmd = Commands::Lookup {
            ip: "8.8.8.8".to_string(),
        };
        let err = run_cli_command(cmd, &config).await.unwrap_err();
        assert!(matches!(err, IpGeoError::DatabaseUnavailable(_)));
    }
}

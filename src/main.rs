use clap::Parser;
use std::process::ExitCode;

use ipgeo::cli::Cli;
use ipgeo::config::init_config;
use ipgeo::runtime::modes::{self, Mode};

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = init_config(cli.config.as_deref());

    match modes::detect_mode(cli.command) {
        #[cfg(feature = "server")]
        Mode::Server => {
            let _guard = match ipgeo::system::logging::init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    return ExitCode::FAILURE;
                }
            };

            if let Err(e) = modes::run_server(&config).await {
                tracing::error!("Server error: {:#}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        #[cfg(feature = "cli")]
        Mode::Cli(cmd) => match modes::run_cli_command(cmd, &config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e.format_simple());
                ExitCode::FAILURE
            }
        },
        Mode::Unknown => {
            eprintln!("This command is not available: ipgeo was built without the required feature");
            ExitCode::FAILURE
        }
    }
}

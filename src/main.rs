use clap::Parser;
use stockex::adapter::inbound::cli::command::Cli;
use stockex::adapter::inbound::cli::output::{self, OutputConfig};
use stockex::adapter::inbound::cli::run;
use stockex::infrastructure::config::settings::Config;
use tracing::{debug, error};

fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose), cli.color);

    let mut config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::error(&format!("Failed to load config: {e}"));
            std::process::exit(run::exit_code(&e));
        }
    };

    match cli.verbose {
        0 => {}
        1 => config.logging = config.logging.with_level("info"),
        2 => config.logging = config.logging.with_level("debug"),
        _ => config.logging = config.logging.with_level("trace"),
    }
    config.init_logging();
    debug!(config = %cli.config.display(), "stockex starting");

    if let Err(e) = run::execute(&cli, &config) {
        error!(error = %e, "Command failed");
        output::error(&e.to_string());
        std::process::exit(run::exit_code(&e));
    }
}

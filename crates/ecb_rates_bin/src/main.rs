use clap::Parser;
use clap::error::ErrorKind;
use log::{error, info};
use std::process::exit;

use cli::Cli;
use config::Config;

mod cli;
mod config;
mod pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            exit(0);
        }
        Err(e) => {
            let _ = cli::write_usage(&e, &mut std::io::stderr());
            exit(1);
        }
    };

    let config = Config::new();
    info!(
        "Starting [{}] process, data dir: {}",
        cli.mode,
        config.data_dir.display()
    );

    match pipeline::run(&config, cli.mode).await {
        Ok(summary) => summary.report(),
        Err(e) => {
            error!("Error: {:#}", e);
            exit(1);
        }
    }
}

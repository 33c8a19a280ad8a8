use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = pathonet::cli::Cli::parse();
    tokio::select! {
        result = pathonet::cli::run(cli) => match result {
            Ok(output) => {
                println!("{}", output.text);
                if output.success {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(1)
                }
            }
            Err(err) => {
                if let Some(app_err) = err.downcast_ref::<pathonet::error::PathoNetError>() {
                    eprintln!("Error: {app_err}");
                } else {
                    eprintln!("Error: {err}");
                }
                ExitCode::from(1)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted");
            ExitCode::from(130)
        }
    }
}

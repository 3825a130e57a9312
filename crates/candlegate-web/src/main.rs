use std::process::ExitCode;

use candlegate_web::{ServerConfig, ServerError};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();

    if let Err(error) = init_tracing(&config.log_filter) {
        eprintln!("error: {error}");
        return ExitCode::from(error.exit_code());
    }

    match candlegate_web::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "candlegate stopped");
            ExitCode::from(error.exit_code())
        }
    }
}

fn init_tracing(filter: &str) -> Result<(), ServerError> {
    let filter = EnvFilter::try_new(filter).map_err(|e| ServerError::InvalidLogFilter {
        value: filter.to_owned(),
        message: e.to_string(),
    })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

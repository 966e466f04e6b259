mod config;
mod contracts;
mod demo;
mod dispatcher;
mod identity;
mod rpc;
mod session;

use anyhow::Result;
use tracing::{error, info};

use config::Settings;
use session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("=== Payment Gateway Dispatch ===");

    // Missing secrets or contract ids abort before anything touches the network
    let settings = Settings::from_env()?;
    info!(network = ?settings.network, "Loaded configuration");

    let session = Session::connect(&settings)?;
    let dispatcher = session.dispatcher();
    info!(
        rpc = %dispatcher.network().rpc_url(),
        account = %dispatcher.identity().account_id(),
        gateway = %session.gateway_contract().contract_id(),
        token = %settings.token_contract_id,
        "Session ready"
    );

    let Some(demo_settings) = &settings.demo else {
        info!("Demo sequence disabled, set {}=1 to run it", config::ENV_RUN_DEMO);
        return Ok(());
    };

    match demo::run(&session, demo_settings).await {
        Ok(submissions) => {
            for submission in &submissions {
                info!("{}", serde_json::to_string(submission)?);
            }
        }
        Err(err) => error!("Error: {:#}", err),
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

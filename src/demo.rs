//! The fixed example sequence, run against a live gateway
//!
//! Each step depends on the on-chain effect of the one before it, so the
//! steps run one at a time and the first failure ends the run.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::DemoSettings;
use crate::dispatcher::Submission;
use crate::rpc::Network;
use crate::session::Session;

/// 10 tokens at 7 decimal places
pub const DEMO_AMOUNT: i128 = 10 * 10i128.pow(7);
/// 30 days in seconds
pub const DEMO_INTERVAL: u32 = 2_592_000;
pub const DEMO_ID: u32 = 1;

pub async fn run<N: Network>(session: &Session<N>, demo: &DemoSettings) -> Result<Vec<Submission>> {
    let gateway = session.gateway();
    let token = session.token();
    let gateway_id = session.gateway_contract().contract_id();
    let mut submissions = Vec::new();

    submissions.push(gateway.init_gateway().await.context("init")?);
    submissions.push(
        token
            .approve_token(&gateway_id, DEMO_AMOUNT)
            .await
            .context("approve")?,
    );
    submissions.push(
        gateway
            .add_merchant(&demo.merchant)
            .await
            .context("add_merchant")?,
    );
    submissions.push(
        gateway
            .create_payment_link(DEMO_AMOUNT, "Demo Link")
            .await
            .context("create_payment_link")?,
    );
    submissions.push(
        gateway
            .process_payment(DEMO_ID)
            .await
            .context("process_payment")?,
    );
    submissions.push(
        gateway
            .create_subscription_plan(DEMO_AMOUNT, DEMO_INTERVAL, "Monthly Plan")
            .await
            .context("create_subscription_plan")?,
    );
    submissions.push(gateway.subscribe(DEMO_ID).await.context("subscribe")?);
    submissions.push(
        gateway
            .process_subscription_payment(&demo.subscriber, DEMO_ID)
            .await
            .context("process_subscription_payment")?,
    );
    submissions.push(
        gateway
            .cancel_subscription(DEMO_ID)
            .await
            .context("cancel_subscription")?,
    );
    submissions.push(
        gateway
            .deactivate_payment_link(DEMO_ID)
            .await
            .context("deactivate_payment_link")?,
    );
    submissions.push(
        gateway
            .deactivate_subscription_plan(DEMO_ID)
            .await
            .context("deactivate_subscription_plan")?,
    );
    submissions.push(
        gateway
            .remove_merchant(&demo.merchant)
            .await
            .context("remove_merchant")?,
    );

    info!("Demo sequence submitted {} transactions", submissions.len());
    Ok(submissions)
}

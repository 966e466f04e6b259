use anyhow::{Context, Result};
use async_trait::async_trait;
use stellar_rpc_client::{Client, SimulateTransactionResponse};
use stellar_xdr::curr::{
    AccountEntry, ExtensionPoint, Hash, Limits, OperationBody, ReadXdr, SorobanAuthorizationEntry,
    SorobanTransactionData, Transaction, TransactionEnvelope, TransactionExt,
    TransactionV1Envelope, VecM,
};

/// The network calls a dispatch needs
///
/// Implemented by [`SorobanRpc`] for a live endpoint and by recording fakes in tests.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch the current ledger entry of an account (`G...`)
    async fn get_account(&self, account_id: &str) -> Result<AccountEntry>;

    /// Simulate an unsigned transaction to learn its resources and fees
    async fn simulate_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<SimulateTransactionResponse>;

    /// Submit a signed envelope, returning the transaction hash
    async fn send_transaction(&self, envelope: &TransactionEnvelope) -> Result<Hash>;
}

/// Soroban RPC client bound to one endpoint
pub struct SorobanRpc {
    client: Client,
    rpc_url: String,
}

impl SorobanRpc {
    /// Create a new RPC client instance
    ///
    /// # Arguments
    /// * `rpc_url` - The Soroban RPC endpoint URL (e.g., "https://rpc-futurenet.stellar.org")
    pub fn new(rpc_url: &str) -> Result<Self> {
        let client = Client::new(rpc_url)
            .with_context(|| format!("Failed to create RPC client for {}", rpc_url))?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl Network for SorobanRpc {
    async fn get_account(&self, account_id: &str) -> Result<AccountEntry> {
        self.client
            .get_account(account_id)
            .await
            .with_context(|| format!("Failed to load account {}", account_id))
    }

    async fn simulate_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<SimulateTransactionResponse> {
        // Simulation takes an envelope, signatures are not required
        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: transaction.clone(),
            signatures: VecM::default(),
        });

        self.client
            .simulate_transaction_envelope(&envelope)
            .await
            .context("Failed to simulate transaction")
    }

    async fn send_transaction(&self, envelope: &TransactionEnvelope) -> Result<Hash> {
        self.client
            .send_transaction(envelope)
            .await
            .context("Failed to submit transaction")
    }
}

/// Apply simulation results to a transaction
///
/// Installs the Soroban resource footprint, the authorization entries of the
/// first result, and raises the fee to `base_fee + min_resource_fee`.
pub fn apply_simulation(
    mut transaction: Transaction,
    simulation: &SimulateTransactionResponse,
    base_fee: u32,
) -> Result<Transaction> {
    if let Some(error) = &simulation.error {
        anyhow::bail!("Transaction simulation failed: {}", error);
    }

    let first_result = simulation
        .results
        .first()
        .context("No simulation results found")?;

    if simulation.transaction_data.is_empty() {
        anyhow::bail!("No transaction data in simulation response");
    }

    let soroban_tx_data =
        SorobanTransactionData::from_xdr_base64(&simulation.transaction_data, Limits::none())
            .context("Failed to parse soroban transaction data")?;

    if !first_result.auth.is_empty() {
        let auth_entries = first_result
            .auth
            .iter()
            .map(|xdr| SorobanAuthorizationEntry::from_xdr_base64(xdr, Limits::none()))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to parse authorization entries")?;

        let mut operations: Vec<_> = transaction.operations.to_vec();
        if let Some(operation) = operations.get_mut(0) {
            if let OperationBody::InvokeHostFunction(ref mut invoke_op) = operation.body {
                invoke_op.auth = auth_entries
                    .try_into()
                    .context("Failed to convert auth entries")?;
            }
        }
        transaction.operations = operations.try_into()?;
    }

    transaction.ext = TransactionExt::V1(SorobanTransactionData {
        ext: ExtensionPoint::V0,
        resources: soroban_tx_data.resources,
        resource_fee: soroban_tx_data.resource_fee,
    });

    let fee = u64::from(base_fee) + simulation.min_resource_fee as u64;
    transaction.fee = u32::try_from(fee).context("Simulated fee does not fit in u32")?;

    Ok(transaction)
}

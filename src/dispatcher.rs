use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    Hash, Limits, Memo, Preconditions, SequenceNumber, TimeBounds, TimePoint, Transaction,
    TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, WriteXdr,
};
use tracing::{debug, info};

use crate::contracts::ContractCall;
use crate::identity::Identity;
use crate::rpc::{self, Network};

/// Inclusion fee in stroops, the network minimum
pub const BASE_FEE: u32 = 100;

/// Validity window of a submitted transaction
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-transaction parameters shared by every dispatch
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub network_passphrase: String,
    pub base_fee: u32,
    /// Zero leaves the transaction without an upper time bound
    pub timeout: Duration,
    /// Simulate before signing and apply the returned resources and fee
    pub preflight: bool,
}

impl DispatchOptions {
    pub fn new(network_passphrase: &str) -> Self {
        Self {
            network_passphrase: network_passphrase.to_string(),
            base_fee: BASE_FEE,
            timeout: DEFAULT_TIMEOUT,
            preflight: false,
        }
    }
}

/// What the network handed back for one submitted call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub hash: String,
    pub contract_id: String,
    pub function_name: String,
}

/// Builds, signs and submits one transaction per contract call
pub struct Dispatcher<N> {
    network: N,
    identity: Identity,
    options: DispatchOptions,
}

impl<N: Network> Dispatcher<N> {
    pub fn new(network: N, identity: Identity, options: DispatchOptions) -> Self {
        Self {
            network,
            identity,
            options,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Submit `call` as a single-operation transaction and return its hash
    ///
    /// The submission is not polled; the hash only means the network accepted it.
    pub async fn send_contract_call(&self, call: ContractCall) -> Result<Submission> {
        info!(
            contract = %call.contract.contract_id(),
            function = %call.function_name,
            "Dispatching contract call"
        );

        let envelope = self.build_signed_envelope(&call).await?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let xdr = envelope.to_xdr_base64(Limits::none())?;
            debug!(%xdr, "Signed envelope");
        }

        let hash = self.network.send_transaction(&envelope).await?;
        let hash = hex::encode(hash.0);
        info!("TX hash: {}", hash);

        Ok(Submission {
            hash,
            contract_id: call.contract.contract_id(),
            function_name: call.function_name,
        })
    }

    /// Load the account, build the transaction and sign it, without submitting
    pub async fn build_signed_envelope(&self, call: &ContractCall) -> Result<TransactionEnvelope> {
        // Always reload: the sequence number moves with every accepted transaction
        let account_id = self.identity.account_id();
        let account = self.network.get_account(&account_id).await?;
        let sequence = account.seq_num.0 + 1;
        debug!(account = %account_id, sequence, "Loaded source account");

        let mut transaction = Transaction {
            source_account: self.identity.muxed_account(),
            fee: self.options.base_fee,
            seq_num: SequenceNumber(sequence),
            cond: self.preconditions()?,
            memo: Memo::None,
            operations: vec![call.to_operation()?].try_into()?,
            ext: TransactionExt::V0,
        };

        if self.options.preflight {
            let simulation = self.network.simulate_transaction(&transaction).await?;
            transaction = rpc::apply_simulation(transaction, &simulation, self.options.base_fee)?;
            debug!(fee = transaction.fee, "Applied simulation results");
        }

        let tx_hash = transaction_hash(&transaction, &self.options.network_passphrase)?;
        let signature = self.identity.sign_hash(&tx_hash)?;

        Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: transaction,
            signatures: vec![signature].try_into()?,
        }))
    }

    fn preconditions(&self) -> Result<Preconditions> {
        if self.options.timeout.is_zero() {
            return Ok(Preconditions::None);
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before the unix epoch")?;
        let max_time = now
            .checked_add(self.options.timeout)
            .context("Transaction timeout overflows the clock")?
            .as_secs();

        Ok(Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(max_time),
        }))
    }
}

/// The network id is the SHA-256 of the passphrase
pub fn network_id(network_passphrase: &str) -> Hash {
    Hash(Sha256::digest(network_passphrase.as_bytes()).into())
}

/// Hash signed by the source account, binding the transaction to one network
pub fn transaction_hash(transaction: &Transaction, network_passphrase: &str) -> Result<[u8; 32]> {
    let payload = TransactionSignaturePayload {
        network_id: network_id(network_passphrase),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(transaction.clone()),
    };
    let bytes = payload
        .to_xdr(Limits::none())
        .context("Failed to encode signature payload")?;

    Ok(Sha256::digest(&bytes).into())
}

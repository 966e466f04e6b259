use anyhow::Result;

use crate::config::Settings;
use crate::contracts::gateway::Gateway;
use crate::contracts::token::Token;
use crate::contracts::ContractHandle;
use crate::dispatcher::{DispatchOptions, Dispatcher};
use crate::identity::Identity;
use crate::rpc::{Network, SorobanRpc};

/// Everything a contract call needs: the dispatcher and both contract handles
pub struct Session<N> {
    dispatcher: Dispatcher<N>,
    gateway: ContractHandle,
    token: ContractHandle,
}

impl Session<SorobanRpc> {
    /// Connect to the configured RPC endpoint with the configured identity
    pub fn connect(settings: &Settings) -> Result<Self> {
        let network = SorobanRpc::new(&settings.rpc_url)?;
        let identity = Identity::from_secret(settings.secret_key.expose())?;
        let gateway = ContractHandle::from_strkey(&settings.gateway_contract_id)?;
        let token = ContractHandle::from_strkey(&settings.token_contract_id)?;

        let options = DispatchOptions {
            base_fee: settings.base_fee,
            timeout: settings.tx_timeout,
            preflight: settings.preflight,
            ..DispatchOptions::new(&settings.network_passphrase)
        };

        Ok(Self::new(
            Dispatcher::new(network, identity, options),
            gateway,
            token,
        ))
    }
}

impl<N: Network> Session<N> {
    pub fn new(dispatcher: Dispatcher<N>, gateway: ContractHandle, token: ContractHandle) -> Self {
        Self {
            dispatcher,
            gateway,
            token,
        }
    }

    pub fn gateway(&self) -> Gateway<'_, N> {
        Gateway::new(&self.dispatcher, &self.gateway, &self.token)
    }

    pub fn token(&self) -> Token<'_, N> {
        Token::new(&self.dispatcher, &self.token)
    }

    pub fn dispatcher(&self) -> &Dispatcher<N> {
        &self.dispatcher
    }

    pub fn gateway_contract(&self) -> &ContractHandle {
        &self.gateway
    }
}

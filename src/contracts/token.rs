use anyhow::Result;
use tracing::info;

use super::{args, ContractCall, ContractHandle};
use crate::dispatcher::{Dispatcher, Submission};
use crate::rpc::Network;

/// Expiration ledger sent with every approval
pub const APPROVAL_EXPIRATION_LEDGER: u32 = 0;

/// Fungible token contract client
pub struct Token<'a, N> {
    dispatcher: &'a Dispatcher<N>,
    contract: &'a ContractHandle,
}

impl<'a, N: Network> Token<'a, N> {
    pub fn new(dispatcher: &'a Dispatcher<N>, contract: &'a ContractHandle) -> Self {
        Self {
            dispatcher,
            contract,
        }
    }

    /// `approve(from, spender, amount, expiration_ledger)`
    ///
    /// The spender may be an account or a contract, e.g. the gateway itself.
    pub fn approve_call(&self, spender: &str, amount: i128) -> Result<ContractCall> {
        Ok(self.contract.call(
            "approve",
            vec![
                self.dispatcher.identity().to_sc_val(),
                args::address(spender)?,
                args::i256(amount),
                args::u32(APPROVAL_EXPIRATION_LEDGER),
            ],
        ))
    }

    pub async fn approve_token(&self, spender: &str, amount: i128) -> Result<Submission> {
        info!("Approve Token...");
        self.dispatcher
            .send_contract_call(self.approve_call(spender, amount)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::DispatchOptions;
    use crate::identity::Identity;
    use crate::rpc::testing::{
        account_strkey, contract_strkey, test_secret, FakeNetwork, TEST_PASSPHRASE,
    };
    use stellar_xdr::curr::ScVal;

    fn dispatcher() -> Result<Dispatcher<FakeNetwork>> {
        let identity = Identity::from_secret(&test_secret())?;
        Ok(Dispatcher::new(
            FakeNetwork::new(0),
            identity,
            DispatchOptions::new(TEST_PASSPHRASE),
        ))
    }

    #[test]
    fn test_approve_targets_approve_on_token() -> Result<()> {
        let dispatcher = dispatcher()?;
        let contract = ContractHandle::from_strkey(&contract_strkey(20))?;
        let call = Token::new(&dispatcher, &contract).approve_call(&contract_strkey(10), 1)?;

        assert_eq!(call.function_name, "approve");
        assert_eq!(call.contract, contract);
        assert_eq!(call.args[0], dispatcher.identity().to_sc_val());
        assert_eq!(call.args[1], args::address(&contract_strkey(10))?);

        Ok(())
    }

    #[test]
    fn test_approve_always_sends_zero_expiration() -> Result<()> {
        let dispatcher = dispatcher()?;
        let contract = ContractHandle::from_strkey(&contract_strkey(20))?;
        let token = Token::new(&dispatcher, &contract);

        for amount in [0, 1, 10 * 10i128.pow(7), i128::MAX, -5] {
            let call = token.approve_call(&account_strkey(4), amount)?;
            assert_eq!(call.args.len(), 4);
            assert_eq!(call.args[2], args::i256(amount));
            assert_eq!(call.args[3], ScVal::U32(0));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_approve_token_submits_once() -> Result<()> {
        let dispatcher = dispatcher()?;
        let contract = ContractHandle::from_strkey(&contract_strkey(20))?;

        let submission = Token::new(&dispatcher, &contract)
            .approve_token(&contract_strkey(10), 100)
            .await?;

        assert_eq!(submission.function_name, "approve");
        assert_eq!(submission.contract_id, contract_strkey(20));
        assert_eq!(dispatcher.network().submitted().len(), 1);

        Ok(())
    }
}

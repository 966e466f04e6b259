use anyhow::Result;
use stellar_xdr::curr::ScVal;
use tracing::info;

use super::{args, ContractCall, ContractHandle};
use crate::dispatcher::{Dispatcher, Submission};
use crate::rpc::Network;

/// Payment gateway contract client
///
/// Every entry point takes the caller's own address as its first argument.
pub struct Gateway<'a, N> {
    dispatcher: &'a Dispatcher<N>,
    contract: &'a ContractHandle,
    token: &'a ContractHandle,
}

impl<'a, N: Network> Gateway<'a, N> {
    /// # Arguments
    /// * `dispatcher` - Signs and submits the calls
    /// * `contract` - The gateway contract
    /// * `token` - The token contract the gateway settles in, passed to `init`
    pub fn new(
        dispatcher: &'a Dispatcher<N>,
        contract: &'a ContractHandle,
        token: &'a ContractHandle,
    ) -> Self {
        Self {
            dispatcher,
            contract,
            token,
        }
    }

    fn caller(&self) -> ScVal {
        self.dispatcher.identity().to_sc_val()
    }

    fn call(&self, function_name: &str, args: Vec<ScVal>) -> ContractCall {
        let mut all_args = Vec::with_capacity(args.len() + 1);
        all_args.push(self.caller());
        all_args.extend(args);
        self.contract.call(function_name, all_args)
    }

    /// `init(admin, token)`
    pub fn init_call(&self) -> ContractCall {
        self.call("init", vec![ScVal::Address(self.token.sc_address())])
    }

    pub async fn init_gateway(&self) -> Result<Submission> {
        info!("Init Gateway...");
        self.dispatcher.send_contract_call(self.init_call()).await
    }

    /// `add_merchant(admin, merchant)`
    pub fn add_merchant_call(&self, merchant: &str) -> Result<ContractCall> {
        Ok(self.call("add_merchant", vec![args::address(merchant)?]))
    }

    pub async fn add_merchant(&self, merchant: &str) -> Result<Submission> {
        info!("Add Merchant...");
        self.dispatcher
            .send_contract_call(self.add_merchant_call(merchant)?)
            .await
    }

    /// `remove_merchant(admin, merchant)`
    pub fn remove_merchant_call(&self, merchant: &str) -> Result<ContractCall> {
        Ok(self.call("remove_merchant", vec![args::address(merchant)?]))
    }

    pub async fn remove_merchant(&self, merchant: &str) -> Result<Submission> {
        info!("Remove Merchant...");
        self.dispatcher
            .send_contract_call(self.remove_merchant_call(merchant)?)
            .await
    }

    /// `create_payment_link(merchant, amount, description)`
    pub fn create_payment_link_call(&self, amount: i128, description: &str) -> Result<ContractCall> {
        Ok(self.call(
            "create_payment_link",
            vec![args::i256(amount), args::symbol(description)?],
        ))
    }

    pub async fn create_payment_link(&self, amount: i128, description: &str) -> Result<Submission> {
        info!("Create Payment Link...");
        self.dispatcher
            .send_contract_call(self.create_payment_link_call(amount, description)?)
            .await
    }

    /// `process_payment(payer, link_id)`
    pub fn process_payment_call(&self, link_id: u32) -> ContractCall {
        self.call("process_payment", vec![args::u32(link_id)])
    }

    pub async fn process_payment(&self, link_id: u32) -> Result<Submission> {
        info!("Process Payment...");
        self.dispatcher
            .send_contract_call(self.process_payment_call(link_id))
            .await
    }

    /// `create_subscription_plan(merchant, amount, interval, name)`
    pub fn create_subscription_plan_call(
        &self,
        amount: i128,
        interval: u32,
        name: &str,
    ) -> Result<ContractCall> {
        Ok(self.call(
            "create_subscription_plan",
            vec![args::i256(amount), args::u32(interval), args::symbol(name)?],
        ))
    }

    pub async fn create_subscription_plan(
        &self,
        amount: i128,
        interval: u32,
        name: &str,
    ) -> Result<Submission> {
        info!("Create Subscription Plan...");
        self.dispatcher
            .send_contract_call(self.create_subscription_plan_call(amount, interval, name)?)
            .await
    }

    /// `subscribe(subscriber, plan_id)`
    pub fn subscribe_call(&self, plan_id: u32) -> ContractCall {
        self.call("subscribe", vec![args::u32(plan_id)])
    }

    pub async fn subscribe(&self, plan_id: u32) -> Result<Submission> {
        info!("Subscribe...");
        self.dispatcher
            .send_contract_call(self.subscribe_call(plan_id))
            .await
    }

    /// `process_subscription_payment(merchant, subscriber, subscription_id)`
    pub fn process_subscription_payment_call(
        &self,
        subscriber: &str,
        subscription_id: u32,
    ) -> Result<ContractCall> {
        Ok(self.call(
            "process_subscription_payment",
            vec![args::address(subscriber)?, args::u32(subscription_id)],
        ))
    }

    pub async fn process_subscription_payment(
        &self,
        subscriber: &str,
        subscription_id: u32,
    ) -> Result<Submission> {
        info!("Process Subscription Payment...");
        self.dispatcher
            .send_contract_call(self.process_subscription_payment_call(subscriber, subscription_id)?)
            .await
    }

    /// `cancel_subscription(subscriber, subscription_id)`
    pub fn cancel_subscription_call(&self, subscription_id: u32) -> ContractCall {
        self.call("cancel_subscription", vec![args::u32(subscription_id)])
    }

    pub async fn cancel_subscription(&self, subscription_id: u32) -> Result<Submission> {
        info!("Cancel Subscription...");
        self.dispatcher
            .send_contract_call(self.cancel_subscription_call(subscription_id))
            .await
    }

    /// `deactivate_payment_link(merchant, link_id)`
    pub fn deactivate_payment_link_call(&self, link_id: u32) -> ContractCall {
        self.call("deactivate_payment_link", vec![args::u32(link_id)])
    }

    pub async fn deactivate_payment_link(&self, link_id: u32) -> Result<Submission> {
        info!("Deactivate Payment Link...");
        self.dispatcher
            .send_contract_call(self.deactivate_payment_link_call(link_id))
            .await
    }

    /// `deactivate_subscription_plan(merchant, plan_id)`
    pub fn deactivate_subscription_plan_call(&self, plan_id: u32) -> ContractCall {
        self.call("deactivate_subscription_plan", vec![args::u32(plan_id)])
    }

    pub async fn deactivate_subscription_plan(&self, plan_id: u32) -> Result<Submission> {
        info!("Deactivate Subscription Plan...");
        self.dispatcher
            .send_contract_call(self.deactivate_subscription_plan_call(plan_id))
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
    use stellar_xdr::curr::{
        Hash, HostFunction, OperationBody, ScAddress, TransactionEnvelope,
    };

    struct Fixture {
        dispatcher: Dispatcher<FakeNetwork>,
        gateway: ContractHandle,
        token: ContractHandle,
    }

    impl Fixture {
        fn new(network: FakeNetwork) -> Result<Self> {
            let identity = Identity::from_secret(&test_secret())?;
            Ok(Self {
                dispatcher: Dispatcher::new(network, identity, DispatchOptions::new(TEST_PASSPHRASE)),
                gateway: ContractHandle::from_strkey(&contract_strkey(10))?,
                token: ContractHandle::from_strkey(&contract_strkey(20))?,
            })
        }

        fn client(&self) -> Gateway<'_, FakeNetwork> {
            Gateway::new(&self.dispatcher, &self.gateway, &self.token)
        }

        fn caller(&self) -> ScVal {
            self.dispatcher.identity().to_sc_val()
        }
    }

    fn all_calls(gateway: &Gateway<'_, FakeNetwork>) -> Result<Vec<ContractCall>> {
        let merchant = account_strkey(1);
        Ok(vec![
            gateway.init_call(),
            gateway.add_merchant_call(&merchant)?,
            gateway.remove_merchant_call(&merchant)?,
            gateway.create_payment_link_call(5, "Demo")?,
            gateway.process_payment_call(1),
            gateway.create_subscription_plan_call(5, 60, "Plan")?,
            gateway.subscribe_call(1),
            gateway.process_subscription_payment_call(&account_strkey(2), 1)?,
            gateway.cancel_subscription_call(1),
            gateway.deactivate_payment_link_call(1),
            gateway.deactivate_subscription_plan_call(1),
        ])
    }

    #[test]
    fn test_entry_point_names() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::new(0))?;
        let names: Vec<_> = all_calls(&fixture.client())?
            .into_iter()
            .map(|call| call.function_name)
            .collect();

        assert_eq!(
            names,
            vec![
                "init",
                "add_merchant",
                "remove_merchant",
                "create_payment_link",
                "process_payment",
                "create_subscription_plan",
                "subscribe",
                "process_subscription_payment",
                "cancel_subscription",
                "deactivate_payment_link",
                "deactivate_subscription_plan",
            ]
        );

        Ok(())
    }

    #[test]
    fn test_caller_is_first_argument_and_gateway_is_target() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::new(0))?;
        for call in all_calls(&fixture.client())? {
            assert_eq!(call.args.first(), Some(&fixture.caller()), "{}", call.function_name);
            assert_eq!(call.contract, fixture.gateway, "{}", call.function_name);
        }

        Ok(())
    }

    #[test]
    fn test_init_passes_token_contract_address() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::new(0))?;
        let call = fixture.client().init_call();

        assert_eq!(
            call.args,
            vec![
                fixture.caller(),
                ScVal::Address(ScAddress::Contract(Hash([20u8; 32]))),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_payment_link_encodes_amount_and_description() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::new(0))?;
        let amount = 10 * 10i128.pow(7);
        let call = fixture
            .client()
            .create_payment_link_call(amount, "Demo Link")?;

        assert_eq!(
            call.args,
            vec![fixture.caller(), args::i256(amount), args::symbol("Demo Link")?]
        );

        Ok(())
    }

    #[test]
    fn test_subscription_plan_keeps_argument_types() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::new(0))?;
        let call = fixture
            .client()
            .create_subscription_plan_call(-3, u32::MAX, "Monthly Plan")?;

        assert_eq!(call.args.len(), 4);
        assert!(matches!(call.args[1], ScVal::I256(_)));
        assert_eq!(call.args[1], args::i256(-3));
        assert_eq!(call.args[2], ScVal::U32(u32::MAX));
        assert!(matches!(call.args[3], ScVal::Symbol(_)));

        Ok(())
    }

    #[test]
    fn test_id_wrappers_pass_u32() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::new(0))?;
        let gateway = fixture.client();

        for call in [
            gateway.process_payment_call(7),
            gateway.subscribe_call(7),
            gateway.cancel_subscription_call(7),
            gateway.deactivate_payment_link_call(7),
            gateway.deactivate_subscription_plan_call(7),
        ] {
            assert_eq!(call.args, vec![fixture.caller(), ScVal::U32(7)]);
        }

        let call = gateway.process_subscription_payment_call(&account_strkey(2), 9)?;
        assert_eq!(
            call.args,
            vec![fixture.caller(), args::address(&account_strkey(2))?, ScVal::U32(9)]
        );

        Ok(())
    }

    #[test]
    fn test_malformed_merchant_address_fails_without_dispatch() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::new(0))?;

        assert!(fixture.client().add_merchant_call("<merchant-pub-key>").is_err());
        assert_eq!(fixture.dispatcher.network().account_fetch_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_merchant_dispatches_one_transaction() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::new(100))?;
        let merchant = account_strkey(1);

        let submission = fixture.client().add_merchant(&merchant).await?;
        assert_eq!(submission.function_name, "add_merchant");

        let network = fixture.dispatcher.network();
        assert_eq!(network.account_fetch_count(), 1);
        let submitted = network.submitted();
        assert_eq!(submitted.len(), 1);

        let TransactionEnvelope::Tx(envelope) = &submitted[0] else {
            panic!("expected a v1 envelope");
        };
        assert_eq!(envelope.tx.seq_num.0, 101);
        assert_eq!(envelope.tx.operations.len(), 1);

        let OperationBody::InvokeHostFunction(op) = &envelope.tx.operations[0].body else {
            panic!("expected an invoke host function operation");
        };
        let HostFunction::InvokeContract(invoke) = &op.host_function else {
            panic!("expected a contract invocation");
        };
        assert_eq!(invoke.contract_address, fixture.gateway.sc_address());
        assert_eq!(invoke.function_name.to_utf8_string_lossy(), "add_merchant");
        assert_eq!(
            invoke.args.to_vec(),
            vec![fixture.caller(), args::address(&merchant)?]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_network_rejects_wrapper() -> Result<()> {
        let fixture = Fixture::new(FakeNetwork::unreachable())?;

        let result = fixture.client().add_merchant(&account_strkey(1)).await;

        assert!(result.is_err());
        assert!(fixture.dispatcher.network().submitted().is_empty());

        Ok(())
    }
}

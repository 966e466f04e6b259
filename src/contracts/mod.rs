pub mod args;
pub mod gateway;
pub mod token;

use anyhow::{Context, Result};
use stellar_strkey::Contract;
use stellar_xdr::curr::{
    Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Operation, OperationBody,
    ScAddress, ScSymbol, ScVal, VecM,
};

/// A deployed contract, addressed by its `C...` id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    contract_id: Contract,
}

impl ContractHandle {
    pub fn from_strkey(contract_id: &str) -> Result<Self> {
        let contract_id = Contract::from_string(contract_id)
            .with_context(|| format!("Failed to parse contract address {}", contract_id))?;
        Ok(Self { contract_id })
    }

    pub fn contract_id(&self) -> String {
        self.contract_id.to_string()
    }

    pub fn sc_address(&self) -> ScAddress {
        ScAddress::Contract(Hash(self.contract_id.0))
    }

    /// Bind an entry point and its arguments to this contract
    pub fn call(&self, function_name: &str, args: Vec<ScVal>) -> ContractCall {
        ContractCall {
            contract: self.clone(),
            function_name: function_name.to_string(),
            args,
        }
    }
}

/// One invocation of a contract entry point, not yet wrapped in a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    pub contract: ContractHandle,
    pub function_name: String,
    pub args: Vec<ScVal>,
}

impl ContractCall {
    /// Build the invoke-host-function operation for this call
    ///
    /// Authorization entries are left empty; they are only filled in by preflight.
    pub fn to_operation(&self) -> Result<Operation> {
        let function_name = ScSymbol(
            self.function_name
                .as_str()
                .try_into()
                .context("Function name too long")?,
        );
        let args: VecM<ScVal> = self
            .args
            .clone()
            .try_into()
            .context("Too many contract call arguments")?;

        let invoke_args = InvokeContractArgs {
            contract_address: self.contract.sc_address(),
            function_name,
            args,
        };

        Ok(Operation {
            source_account: None,
            body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
                host_function: HostFunction::InvokeContract(invoke_args),
                auth: VecM::default(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::{account_strkey, contract_strkey};

    #[test]
    fn test_contract_handle_round_trips_id() -> Result<()> {
        let id = contract_strkey(3);
        let handle = ContractHandle::from_strkey(&id)?;

        assert_eq!(handle.contract_id(), id);
        assert_eq!(handle.sc_address(), ScAddress::Contract(Hash([3u8; 32])));

        Ok(())
    }

    #[test]
    fn test_contract_handle_rejects_account_strkey() {
        assert!(ContractHandle::from_strkey(&account_strkey(3)).is_err());
    }

    #[test]
    fn test_operation_targets_contract_and_entry_point() -> Result<()> {
        let handle = ContractHandle::from_strkey(&contract_strkey(9))?;
        let call = handle.call("process_payment", vec![ScVal::U32(1)]);
        let operation = call.to_operation()?;

        let OperationBody::InvokeHostFunction(op) = operation.body else {
            panic!("expected an invoke host function operation");
        };
        let HostFunction::InvokeContract(invoke) = op.host_function else {
            panic!("expected a contract invocation");
        };

        assert_eq!(invoke.contract_address, handle.sc_address());
        assert_eq!(invoke.function_name.to_utf8_string_lossy(), "process_payment");
        assert_eq!(invoke.args.to_vec(), vec![ScVal::U32(1)]);
        assert!(op.auth.is_empty());
        assert!(operation.source_account.is_none());

        Ok(())
    }

    #[test]
    fn test_entry_point_name_longer_than_symbol_fails() -> Result<()> {
        let handle = ContractHandle::from_strkey(&contract_strkey(9))?;
        let call = handle.call(&"x".repeat(33), Vec::new());

        assert!(call.to_operation().is_err());

        Ok(())
    }
}

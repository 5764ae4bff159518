use std::sync::Arc;

use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::{Function, JsonAbi},
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    rpc::types::{TransactionReceipt, TransactionRequest},
    sol_types::SolCall,
};

use crate::{
    client::Client,
    error::{Error, Result},
};

/// A deployed contract.
///
/// Only the deployment helper creates handles, so an existing handle always
/// points to confirmed runtime code. Every ABI method is reachable twice:
/// through [`ContractHandle::send`] (state mutating, returns the receipt)
/// and through [`ContractHandle::call`] (read-only, returns decoded output).
/// The `_typed` variants do the same for `sol!` generated call structs.
#[derive(Clone, Debug)]
pub struct ContractHandle {
    address: Address,
    abi: Arc<JsonAbi>,
    client: Client,
}

impl ContractHandle {
    pub(crate) fn new(address: Address, abi: Arc<JsonAbi>, client: Client) -> Self {
        Self { address, abi, client }
    }

    /// Address of the contract.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Interface of the contract.
    #[must_use]
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Client used to talk to the contract.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Execute `method` against the current state without mutating it.
    ///
    /// # Errors
    ///
    /// May fail if `method` is not part of the ABI, the arguments don't match
    /// it, the execution reverts or the node cannot be reached.
    pub async fn call(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>> {
        let call = describe(method, args);
        let function = self.function(&call, method, args.len())?;
        let input = encode(&call, function, args)?;

        let output = self
            .client
            .call_described(format!("call {call}"), self.address, input)
            .await?;

        decode(&call, function, &output)
    }

    /// Submit a transaction invoking `method` and wait until it is mined.
    ///
    /// # Errors
    ///
    /// See [`ContractHandle::call`]; a mined but failed transaction is
    /// reported as [`Error::Reverted`].
    pub async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<TransactionReceipt> {
        self.send_with_value(method, args, U256::ZERO).await
    }

    /// [`ContractHandle::send`] transferring `value` along with the call.
    ///
    /// # Errors
    ///
    /// See [`ContractHandle::send`].
    pub async fn send_with_value(
        &self,
        method: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<TransactionReceipt> {
        let call = describe(method, args);
        let function = self.function(&call, method, args.len())?;
        let input = encode(&call, function, args)?;

        self.transact(format!("send {call}"), input, value).await
    }

    /// Typed counterpart of [`ContractHandle::call`].
    ///
    /// # Errors
    ///
    /// See [`ContractHandle::call`].
    pub async fn call_typed<C: SolCall>(&self, call: &C) -> Result<C::Return> {
        let description = format!("call {}", C::SIGNATURE);
        let output = self
            .client
            .call_described(
                description.clone(),
                self.address,
                call.abi_encode().into(),
            )
            .await?;

        C::abi_decode_returns(&output).map_err(|e| abi_error(&description, e))
    }

    /// Typed counterpart of [`ContractHandle::send`].
    ///
    /// # Errors
    ///
    /// See [`ContractHandle::send`].
    pub async fn send_typed<C: SolCall>(
        &self,
        call: &C,
    ) -> Result<TransactionReceipt> {
        self.transact(
            format!("send {}", C::SIGNATURE),
            call.abi_encode().into(),
            U256::ZERO,
        )
        .await
    }

    async fn transact(
        &self,
        call: String,
        input: Bytes,
        value: U256,
    ) -> Result<TransactionReceipt> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(input)
            .with_value(value);

        self.client.send_described(call, tx).await
    }

    /// Resolve `method`, picking the overload that takes `arity` arguments.
    fn function(&self, call: &str, method: &str, arity: usize) -> Result<&Function> {
        let overloads = self.abi.function(method).ok_or_else(|| Error::Abi {
            call: call.to_string(),
            reason: format!("no method `{method}` in the contract abi"),
        })?;

        overloads
            .iter()
            .find(|function| function.inputs.len() == arity)
            .ok_or_else(|| Error::Abi {
                call: call.to_string(),
                reason: format!(
                    "no overload of `{method}` takes {arity} argument(s)"
                ),
            })
    }
}

fn encode(call: &str, function: &Function, args: &[DynSolValue]) -> Result<Bytes> {
    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|e| abi_error(call, e))
}

fn decode(call: &str, function: &Function, output: &[u8]) -> Result<Vec<DynSolValue>> {
    function.abi_decode_output(output).map_err(|e| abi_error(call, e))
}

fn abi_error(call: &str, reason: impl std::fmt::Display) -> Error {
    Error::Abi { call: call.to_string(), reason: reason.to_string() }
}

/// `method(arg, ...)` with arguments rendered in their Solidity form.
fn describe(method: &str, args: &[DynSolValue]) -> String {
    let args: Vec<String> = args.iter().map(render).collect();
    format!("{method}({})", args.join(", "))
}

fn render(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Address(a) => a.to_string(),
        DynSolValue::String(s) => format!("{s:?}"),
        DynSolValue::Bytes(b) => Bytes::copy_from_slice(b).to_string(),
        DynSolValue::FixedBytes(word, size) => {
            Bytes::copy_from_slice(&word[..*size]).to_string()
        }
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => {
            let values: Vec<String> = values.iter().map(render).collect();
            format!("[{}]", values.join(", "))
        }
        other => format!("{other:?}"),
    }
}

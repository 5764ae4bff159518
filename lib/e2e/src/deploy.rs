use std::sync::Arc;

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    network::TransactionBuilder,
    primitives::{Bytes, U256},
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use crate::{
    artifact::Artifact,
    client::Client,
    contract::ContractHandle,
    error::{Error, Result},
    receipt::ReceiptExt,
};

/// Outcome of a successful deployment.
#[derive(Debug)]
pub struct Deployed {
    /// Receipt of the creation transaction.
    pub receipt: TransactionReceipt,
    /// Handle to the freshly deployed contract.
    pub contract: ContractHandle,
}

/// A basic smart contract deployer.
pub struct Deployer<'a> {
    client: Client,
    artifact: &'a Artifact,
    ctr_args: Option<Vec<DynSolValue>>,
    value: U256,
    gas_limit: Option<u64>,
}

impl<'a> Deployer<'a> {
    /// Deployer of `artifact` on behalf of `client`'s signer.
    #[must_use]
    pub fn new(client: Client, artifact: &'a Artifact) -> Self {
        Self {
            client,
            artifact,
            ctr_args: None,
            value: U256::ZERO,
            gas_limit: None,
        }
    }

    /// Add solidity constructor arguments to the deployer.
    #[must_use]
    pub fn with_constructor(mut self, ctr_args: Vec<DynSolValue>) -> Self {
        self.ctr_args = Some(ctr_args);
        self
    }

    /// Send `value` to a payable constructor.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Pin the gas limit of the creation transaction instead of letting the
    /// node estimate it. A creation that fails then gets mined and reported
    /// through its receipt.
    #[must_use]
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Deploy the contract and wait for the creation transaction to be
    /// confirmed.
    /// Consumes currently configured deployer.
    ///
    /// # Errors
    ///
    /// May error if:
    ///
    /// - The constructor arguments don't match the artifact's constructor.
    /// - The node rejects the creation transaction, or the creation reverts
    ///   or runs out of gas.
    /// - No runtime code ends up at the created address.
    /// - The node cannot be reached or doesn't answer in time.
    pub async fn deploy(self) -> Result<Deployed> {
        let name = self.artifact.display_name().to_string();
        let tx = self.creation_tx()?;

        tracing::info!(contract = %name, from = %self.client.sender(), "deploying");

        let receipt = self
            .client
            .send_described(format!("deploy {name}"), tx)
            .await
            .map_err(|e| match e {
                Error::Rpc { message, .. } => {
                    deployment(&name, format!("node rejected creation: {message}"))
                }
                Error::Reverted { receipt, .. } => deployment(
                    &name,
                    format!(
                        "creation transaction {} reverted or ran out of gas (gas used {})",
                        receipt.transaction_hash, receipt.gas_used
                    ),
                ),
                other => other,
            })?;

        let address = receipt.address().map_err(|_| {
            deployment(&name, "receipt contains no contract address")
        })?;

        let runtime = self.client.get_code(address).await?;
        if runtime.is_empty() {
            return Err(deployment(
                &name,
                format!("no runtime code at {address}, is the bytecode malformed?"),
            ));
        }

        tracing::info!(contract = %name, %address, gas_used = receipt.gas_used, "deployed");

        let contract = ContractHandle::new(
            address,
            Arc::new(self.artifact.abi.clone()),
            self.client,
        );
        Ok(Deployed { receipt, contract })
    }

    fn creation_tx(&self) -> Result<TransactionRequest> {
        let tx = TransactionRequest::default()
            .with_deploy_code(self.creation_code()?)
            .with_value(self.value);
        Ok(match self.gas_limit {
            Some(gas_limit) => tx.with_gas_limit(gas_limit),
            None => tx,
        })
    }

    /// Bytecode followed by the abi-encoded constructor arguments.
    fn creation_code(&self) -> Result<Bytes> {
        let name = self.artifact.display_name();
        let args = self.ctr_args.as_deref().unwrap_or_default();

        let encoded_args = match &self.artifact.abi.constructor {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map_err(|e| deployment(name, format!("constructor arguments: {e}")))?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(deployment(
                    name,
                    format!(
                        "got {} constructor argument(s) but the abi declares no constructor",
                        args.len()
                    ),
                ))
            }
        };

        let mut code = self.artifact.bytecode.to_vec();
        code.extend_from_slice(&encoded_args);
        Ok(code.into())
    }
}

fn deployment(contract: &str, reason: impl Into<String>) -> Error {
    Error::Deployment { contract: contract.to_string(), reason: reason.into() }
}

use std::{fmt, future::Future, time::Duration};

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{keccak256, Address, Bytes, FixedBytes, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};

use crate::error::{Error, Result};

/// JSON-RPC client acting on behalf of a single signer.
///
/// Every request is bounded by the client's timeout. Transactions are signed
/// locally and missing fields (nonce, gas, fees, chain id) are filled in by
/// the provider before submission.
#[derive(Clone)]
pub struct Client {
    provider: DynProvider,
    url: Url,
    sender: Address,
    timeout: Duration,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url.as_str())
            .field("sender", &self.sender)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Connect to `url` signing with `signer`.
    #[must_use]
    pub fn new(url: Url, signer: PrivateKeySigner, timeout: Duration) -> Self {
        let sender = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url.clone())
            .erased();

        Self { provider, url, sender, timeout }
    }

    /// Same client with a different request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Underlying provider, e.g. to instantiate `sol!` generated bindings.
    #[must_use]
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// The rpc endpoint this client is connected to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Address transactions and calls are sent from.
    #[must_use]
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Selector of a canonical function signature, e.g. `myMethod()`.
    #[must_use]
    pub fn encode_function_signature(signature: &str) -> FixedBytes<4> {
        FixedBytes::from_slice(&keccak256(signature.as_bytes())[..4])
    }

    /// Gas token balance of `address` at the latest block.
    ///
    /// # Errors
    ///
    /// May fail if the node is unreachable, rejects the request or does not
    /// answer in time.
    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        let call = format!("eth_getBalance({address})");
        self.bounded(&call, async {
            self.provider
                .get_balance(address)
                .await
                .map_err(|e| Error::from_rpc(&call, e))
        })
        .await
    }

    /// Current legacy gas price.
    ///
    /// # Errors
    ///
    /// See [`Client::get_balance`].
    pub async fn get_gas_price(&self) -> Result<u128> {
        let call = "eth_gasPrice()";
        self.bounded(call, async {
            self.provider
                .get_gas_price()
                .await
                .map_err(|e| Error::from_rpc(call, e))
        })
        .await
    }

    /// Runtime code stored at `address`.
    ///
    /// # Errors
    ///
    /// See [`Client::get_balance`].
    pub async fn get_code(&self, address: Address) -> Result<Bytes> {
        let call = format!("eth_getCode({address})");
        self.bounded(&call, async {
            self.provider
                .get_code_at(address)
                .await
                .map_err(|e| Error::from_rpc(&call, e))
        })
        .await
    }

    /// Sign and submit `tx`, then wait until it is mined.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`Client::get_balance`], returns
    /// [`Error::Reverted`] when the transaction was mined but failed.
    pub async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt> {
        let call = describe(&tx.clone().with_from(self.sender));
        self.send_described(call, tx).await
    }

    /// [`Client::send_transaction`] with a caller supplied description used
    /// in errors and logs.
    pub(crate) async fn send_described(
        &self,
        call: String,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt> {
        let tx = tx.with_from(self.sender);
        let receipt = self
            .bounded(&call, async {
                self.provider
                    .send_transaction(tx)
                    .await
                    .map_err(|e| Error::from_rpc(&call, e))?
                    .get_receipt()
                    .await
                    .map_err(|e| Error::from_pending(&call, e))
            })
            .await?;

        tracing::debug!(
            %call,
            tx = %receipt.transaction_hash,
            gas_used = receipt.gas_used,
            status = receipt.status(),
            "transaction mined"
        );

        if receipt.status() {
            Ok(receipt)
        } else {
            Err(Error::Reverted { call, receipt: Box::new(receipt) })
        }
    }

    /// Execute `data` against `to` without creating a transaction.
    ///
    /// # Errors
    ///
    /// See [`Client::get_balance`]. A reverted execution is reported as
    /// [`Error::Rpc`] carrying the revert data.
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let call = format!("eth_call(to: {to}, data: {data})");
        self.call_described(call, to, data).await
    }

    /// [`Client::call`] with a caller supplied description.
    pub(crate) async fn call_described(
        &self,
        call: String,
        to: Address,
        data: Bytes,
    ) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(data);

        self.bounded(&call, async {
            self.provider.call(tx).await.map_err(|e| Error::from_rpc(&call, e))
        })
        .await
    }

    /// Await `fut`, giving up after the client's timeout.
    async fn bounded<T>(
        &self,
        call: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, fut).await.map_err(|_| {
            Error::Timeout { call: call.to_string(), after: self.timeout }
        })?
    }
}

/// Short human readable rendering of a transaction request.
fn describe(tx: &TransactionRequest) -> String {
    let mut parts = Vec::new();
    if let Some(from) = tx.from {
        parts.push(format!("from: {from}"));
    }
    match tx.to.as_ref().and_then(|kind| kind.to()) {
        Some(to) => parts.push(format!("to: {to}")),
        None => parts.push("to: <create>".to_string()),
    }
    if let Some(value) = tx.value {
        parts.push(format!("value: {value}"));
    }
    if let Some(gas) = tx.gas {
        parts.push(format!("gas: {gas}"));
    }
    if let Some(gas_price) = tx.gas_price {
        parts.push(format!("gasPrice: {gas_price}"));
    }
    if let Some(input) = tx.input.input() {
        if !input.is_empty() {
            parts.push(format!("data: {input}"));
        }
    }
    format!("eth_sendTransaction({})", parts.join(", "))
}

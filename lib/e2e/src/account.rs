use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
};
use once_cell::sync::Lazy;
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    artifact::Artifact, client::Client, config::Config, deploy::Deployer,
    error::Result,
};

/// Gas of a plain value transfer to an account without code.
const TRANSFER_GAS: u64 = 21_000;

/// Funded test account with its own client.
#[derive(Clone, Debug)]
pub struct Account {
    /// Local key the account signs with.
    pub signer: PrivateKeySigner,
    /// The account's client, signing with [`Account::signer`].
    pub client: Client,
}

impl Account {
    /// Create a new account funded with [`Config::funding`] by the master
    /// account.
    ///
    /// # Errors
    ///
    /// May fail if funding the newly created account fails.
    pub async fn new(config: &Config) -> Result<Self> {
        AccountFactory::create(config).await
    }

    /// Wrap an existing signer without funding it.
    #[must_use]
    pub fn from_signer(signer: PrivateKeySigner, config: &Config) -> Self {
        let client =
            Client::new(config.rpc_url.clone(), signer.clone(), config.timeout);
        Self { signer, client }
    }

    /// Hex-encoded private key, e.g. to import the account into a wallet.
    #[must_use]
    pub fn pk(&self) -> String {
        alloy::hex::encode(self.signer.to_bytes())
    }

    /// Retrieve this account's address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The rpc endpoint this account's client is connected to.
    #[must_use]
    pub fn url(&self) -> &str {
        self.client.url().as_str()
    }

    /// The account's client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create a configurable smart contract deployer on behalf of this
    /// account.
    #[must_use]
    pub fn as_deployer<'a>(&self, artifact: &'a Artifact) -> Deployer<'a> {
        Deployer::new(self.client.clone(), artifact)
    }

    /// Get gas token balance.
    ///
    /// # Errors
    ///
    /// May fail if the node cannot be queried.
    pub async fn balance(&self) -> Result<U256> {
        self.client.get_balance(self.address()).await
    }

    /// Send gas token to an address.
    ///
    /// # Errors
    ///
    /// May fail if the transfer cannot be submitted or mined.
    pub async fn send_value(
        &self,
        to: Address,
        value: U256,
    ) -> Result<TransactionReceipt> {
        let tx = TransactionRequest::default().with_to(to).with_value(value);
        self.client.send_transaction(tx).await
    }

    /// Send the whole balance, minus the transfer fee, to `to`.
    ///
    /// Does nothing when the balance cannot even cover the fee.
    ///
    /// # Errors
    ///
    /// May fail if the node cannot be queried or the transfer fails.
    pub async fn return_balance_to(&self, to: Address) -> Result<()> {
        let balance = self.balance().await?;
        let gas_price = self.client.get_gas_price().await?;
        let gas_cost = U256::from(TRANSFER_GAS) * U256::from(gas_price);

        if balance <= gas_cost {
            return Ok(());
        }

        // Pin gas and price so the fee is exactly `gas_cost`.
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_value(balance - gas_cost)
            .with_gas_limit(TRANSFER_GAS)
            .with_gas_price(gas_price);
        self.client.send_transaction(tx).await?;

        tracing::debug!(account = %self.address(), %to, "returned balance");
        Ok(())
    }
}

/// Creates funded accounts one at a time.
struct AccountFactory;

impl AccountFactory {
    /// Get access to the factory in a synchronized manner.
    async fn lock() -> MutexGuard<'static, Self> {
        /// Since accounts get funded from a single master account, we must
        /// synchronize account creation (otherwise the nonce will be too
        /// low).
        static SYNC_ACCOUNT_FACTORY: Lazy<Mutex<AccountFactory>> =
            Lazy::new(|| Mutex::new(AccountFactory));

        SYNC_ACCOUNT_FACTORY.lock().await
    }

    /// Create new account and fund it from the master account.
    ///
    /// # Errors
    ///
    /// May fail if funding the newly created account fails.
    async fn create(config: &Config) -> Result<Account> {
        let _lock = AccountFactory::lock().await;

        let account = Account::from_signer(PrivateKeySigner::random(), config);
        let master = Account::from_signer(config.master.clone(), config);

        master.send_value(account.address(), config.funding).await?;

        tracing::info!(
            account = %account.address(),
            funding = %config.funding,
            "funded test account"
        );
        Ok(account)
    }
}

use std::{future::Future, panic::AssertUnwindSafe};

use futures::FutureExt;
use tracing_subscriber::EnvFilter;

use crate::{account::Account, config::Config};

/// Run `body` with `N` freshly funded accounts.
///
/// The accounts are created from [`Config::from_env`] before `body` starts
/// and their remaining balance is returned to the master account after it
/// ends, whether it succeeded, failed or panicked. A panic is resumed once
/// the teardown is done. When both `body` and the teardown fail, the error
/// of `body` is returned and the teardown error is logged.
///
/// This is what [`crate::test`] expands to:
///
/// ```rust,ignore
/// e2e::with_anon_context(|[alice]: [Account; 1]| async move {
///     let balance = alice.balance().await?;
///     assert!(balance > U256::ZERO);
///     Ok(())
/// })
/// .await
/// ```
///
/// # Errors
///
/// May fail if the configuration is invalid, an account cannot be funded,
/// `body` fails or the teardown fails.
pub async fn with_anon_context<const N: usize, F, Fut>(body: F) -> eyre::Result<()>
where
    F: FnOnce([Account; N]) -> Fut,
    Fut: Future<Output = eyre::Result<()>>,
{
    init_tracing();

    let config = Config::from_env()?;
    let context = AnonContext::open(&config, N).await?;
    let accounts: [Account; N] = context
        .accounts
        .clone()
        .try_into()
        .map_err(|_| eyre::eyre!("expected {N} test accounts"))?;

    let outcome = AssertUnwindSafe(body(accounts)).catch_unwind().await;
    let teardown = context.close().await;

    match outcome {
        Err(panic) => {
            if let Err(e) = teardown {
                tracing::warn!("teardown after panic failed: {e:#}");
            }
            std::panic::resume_unwind(panic)
        }
        Ok(Err(e)) => {
            if let Err(teardown) = teardown {
                tracing::warn!("teardown after failure failed: {teardown:#}");
            }
            Err(e)
        }
        Ok(Ok(())) => teardown,
    }
}

/// Accounts owned by a single test.
struct AnonContext {
    master: Account,
    accounts: Vec<Account>,
}

impl AnonContext {
    async fn open(config: &Config, count: usize) -> eyre::Result<Self> {
        let master = Account::from_signer(config.master.clone(), config);

        let mut context = Self { master, accounts: Vec::with_capacity(count) };
        for _ in 0..count {
            match Account::new(config).await {
                Ok(account) => context.accounts.push(account),
                Err(e) => {
                    // Release what was funded so far.
                    if let Err(teardown) = context.close().await {
                        tracing::warn!("teardown after failed setup failed: {teardown:#}");
                    }
                    return Err(e.into());
                }
            }
        }

        Ok(context)
    }

    /// Return every account's balance to master, attempting all of them even
    /// if some fail.
    async fn close(self) -> eyre::Result<()> {
        let master = self.master.address();
        let mut first_error = None;

        for account in &self.accounts {
            if let Err(e) = account.return_balance_to(master).await {
                tracing::warn!(account = %account.address(), "failed to return balance: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Install a `RUST_LOG` driven subscriber writing to the test output.
fn init_tracing() {
    // Fails when a previous test already installed it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

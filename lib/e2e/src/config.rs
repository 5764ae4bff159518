use std::{str::FromStr, time::Duration};

use alloy::{
    primitives::{uint, U256},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};

use crate::error::{Error, Result};

pub(crate) const RPC_URL_ENV_VAR_NAME: &str = "RPC_URL";
pub(crate) const MASTER_PRIVATE_KEY_ENV_VAR_NAME: &str = "MASTER_PRIVATE_KEY";
pub(crate) const FUNDING_ENV_VAR_NAME: &str = "E2E_FUNDING_WEI";
pub(crate) const TIMEOUT_ENV_VAR_NAME: &str = "E2E_RPC_TIMEOUT_SECS";

const DEFAULT_RPC_URL: &str = "http://localhost:8545";
/// Pre-funded "Alith" development account of Frontier based dev nodes.
const DEFAULT_MASTER_PRIVATE_KEY: &str =
    "0x5fb92d6e98884f76de468fa3f6278f8807c48bebc13595d45af5bdc4da702133";
const DEFAULT_FUNDING_WEI: U256 = uint!(100_000_000_000_000_000_000_U256);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by every test of a run.
///
/// Passed explicitly to whatever needs it instead of living in globals.
#[derive(Clone, Debug)]
pub struct Config {
    /// Node JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Pre-funded account used to fund test accounts.
    pub master: PrivateKeySigner,
    /// Amount every fresh test account receives.
    pub funding: U256,
    /// Upper bound for any single RPC interaction.
    pub timeout: Duration,
}

impl Config {
    /// Load the configuration from the environment, reading a `.env` file
    /// first if one exists.
    ///
    /// # Errors
    ///
    /// May fail if one of the variables is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`], but reads variables through `lookup`.
    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let rpc_url = lookup(RPC_URL_ENV_VAR_NAME)
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let rpc_url = rpc_url
            .parse::<Url>()
            .map_err(|e| invalid(RPC_URL_ENV_VAR_NAME, e))?;

        let master = lookup(MASTER_PRIVATE_KEY_ENV_VAR_NAME)
            .unwrap_or_else(|| DEFAULT_MASTER_PRIVATE_KEY.to_string());
        let master = PrivateKeySigner::from_str(master.trim())
            .map_err(|e| invalid(MASTER_PRIVATE_KEY_ENV_VAR_NAME, e))?;

        let funding = match lookup(FUNDING_ENV_VAR_NAME) {
            Some(wei) => U256::from_str(wei.trim())
                .map_err(|e| invalid(FUNDING_ENV_VAR_NAME, e))?,
            None => DEFAULT_FUNDING_WEI,
        };

        let timeout = match lookup(TIMEOUT_ENV_VAR_NAME) {
            Some(secs) => secs
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|e| invalid(TIMEOUT_ENV_VAR_NAME, e))?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self { rpc_url, master, funding, timeout })
    }
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> Error {
    Error::Config { var, reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_local_dev_node() {
        let config = load(&[]).expect("defaults should be valid");

        assert_eq!(config.rpc_url.as_str(), "http://localhost:8545/");
        assert_eq!(config.funding, DEFAULT_FUNDING_WEI);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(
            config.master.address(),
            "0xf24FF3a9CF04c71Dbc94D0b566f7A27B94566cac"
                .parse::<alloy::primitives::Address>()
                .unwrap()
        );
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            (RPC_URL_ENV_VAR_NAME, "http://10.0.0.7:9933"),
            (FUNDING_ENV_VAR_NAME, "42"),
            (TIMEOUT_ENV_VAR_NAME, " 5 "),
        ])
        .expect("overrides should be valid");

        assert_eq!(config.rpc_url.port(), Some(9933));
        assert_eq!(config.funding, U256::from(42));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_malformed_values() {
        let err = load(&[(TIMEOUT_ENV_VAR_NAME, "soon")]).unwrap_err();
        assert!(matches!(
            err,
            Error::Config { var: TIMEOUT_ENV_VAR_NAME, .. }
        ));

        let err = load(&[(MASTER_PRIVATE_KEY_ENV_VAR_NAME, "0x1234")])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config { var: MASTER_PRIVATE_KEY_ENV_VAR_NAME, .. }
        ));

        let err = load(&[(RPC_URL_ENV_VAR_NAME, "not a url")]).unwrap_err();
        assert!(matches!(err, Error::Config { var: RPC_URL_ENV_VAR_NAME, .. }));
    }
}

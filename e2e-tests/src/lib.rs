//! Contract artifacts exercised by the end-to-end scenarios.
//!
//! The scenarios themselves live under `tests/` and only run with the `e2e`
//! feature enabled, since they need a live node (see [`e2e::Config`]):
//!
//! ```sh
//! RPC_URL=http://localhost:8545 cargo test -p e2e-tests --features e2e
//! ```
use e2e::{Artifact, Result};

macro_rules! artifact {
    ($name:literal) => {
        Artifact::from_json(include_str!(concat!("../artifacts/", $name, ".json")))
    };
}

/// ERC-20 token with zero supply, enough to exercise approvals.
///
/// # Errors
///
/// May fail if the bundled artifact is malformed.
pub fn erc20() -> Result<Artifact> {
    artifact!("ERC20")
}

/// Contract whose payable fallback sends the received value back to the
/// caller.
///
/// # Errors
///
/// May fail if the bundled artifact is malformed.
pub fn fallback_contract() -> Result<Artifact> {
    artifact!("FallbackContract")
}

/// Implementation of `IDoer`, `doTheThing()` always returns `true`.
///
/// # Errors
///
/// May fail if the bundled artifact is malformed.
pub fn contract_impl() -> Result<Artifact> {
    artifact!("ContractImpl")
}

/// Contract delegating `doTheThing()` to a linked `IDoer` implementation.
///
/// # Errors
///
/// May fail if the bundled artifact is malformed.
pub fn icontract_user() -> Result<Artifact> {
    artifact!("IContractUser")
}

//! End-to-end testing harness for EVM-compatible nodes.
//!
//! Tests get freshly funded accounts through [`test`] (or
//! [`with_anon_context`]), deploy JSON contract artifacts with
//! [`Account::as_deployer`] and interact with them through
//! [`ContractHandle`]. Everything talks to the node through [`Client`],
//! which bounds every request by the configured timeout and reports failures
//! as [`Error`].
//!
//! The node is configured through the environment, see [`Config`].
mod account;
mod artifact;
mod client;
mod config;
mod context;
mod contract;
mod deploy;
mod error;
mod event;
mod receipt;

pub use account::Account;
pub use artifact::Artifact;
pub use client::Client;
pub use config::Config;
pub use context::with_anon_context;
pub use contract::ContractHandle;
pub use deploy::{Deployed, Deployer};
pub use e2e_proc::test;
pub use error::{Error, Result};
pub use event::EventExt;
pub use receipt::ReceiptExt;

use alloy::{
    primitives::{Address, U256},
    rpc::types::TransactionReceipt,
};

use crate::error::{Error, Result};

/// Extension trait for reading results out of a [`TransactionReceipt`].
pub trait ReceiptExt {
    /// Returns the address of the contract created by the transaction.
    ///
    /// # Errors
    ///
    /// May fail if the transaction didn't create a contract.
    fn address(&self) -> Result<Address>;

    /// Total fee paid by the sender, `gasUsed × effectiveGasPrice`.
    fn gas_cost(&self) -> U256;
}

impl ReceiptExt for TransactionReceipt {
    fn address(&self) -> Result<Address> {
        self.contract_address.ok_or_else(|| Error::Deployment {
            contract: "<unnamed>".to_string(),
            reason: format!(
                "receipt of {} contains no contract address",
                self.transaction_hash
            ),
        })
    }

    fn gas_cost(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }
}

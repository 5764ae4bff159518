use alloy::{rpc::types::TransactionReceipt, sol_types::SolEvent};

/// Extension trait for inspecting the events a transaction emitted.
pub trait EventExt {
    /// All logs of the receipt that decode as `E`, in emission order.
    fn events<E: SolEvent>(&self) -> Vec<E>;

    /// Whether the transaction emitted exactly the `expected` event.
    fn emits<E: SolEvent + PartialEq>(&self, expected: E) -> bool {
        self.events::<E>().into_iter().any(|event| event == expected)
    }
}

impl EventExt for TransactionReceipt {
    fn events<E: SolEvent>(&self) -> Vec<E> {
        self.inner
            .logs()
            .iter()
            .filter_map(|log| log.log_decode::<E>().ok())
            .map(|log| log.inner.data)
            .collect()
    }
}

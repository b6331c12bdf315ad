//! Crate-level tests for the store contract.

mod store_contract;

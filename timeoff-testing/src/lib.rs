//! Reusable verification for `EventStore` implementations.
//!
//! Backends plug into [`event_store_contract_tests!`] to get one test per
//! behavioural guarantee the time-off core relies on.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod contract;

pub use contract::{ContractEntry, ContractTestFailure, ContractTestResult};

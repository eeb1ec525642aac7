//! Shared utilities: actor addressing.

pub mod address;

pub use address::{Address, AddressFactory};

//! Domain layer shared by the storage, advisor and HTTP crates.

pub mod catalog;
pub mod naming;
pub mod session;
pub mod showcase;
pub mod types;

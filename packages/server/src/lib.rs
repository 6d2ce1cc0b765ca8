// Carbon Market - service core
//
// Shared library behind the marketplace and lands HTTP services and the
// migration runner. Business logic lives per-domain in domains/*.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;

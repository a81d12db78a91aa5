pub mod errors;
pub mod gateway;
pub mod ledger;
pub mod models;
pub mod ports;
pub mod provisioning;
pub mod rotation;
pub mod service;

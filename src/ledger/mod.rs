pub mod audit;
pub mod balance;
pub mod entry;
pub mod service;
pub mod store;

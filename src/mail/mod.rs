pub mod client;
pub mod connect;
pub mod fetch;
pub mod filter;
pub mod types;

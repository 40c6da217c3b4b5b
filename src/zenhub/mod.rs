pub mod client;
pub(crate) mod types;

pub use client::ZenHubClient;

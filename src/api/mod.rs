// HTTP plumbing shared by the GitHub and ZenHub clients.

pub mod client;
pub mod rate_limit;
pub mod retry;

pub use client::{ApiClient, Auth};
pub use rate_limit::Pacer;
pub use retry::{Disposition, RetryPolicy};

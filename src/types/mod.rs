// Shared domain types, used by the API clients, the merger and the writers.

pub mod common;
pub mod issue;
pub mod meta;
pub mod record;

pub use common::*;
pub use issue::*;
pub use meta::*;
pub use record::*;

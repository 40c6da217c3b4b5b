// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod github;
pub mod markdown;
pub mod source;
pub mod types;
pub mod zenhub;

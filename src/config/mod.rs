pub mod loader;
pub mod run;
pub mod types;

pub use loader::load_settings;
pub use run::{ExportArgs, RunConfig};
pub use types::Settings;

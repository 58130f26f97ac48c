//! CLI command handlers. Each writes its report to the given writer.

mod classify;
mod codes;
mod config;
mod delays;

pub use classify::run_classify;
pub use codes::run_codes;
pub use config::run_config;
pub use delays::run_delays;

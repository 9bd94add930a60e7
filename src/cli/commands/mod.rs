//! CLI command implementations.

mod batch;
mod config;
mod doctor;
mod init;
mod serve;

pub use batch::run_batch;
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use serve::run_serve;

pub mod config;
pub mod error;
pub mod probe;
pub mod report;
pub mod rpc;
#[cfg(test)]
mod test_util;
pub mod types;

pub use config::RpcConfig;
pub use error::{ConfigError, CoreError, RpcError};
pub use probe::{run_probe, ProbeError, ProbeStep, ProbeTargets};

pub mod artifact;
pub mod deployer;
pub mod error;
pub mod evm;
pub mod fixture;
pub mod logging;
pub mod shared;

use std::path::PathBuf;

use ethers::types::H256;

pub type Result<T> = std::result::Result<T, DeployError>;

/// Every way a deployment run can fail.
///
/// None of these are recovered from: they bubble up to `main`, get printed
/// and turn into exit code 1. The variants only exist so callers and tests
/// can tell which stage broke.
#[derive(thiserror::Error, Debug)]
pub enum DeployError {
    #[error("missing env var {0}")]
    MissingEnv(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("network {network} expects chain id {expected}, but the node reports {actual}")]
    ChainMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },

    #[error("no artifact for contract {name} under {dir}")]
    ArtifactNotFound { name: String, dir: PathBuf },

    #[error("invalid artifact {path}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("compilation failed: {0}")]
    Compile(String),

    #[error("deployment of {contract} failed: {reason}")]
    Deploy { contract: String, reason: String },

    #[error("mint failed: {0}")]
    Mint(String),

    #[error("transaction {0:?} was dropped from the mempool")]
    TransactionDropped(H256),

    #[error("transaction {0:?} reverted")]
    TransactionReverted(H256),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

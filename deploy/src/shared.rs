use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dotenvy::dotenv;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use maplit::hashmap;
use tracing::{debug, warn};

use crate::error::{DeployError, Result};

pub const DEFAULT_NETWORK: &str = "mumbai";
pub const DEFAULT_COMPILER_VERSION: &str = "0.8.2";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const DEFAULT_CONFIRMATIONS: usize = 1;

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Chain ids of the networks we know how to talk to.
pub fn known_networks() -> HashMap<&'static str, u64> {
    hashmap! {
        "mumbai" => 80001,
        "polygon" => 137,
        "sepolia" => 11155111,
        "localhost" => 31337,
        "hardhat" => 31337,
    }
}

#[derive(Clone)]
pub struct Config {
    pub compiler_version: String,
    pub network_name: String,
    pub rpc_url: String,
    pub signing_key: String,
    pub confirmations: usize,
    pub artifacts_dir: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("compiler_version", &self.compiler_version)
            .field("network_name", &self.network_name)
            .field("rpc_url", &self.rpc_url)
            .field("signing_key", &"<redacted>")
            .field("confirmations", &self.confirmations)
            .field("artifacts_dir", &self.artifacts_dir)
            .finish()
    }
}

impl Config {
    /// Builds the config from an arbitrary variable source.
    ///
    /// `network` overrides `DEPLOY_NETWORK`. The RPC url is read from
    /// `<NETWORK>_RPC`, so `mumbai` reads `MUMBAI_RPC`.
    pub fn from_lookup<F>(network: Option<&str>, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network_name = network
            .map(str::to_string)
            .or_else(|| lookup("DEPLOY_NETWORK"))
            .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        if network_name.is_empty() {
            return Err(DeployError::InvalidConfig("network name is empty".to_string()));
        }
        let rpc_var = rpc_env_var(&network_name);
        let rpc_url = required(&lookup, &rpc_var)?;
        let signing_key = required(&lookup, "PRIVATE_KEY")?;
        let confirmations = match lookup("DEPLOY_CONFIRMATIONS") {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                DeployError::InvalidConfig(format!(
                    "DEPLOY_CONFIRMATIONS must be a non-negative integer, got {raw:?}"
                ))
            })?,
            None => DEFAULT_CONFIRMATIONS,
        };
        Ok(Config {
            compiler_version: lookup("SOLC_VERSION")
                .unwrap_or_else(|| DEFAULT_COMPILER_VERSION.to_string()),
            network_name,
            rpc_url,
            signing_key,
            confirmations,
            artifacts_dir: lookup("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR)),
        })
    }

    pub fn expected_chain_id(&self) -> Option<u64> {
        known_networks().get(self.network_name.as_str()).copied()
    }
}

fn rpc_env_var(network: &str) -> String {
    format!("{}_RPC", network.to_uppercase().replace('-', "_"))
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DeployError::MissingEnv(name.to_string())),
    }
}

/// Loads `.env` into the process environment. Variables already set win.
///
/// Binaries call this before parsing flags or installing the log filter so
/// `.env` feeds those too.
pub fn load_dotenv() {
    if let Err(err) = dotenv() {
        debug!("no .env loaded: {err}");
    }
}

/// Reads `.env` (if present) and the process environment.
pub fn config(network: Option<&str>) -> Result<Config> {
    load_dotenv();
    Config::from_lookup(network, |name| std::env::var(name).ok())
}

/// Connects to the configured node and binds the signing key to its chain id.
pub async fn get_wallet(config: &Config) -> Result<Arc<SignerClient>> {
    let wallet = config
        .signing_key
        .trim_start_matches("0x")
        .parse::<LocalWallet>()
        .map_err(|e| DeployError::InvalidPrivateKey(e.to_string()))?;
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| DeployError::InvalidConfig(format!("bad rpc url {}: {e}", config.rpc_url)))?;
    let chain_id = check_chain_id(&provider, config).await?;
    let wallet = wallet.with_chain_id(chain_id);
    Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
}

/// Asks the node for its chain id and rejects it when the configured network
/// is known to live on another chain.
pub async fn check_chain_id<M: Middleware>(provider: &M, config: &Config) -> Result<u64> {
    let chain_id = provider
        .get_chainid()
        .await
        .map_err(|e| DeployError::Rpc(e.to_string()))?
        .as_u64();
    match config.expected_chain_id() {
        Some(expected) if expected != chain_id => Err(DeployError::ChainMismatch {
            network: config.network_name.clone(),
            expected,
            actual: chain_id,
        }),
        Some(_) => Ok(chain_id),
        None => {
            warn!(
                network = %config.network_name,
                chain_id,
                "unknown network, trusting the node's chain id"
            );
            Ok(chain_id)
        }
    }
}

use std::io::Write;

use async_trait::async_trait;
use ethers::types::{Address, H256};
use ethers::utils::to_checksum;
use tracing::{error, info};

use crate::error::Result;

pub const CONTRACT_NAME: &str = "SuperMarioWorld";
pub const TOKEN_NAME: &str = "SuperMarioWorld";
pub const TOKEN_SYMBOL: &str = "SPRM";
pub const TOKEN_URI: &str =
    "https://ipfs.io/ipfs/QmeX9DWdk4nt46CHR5AsezRywjg6AX8km8aic5aqNikA5e";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParams {
    pub contract_name: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_uri: String,
}

impl Default for DeployParams {
    fn default() -> Self {
        Self {
            contract_name: CONTRACT_NAME.to_string(),
            token_name: TOKEN_NAME.to_string(),
            token_symbol: TOKEN_SYMBOL.to_string(),
            token_uri: TOKEN_URI.to_string(),
        }
    }
}

/// A contract whose creation transaction has been confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    pub contract_name: String,
    pub address: Address,
    pub deploy_tx: H256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct DeployResult {
    pub contract: ContractHandle,
    pub mint: MintReceipt,
}

/// Submits transactions and waits for them to be confirmed.
///
/// Both methods only return `Ok` once the transaction is included with a
/// success status.
#[async_trait]
pub trait TransactionSubmitter {
    async fn deploy(&self, contract_name: &str, name: &str, symbol: &str) -> Result<ContractHandle>;

    async fn mint(&self, contract: &ContractHandle, token_uri: &str) -> Result<MintReceipt>;
}

/// Deploys `params.contract_name` and mints one token on it.
///
/// The mint is issued only after the deployment is confirmed, and the run
/// counts as successful only once the mint is confirmed too. Nothing is rolled
/// back: when the mint fails the deployed address has already been written to
/// `out`.
pub async fn deploy<S, W>(params: &DeployParams, submitter: &S, out: &mut W) -> Result<DeployResult>
where
    S: TransactionSubmitter + Sync + ?Sized,
    W: Write + Send,
{
    info!(
        contract = %params.contract_name,
        name = %params.token_name,
        symbol = %params.token_symbol,
        "deploying contract"
    );
    let contract = submitter
        .deploy(&params.contract_name, &params.token_name, &params.token_symbol)
        .await
        .inspect_err(|e| error!("deployment failed: {e}"))?;
    writeln!(
        out,
        "Success! Contract was deployed to: {}",
        to_checksum(&contract.address, None)
    )?;
    info!(address = ?contract.address, tx = ?contract.deploy_tx, "contract deployed");

    let mint = submitter
        .mint(&contract, &params.token_uri)
        .await
        .inspect_err(|e| error!(address = ?contract.address, "mint failed: {e}"))?;
    writeln!(out, "NFT successfully minted")?;
    info!(tx = ?mint.tx_hash, block = ?mint.block_number, "token minted");

    Ok(DeployResult { contract, mint })
}

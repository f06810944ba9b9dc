use std::sync::Arc;

use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::types::{Address, TransactionReceipt, H256, U256};

use crate::deployer::MintReceipt;
use crate::error::{DeployError, Result};
use crate::shared::SignerClient;

/// A deployed token contract bound to the deployer's wallet.
pub struct Fixture {
    pub deployer: Arc<SignerClient>,
    pub contract: Contract<SignerClient>,
    pub confirmations: usize,
}

impl Fixture {
    pub fn connect(deployer: Arc<SignerClient>, address: Address, abi: Abi, confirmations: usize) -> Fixture {
        Fixture {
            contract: Contract::new(address, abi, deployer.clone()),
            deployer,
            confirmations,
        }
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Sends `mint(token_uri)` and waits for it to be confirmed.
    pub async fn mint(&self, token_uri: &str) -> Result<MintReceipt> {
        let call = self
            .contract
            .method::<_, ()>("mint", token_uri.to_string())
            .map_err(|e| DeployError::Mint(e.to_string()))?;
        let pending = call
            .send()
            .await
            .map_err(|e| DeployError::Mint(e.to_string()))?;
        let tx_hash = *pending;
        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| DeployError::Rpc(e.to_string()))?;
        let receipt = confirmed(tx_hash, receipt)?;
        Ok(MintReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
        })
    }

    pub async fn name(&self) -> Result<String> {
        self.read("name", ()).await
    }

    pub async fn symbol(&self) -> Result<String> {
        self.read("symbol", ()).await
    }

    pub async fn token_uri(&self, token_id: U256) -> Result<String> {
        self.read("tokenURI", token_id).await
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256> {
        self.read("balanceOf", owner).await
    }

    async fn read<T, D>(&self, method: &str, args: T) -> Result<D>
    where
        T: ethers::abi::Tokenize,
        D: ethers::abi::Detokenize,
    {
        self.contract
            .method::<T, D>(method, args)
            .map_err(|e| DeployError::Rpc(format!("{method}: {e}")))?
            .call()
            .await
            .map_err(|e| DeployError::Rpc(format!("{method}: {e}")))
    }
}

/// A pending transaction resolving to no receipt was dropped; one with a
/// receipt must also have succeeded.
pub(crate) fn confirmed(tx_hash: H256, receipt: Option<TransactionReceipt>) -> Result<TransactionReceipt> {
    let receipt = receipt.ok_or(DeployError::TransactionDropped(tx_hash))?;
    check_status(&receipt)?;
    Ok(receipt)
}

pub(crate) fn check_status(receipt: &TransactionReceipt) -> Result<()> {
    match receipt.status {
        Some(status) if status.as_u64() == 0 => {
            Err(DeployError::TransactionReverted(receipt.transaction_hash))
        }
        _ => Ok(()),
    }
}

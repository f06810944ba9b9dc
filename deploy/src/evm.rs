use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::contract::ContractFactory;
use ethers::signers::Signer;
use tracing::{debug, info};

use crate::artifact::{Artifact, ArtifactStore};
use crate::deployer::{ContractHandle, MintReceipt, TransactionSubmitter};
use crate::error::{DeployError, Result};
use crate::fixture::{check_status, Fixture};
use crate::shared::SignerClient;

/// Sends transactions to a JSON-RPC node through the configured wallet.
pub struct EvmSubmitter {
    client: Arc<SignerClient>,
    store: ArtifactStore,
    confirmations: usize,
    artifacts: Mutex<HashMap<String, Artifact>>,
}

impl EvmSubmitter {
    pub fn new(client: Arc<SignerClient>, store: ArtifactStore, confirmations: usize) -> Self {
        Self {
            client,
            store,
            confirmations,
            artifacts: Mutex::new(HashMap::new()),
        }
    }

    /// Registers an artifact produced elsewhere (e.g. a fresh compile) so it
    /// takes precedence over the artifact store.
    pub fn with_artifact(self, artifact: Artifact) -> Self {
        self.cache().insert(artifact.contract_name.clone(), artifact);
        self
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Artifact>> {
        self.artifacts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn artifact(&self, contract_name: &str) -> Result<Artifact> {
        if let Some(artifact) = self.cache().get(contract_name) {
            return Ok(artifact.clone());
        }
        let artifact = self.store.load(contract_name)?;
        self.cache().insert(contract_name.to_string(), artifact.clone());
        Ok(artifact)
    }
}

#[async_trait]
impl TransactionSubmitter for EvmSubmitter {
    async fn deploy(&self, contract_name: &str, name: &str, symbol: &str) -> Result<ContractHandle> {
        let artifact = self.artifact(contract_name)?;
        debug!(
            bytecode_len = artifact.bytecode.len(),
            deployer = ?self.client.signer().address(),
            "building deployment transaction"
        );
        let deploy_err = |reason: String| DeployError::Deploy {
            contract: contract_name.to_string(),
            reason,
        };
        let factory = ContractFactory::new(artifact.abi, artifact.bytecode, self.client.clone());
        let deployer = factory
            .deploy((name.to_string(), symbol.to_string()))
            .map_err(|e| deploy_err(e.to_string()))?
            .confirmations(self.confirmations);
        let (contract, receipt) = deployer
            .send_with_receipt()
            .await
            .map_err(|e| deploy_err(e.to_string()))?;
        check_status(&receipt)?;
        info!(
            address = ?contract.address(),
            block = ?receipt.block_number,
            gas_used = ?receipt.gas_used,
            "deployment confirmed"
        );
        Ok(ContractHandle {
            contract_name: contract_name.to_string(),
            address: contract.address(),
            deploy_tx: receipt.transaction_hash,
        })
    }

    async fn mint(&self, contract: &ContractHandle, token_uri: &str) -> Result<MintReceipt> {
        let artifact = self.artifact(&contract.contract_name)?;
        let fixture = Fixture::connect(
            self.client.clone(),
            contract.address,
            artifact.abi,
            self.confirmations,
        );
        fixture.mint(token_uri).await
    }
}

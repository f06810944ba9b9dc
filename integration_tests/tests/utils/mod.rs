use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deploy::artifact::{self, ArtifactStore};
use deploy::deployer::{ContractHandle, MintReceipt, TransactionSubmitter};
use deploy::error::{DeployError, Result};
use deploy::evm::EvmSubmitter;
use deploy::shared::{get_wallet, Config, SignerClient};
use ethers::abi::Abi;
use ethers::types::{Address, H256};
use ethers::utils::{hex, Anvil, AnvilInstance};
use tempfile::TempDir;

/// A transaction as the mock chain saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tx {
    Deploy {
        contract: String,
        name: String,
        symbol: String,
    },
    Mint {
        contract: Address,
        token_uri: String,
    },
}

pub enum Failure {
    None,
    Deploy,
    Mint,
}

/// In-memory stand-in for a node: confirms transactions instantly and
/// remembers their order.
pub struct MockChain {
    pub deploy_address: Address,
    pub failure: Failure,
    pub txs: Mutex<Vec<Tx>>,
    block: Mutex<u64>,
}

impl MockChain {
    pub fn new(deploy_address: Address) -> Self {
        Self {
            deploy_address,
            failure: Failure::None,
            txs: Mutex::new(Vec::new()),
            block: Mutex::new(100),
        }
    }

    pub fn failing(deploy_address: Address, failure: Failure) -> Self {
        Self {
            failure,
            ..Self::new(deploy_address)
        }
    }

    pub fn transactions(&self) -> Vec<Tx> {
        self.txs.lock().unwrap().clone()
    }

    fn next_block(&self) -> u64 {
        let mut block = self.block.lock().unwrap();
        *block += 1;
        *block
    }
}

#[async_trait]
impl TransactionSubmitter for MockChain {
    async fn deploy(&self, contract_name: &str, name: &str, symbol: &str) -> Result<ContractHandle> {
        if let Failure::Deploy = self.failure {
            return Err(DeployError::Rpc("error sending request: connection refused".to_string()));
        }
        self.txs.lock().unwrap().push(Tx::Deploy {
            contract: contract_name.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
        });
        self.next_block();
        Ok(ContractHandle {
            contract_name: contract_name.to_string(),
            address: self.deploy_address,
            deploy_tx: H256::from_low_u64_be(1),
        })
    }

    async fn mint(&self, contract: &ContractHandle, token_uri: &str) -> Result<MintReceipt> {
        let tx_hash = H256::from_low_u64_be(2);
        if let Failure::Mint = self.failure {
            return Err(DeployError::TransactionReverted(tx_hash));
        }
        self.txs.lock().unwrap().push(Tx::Mint {
            contract: contract.address,
            token_uri: token_uri.to_string(),
        });
        Ok(MintReceipt {
            tx_hash,
            block_number: Some(self.next_block()),
        })
    }
}

pub fn abc_address() -> Address {
    "0xABC0000000000000000000000000000000000123".parse().unwrap()
}

pub const SOLC_VERSION: &str = "0.8.2";

/// Just enough of an ERC721 for the deploy + mint flow and its read calls.
pub const SUPER_MARIO_WORLD_SOL: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.2;

contract SuperMarioWorld {
    string public name;
    string public symbol;
    uint256 private nextTokenId;
    mapping(uint256 => address) public ownerOf;
    mapping(address => uint256) public balanceOf;
    mapping(uint256 => string) private uris;

    constructor(string memory name_, string memory symbol_) {
        name = name_;
        symbol = symbol_;
    }

    function mint(string memory tokenURI_) external {
        require(bytes(tokenURI_).length > 0, "empty uri");
        uint256 tokenId = nextTokenId++;
        ownerOf[tokenId] = msg.sender;
        balanceOf[msg.sender] += 1;
        uris[tokenId] = tokenURI_;
    }

    function tokenURI(uint256 tokenId) external view returns (string memory) {
        require(ownerOf[tokenId] != address(0), "no such token");
        return uris[tokenId];
    }
}
"#;

/// A running anvil node plus a submitter wired to its first dev account.
pub struct LocalNode {
    pub anvil: AnvilInstance,
    pub client: Arc<SignerClient>,
    pub abi: Abi,
    pub submitter: EvmSubmitter,
    pub sources: TempDir,
}

pub async fn launch_local_node() -> LocalNode {
    let anvil = Anvil::new().spawn();
    let config = Config {
        compiler_version: SOLC_VERSION.to_string(),
        network_name: "localhost".to_string(),
        rpc_url: anvil.endpoint(),
        signing_key: hex::encode(anvil.keys()[0].to_bytes()),
        confirmations: 1,
        artifacts_dir: "artifacts".into(),
    };
    let client = get_wallet(&config).await.unwrap();

    let sources = tempfile::tempdir().unwrap();
    fs::write(sources.path().join("SuperMarioWorld.sol"), SUPER_MARIO_WORLD_SOL).unwrap();
    let compiled = artifact::compile(sources.path(), "SuperMarioWorld", SOLC_VERSION)
        .await
        .unwrap();
    let abi = compiled.abi.clone();
    let submitter = EvmSubmitter::new(client.clone(), ArtifactStore::new(sources.path()), 1)
        .with_artifact(compiled);
    LocalNode {
        anvil,
        client,
        abi,
        submitter,
        sources,
    }
}

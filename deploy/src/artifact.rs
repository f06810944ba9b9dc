//! Compiled contract artifacts.
//!
//! Artifacts follow the Hardhat layout: `artifacts/contracts/<File>.sol/<Name>.json`
//! next to a `<Name>.dbg.json` we ignore. Only `abi` and `bytecode` are read.

use std::fs;
use std::path::{Path, PathBuf};

use ethers::abi::Abi;
use ethers::solc::Solc;
use ethers::types::Bytes;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DeployError, Result};

#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: Option<String>,
    abi: Abi,
    bytecode: Bytes,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load(&self, contract_name: &str) -> Result<Artifact> {
        let path = find_artifact(&self.root, contract_name)?.ok_or_else(|| {
            DeployError::ArtifactNotFound {
                name: contract_name.to_string(),
                dir: self.root.clone(),
            }
        })?;
        debug!(path = %path.display(), "loading artifact");
        let raw = fs::read_to_string(&path)?;
        let parsed: HardhatArtifact =
            serde_json::from_str(&raw).map_err(|e| DeployError::InvalidArtifact {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        if let Some(name) = parsed.contract_name.as_deref() {
            if name != contract_name {
                return Err(DeployError::InvalidArtifact {
                    path,
                    reason: format!("artifact is for {name}, expected {contract_name}"),
                });
            }
        }
        if parsed.bytecode.is_empty() {
            // interfaces and abstract contracts have no creation code
            return Err(DeployError::InvalidArtifact {
                path,
                reason: "empty bytecode, contract is not deployable".to_string(),
            });
        }
        Ok(Artifact {
            contract_name: contract_name.to_string(),
            abi: parsed.abi,
            bytecode: parsed.bytecode,
        })
    }
}

fn find_artifact(dir: &Path, contract_name: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let file_name = format!("{contract_name}.json");
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            // build-info holds whole compiler runs, never single artifacts
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            if let Some(found) = find_artifact(&path, contract_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|n| n == file_name.as_str()) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Compiles every source under `sources` with the given solc version and
/// returns the artifact for `contract_name`.
///
/// The compiler is installed through svm when it is not already present, which
/// blocks, so this runs on the blocking pool.
pub async fn compile(sources: &Path, contract_name: &str, compiler_version: &str) -> Result<Artifact> {
    let sources = sources.to_path_buf();
    let contract_name = contract_name.to_string();
    let compiler_version = compiler_version.to_string();
    tokio::task::spawn_blocking(move || compile_blocking(&sources, &contract_name, &compiler_version))
        .await
        .map_err(|e| DeployError::Compile(e.to_string()))?
}

fn compile_blocking(sources: &Path, contract_name: &str, compiler_version: &str) -> Result<Artifact> {
    info!(version = compiler_version, sources = %sources.display(), "compiling contracts");
    let solc = Solc::find_or_install_svm_version(compiler_version)
        .map_err(|e| DeployError::Compile(format!("solc {compiler_version}: {e}")))?;
    let output = solc
        .compile_source(sources)
        .map_err(|e| DeployError::Compile(e.to_string()))?;
    if output.has_error() {
        let messages = output
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(DeployError::Compile(messages));
    }
    let contract = output.find(contract_name).ok_or_else(|| DeployError::ArtifactNotFound {
        name: contract_name.to_string(),
        dir: sources.to_path_buf(),
    })?;
    let abi = contract
        .abi
        .cloned()
        .ok_or_else(|| DeployError::Compile(format!("{contract_name} has no abi")))?;
    let bytecode = contract
        .bin
        .and_then(|bin| bin.as_bytes().cloned())
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| DeployError::Compile(format!("{contract_name} has no bytecode")))?;
    Ok(Artifact {
        contract_name: contract_name.to_string(),
        abi,
        bytecode,
    })
}

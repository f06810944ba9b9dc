use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use deploy::artifact::{self, ArtifactStore};
use deploy::deployer::{self, DeployParams, CONTRACT_NAME, TOKEN_NAME, TOKEN_SYMBOL, TOKEN_URI};
use deploy::error::Result;
use deploy::evm::EvmSubmitter;
use deploy::logging::init_logging;
use deploy::shared::{config, get_wallet, load_dotenv};
use ethers::signers::Signer;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "deploy")]
#[command(about = "Deploys the SuperMarioWorld contract and mints its first token")]
#[command(version)]
struct Cli {
    /// Network to deploy to; its RPC url is read from <NETWORK>_RPC
    #[arg(long, env = "DEPLOY_NETWORK")]
    network: Option<String>,

    #[arg(long, default_value = CONTRACT_NAME)]
    contract: String,

    /// Token name passed to the constructor
    #[arg(long, default_value = TOKEN_NAME)]
    name: String,

    /// Token symbol passed to the constructor
    #[arg(long, default_value = TOKEN_SYMBOL)]
    symbol: String,

    /// Metadata URI of the minted token
    #[arg(long, default_value = TOKEN_URI)]
    uri: String,

    /// Compile the Solidity sources in this directory instead of reading
    /// prebuilt artifacts
    #[arg(long)]
    compile: Option<PathBuf>,

    #[arg(long, env = "DEPLOY_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config(cli.network.as_deref())?;
    info!(?config, "loaded configuration");

    let client = get_wallet(&config).await?;
    info!(deployer = ?client.signer().address(), "wallet connected");

    let params = DeployParams {
        contract_name: cli.contract,
        token_name: cli.name,
        token_symbol: cli.symbol,
        token_uri: cli.uri,
    };
    let mut submitter = EvmSubmitter::new(
        client,
        ArtifactStore::new(&config.artifacts_dir),
        config.confirmations,
    );
    if let Some(sources) = cli.compile.as_deref() {
        let compiled =
            artifact::compile(sources, &params.contract_name, &config.compiler_version).await?;
        submitter = submitter.with_artifact(compiled);
    }

    let mut stdout = std::io::stdout();
    deployer::deploy(&params, &submitter, &mut stdout).await?;
    Ok(())
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use deploy::artifact::ArtifactStore;
use deploy::deployer::{CONTRACT_NAME, TOKEN_URI};
use deploy::fixture::Fixture;
use deploy::logging::init_logging;
use deploy::shared::{config, get_wallet, load_dotenv};
use ethers::signers::Signer;
use ethers::types::{Address, U256};

/// Follow-up calls against an already deployed contract.
#[derive(Parser)]
#[command(name = "tools")]
struct Cli {
    #[arg(long, env = "DEPLOY_NETWORK")]
    network: Option<String>,

    #[arg(long, default_value = CONTRACT_NAME)]
    contract: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mint another token on a deployed contract
    Mint {
        #[arg(long)]
        address: Address,
        #[arg(long, default_value = TOKEN_URI)]
        uri: String,
    },
    /// Print name, symbol, deployer balance and a token URI
    Inspect {
        #[arg(long)]
        address: Address,
        #[arg(long, default_value_t = 0)]
        token_id: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    init_logging(false);

    let config = config(cli.network.as_deref())?;
    let client = get_wallet(&config).await?;
    let abi = ArtifactStore::new(&config.artifacts_dir)
        .load(&cli.contract)
        .with_context(|| format!("loading ABI of {}", cli.contract))?
        .abi;

    match cli.command {
        Command::Mint { address, uri } => {
            let fixture = Fixture::connect(client, address, abi, config.confirmations);
            let receipt = fixture.mint(&uri).await?;
            println!("Minted {} in tx {:?}", uri, receipt.tx_hash);
        }
        Command::Inspect { address, token_id } => {
            let owner = client.signer().address();
            let fixture = Fixture::connect(client, address, abi, config.confirmations);
            println!("Contract: {:?}", fixture.address());
            println!("Name: {}", fixture.name().await?);
            println!("Symbol: {}", fixture.symbol().await?);
            println!("Balance of {:?}: {}", owner, fixture.balance_of(owner).await?);
            let uri = fixture.token_uri(U256::from(token_id)).await?;
            println!("Token #{} URI: {}", token_id, uri);
        }
    }
    Ok(())
}

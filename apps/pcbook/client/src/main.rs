//! pcbook client
//!
//! Exercises the four laptop service calls against a running server, using
//! sampled laptops for the records it needs.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::{Result, WrapErr};
use grpc_client::{ChannelConfig, create_channel_with_config};
use rpc::laptop_service_client::LaptopServiceClient;
use tracing::info;

mod commands;

use commands::{LaptopClient, SearchArgs};

#[derive(Parser)]
#[command(name = "pcbook-client")]
#[command(about = "Create, search, upload images for and rate laptops")]
struct Cli {
    /// Server address
    #[arg(short, long, default_value = "http://[::1]:50051", global = true)]
    address: String,

    /// Deadline for each call, in seconds
    #[arg(short, long, default_value_t = 5, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create random sample laptops
    Create {
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    /// Seed sample laptops, then stream back the ones matching a filter
    Search(SearchArgs),

    /// Upload an image for a laptop
    Upload {
        /// Image file; its extension becomes the image type
        #[arg(short, long)]
        image: PathBuf,

        /// Existing laptop; a sample laptop is created when omitted
        #[arg(short, long)]
        laptop_id: Option<String>,
    },

    /// Create sample laptops and rate them with random scores
    Rate {
        #[arg(short, long, default_value_t = 3)]
        laptops: usize,

        /// Rating rounds, one stream per round
        #[arg(short, long, default_value_t = 1)]
        rounds: usize,
    },

    /// Write a sample laptop to files without contacting the server
    Sample {
        /// Protobuf binary output
        #[arg(long)]
        binary: Option<PathBuf>,

        /// JSON output; printed to stdout when neither output is given
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let cli = Cli::parse();

    if let Commands::Sample { binary, json } = &cli.command {
        return commands::write_sample(binary.as_deref(), json.as_deref());
    }

    info!(address = %cli.address, "Dialing server");
    let config = ChannelConfig::new().with_call_deadline(Duration::from_secs(cli.timeout));
    let channel = create_channel_with_config(cli.address.clone(), config.clone())
        .await
        .wrap_err_with(|| format!("Cannot dial server {}", cli.address))?;
    let mut client = LaptopClient::new(LaptopServiceClient::new(channel), config);

    match cli.command {
        Commands::Create { count } => {
            for _ in 0..count {
                client.create_sample().await?;
            }
        }
        Commands::Search(args) => {
            for _ in 0..args.seed {
                client.create_sample().await?;
            }
            client.search(args.filter()).await?;
        }
        Commands::Upload { image, laptop_id } => {
            let laptop_id = match laptop_id {
                Some(id) => id,
                None => client.create_sample().await?,
            };
            client.upload_image(&laptop_id, &image).await?;
        }
        Commands::Rate { laptops, rounds } => {
            let mut ids = Vec::with_capacity(laptops);
            for _ in 0..laptops {
                ids.push(client.create_sample().await?);
            }
            for round in 1..=rounds {
                info!(round, "Rating laptops");
                client.rate_random(&ids).await?;
            }
        }
        Commands::Sample { .. } => {}
    }

    Ok(())
}

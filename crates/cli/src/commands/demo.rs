use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use tradenet_infra::{Backends, NetworkService, demo};

#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Number of chains to create.
    #[clap(long, default_value_t = 10)]
    pub count: usize,

    /// Delete all nodes, contacts and products first.
    #[clap(long)]
    pub clear: bool,

    /// Seed for reproducible data.
    #[clap(long)]
    pub seed: Option<u64>,
}

pub async fn run(backends: &Backends, args: DemoArgs) -> Result<()> {
    let service = NetworkService::new(backends.network.clone());
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let summary = demo::seed(&service, &mut rng, args.count, args.clear).await?;
    println!("Created {} chains ({} nodes)", summary.chains, summary.nodes);
    Ok(())
}

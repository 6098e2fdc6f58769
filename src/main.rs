mod config;
mod db;
mod handlers;
mod models;
mod store;
mod voting;

use config::{Config, LedgerLocation};
use db::{JsonFileLedger, MemoryLedger, ProfileLedger};
use handlers::Flow;
use log::{error, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{self, BufRead, Write};
use voting::VoteSimulationEngine;

fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    let candidates = store::load_candidates(&config.candidates_path)?;

    let ledger = match &config.ledger {
        LedgerLocation::Memory => {
            info!("Using in-memory ledger, the vote will not outlive this session");
            ProfileLedger::Memory(MemoryLedger::new())
        }
        LedgerLocation::File(path) => {
            let ledger = JsonFileLedger::open(path);
            info!("Using ledger file {}", ledger.path().display());
            ProfileLedger::File(ledger)
        }
    };

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };

    let mut engine = VoteSimulationEngine::initialize(candidates, ledger, &mut rng);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "Voting simulation. Your vote is anonymous and can only be cast once.")?;
    writeln!(stdout, "Type `help` for commands.")?;

    for line in stdin.lock().lines() {
        let line = line?;
        if handlers::handle_line(&mut engine, &line, &mut stdout)? == Flow::Quit {
            break;
        }
        stdout.flush()?;
    }

    Ok(())
}

//! Arbor - HD wallet command-line tool.
//!
//! Generate mnemonics, derive keys and addresses, and sign messages for the
//! networks in the arbor registry.

mod commands;

use clap::Parser;
use commands::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr so stdout only carries command output.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "arbor=debug",
        _ => "arbor=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let network = cli.network;
    match cli.command {
        Commands::Mnemonic(cmd) => cmd.execute(network)?,
        Commands::Derive(cmd) => cmd.execute(network)?,
        Commands::Addresses(cmd) => cmd.execute(network)?,
        Commands::Sign(cmd) => cmd.execute(network)?,
        Commands::Verify(cmd) => cmd.execute(network)?,
        Commands::ArmorSign(cmd) => cmd.execute(network)?,
        Commands::ArmorVerify(cmd) => cmd.execute()?,
        Commands::Networks => commands::networks::print_networks(),
    }
    Ok(())
}

//! Network registry listing.

use arbor::Network;
use colored::Colorize;

/// Print every registered network and its address types.
#[rustfmt::skip]
pub fn print_networks() {
    println!();
    for network in Network::ALL {
        let params = network.params();
        let types: Vec<&str> = params.address_types.iter().map(|t| t.id()).collect();

        println!("      {}  {} ({})", params.id.cyan().bold(), params.name, params.ticker.dimmed());
        println!("      {}    {}", "Coin".dimmed(), params.coin_type);
        println!("      {}   {}", "Types".dimmed(), types.join(", "));
        println!("      {}    {}", "Path".dimmed(), params.bip32_path.dimmed());
        println!();
    }
}

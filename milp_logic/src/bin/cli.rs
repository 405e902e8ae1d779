extern crate milp_logic;

use std::io;

use tracing_subscriber::EnvFilter;

fn main() {
    let config = milp_logic::config::Config::parse_from_args();

    let filter = if config.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut lock = stdin.lock();
    match milp_logic::lp_cli::lp_cli(&mut lock, config) {
        Ok(res) => print!("{}", res),
        Err(e) => {
            println!("error: {}", e);
            std::process::exit(1);
        }
    }
}

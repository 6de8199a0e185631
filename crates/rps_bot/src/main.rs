//! rps_bot - a rock/paper/cisor game bot that connects to an ircserv
//! instance as a plain client and referees games over PRIVMSG.

mod bot;
mod game;
mod room;
mod stats;

use clap::Parser;
use flexi_logger::Logger;
use log::error;

/// Rock/paper/cisor game bot for ircserv
#[derive(Debug, Parser)]
#[command(name = "rps_bot")]
struct Cli {
    /// Server host
    host: String,
    /// Server port
    port: u16,
    /// Server password
    password: String,
}

#[tokio::main]
async fn main() {
    Logger::try_with_env_or_str("info")
        .and_then(|logger| logger.log_to_stderr().start())
        .ok();

    let cli = Cli::parse();
    let mut bot = bot::Bot::new(&cli.host, cli.port, &cli.password);
    if let Err(e) = bot.run().await {
        error!("bot terminated: {e}");
        std::process::exit(1);
    }
}

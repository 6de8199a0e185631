use clap::Parser;
use flexi_logger::Logger;
use ircserv::config::{Cli, Settings};
use ircserv::server::Server;
use log::error;

#[tokio::main]
async fn main() {
    Logger::try_with_env_or_str("info")
        .and_then(|logger| logger.log_to_stderr().start())
        .ok();

    let cli = Cli::parse();
    let settings = match Settings::from_cli(cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ircserv: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Server::new(settings).run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

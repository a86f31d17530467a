mod commands;
mod terminal;

use arping_common::config::Config;
use commands::{CommandLine, Commands, iface, probe, resolve};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    match commands.command {
        Commands::Resolve { target, opts } => {
            print::header("resolving hardware address");
            resolve::resolve(target, Config::from(&opts)).await
        }
        Commands::Probe { target, opts } => {
            print::header("sending arp probe");
            probe::probe(target, Config::from(&opts)).await
        }
        Commands::Iface { target } => {
            print::header("interface selection");
            iface::iface(target)
        }
    }
}

// Entrypoint for the face-auth socket client: connect, send one command,
// print the decoded reply.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use crossterm::style::Stylize;
use dbis_cli::config::init_logging;
use dbis_cli::face::{FaceClient, FaceCommand};
use tracing::Level;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Command {
    Ping,
    Register,
    Authenticate,
}

#[derive(Parser, Debug)]
#[command(name = "face-client")]
#[command(about = "Send one command to the face-authentication server", long_about = None)]
struct Args {
    /// Server IP or host name
    host: String,

    /// Server port
    port: u16,

    /// Command to send
    #[arg(value_enum, default_value = "ping")]
    command: Command,

    /// Name to register (required for `register`)
    #[arg(long)]
    name: Option<String>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: Level,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level)?;

    let command = match args.command {
        Command::Ping => FaceCommand::ping(),
        Command::Authenticate => FaceCommand::authenticate(),
        Command::Register => FaceCommand::register(args.name.as_deref().unwrap_or(""))?,
    };

    println!("Connecting to {}:{}", args.host, args.port);
    let mut client = FaceClient::connect(&args.host, args.port)?;
    let reply = client.request(&command)?;

    if reply.is_success() {
        println!("{} {}", "OK".green(), reply.message);
    } else {
        println!("{} {}", "ERROR".red(), reply.message);
    }
    if let Some(user) = &reply.user {
        println!("User: {}", user);
    }
    if !reply.is_success() {
        bail!("server returned status `{}`", reply.status);
    }
    Ok(())
}

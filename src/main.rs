// Entrypoint for the interactive client.
// - Keeps `main` small: resolve config, start logging, build the API client
//   and hand it to the UI loop together with an empty session.

use anyhow::Context;
use clap::Parser;
use dbis_cli::{
    api::ApiClient,
    config::{init_logging, Args, Config},
    session::Session,
    ui::main_menu,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_logging(config.log_level)?;
    info!(base_url = %config.base_url, "starting client");

    let api = ApiClient::new().context("Failed to build HTTP client")?;
    let mut session = Session::new(&config.base_url);

    // Blocks until the user picks "Exit".
    main_menu(&api, &mut session)?;
    Ok(())
}

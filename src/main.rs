use clap::Parser;
use log::{error, info};

use slugnotes::{initialize_logger, App, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    let result = match App::new(cli.figment()) {
        Ok(app) => app.run(cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Application shutting down");
}

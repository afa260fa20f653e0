//! Mealtoken - campus meal-token exchange
//!
//! Text menu front end over the `mealtoken-core` ledger. Users register,
//! post surplus lunch/dinner tokens at their hall, and buyers get the
//! sellers' contact details.

use std::io;

use mealtoken_core::LedgerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod menu;
mod state;

fn main() {
    // Initialize logging; stdout belongs to the menu
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting mealtoken");

    let config = match LedgerConfig::discover() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut app_state = match state::AppState::new(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            eprintln!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = menu::Menu::new(stdin.lock(), stdout.lock(), &mut app_state);
    if let Err(e) = menu.run() {
        tracing::error!("Session ended with an error: {}", e);
        std::process::exit(1);
    }
}

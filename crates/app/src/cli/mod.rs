use std::{io, sync::Arc};

use clap::{Parser, Subcommand};
use grove_app::{
    auth::AuthState,
    config::{AppConfig, LoggingConfig},
    facade::CartFacade,
    render::write_cart,
    synchronizer::CartSynchronizer,
};

mod add;
mod errors;
mod item;
mod notifier;

pub(crate) use errors::CliError;

use notifier::ConsoleNotifier;

#[derive(Debug, Parser)]
#[command(name = "grove-app", about = "Grove cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the cart
    Show,

    /// Add an item to the cart
    Add(add::AddCommand),

    /// Change an item's quantity, plan, site or dedication
    Update(item::UpdateArgs),

    /// Remove an item from the cart
    Remove(item::RemoveArgs),

    /// Remove every item from the cart
    Clear,

    /// Sign in with the configured token and move the guest cart to the account
    Sync,
}

impl Cli {
    /// Parses flags and environment, loading `.env` first.
    pub(crate) fn load() -> Self {
        _ = dotenvy::dotenv();

        Self::parse()
    }

    pub(crate) fn logging(&self) -> &LoggingConfig {
        &self.config.logging
    }

    pub(crate) async fn run(self) -> Result<(), CliError> {
        let currency = self.config.currency()?;
        let gateway = self.config.http_gateway()?;

        let synchronizer =
            CartSynchronizer::new(Arc::new(gateway), self.config.local_store())
                .with_ordering(self.config.ordering());

        let facade = CartFacade::new(Arc::new(synchronizer), Arc::new(ConsoleNotifier));

        // With a token every command works on the account cart, so pending
        // guest items are drained first.
        match self.config.auth_state() {
            AuthState::Authenticated(token) => facade.sign_in(token).await?,
            AuthState::Guest if matches!(self.command, Commands::Sync) => {
                return Err(CliError::MissingToken);
            }
            AuthState::Guest => {}
        }

        match self.command {
            Commands::Show | Commands::Sync => {}
            Commands::Add(command) => add::run(&facade, command).await?,
            Commands::Update(args) => item::update(&facade, args).await?,
            Commands::Remove(args) => item::remove(&facade, args).await?,
            Commands::Clear => facade.clear().await?,
        }

        write_cart(io::stdout().lock(), &facade.cart(), currency)?;

        Ok(())
    }
}

//! Command router: argument parsing and dispatch to the API client.

pub mod format;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::credentials::CredentialChain;
use crate::api::reauth::ApiClient;
use crate::config::{Config, SessionStore};

#[derive(Debug, Parser)]
#[command(name = "trolley", version, about = "Command-line client for an online grocery service")]
pub struct Cli {
    /// Path to an alternative config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and persist the session.
    Login,
    /// Invalidate the session server-side and forget it locally.
    Logout,
    /// Show the current session, if any.
    Status,
    /// Search for products. Works without a login.
    Search { term: String },
    /// Browse a product category. Works without a login.
    Browse { category: String },
    /// Show the current trolley contents.
    Trolley,
    /// List pending and previous orders.
    Orders,
    /// List available delivery slots for the default branch.
    Slots,
    /// Look up products by line number.
    Product { line_numbers: Vec<String> },
}

/// Build the client and run one command. Any error propagates to the
/// binary boundary, which prints it to stderr and exits non-zero.
pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let store = SessionStore::new(SessionStore::default_path());
    let mut client = ApiClient::new(&config, store, Box::new(CredentialChain::default_chain()));

    match cli.command {
        Command::Login => {
            let session = client.login().await?;
            println!("Logged in (customer {}).", session.customer_id);
        }
        Command::Logout => {
            client.logout().await;
            println!("Logged out.");
        }
        Command::Status => {
            print!("{}", format::status(client.current_session()));
        }
        Command::Search { term } => {
            let results = client.search(&term).await?;
            print!("{}", format::search_results(&results));
        }
        Command::Browse { category } => {
            let results = client.browse(&category).await?;
            print!("{}", format::search_results(&results));
        }
        Command::Trolley => {
            let trolley = client.trolley().await?;
            print!("{}", format::trolley(&trolley));
        }
        Command::Orders => {
            let overview = client.orders().await?;
            print!("{}", format::orders(&overview));
        }
        Command::Slots => {
            let days = client.slots().await?;
            print!("{}", format::slot_days(&days));
        }
        Command::Product { line_numbers } => {
            let products = client.products(&line_numbers).await?;
            print!("{}", format::products(&products));
        }
    }

    Ok(())
}

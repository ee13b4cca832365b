//! Terra admin command-line console.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session persists across invocations)
//! terra login -u admin -p <password>
//!
//! # Register the first administrator
//! terra register -u admin -e admin@example.com -p <password>
//!
//! # Work with orders
//! terra orders list
//! terra orders status 68a1f00b2c9d4e0012ab34cd shipped --tracking TRACK123
//! terra orders payment 68a1f00b2c9d4e0012ab34cd paid
//! terra orders send-link 68a1f00b2c9d4e0012ab34cd https://pay.example/x
//!
//! # Drop the session
//! terra logout
//! ```
//!
//! # Environment Variables
//!
//! - `TERRA_API_URL` - Base URL of the admin backend
//! - `TERRA_STATE_DIR` - Directory for the durable session record

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use terra_console::{ConsoleConfig, OrderWorkflow, SessionManager};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "terra")]
#[command(author, version, about = "Terra admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the admin backend
    Login {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
    },
    /// Register the first administrator account
    Register {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Drop the current session
    Logout,
    /// Show the signed-in principal
    Whoami,
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List all orders
    List,
    /// Show one order in detail
    Show {
        /// Order ID
        id: String,
    },
    /// Set the fulfillment status of an order
    Status {
        /// Order ID
        id: String,

        /// Target status (`new`, `processing`, `shipped`, `delivered`, `cancelled`)
        status: String,

        /// Tracking number for the customer notice (used on `shipped` only)
        #[arg(short, long)]
        tracking: Option<String>,
    },
    /// Set the payment status of an order
    Payment {
        /// Order ID
        id: String,

        /// Target status (`pending`, `paid`, `refunded`)
        status: String,
    },
    /// Send a payment link to the customer
    SendLink {
        /// Order ID
        id: String,

        /// Payment link from the bank
        link: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let config = ConsoleConfig::from_env()?;
    let session = SessionManager::open(&config).await;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&session, &username, &password).await
        }
        Commands::Register {
            username,
            email,
            password,
        } => commands::auth::register(&session, &username, &email, &password).await,
        Commands::Logout => commands::auth::logout(&session).await,
        Commands::Whoami => commands::auth::whoami(&session).await,
        Commands::Orders { action } => {
            let workflow = OrderWorkflow::new(session);
            match action {
                OrdersAction::List => commands::orders::list(&workflow).await,
                OrdersAction::Show { id } => commands::orders::show(&workflow, &id).await,
                OrdersAction::Status {
                    id,
                    status,
                    tracking,
                } => {
                    commands::orders::set_status(&workflow, &id, &status, tracking.as_deref())
                        .await
                }
                OrdersAction::Payment { id, status } => {
                    commands::orders::set_payment(&workflow, &id, &status).await
                }
                OrdersAction::SendLink { id, link } => {
                    commands::orders::send_link(&workflow, &id, &link).await
                }
            }
        }
    }
}

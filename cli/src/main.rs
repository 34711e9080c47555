//! Rishta CLI
//!
//! Command-line client for the Rishta matrimonial platform.
//!
//! # Usage
//!
//! ```bash
//! rishta login --phone 9876543210
//! rishta login --phone 9876543210 --code 123456
//! rishta profile show
//! rishta profile set "Date of Birth" 1995-02-01
//! rishta photo set 2 https://cdn.example.com/p2.jpg
//! rishta matches --city Pune --min-age 25 --sort age-asc
//! rishta interests send u-42 --message "Namaste"
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "rishta")]
#[command(author = "Rishta")]
#[command(version = "0.1.0")]
#[command(about = "Rishta Command Line Interface", long_about = None)]
pub struct Cli {
    /// API endpoint URL
    #[arg(long, env = "RISHTA_API_URL")]
    api_url: Option<String>,

    /// Session token
    #[arg(long, env = "RISHTA_TOKEN")]
    token: Option<String>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a one-time code sent to your phone
    Login {
        #[arg(long)]
        phone: String,
        /// Code received by SMS; omit to request one
        #[arg(long)]
        code: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// View and edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Manage profile photos
    Photo {
        #[command(subcommand)]
        action: PhotoCommands,
    },
    /// Browse suggested matches
    Matches(MatchArgs),
    /// Send and answer interests
    Interests {
        #[command(subcommand)]
        action: InterestCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show completion per section
    Show {
        /// Also print every field with its current value
        #[arg(long)]
        fields: bool,
    },
    /// Set a field by name or label and save
    Set { field: String, value: String },
    /// Clear a field and save
    Unset { field: String },
    /// Save the profile as stored, retrying verification if it is due
    Save,
}

#[derive(Subcommand)]
pub enum PhotoCommands {
    /// List photo slots
    List,
    /// Put a photo URL into a slot (1-4)
    Set { slot: u8, url: String },
    /// Empty a slot
    Clear { slot: u8 },
    /// Mark a slot as the profile photo
    Primary { slot: u8 },
}

#[derive(clap::Args)]
pub struct MatchArgs {
    #[arg(long)]
    pub min_age: Option<u32>,
    #[arg(long)]
    pub max_age: Option<u32>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub religion: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub marital_status: Option<String>,
    /// Minimum height in centimetres
    #[arg(long)]
    pub min_height: Option<u16>,
    #[arg(long, value_enum, default_value = "newest")]
    pub sort: commands::matches::SortArg,
}

#[derive(Subcommand)]
pub enum InterestCommands {
    /// Send an interest to a member
    Send {
        user_id: String,
        #[arg(long)]
        message: Option<String>,
    },
    /// List interests sent and received
    List {
        /// Only show interests waiting for your answer
        #[arg(long)]
        pending: bool,
    },
    /// Accept a received interest
    Accept { id: String },
    /// Decline a received interest
    Decline { id: String },
    /// Withdraw an interest you sent
    Withdraw { id: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match config::Config::load(cli.profile.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config");
            config::Config::default()
        }
    };
    let ctx = commands::Context::new(&cli, config);

    let result = match cli.command {
        Commands::Login { phone, code } => commands::auth::login(&ctx, &phone, code.as_deref()).await,
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Profile { action } => commands::profile::handle(action, &ctx).await,
        Commands::Photo { action } => commands::profile::handle_photo(action, &ctx).await,
        Commands::Matches(args) => commands::matches::handle(args, &ctx).await,
        Commands::Interests { action } => commands::interests::handle(action, &ctx).await,
        Commands::Config { action } => commands::config::handle(action, cli.profile.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

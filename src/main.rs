//! Startup Platform command-line client
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command
//!       │
//!       ▼
//!  ┌──────────┐    ┌──────────────┐    ┌───────────────────────────────┐
//!  │  config  │───▶│   Session    │───▶│           ApiClient           │
//!  │  (TOML)  │    │ restore/login│    │ bearer → retry → 401 refresh  │──▶ REST API
//!  └──────────┘    └──────────────┘    │  (single-flight) → normalize  │
//!                                      └──────────────┬────────────────┘
//!                                                     │
//!                                              ┌──────▼──────┐
//!                                              │ TokenStore  │
//!                                              │ (JSON file) │
//!                                              └─────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use startup_platform::config::{load_config, validate_config, ClientConfig, ConfigError};
use startup_platform::marketplace::{
    ProfileUpdate, RegisterRequest, Role, StartupDraft, StartupFilter, StartupUpdate,
};
use startup_platform::observability::logging::init_logging;
use startup_platform::{ApiClient, ApiError, Session};

#[derive(Parser)]
#[command(name = "startup-platform")]
#[command(about = "Command-line client for the Startup Platform API", long_about = None, version)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides the configuration file).
    #[arg(long)]
    base_url: Option<String>,

    /// Where to persist the session tokens.
    #[arg(long)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is up (wakes a sleeping host)
    Health,
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        /// founder or talent
        #[arg(long)]
        role: Role,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage your profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Browse users
    Users {
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Browse and manage startups
    Startups {
        #[command(subcommand)]
        action: StartupCommand,
    },
    /// Express, withdraw and list interest
    Interest {
        #[command(subcommand)]
        action: InterestCommand,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Update profile fields; omitted fields are unchanged
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Comma-separated list of skills
        #[arg(long, value_delimiter = ',')]
        skills: Option<Vec<String>>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum StartupCommand {
    /// List startups
    List {
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        owner_id: Option<Uuid>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// List your own startups
    Mine,
    /// Show one startup
    Show { id: Uuid },
    /// Create a startup (founders only)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
    /// Update a startup you own
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
    /// Delete a startup you own
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum InterestCommand {
    /// Express interest, or withdraw it if already expressed
    Toggle { startup_id: Uuid },
    /// List interest in a startup you own
    List { startup_id: Uuid },
    /// List startups you are interested in
    Mine,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.observability.log_level);
    tracing::debug!(
        base_url = %config.api.base_url,
        max_attempts = config.retries.max_attempts,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let client = ApiClient::from_config(&config)?;
    let session = Session::new(client);

    if let Err(e) = run(cli.command, &session).await {
        report(&e);
        std::process::exit(1);
    }
    Ok(())
}

/// Config file (or defaults), then command-line overrides, then validation.
fn resolve_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(token_file) = &cli.token_file {
        config.session.token_file = Some(token_file.clone());
    }
    config.session.token_file = match config.session.token_file.take() {
        Some(path) => Some(expand_home(path)),
        None => default_token_file(),
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Expand a leading `~/` against `$HOME`.
fn expand_home(path: PathBuf) -> PathBuf {
    if let (Ok(rest), Some(home)) = (path.strip_prefix("~"), std::env::var_os("HOME")) {
        return PathBuf::from(home).join(rest);
    }
    path
}

fn default_token_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".startup-platform")
            .join("tokens.json")
    })
}

async fn run(command: Commands, session: &Session) -> Result<(), ApiError> {
    let client = session.client();

    match command {
        Commands::Health => print_json(&client.health().await?),
        Commands::Register {
            email,
            password,
            full_name,
            role,
        } => {
            let request = RegisterRequest {
                email,
                password_confirm: password.clone(),
                password,
                full_name,
                role,
            };
            print_json(&session.register(&request).await?)
        }
        Commands::Login { email, password } => print_json(&session.login(&email, &password).await?),
        Commands::Logout => {
            session.logout()?;
            eprintln!("Signed out.");
            Ok(())
        }
        Commands::Whoami => match session.restore().await? {
            Some(user) => print_json(&user),
            None => {
                eprintln!("Not signed in.");
                Ok(())
            }
        },
        Commands::Profile {
            action:
                ProfileCommand::Update {
                    full_name,
                    bio,
                    skills,
                    avatar_url,
                },
        } => {
            let update = ProfileUpdate {
                full_name,
                bio,
                skills,
                avatar_url,
            };
            print_json(&session.update_profile(&update).await?)
        }
        Commands::Users { role, page } => print_json(&client.list_users(role, page).await?),
        Commands::Startups { action } => run_startups(action, client).await,
        Commands::Interest { action } => run_interest(action, session).await,
    }
}

async fn run_startups(action: StartupCommand, client: &ApiClient) -> Result<(), ApiError> {
    match action {
        StartupCommand::List {
            industry,
            stage,
            owner_id,
            page,
        } => {
            let filter = StartupFilter {
                industry,
                stage,
                owner_id,
                page,
            };
            print_json(&client.list_startups(&filter).await?)
        }
        StartupCommand::Mine => print_json(&client.my_startups().await?),
        StartupCommand::Show { id } => print_json(&client.get_startup(id).await?),
        StartupCommand::Create {
            name,
            description,
            industry,
            stage,
            website,
        } => {
            let draft = StartupDraft {
                name,
                description,
                industry,
                stage,
                website,
            };
            print_json(&client.create_startup(&draft).await?)
        }
        StartupCommand::Update {
            id,
            name,
            description,
            industry,
            stage,
            website,
        } => {
            let update = StartupUpdate {
                name,
                description,
                industry,
                stage,
                website,
            };
            print_json(&client.update_startup(id, &update).await?)
        }
        StartupCommand::Delete { id } => {
            client.delete_startup(id).await?;
            eprintln!("Startup {id} deleted.");
            Ok(())
        }
    }
}

async fn run_interest(action: InterestCommand, session: &Session) -> Result<(), ApiError> {
    let client = session.client();

    match action {
        InterestCommand::Toggle { startup_id } => {
            session.restore().await?;
            let mut startup = client.get_startup(startup_id).await?;
            if startup.has_expressed_interest.is_none() {
                // Older servers do not report it; derive it from our own interests.
                let mine = client.my_interests().await?;
                startup.has_expressed_interest =
                    Some(mine.results.iter().any(|i| i.startup_id == startup_id));
            }

            let interested = session.toggle_interest(&startup).await?;
            eprintln!(
                "{} interest in {}.",
                if interested { "Expressed" } else { "Withdrew" },
                startup.name
            );
            Ok(())
        }
        InterestCommand::List { startup_id } => print_json(&client.startup_interests(startup_id).await?),
        InterestCommand::Mine => print_json(&client.my_interests().await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ApiError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| ApiError::decode(&e))?;
    println!("{rendered}");
    Ok(())
}

fn report(err: &ApiError) {
    eprintln!("Error: {err}");
    for (field, message) in err.field_errors() {
        eprintln!("  {field}: {message}");
    }

    if err.is_session_expired() {
        eprintln!("Run `startup-platform login` to sign in again.");
    } else if err.is_cold_start() {
        eprintln!("The server may be waking up; try again in a minute.");
    } else if err.is_network() || err.is_server() {
        eprintln!("Please try again.");
    }
}

// ABOUTME: Entry point for the okrdesk command line tool
// ABOUTME: Runs the API server, manages the signed-in session, and checks the database

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use okrdesk_cli::{check_database, run_server, ApiClient, CliError, SessionState, StoredSession};
use okrdesk_config::Config;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "okrdesk")]
#[command(about = "OKRDesk - objectives, key results, tasks and KPIs for your organization")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(long, help = "Port to listen on (overrides OKRDESK_API_PORT)")]
        port: Option<u16>,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, help = "Password (prompted when omitted)")]
        password: Option<String>,
        #[arg(long, help = "API base URL (overrides OKRDESK_API_URL)")]
        api_url: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check that the database is reachable
    CheckDb {
        #[arg(long, help = "Database file (overrides OKRDESK_DATABASE_PATH)")]
        database_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            run_server(config).await
        }
        Commands::Login {
            email,
            password,
            api_url,
        } => {
            let api_url = api_url.unwrap_or(config.api_url);
            let password = match password {
                Some(password) => password,
                None => inquire::Password::new("Password:")
                    .without_confirmation()
                    .prompt()?,
            };
            login(&api_url, &email, &password).await
        }
        Commands::Logout => logout(&config).await,
        Commands::Whoami => whoami(&config).await,
        Commands::CheckDb { database_path } => {
            let path = database_path.unwrap_or(config.database_path);
            let report = check_database(&path).await.map_err(|e| {
                error!("Database check failed: {}", e);
                anyhow::Error::new(e)
                    .context(format!("Could not read database at {}", path.display()))
            })?;

            println!(
                "{} Connected to {}",
                "✓".green(),
                path.display().to_string().cyan()
            );
            println!("Departments: {}", report.department_count);
            for name in report.department_names {
                println!("  - {}", name);
            }
            Ok(())
        }
    }
}

async fn login(api_url: &str, email: &str, password: &str) -> anyhow::Result<()> {
    let client = ApiClient::new(api_url);
    let response = client.login(email, password).await?;

    let session = SessionState::open_default();
    session.save(&StoredSession {
        token: response.token,
        email: response.user.email.clone(),
        api_url: client.base_url().to_string(),
    });

    println!(
        "{} Signed in as {} ({})",
        "✓".green(),
        response.user.name.bold(),
        response.user.role
    );
    println!("Session expires at {}", response.expires_at.to_rfc3339());
    if !session.is_persistent() {
        println!(
            "{} Session storage is unavailable, the session lasts only for this command",
            "⚠".yellow()
        );
    }
    Ok(())
}

async fn logout(config: &Config) -> anyhow::Result<()> {
    let session = SessionState::open_default();
    let Some(stored) = session.load() else {
        println!("Not signed in");
        return Ok(());
    };

    let api_url = if stored.api_url.is_empty() {
        config.api_url.as_str()
    } else {
        stored.api_url.as_str()
    };
    if let Err(e) = ApiClient::new(api_url).logout(&stored.token).await {
        tracing::warn!("Server-side sign out failed: {}", e);
    }

    session.clear();
    println!("{} Signed out {}", "✓".green(), stored.email);
    Ok(())
}

async fn whoami(config: &Config) -> anyhow::Result<()> {
    let stored = SessionState::open_default()
        .load()
        .ok_or(CliError::NotSignedIn)?;

    let api_url = if stored.api_url.is_empty() {
        config.api_url.as_str()
    } else {
        stored.api_url.as_str()
    };
    let user = ApiClient::new(api_url).me(&stored.token).await?;

    println!("{} <{}>", user.name.bold(), user.email);
    println!("Role: {}", user.role);
    if let Some(department) = &user.department {
        println!("Department: {}", department);
    }
    if let Some(position) = &user.position {
        println!("Position: {}", position);
    }
    Ok(())
}

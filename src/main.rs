// Profile Dashboard - Main Entry Point
//
// Command-line front end for the user dashboard:
// - Account registration and login
// - Persisted session across invocations
// - Profile display and quota-limited profile updates

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use profile_dashboard::api::{Credentials, Profile, ProfileUpdate, Registration};
use profile_dashboard::config::Config;
use profile_dashboard::dashboard::{DashboardController, DashboardState};
use profile_dashboard::rate_limit::QuotaStatus;
use profile_dashboard::{Client, DashboardError};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Profile Dashboard: sign in and manage your profile
#[derive(Parser, Debug)]
#[command(name = "profile-dashboard")]
#[command(version)]
#[command(about = "Sign in and manage your user profile", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the session
    Logout,
    /// Show the dashboard
    Show,
    /// Update your name and/or email
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show remaining profile updates
    Quota,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    init_tracing(&config, args.verbose)?;

    info!("Profile dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    let client = Client::init(&config)?;

    let result = match args.command {
        Commands::Register {
            name,
            email,
            password,
        } => register(&client, Registration { name, email, password }).await,
        Commands::Login { email, password } => login(&client, Credentials::new(email, password)).await,
        Commands::Logout => {
            client.auth().logout();
            println!("Logged out.");
            Ok(())
        }
        Commands::Show => show(&client).await,
        Commands::Update { name, email, yes } => update(&client, name, email, yes).await,
        Commands::Quota => {
            println!("{}", client.quota_status().message());
            Ok(())
        }
    };

    client.teardown();
    result
}

fn init_tracing(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        config.log_level()?
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format.to_lowercase().as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.compact().init(),
    }
    Ok(())
}

async fn register(client: &Client, registration: Registration) -> Result<()> {
    match client.auth().register(&registration).await {
        Ok(()) => {
            println!("Registration successful! Please log in.");
            Ok(())
        }
        Err(e) => bail!("Registration failed: {}", e.message()),
    }
}

async fn login(client: &Client, credentials: Credentials) -> Result<()> {
    match client.auth().login(&credentials).await {
        Ok(()) => {
            println!("Logged in as {}.", credentials.email);
            Ok(())
        }
        Err(e) => bail!("{}", e.message()),
    }
}

/// Mount the dashboard and require a loaded profile
async fn mount(controller: &mut DashboardController) -> Result<Profile> {
    match controller.mount().await? {
        DashboardState::Ready { profile } => Ok(profile.clone()),
        DashboardState::LoggedOut {
            reason: Some(reason),
        } => bail!("{}. Please log in again.", reason),
        state if state.requires_login() => {
            bail!("Not logged in. Run `profile-dashboard login` first.")
        }
        other => bail!("Unexpected dashboard state: {}", other),
    }
}

async fn show(client: &Client) -> Result<()> {
    let mut controller = client.dashboard();
    let profile = mount(&mut controller).await?;
    render_profile(&profile, &controller.quota_status());
    Ok(())
}

async fn update(
    client: &Client,
    name: Option<String>,
    email: Option<String>,
    yes: bool,
) -> Result<()> {
    let mut controller = client.dashboard();
    let profile = mount(&mut controller).await?;

    let draft = ProfileUpdate {
        name: name.unwrap_or_else(|| profile.name.clone()),
        email: email.unwrap_or_else(|| profile.email.clone()),
    };
    if !draft.changes(&profile) {
        bail!("Nothing to update: pass --name and/or --email with new values");
    }

    if let Err(e) = controller.begin_edit().map(|_| ()) {
        return Err(quota_error(e, &controller.quota_status()));
    }

    let remaining = controller.quota_status().remaining;
    if !yes && !confirm(&format!(
        "This uses 1 of your {} remaining profile updates. Continue?",
        remaining
    ))? {
        controller.cancel_edit()?;
        println!("Update cancelled.");
        return Ok(());
    }

    let outcome = controller
        .submit(draft)
        .await
        .map(|state| state.profile().cloned());
    match outcome {
        Ok(updated) => {
            if let Some(updated) = updated {
                println!("Profile updated.");
                render_profile(&updated, &controller.quota_status());
            }
            Ok(())
        }
        Err(DashboardError::Service(e)) => bail!(
            "Update failed: {}. {}",
            e.message(),
            controller.quota_status().message()
        ),
        Err(e) => Err(quota_error(e, &controller.quota_status())),
    }
}

fn quota_error(error: DashboardError, status: &QuotaStatus) -> anyhow::Error {
    match error {
        DashboardError::QuotaExceeded { .. } => anyhow::anyhow!(status.message()),
        other => other.into(),
    }
}

fn render_profile(profile: &Profile, quota: &QuotaStatus) {
    println!("Welcome, {}!", profile.name);
    if !profile.email.is_empty() {
        println!("Email: {}", profile.email);
    }
    println!("{}", quota.message());
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().context("Failed to write prompt")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

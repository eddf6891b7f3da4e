use anyhow::Context;
use clap::{Parser, Subcommand};
use roster_config::load as load_config;
use roster_database::{initialize_database, User, UserStore};
use roster_gateway::{build_router, AppState};
use roster_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster user service (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Create the users table and exit
    Migrate,
    /// Print every user in the database
    DumpUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Loaded before tracing so RUST_LOG may come from .env
    let dotenv = dotenvy::dotenv();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(error) => debug!(%error, "no .env file loaded"),
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Migrate => migrate().await,
        Commands::DumpUsers => dump_users().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Roster");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let app = build_router(AppState::new(services.store.clone()));

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(roster_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    services.db_pool.close().await;
    info!("server shut down");
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    let pool = initialize_database(&config.database)
        .await
        .context("failed to migrate database")?;
    pool.close().await;

    info!(url = %config.database.url, "database schema is up to date");
    Ok(())
}

async fn dump_users() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let users = services
        .store
        .find_all()
        .await
        .context("failed to fetch users")?;

    print!("{}", render_users(&users));

    services.db_pool.close().await;
    Ok(())
}

fn render_users(users: &[User]) -> String {
    let mut out = String::from("=== USERS ===\n");
    if users.is_empty() {
        out.push_str("No users found in database\n");
        return out;
    }

    out.push_str(&format!("Found {} users:\n", users.len()));
    out.push_str(&format!(
        "{:<6} {:<24} {:<32} {:<30}\n",
        "ID", "Username", "Email", "Full Name"
    ));
    out.push_str(&format!("{}\n", "-".repeat(95)));

    for user in users {
        out.push_str(&format!(
            "{:<6} {:<24} {:<32} {:<30}\n",
            user.id,
            user.username,
            user.email,
            user.fullname.as_deref().unwrap_or("NULL")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["roster"]).unwrap();
        assert_eq!(cli.command.unwrap_or(Commands::Serve), Commands::Serve);
    }

    #[test]
    fn subcommands_use_kebab_case() {
        let cli = Cli::try_parse_from(["roster", "dump-users"]).unwrap();
        assert_eq!(cli.command, Some(Commands::DumpUsers));

        let cli = Cli::try_parse_from(["roster", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));

        assert!(Cli::try_parse_from(["roster", "seed"]).is_err());
    }

    #[test]
    fn render_users_prints_null_for_missing_fullname() {
        let users = vec![
            User {
                id: 1,
                username: "alice".into(),
                email: "a@x.com".into(),
                fullname: Some("Alice Liddell".into()),
            },
            User {
                id: 2,
                username: "bob".into(),
                email: "b@x.com".into(),
                fullname: None,
            },
        ];

        let rendered = render_users(&users);
        assert!(rendered.contains("Found 2 users:"));
        assert!(rendered.contains("Alice Liddell"));
        let bob = rendered.lines().find(|line| line.starts_with("2 ")).unwrap();
        assert!(bob.trim_end().ends_with("NULL"));
    }

    #[test]
    fn render_users_handles_empty_table() {
        assert!(render_users(&[]).contains("No users found in database"));
    }
}

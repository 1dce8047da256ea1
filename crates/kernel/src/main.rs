//! Routeward
//!
//! Inspect a route file: the reduced tree, the navigation menu, and how a
//! session with given roles would be guarded.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use routeward_kernel::models::UserInfo;
use routeward_kernel::{Config, Navigator, SessionStore};

#[derive(Debug, Parser)]
#[command(name = "routeward", version, about = "Inspect role-gated route trees")]
struct Cli {
    /// Route file (overrides ROUTES_FILE).
    #[arg(long, short)]
    routes: Option<PathBuf>,

    /// Relax the navigation guard (ignored when APP_ENV=production).
    #[arg(long)]
    dev: bool,

    /// Append 403 / * fallback routes to every route level.
    #[arg(long)]
    fallbacks: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the reduced route tree with effective authorities.
    Tree,
    /// Print the navigation menu.
    Menu,
    /// Resolve and guard a navigation (defaults to the home page).
    Navigate {
        path: Option<String>,
        /// Role held by the session; repeat for several. None = logged out.
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Check a permission on the route serving a path.
    Has {
        path: String,
        permission: String,
        /// Role held by the session; repeat for several.
        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(routes) = cli.routes {
        config.routes_file = routes;
    }
    config.dev_mode |= cli.dev;
    config.fallback_routes |= cli.fallbacks;

    info!(
        routes_file = %config.routes_file.display(),
        guard = ?config.guard_mode(),
        "Configuration loaded"
    );

    let session = Arc::new(SessionStore::new());
    let navigator = Navigator::from_config(&config, session.clone())
        .context("failed to load routes")?;

    match cli.command {
        Command::Tree => print_json(&navigator.table().routes()),
        Command::Menu => print_json(&navigator.nav_menu()),
        Command::Navigate { path, roles } => {
            login(&session, &roles);
            let path = path.unwrap_or_else(|| config.home_path.clone());
            let navigation = navigator
                .navigate(&path)
                .with_context(|| format!("failed to navigate to {path}"))?;
            print_json(&navigation)
        }
        Command::Has {
            path,
            permission,
            roles,
        } => {
            login(&session, &roles);
            let to = navigator
                .table()
                .resolve(&path)
                .with_context(|| format!("failed to resolve {path}"))?;
            let leaf = to.leaf();
            print_json(&serde_json::json!({
                "pattern": to.pattern,
                "permission": permission,
                "has": leaf.meta.has(&permission),
                "hasRoute": leaf.meta.has_route(),
            }))
        }
    }
}

fn login(session: &SessionStore, roles: &[String]) {
    if roles.is_empty() {
        return;
    }
    let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
    session.login(UserInfo::with_roles("cli", &roles));
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialise output")?;
    println!("{text}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

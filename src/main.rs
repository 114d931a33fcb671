//! inspector-auth - provision identity accounts for inspector documents
//!
//! Usage:
//!   inspector-auth <INSPECTOR_ID>
//!   inspector-auth --all
//!   inspector-auth --watch
//!
//! Exit codes: 0 success/no-op, 1 unhandled error, 2 missing credentials.

use clap::{CommandFactory, Parser};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inspector_auth::{
    config::Args,
    db::{MongoClient, MongoDirectory},
    drivers,
    identity::{HttpIdentityProvider, IdentityProvider, ServiceCredentials},
    reconcile::{InspectorStore, ProfileStore, ReconcileSettings, Reconciler},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("inspector_auth={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // No mode selected: print usage and exit cleanly
    if args.inspector_id.is_none() && !args.all && !args.watch {
        Args::command().print_help()?;
        println!();
        return Ok(());
    }

    // Credentials are required before any I/O happens
    let credentials = match ServiceCredentials::load(&args.credentials) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    info!("Identity credentials loaded (project: {})", credentials.project_id);

    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => client,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let directory = Arc::new(MongoDirectory::new(&mongo));
    let identity: Arc<dyn IdentityProvider> = Arc::new(HttpIdentityProvider::new(
        args.identity_url.clone(),
        credentials,
    ));
    info!("Identity service: {}", args.identity_url);

    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&directory) as Arc<dyn InspectorStore>,
        Arc::clone(&directory) as Arc<dyn ProfileStore>,
        identity,
        ReconcileSettings {
            email_domain: args.email_domain.clone(),
            default_password: args.default_password.clone(),
        },
    ));

    if args.watch {
        let events = match directory.watch_records().await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to start watcher: {}", e);
                std::process::exit(1);
            }
        };
        drivers::run_watch(reconciler, Box::pin(events)).await;
        return Ok(());
    }

    if args.all {
        drivers::run_full_scan(&reconciler).await?;
        return Ok(());
    }

    if let Some(ref id) = args.inspector_id {
        drivers::run_single(&reconciler, id).await;
    }

    Ok(())
}

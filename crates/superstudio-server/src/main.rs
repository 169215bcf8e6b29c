// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Superstudio server binary.

use clap::{Parser, Subcommand};
use std::sync::Arc;
use superstudio_server::{create_app_state, create_router};
use superstudio_server_content::SanityContentStore;
use superstudio_server_smtp::SmtpClient;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};

/// Superstudio server - showcase API and magic-link submission editing.
#[derive(Parser, Debug)]
#[command(
	name = "superstudio-server",
	about = "Superstudio showcase and submission server",
	version
)]
struct Args {
	/// Subcommands for superstudio-server (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("superstudio-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	// Load configuration
	let config = superstudio_server_config::load_config()?;

	// Setup tracing
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		environment = %config.auth.environment,
		"starting superstudio-server"
	);

	// Content store client
	let store = Arc::new(SanityContentStore::new(config.content.clone())?);

	// SMTP client, when configured; the email layer logs links otherwise
	let smtp_client = match config.smtp.clone() {
		Some(smtp_config) => match SmtpClient::new(smtp_config) {
			Ok(client) => Some(Arc::new(client)),
			Err(e) => {
				tracing::error!(error = %e, "failed to initialize SMTP client; magic links will be logged");
				None
			}
		},
		None => {
			tracing::info!("SMTP not configured; magic links will be logged");
			None
		}
	};

	let state = create_app_state(&config, store, smtp_client);

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	// Start server
	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	// Run server with graceful shutdown
	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("received shutdown signal");
		}
	}

	tracing::info!("server shutdown complete");
	Ok(())
}

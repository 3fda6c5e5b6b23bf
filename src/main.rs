// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use wallet_accounts_server::{
    api::router,
    config::{Config, StoreBackend},
    logging::init_logging,
    state::{AppState, AuthConfig},
    storage::{InMemoryWalletAccountStore, RedbWalletAccountStore, WalletAccountStore},
};

/// Time allowed for in-flight requests once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn fatal(message: &str, error: impl std::fmt::Display) -> ! {
    tracing::error!(error = %error, "{message}");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install rustls crypto provider");
        process::exit(1);
    }

    init_logging();

    let config = Config::from_env().unwrap_or_else(|e| fatal("Invalid configuration", e));

    let store: Arc<dyn WalletAccountStore> = match config.store_backend {
        StoreBackend::Redb => {
            let store = RedbWalletAccountStore::open(&config.database_path)
                .unwrap_or_else(|e| fatal("Failed to open wallet account database", e));
            tracing::info!(path = %config.database_path.display(), "Opened wallet account database");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory wallet account store; records are lost on restart");
            Arc::new(InMemoryWalletAccountStore::new())
        }
    };

    let auth_config = AuthConfig::from_config(&config)
        .unwrap_or_else(|e| fatal("Failed to set up token verification", e));
    if auth_config.jwks.is_none() && auth_config.shared_secret.is_none() {
        tracing::warn!("No token verifier configured; accepting unsigned tokens (dev build)");
    }

    let app = router(AppState::new(store).with_auth_config(auth_config));
    let addr = config.bind_addr;

    let handle = Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections");
        shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    let served = match config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .unwrap_or_else(|e| fatal("Failed to load TLS certificate", e));
            tracing::info!(%addr, "Wallet accounts server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            tracing::info!(%addr, "Wallet accounts server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(e) = served {
        fatal("Server failed", e);
    }
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

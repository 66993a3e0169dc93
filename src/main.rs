use crate::app::AppContext;
use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use crate::db::RecordStore;
use crate::router::respond;
use astra::{Request, Server};
use chrono::Utc;
use std::net::SocketAddr;
use tracing::{error, info, warn};

mod app;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod logging;
mod notify;
mod responses;
mod router;
mod spreadsheets;
mod telemetry;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    logging::init_tracing(&config.logging);

    let db = Database::new(config.database.path.clone());
    if let Err(e) = init_db(&db, &config.database.schema) {
        error!(error = %e, "database initialization failed");
        std::process::exit(1);
    }

    let store = RecordStore::new(db.clone());
    if config.database.cleanup_days > 0 {
        if let Err(e) = store.cleanup(config.database.cleanup_days, Utc::now()) {
            warn!(error = %e, "startup cleanup failed");
        }
    }
    match store.database_size() {
        Ok(size) => info!(used = size.used, percentage = size.percentage, "record store size"),
        Err(e) => warn!(error = %e, "could not measure record store"),
    }

    let addr: SocketAddr = match config.server.bind.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(bind = %config.server.bind, error = %e, "invalid bind address");
            std::process::exit(1);
        }
    };
    let workers = config.server.workers;

    let ctx = match AppContext::new(config, db) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    };

    info!(%addr, workers, "starting server");

    let result = Server::bind(&addr)
        .max_workers(workers)
        .serve(move |req: Request, _info| respond(req, &ctx));

    if let Err(e) = result {
        error!(error = %e, "server ended with error");
    }

    info!("server shut down");
}

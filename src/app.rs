// src/app.rs
use crate::config::AppConfig;
use crate::db::{Database, LeadRepository, RecordStore};
use crate::domain::{LeadScorer, ScoringZone};
use crate::errors::ServerError;
use crate::notify::Notifier;
use crate::telemetry::Telemetry;

/// Everything a request handler needs. Built once in `main`.
pub struct AppContext {
    pub config: AppConfig,
    pub store: RecordStore,
    pub scorer: LeadScorer,
    pub notifier: Notifier,
    pub telemetry: Telemetry,
}

impl AppContext {
    pub fn new(config: AppConfig, db: Database) -> Result<Self, ServerError> {
        let zone = ScoringZone::from_offset_minutes(config.scoring.utc_offset_minutes)?;
        let notifier = Notifier::from_config(&config.agency, &config.mail);
        let telemetry = Telemetry::from_config(&config.analytics);

        Ok(Self {
            store: RecordStore::new(db),
            scorer: LeadScorer::new(zone),
            notifier,
            telemetry,
            config,
        })
    }

    pub fn db(&self) -> &Database {
        self.store.database()
    }

    pub fn leads(&self) -> LeadRepository<'_> {
        LeadRepository::new(&self.store, &self.scorer)
    }
}

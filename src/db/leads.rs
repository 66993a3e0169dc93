// src/db/leads.rs
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::db::records::{Collection, Record, RecordStore};
use crate::domain::{Interaction, Lead, LeadScorer, LeadStatus, NewLead};
use crate::errors::ServerError;

const CUSTOMERS: &str = "customers";

/// Typed access to leads stored in the `customers` collection.
///
/// Score and tags are recomputed before every write, so whatever is stored
/// reflects the lead's status and interactions at the time of that write.
pub struct LeadRepository<'a> {
    store: &'a RecordStore,
    scorer: &'a LeadScorer,
}

/// Outcome of a status change, with the status the lead had before.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous: LeadStatus,
    pub lead: Lead,
}

fn to_record(lead: &Lead) -> Result<Record, ServerError> {
    match serde_json::to_value(lead)? {
        Value::Object(map) => Ok(map),
        _ => Err(ServerError::InternalError),
    }
}

fn from_record(record: Record) -> Result<Lead, ServerError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Only the derived and mutable fields; contact details are never rewritten.
fn mutable_fields(lead: &Lead) -> Result<Record, ServerError> {
    let value = json!({
        "status": lead.status,
        "score": lead.score,
        "tags": lead.tags,
        "interactions": lead.interactions,
    });
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ServerError::InternalError),
    }
}

impl<'a> LeadRepository<'a> {
    pub fn new(store: &'a RecordStore, scorer: &'a LeadScorer) -> Self {
        Self { store, scorer }
    }

    /// Score, tag and store a fresh submission.
    pub fn create(&self, new_lead: NewLead, now: DateTime<Utc>) -> Result<Lead, ServerError> {
        let mut lead = new_lead.into_lead(now);
        self.scorer.refresh(&mut lead, now);

        let mut record = to_record(&lead)?;
        record.remove("id");
        let id = self.store.save(Collection::Customers, record, now)?;
        lead.id = id;

        if let Some(score) = &lead.score {
            info!(
                lead_id = %lead.id,
                total = score.total,
                quality = %score.quality,
                priority = %score.priority,
                "lead created"
            );
        }
        Ok(lead)
    }

    /// Every stored lead in insertion order. Records that fail to parse are skipped.
    pub fn list(&self) -> Result<Vec<Lead>, ServerError> {
        let records = self.store.list(Collection::Customers, &Record::new())?;
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let id = record
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string();
                match from_record(record) {
                    Ok(lead) => Some(lead),
                    Err(e) => {
                        warn!(record_id = %id, error = %e, "skipping unreadable lead record");
                        None
                    }
                }
            })
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<Lead>, ServerError> {
        self.store
            .read_by_id(CUSTOMERS, id)?
            .map(from_record)
            .transpose()
    }

    /// Change status, append the synthetic `status_update` interaction and rescore.
    pub fn update_status(
        &self,
        id: &str,
        status: LeadStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusChange>, ServerError> {
        let Some(mut lead) = self.get(id)? else {
            return Ok(None);
        };

        let previous = lead.status;
        lead.status = status;
        lead.interactions.push(Interaction::status_update(status, now));
        self.scorer.refresh(&mut lead, now);
        self.persist(&lead, now)?;

        info!(lead_id = %id, from = %previous, to = %status, total = lead.score_total(), "lead status updated");
        Ok(Some(StatusChange { previous, lead }))
    }

    /// Append a manually logged interaction and rescore.
    pub fn add_interaction(
        &self,
        id: &str,
        interaction: Interaction,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, ServerError> {
        let Some(mut lead) = self.get(id)? else {
            return Ok(None);
        };

        lead.interactions.push(interaction);
        self.scorer.refresh(&mut lead, now);
        self.persist(&lead, now)?;
        Ok(Some(lead))
    }

    pub fn delete(&self, id: &str) -> Result<bool, ServerError> {
        self.store.delete(CUSTOMERS, id)
    }

    /// Recompute score and tags for every lead. Returns how many were rewritten;
    /// a lead that fails to persist is logged and skipped.
    pub fn rescore_all(&self, now: DateTime<Utc>) -> Result<usize, ServerError> {
        let mut count = 0;
        for mut lead in self.list()? {
            self.scorer.refresh(&mut lead, now);
            match self.persist(&lead, now) {
                Ok(()) => count += 1,
                Err(e) => error!(lead_id = %lead.id, error = %e, "could not persist rescored lead"),
            }
        }
        info!(count, "leads rescored");
        Ok(count)
    }

    fn persist(&self, lead: &Lead, now: DateTime<Utc>) -> Result<(), ServerError> {
        let found = self
            .store
            .update_at(CUSTOMERS, &lead.id, mutable_fields(lead)?, now)?;
        if !found {
            return Err(ServerError::NotFound);
        }
        Ok(())
    }
}

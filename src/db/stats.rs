// src/db/stats.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::db::records::{Collection, Record, RecordStore};
use crate::errors::ServerError;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusCounts {
    pub new: usize,
    pub contacted: usize,
    pub viewed: usize,
    pub closed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total: usize,
    pub today: usize,
    pub this_month: usize,
    pub by_status: StatusCounts,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertyStats {
    pub total: usize,
    pub available: usize,
    pub sold: usize,
    pub rented: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStats {
    pub total: usize,
    pub today: usize,
    pub this_month: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeliveryStats {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub upcoming: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub customers: CustomerStats,
    pub properties: PropertyStats,
    pub inquiries: InquiryStats,
    pub emails: DeliveryStats,
    pub sms: DeliveryStats,
    pub appointments: AppointmentStats,
}

fn field<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

fn count_field(records: &[Record], key: &str, value: &str) -> usize {
    records.iter().filter(|r| field(r, key) == value).count()
}

/// Counts by `createdAt` date prefix (UTC day and UTC month).
fn created_within(records: &[Record], prefix: &str) -> usize {
    records
        .iter()
        .filter(|r| field(r, "createdAt").starts_with(prefix))
        .count()
}

fn delivery(records: &[Record]) -> DeliveryStats {
    DeliveryStats {
        total: records.len(),
        sent: count_field(records, "status", "sent"),
        failed: count_field(records, "status", "failed"),
    }
}

impl RecordStore {
    pub fn stats(&self, now: DateTime<Utc>) -> Result<StoreStats, ServerError> {
        let all = Record::new();
        let customers = self.list(Collection::Customers, &all)?;
        let properties = self.list(Collection::Properties, &all)?;
        let inquiries = self.list(Collection::Inquiries, &all)?;
        let emails = self.list(Collection::Emails, &all)?;
        let sms = self.list(Collection::Sms, &all)?;
        let appointments = self.list(Collection::Appointments, &all)?;

        let today = now.format("%Y-%m-%d").to_string();
        let this_month = now.format("%Y-%m").to_string();

        let upcoming = appointments
            .iter()
            .filter_map(|a| DateTime::parse_from_rfc3339(field(a, "scheduledDate")).ok())
            .filter(|when| when.with_timezone(&Utc) > now)
            .count();

        Ok(StoreStats {
            customers: CustomerStats {
                total: customers.len(),
                today: created_within(&customers, &today),
                this_month: created_within(&customers, &this_month),
                by_status: StatusCounts {
                    new: count_field(&customers, "status", "new"),
                    contacted: count_field(&customers, "status", "contacted"),
                    viewed: count_field(&customers, "status", "viewed"),
                    closed: count_field(&customers, "status", "closed"),
                },
            },
            properties: PropertyStats {
                total: properties.len(),
                available: count_field(&properties, "status", "available"),
                sold: count_field(&properties, "status", "sold"),
                rented: count_field(&properties, "status", "rented"),
            },
            inquiries: InquiryStats {
                total: inquiries.len(),
                today: created_within(&inquiries, &today),
                this_month: created_within(&inquiries, &this_month),
            },
            emails: delivery(&emails),
            sms: delivery(&sms),
            appointments: AppointmentStats {
                total: appointments.len(),
                upcoming,
                completed: count_field(&appointments, "status", "completed"),
            },
        })
    }
}

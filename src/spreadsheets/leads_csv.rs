// src/spreadsheets/leads_csv.rs
use chrono::{DateTime, Utc};

use crate::domain::Lead;

pub const CSV_HEADER: &str = "Name,Email,Phone,Requirements,Status,Date";

/// Commas become semicolons and line breaks become spaces, so every lead
/// stays on one row with six columns. No quoting is applied.
fn flatten(field: &str) -> String {
    field
        .replace(',', ";")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

pub fn leads_csv(leads: &[Lead]) -> String {
    let mut rows = Vec::with_capacity(leads.len() + 1);
    rows.push(CSV_HEADER.to_string());

    for lead in leads {
        rows.push(
            [
                flatten(&lead.full_name()),
                flatten(&lead.email),
                flatten(&lead.phone),
                flatten(&lead.property_description),
                lead.status.as_str().to_string(),
                lead.submitted_at.format("%d/%m/%Y").to_string(),
            ]
            .join(","),
        );
    }

    rows.join("\n")
}

pub fn csv_filename(now: DateTime<Utc>) -> String {
    format!("cheema-properties-inquiries-{}.csv", now.format("%Y-%m-%d"))
}

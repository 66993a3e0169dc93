// src/domain/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::score::{LeadScore, Quality};
use crate::errors::ServerError;

/// Where a lead sits in the agency's follow-up pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Viewed,
    Closed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Viewed,
        LeadStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Viewed => "viewed",
            LeadStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "viewed" => Ok(LeadStatus::Viewed),
            "closed" => Ok(LeadStatus::Closed),
            other => Err(ServerError::BadRequest(format!("unknown status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Email,
    Call,
    Whatsapp,
    PropertyView,
    Inquiry,
    Meeting,
    /// Appended automatically on every status change.
    StatusUpdate,
}

impl InteractionKind {
    /// Kinds an admin can log by hand.
    pub const MANUAL: [InteractionKind; 6] = [
        InteractionKind::Call,
        InteractionKind::Email,
        InteractionKind::Whatsapp,
        InteractionKind::PropertyView,
        InteractionKind::Inquiry,
        InteractionKind::Meeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Email => "email",
            InteractionKind::Call => "call",
            InteractionKind::Whatsapp => "whatsapp",
            InteractionKind::PropertyView => "property_view",
            InteractionKind::Inquiry => "inquiry",
            InteractionKind::Meeting => "meeting",
            InteractionKind::StatusUpdate => "status_update",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InteractionKind::Email => "Email",
            InteractionKind::Call => "Call",
            InteractionKind::Whatsapp => "WhatsApp",
            InteractionKind::PropertyView => "Property view",
            InteractionKind::Inquiry => "Inquiry",
            InteractionKind::Meeting => "Meeting",
            InteractionKind::StatusUpdate => "Status update",
        }
    }
}

impl FromStr for InteractionKind {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "email" => Ok(InteractionKind::Email),
            "call" => Ok(InteractionKind::Call),
            "whatsapp" => Ok(InteractionKind::Whatsapp),
            "property_view" => Ok(InteractionKind::PropertyView),
            "inquiry" => Ok(InteractionKind::Inquiry),
            "meeting" => Ok(InteractionKind::Meeting),
            "status_update" => Ok(InteractionKind::StatusUpdate),
            other => Err(ServerError::BadRequest(format!(
                "unknown interaction type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Positive,
    Neutral,
    Negative,
}

impl FromStr for Outcome {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "positive" => Ok(Outcome::Positive),
            "neutral" => Ok(Outcome::Neutral),
            "negative" => Ok(Outcome::Negative),
            other => Err(ServerError::BadRequest(format!("unknown outcome '{other}'"))),
        }
    }
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Positive => "positive",
            Outcome::Neutral => "neutral",
            Outcome::Negative => "negative",
        }
    }
}

/// A logged touchpoint with a lead. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_needed: Option<bool>,
}

impl Interaction {
    pub fn new(
        kind: InteractionKind,
        description: impl Into<String>,
        outcome: Option<Outcome>,
        follow_up_needed: Option<bool>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            kind,
            timestamp: now,
            description: description.into(),
            outcome,
            follow_up_needed,
        }
    }

    /// The synthetic entry recorded whenever an admin changes a lead's status.
    pub fn status_update(status: LeadStatus, now: DateTime<Utc>) -> Self {
        Self::new(
            InteractionKind::StatusUpdate,
            format!("Status updated to {status}"),
            Some(Outcome::Positive),
            None,
            now,
        )
    }
}

/// A prospective customer's inquiry, as stored in the `customers` collection.
///
/// `score` and `tags` are derived values cached on the record; they are
/// refreshed on every write that touches status or interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub property_description: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<LeadScore>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn score_total(&self) -> u32 {
        self.score.as_ref().map(|s| s.total).unwrap_or(0)
    }

    /// Unscored leads count as cold.
    pub fn quality(&self) -> Quality {
        self.score
            .as_ref()
            .map(|s| s.quality)
            .unwrap_or(Quality::Cold)
    }
}

/// Fields captured by the public inquiry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub property_description: String,
}

impl NewLead {
    /// Every form field is required; the email gets a minimal sanity check.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, ServerError> {
        let required = |name: &str| -> Result<String, ServerError> {
            let value = fields.get(name).map(|v| v.trim()).unwrap_or("");
            if value.is_empty() {
                return Err(ServerError::BadRequest(format!("missing field: {name}")));
            }
            Ok(value.to_string())
        };

        let email = required("email")?;
        let breaks_links = |c: char| {
            c.is_whitespace() || matches!(c, '?' | '&' | '#' | ',' | '<' | '>' | '"')
        };
        if !email.contains('@')
            || email.starts_with('@')
            || email.ends_with('@')
            || email.contains(breaks_links)
        {
            return Err(ServerError::BadRequest("invalid email".into()));
        }

        Ok(Self {
            first_name: required("firstName")?,
            last_name: required("lastName")?,
            email,
            phone: required("phone")?,
            property_description: required("propertyDescription")?,
        })
    }

    pub fn into_lead(self, submitted_at: DateTime<Utc>) -> Lead {
        Lead {
            id: String::new(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            property_description: self.property_description,
            submitted_at,
            status: LeadStatus::New,
            score: None,
            tags: Vec::new(),
            interactions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn form_requires_every_field() {
        let fields = form(&[
            ("firstName", "Rajesh"),
            ("lastName", "Kumar"),
            ("email", "rajesh@example.com"),
            ("phone", "  "),
            ("propertyDescription", "2BHK"),
        ]);
        let err = NewLead::from_form(&fields).unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(msg) if msg.contains("phone")));
    }

    #[test]
    fn form_rejects_bad_email() {
        let fields = form(&[
            ("firstName", "A"),
            ("lastName", "B"),
            ("email", "not-an-email"),
            ("phone", "1"),
            ("propertyDescription", "x"),
        ]);
        assert!(NewLead::from_form(&fields).is_err());
    }

    #[test]
    fn form_rejects_email_carrying_link_syntax() {
        for email in ["a@b.com?cc=x@evil.test&", "a@b.com&body=hi", "a b@c.com", "a@b.com#x"] {
            let fields = form(&[
                ("firstName", "A"),
                ("lastName", "B"),
                ("email", email),
                ("phone", "1"),
                ("propertyDescription", "x"),
            ]);
            assert!(
                matches!(NewLead::from_form(&fields), Err(ServerError::BadRequest(_))),
                "{email}"
            );
        }
    }

    #[test]
    fn lead_deserializes_with_missing_optional_fields() {
        let json = r#"{"id":"1","submittedAt":"2025-01-23T10:30:00Z"}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.status, LeadStatus::New);
        assert!(lead.phone.is_empty());
        assert!(lead.interactions.is_empty());
        assert_eq!(lead.quality(), Quality::Cold);
    }

    #[test]
    fn interaction_uses_wire_names() {
        let json = r#"{"id":"9","type":"property_view","timestamp":"2025-01-23T11:00:00Z","description":"Visited site","outcome":"positive"}"#;
        let i: Interaction = serde_json::from_str(json).unwrap();
        assert_eq!(i.kind, InteractionKind::PropertyView);
        assert_eq!(i.outcome, Some(Outcome::Positive));

        let back = serde_json::to_value(&i).unwrap();
        assert_eq!(back["type"], "property_view");
        assert!(back.get("followUpNeeded").is_none());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in LeadStatus::ALL {
            assert_eq!(status.as_str().parse::<LeadStatus>().unwrap(), status);
        }
        assert!("archived".parse::<LeadStatus>().is_err());
    }
}

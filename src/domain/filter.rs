// src/domain/filter.rs
use std::collections::HashMap;

use crate::domain::lead::{Lead, LeadStatus};
use crate::domain::ranking::leads_by_quality;
use crate::domain::score::Quality;

/// Dashboard search. Empty or `all` values match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub q: String,
    pub status: Option<LeadStatus>,
    pub quality: Option<Quality>,
}

impl LeadFilter {
    /// Unknown status or quality values are treated as `all`.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let pick = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty() && *v != "all")
        };

        Self {
            q: params.get("q").map(|v| v.trim().to_string()).unwrap_or_default(),
            status: pick("status").and_then(|v| v.parse().ok()),
            quality: pick("quality").and_then(|v| v.parse().ok()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty() && self.status.is_none() && self.quality.is_none()
    }

    /// Names and email match case-insensitively; phone is a plain substring.
    fn matches_search_and_status(&self, lead: &Lead) -> bool {
        let matches_search = self.q.is_empty() || {
            let needle = self.q.to_lowercase();
            lead.first_name.to_lowercase().contains(&needle)
                || lead.last_name.to_lowercase().contains(&needle)
                || lead.email.to_lowercase().contains(&needle)
                || lead.phone.contains(&self.q)
        };

        matches_search && self.status.map_or(true, |s| lead.status == s)
    }

    pub fn apply(&self, leads: Vec<Lead>) -> Vec<Lead> {
        let tier: Vec<&Lead> = match self.quality {
            Some(quality) => leads_by_quality(&leads, quality),
            None => leads.iter().collect(),
        };
        tier.into_iter()
            .filter(|l| self.matches_search_and_status(l))
            .cloned()
            .collect()
    }

    /// Query string that reproduces this filter, for export links.
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &self.q)
            .append_pair("status", self.status.map_or("all", |s| s.as_str()))
            .append_pair("quality", self.quality.map_or("all", |q| q.as_str()))
            .finish()
    }
}

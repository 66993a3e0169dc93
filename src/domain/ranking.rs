// src/domain/ranking.rs

use chrono::{DateTime, Utc};

use crate::domain::lead::Lead;
use crate::domain::score::Quality;
use crate::domain::scoring::hours_between;

/// Highest score first. Stable, so equal scores keep their stored order.
pub fn sort_leads_by_score(leads: &mut [Lead]) {
    leads.sort_by(|a, b| b.score_total().cmp(&a.score_total()));
}

pub fn leads_by_quality(leads: &[Lead], quality: Quality) -> Vec<&Lead> {
    leads.iter().filter(|l| l.quality() == quality).collect()
}

#[derive(Debug, Clone)]
pub struct PriorityAction<'a> {
    pub lead: &'a Lead,
    pub action: &'static str,
    pub priority: u8,
}

/// Today's call sheet: hot leads first, with a bump for anything submitted in the last day.
pub fn todays_priority_actions(leads: &[Lead], now: DateTime<Utc>) -> Vec<PriorityAction<'_>> {
    let mut actions: Vec<PriorityAction<'_>> = leads
        .iter()
        .map(|lead| {
            let (mut priority, action) = match lead.quality() {
                Quality::Hot => (3, "Call immediately"),
                Quality::Warm => (2, "Send WhatsApp message"),
                Quality::Cold => (1, "Send email follow-up"),
            };

            if hours_between(&lead.submitted_at, &now) <= 24.0 {
                priority += 1;
            }

            PriorityAction {
                lead,
                action,
                priority,
            }
        })
        .collect();

    actions.sort_by(|a, b| b.priority.cmp(&a.priority));
    actions
}

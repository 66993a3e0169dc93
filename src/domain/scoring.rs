// src/domain/scoring.rs

//! Heuristic lead scoring.
//!
//! Every rule is a literal, case-insensitive substring match against the
//! lead's property description, or a count over its interactions. The keyword
//! lists and weights are part of the observable behavior: changing one changes
//! which leads the agency calls first.

use chrono::{DateTime, Datelike, FixedOffset, Local, Timelike, Utc, Weekday};

use crate::domain::lead::{Interaction, InteractionKind, Lead, Outcome};
use crate::domain::score::{
    LeadScore, Priority, Quality, ScoreBreakdown, BEHAVIOR_CAP, DEMOGRAPHIC_CAP, ENGAGEMENT_CAP,
    INTENT_CAP, TIMELINE_CAP,
};
use crate::errors::ServerError;

const HIGH_INTENT_KEYWORDS: [&str; 6] = ["buy", "purchase", "invest", "looking for", "need", "want"];
const URGENT_KEYWORDS: [&str; 5] = ["urgent", "asap", "immediate", "soon", "quickly"];
const READY_KEYWORDS: [&str; 4] = ["ready", "cash", "approved", "loan"];

/// Stand-in for "never contacted" when picking the next action.
const NO_CONTACT_DAYS: f64 = 999.0;

pub const HOT_THRESHOLD: u32 = 70;
pub const WARM_THRESHOLD: u32 = 40;

/// Calendar used for the business-hours and weekday bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl ScoringZone {
    pub fn from_offset_minutes(minutes: Option<i32>) -> Result<Self, ServerError> {
        match minutes {
            None => Ok(ScoringZone::Local),
            Some(m) => FixedOffset::east_opt(m * 60)
                .map(ScoringZone::Fixed)
                .ok_or_else(|| ServerError::ConfigError(format!("utc offset out of range: {m}"))),
        }
    }

    fn hour_and_weekday(&self, t: &DateTime<Utc>) -> (u32, Weekday) {
        match self {
            ScoringZone::Local => {
                let local = t.with_timezone(&Local);
                (local.hour(), local.weekday())
            }
            ScoringZone::Fixed(offset) => {
                let fixed = t.with_timezone(offset);
                (fixed.hour(), fixed.weekday())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeadScorer {
    zone: ScoringZone,
}

impl LeadScorer {
    pub fn new(zone: ScoringZone) -> Self {
        Self { zone }
    }

    pub fn calculate_lead_score(&self, lead: &Lead, interactions: &[Interaction]) -> LeadScore {
        self.score_at(lead, interactions, Utc::now())
    }

    /// Score as of `now`. Identical inputs give identical output, `last_updated` included.
    pub fn score_at(&self, lead: &Lead, interactions: &[Interaction], now: DateTime<Utc>) -> LeadScore {
        let description = lead.property_description.to_lowercase();

        let breakdown = ScoreBreakdown {
            demographic: score_demographics(lead, &description),
            behavior: score_behavior(&description, interactions),
            engagement: score_engagement(interactions, now),
            intent: score_intent(&description),
            timeline: self.score_timeline(&lead.submitted_at, now),
        };

        let total = breakdown.sum();

        LeadScore {
            total,
            breakdown,
            quality: quality_for(total),
            priority: priority_for(total, &description),
            next_action: next_action_for(total, interactions, now).to_string(),
            last_updated: now,
        }
    }

    /// Recompute the cached score and tags on `lead` from its own interactions.
    pub fn refresh(&self, lead: &mut Lead, now: DateTime<Utc>) {
        let score = self.score_at(lead, &lead.interactions, now);
        lead.score = Some(score);
        lead.tags = auto_assign_tags(lead);
    }

    /// [`refresh`](Self::refresh) against the wall clock.
    pub fn refresh_now(&self, lead: &mut Lead) {
        lead.score = Some(self.calculate_lead_score(lead, &lead.interactions));
        lead.tags = auto_assign_tags(lead);
    }

    fn score_timeline(&self, submitted_at: &DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        let mut score = 0;
        let hours_ago = hours_between(submitted_at, &now);

        if hours_ago <= 1.0 {
            score += 5;
        } else if hours_ago <= 24.0 {
            score += 3;
        } else if hours_ago <= 72.0 {
            score += 1;
        }

        let (hour, weekday) = self.zone.hour_and_weekday(submitted_at);
        if (9..=18).contains(&hour) {
            score += 2;
        }
        if weekday.number_from_monday() <= 5 {
            score += 3;
        }

        score.min(TIMELINE_CAP)
    }
}

fn score_demographics(lead: &Lead, description: &str) -> u32 {
    let mut score = 0;

    if !lead.phone.is_empty() {
        score += 5;
    }
    if !lead.email.is_empty() {
        score += 5;
    }
    if !lead.first_name.is_empty() && !lead.last_name.is_empty() {
        score += 3;
    }

    if contains_any(description, &["budget", "price"]) {
        score += 2;
    }
    if contains_any(description, &["lakh", "cr"]) {
        score += 3;
    }
    if contains_any(description, &["ready to buy", "urgent"]) {
        score += 5;
    }
    if contains_any(description, &["ludhiana", "chandigarh"]) {
        score += 2;
    }

    score.min(DEMOGRAPHIC_CAP)
}

fn score_behavior(description: &str, interactions: &[Interaction]) -> u32 {
    let mut score = 0;

    let views = count_kind(interactions, InteractionKind::PropertyView);
    score += (views * 2).min(8);

    let inquiries = count_kind(interactions, InteractionKind::Inquiry);
    score += (inquiries * 3).min(9);

    // Length in characters, not bytes.
    if description.chars().count() > 50 {
        score += 3;
    }
    if contains_any(description, &["bedroom", "bhk"]) {
        score += 2;
    }
    if contains_any(description, &["parking", "amenities"]) {
        score += 2;
    }
    if contains_any(description, &["floor", "facing"]) {
        score += 1;
    }

    score.min(BEHAVIOR_CAP)
}

fn score_engagement(interactions: &[Interaction], now: DateTime<Utc>) -> u32 {
    let mut score = 0;

    let recent = interactions
        .iter()
        .filter(|i| hours_between(&i.timestamp, &now) / 24.0 <= 7.0)
        .count() as u32;
    score += (recent * 2).min(10);

    let positive = interactions
        .iter()
        .filter(|i| i.outcome == Some(Outcome::Positive))
        .count() as u32;
    score += (positive * 3).min(9);

    let calls = count_kind(interactions, InteractionKind::Call);
    score += calls.min(1);

    score.min(ENGAGEMENT_CAP)
}

fn score_intent(description: &str) -> u32 {
    let mut score = 0;

    score += 2 * count_present(description, &HIGH_INTENT_KEYWORDS);
    score += 3 * count_present(description, &URGENT_KEYWORDS);
    score += 4 * count_present(description, &READY_KEYWORDS);

    if description.contains("budget") && description.contains("location") {
        score += 3;
    }

    score.min(INTENT_CAP)
}

pub fn quality_for(total: u32) -> Quality {
    if total >= HOT_THRESHOLD {
        Quality::Hot
    } else if total >= WARM_THRESHOLD {
        Quality::Warm
    } else {
        Quality::Cold
    }
}

/// An explicitly urgent description is high priority whatever the total.
pub fn priority_for(total: u32, description: &str) -> Priority {
    let description = description.to_lowercase();
    let urgent = contains_any(&description, &["urgent", "asap"]);

    if total >= HOT_THRESHOLD || urgent {
        Priority::High
    } else if total >= WARM_THRESHOLD {
        Priority::Medium
    } else {
        Priority::Low
    }
}

pub fn next_action_for(total: u32, interactions: &[Interaction], now: DateTime<Utc>) -> &'static str {
    let days_since_contact = interactions
        .iter()
        .map(|i| i.timestamp)
        .max()
        .map(|last| hours_between(&last, &now) / 24.0)
        .unwrap_or(NO_CONTACT_DAYS);

    if total >= 70 {
        if days_since_contact > 1.0 {
            return "Immediate call required - Hot lead!";
        }
        return "Schedule property visit within 24 hours";
    }

    if total >= 50 {
        if days_since_contact > 3.0 {
            return "Follow up with WhatsApp message";
        }
        return "Send property recommendations via email";
    }

    if total >= 30 {
        return "Add to nurture campaign - send weekly updates";
    }

    "Low priority - monthly newsletter only"
}

/// Categorical labels from the description, in scan order. Independent of the score.
pub fn auto_assign_tags(lead: &Lead) -> Vec<String> {
    let description = lead.property_description.to_lowercase();

    // (needles, tag) in the order tags are emitted.
    let rules: [(&[&str], &str); 12] = [
        (&["lakh"], "Mid-Budget"),
        (&["cr", "crore"], "High-Budget"),
        (&["apartment"], "Apartment"),
        (&["house"], "House"),
        (&["villa"], "Villa"),
        (&["commercial"], "Commercial"),
        (&["ludhiana"], "Ludhiana"),
        (&["chandigarh"], "Chandigarh"),
        (&["urgent", "asap"], "Urgent"),
        (&["ready"], "Ready-to-Buy"),
        (&["invest"], "Investor"),
        (&["first time"], "First-Time-Buyer"),
    ];

    rules
        .iter()
        .filter(|(needles, _)| contains_any(&description, needles))
        .map(|(_, tag)| tag.to_string())
        .collect()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn count_present(haystack: &str, needles: &[&str]) -> u32 {
    needles.iter().filter(|n| haystack.contains(*n)).count() as u32
}

fn count_kind(interactions: &[Interaction], kind: InteractionKind) -> u32 {
    interactions.iter().filter(|i| i.kind == kind).count() as u32
}

pub(crate) fn hours_between(earlier: &DateTime<Utc>, now: &DateTime<Utc>) -> f64 {
    (*now - *earlier).num_milliseconds() as f64 / 3_600_000.0
}

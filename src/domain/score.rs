// src/domain/score.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ServerError;

pub const DEMOGRAPHIC_CAP: u32 = 25;
pub const BEHAVIOR_CAP: u32 = 25;
pub const ENGAGEMENT_CAP: u32 = 20;
pub const INTENT_CAP: u32 = 20;
pub const TIMELINE_CAP: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Hot,
    Warm,
    Cold,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Hot, Quality::Warm, Quality::Cold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Hot => "hot",
            Quality::Warm => "warm",
            Quality::Cold => "cold",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Quality::Hot),
            "warm" => Ok(Quality::Warm),
            "cold" => Ok(Quality::Cold),
            other => Err(ServerError::BadRequest(format!("unknown quality '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category points, each already clamped to its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub demographic: u32,
    pub behavior: u32,
    pub engagement: u32,
    pub intent: u32,
    pub timeline: u32,
}

impl ScoreBreakdown {
    pub fn sum(&self) -> u32 {
        self.demographic + self.behavior + self.engagement + self.intent + self.timeline
    }

    /// (name, points, cap) in display order.
    pub fn entries(&self) -> [(&'static str, u32, u32); 5] {
        [
            ("Demographic", self.demographic, DEMOGRAPHIC_CAP),
            ("Behavior", self.behavior, BEHAVIOR_CAP),
            ("Engagement", self.engagement, ENGAGEMENT_CAP),
            ("Intent", self.intent, INTENT_CAP),
            ("Timeline", self.timeline, TIMELINE_CAP),
        ]
    }
}

/// Result of one scoring pass. Always recomputed, never edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadScore {
    pub total: u32,
    pub breakdown: ScoreBreakdown,
    pub quality: Quality,
    pub priority: Priority,
    pub next_action: String,
    pub last_updated: DateTime<Utc>,
}

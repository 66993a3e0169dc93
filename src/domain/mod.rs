pub mod filter;
pub mod lead;
pub mod ranking;
pub mod score;
pub mod scoring;

pub use filter::LeadFilter;
pub use lead::{Interaction, InteractionKind, Lead, LeadStatus, NewLead, Outcome};
pub use ranking::{leads_by_quality, sort_leads_by_score, todays_priority_actions, PriorityAction};
pub use score::{LeadScore, Quality};
pub use scoring::{LeadScorer, ScoringZone};

use crate::domain::{LeadStatus, Quality};
use maud::{html, Markup};

pub fn quality_badge(quality: Quality) -> Markup {
    html! {
        span class=(format!("badge badge-{}", quality.as_str())) { (quality.as_str().to_uppercase()) }
    }
}

pub fn status_badge(status: LeadStatus) -> Markup {
    html! {
        span class="badge badge-status" { (status.as_str()) }
    }
}

use crate::domain::LeadScore;
use maud::{html, Markup};

use super::quality_badge;

pub fn score_breakdown(score: &LeadScore) -> Markup {
    html! {
        div class="score" {
            p {
                strong style="font-size: 1.5rem;" { (score.total) } " / 100 "
                (quality_badge(score.quality))
                " priority: " strong { (score.priority.as_str()) }
            }
            table {
                tbody {
                    @for (name, points, cap) in score.breakdown.entries() {
                        tr {
                            td style="width: 120px;" { (name) }
                            td style="width: 70px;" { (points) " / " (cap) }
                            td {
                                div class="bar" {
                                    span style=(format!("width: {}%;", points * 100 / cap.max(1))) {}
                                }
                            }
                        }
                    }
                }
            }
            p { "Next action: " em class="next-action" { (score.next_action) } }
            p style="color: #6b7280; font-size: .8rem;" {
                "Scored " (score.last_updated.format("%Y-%m-%d %H:%M UTC"))
            }
        }
    }
}

use crate::domain::{InteractionKind, Lead, LeadStatus};
use crate::notify::ContactLinks;
use crate::templates::components::{score_breakdown, status_badge};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn lead_detail_page(lead: &Lead, links: &ContactLinks, flash: Option<&str>) -> Markup {
    desktop_layout(
        &lead.full_name(),
        true,
        html! {
            main class="container" {
                p { a href="/admin" { "← All leads" } }
                h1 { (lead.full_name()) " " (status_badge(lead.status)) }

                @if let Some(msg) = flash {
                    div class="flash" { (msg) }
                }

                div style="display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem;" {
                    section class="card" id="contact" {
                        h3 { "Contact" }
                        p { "Email: " (lead.email) }
                        p { "Phone: " (lead.phone) }
                        p { "Submitted: " (lead.submitted_at.format("%Y-%m-%d %H:%M UTC")) }
                        div style="display: flex; gap: 1rem;" {
                            a class="contact-link" href=(links.tel) { "Call" }
                            a class="contact-link" href=(links.whatsapp) target="_blank" rel="noopener" { "WhatsApp" }
                            a class="contact-link" href=(links.email) { "Email" }
                        }
                        h4 { "Requirements" }
                        p class="requirements" { (lead.property_description) }
                        @if !lead.tags.is_empty() {
                            p class="tags" {
                                @for tag in &lead.tags {
                                    span class="badge badge-status" style="margin-right: 4px;" { (tag) }
                                }
                            }
                        }
                    }

                    section class="card" id="score" {
                        h3 { "Lead score" }
                        @match &lead.score {
                            Some(score) => (score_breakdown(score)),
                            None => p { "Not scored yet." },
                        }
                    }
                }

                section class="card" {
                    h3 { "Update" }
                    form id="status-form" action=(format!("/admin/leads/{}/status", lead.id)) method="post" style="display: flex; gap: 10px; align-items: center;" {
                        select name="status" style="padding: 8px;" {
                            @for status in LeadStatus::ALL {
                                option value=(status.as_str()) selected[lead.status == status] { (status.as_str()) }
                            }
                        }
                        button type="submit" { "Change status" }
                    }

                    form id="interaction-form" class="stacked" action=(format!("/admin/leads/{}/interactions", lead.id)) method="post" style="margin-top: 1rem;" {
                        label for="type" { "Log interaction" }
                        select id="type" name="type" {
                            @for kind in InteractionKind::MANUAL {
                                option value=(kind.as_str()) { (kind.label()) }
                            }
                        }
                        label for="outcome" { "Outcome" }
                        select id="outcome" name="outcome" {
                            option value="" { "-" }
                            option value="positive" { "positive" }
                            option value="neutral" { "neutral" }
                            option value="negative" { "negative" }
                        }
                        label for="description" { "Notes" }
                        textarea id="description" name="description" rows="2" {}
                        label { input type="checkbox" name="followUpNeeded" value="true" style="width: auto;"; " Follow-up needed" }
                        div style="margin-top: .75rem;" { button type="submit" { "Add" } }
                    }

                    form action=(format!("/admin/leads/{}/delete", lead.id)) method="post" onsubmit=(format!("return confirm('Delete the inquiry from {}?');", lead.full_name().replace('\'', ""))) style="margin-top: 1rem;" {
                        button type="submit" class="link" { "Delete lead" }
                    }
                }

                section class="card" id="interactions" {
                    h3 { "Interactions (" (lead.interactions.len()) ")" }
                    @if lead.interactions.is_empty() {
                        p { "No interactions yet." }
                    } @else {
                        table {
                            thead { tr { th { "When" } th { "Type" } th { "Outcome" } th { "Notes" } } }
                            tbody {
                                @for interaction in lead.interactions.iter().rev() {
                                    tr class="interaction" {
                                        td { (interaction.timestamp.format("%Y-%m-%d %H:%M")) }
                                        td { (interaction.kind.label()) }
                                        td { (interaction.outcome.map(|o| o.as_str()).unwrap_or("-")) }
                                        td {
                                            (interaction.description)
                                            @if interaction.follow_up_needed == Some(true) {
                                                " " span class="badge badge-warm" { "follow-up" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

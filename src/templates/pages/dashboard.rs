use crate::db::records::DatabaseSize;
use crate::db::stats::StoreStats;
use crate::domain::{Lead, LeadFilter, LeadStatus, PriorityAction, Quality};
use crate::templates::components::card::stat_card;
use crate::templates::components::{quality_badge, status_badge};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct DashboardVm<'a> {
    pub stats: &'a StoreStats,
    pub storage: &'a DatabaseSize,
    pub filter: &'a LeadFilter,
    /// Filtered leads, highest score first.
    pub leads: &'a [Lead],
    pub priority_actions: &'a [PriorityAction<'a>],
    pub quality_counts: [(Quality, usize); 3],
    pub flash: Option<&'a str>,
}

pub fn dashboard_page(vm: &DashboardVm) -> Markup {
    let export_query = vm.filter.to_query();

    desktop_layout(
        "Lead dashboard",
        true,
        html! {
            main class="container" {
                h1 { "Lead dashboard" }

                @if let Some(msg) = vm.flash {
                    div class="flash" { (msg) }
                }

                section id="stats" style="display: grid; grid-template-columns: repeat(6, 1fr); gap: 1rem; margin-bottom: 1.5rem;" {
                    (stat_card("Total leads", vm.stats.customers.total))
                    (stat_card("Today", vm.stats.customers.today))
                    (stat_card("This month", vm.stats.customers.this_month))
                    @for (quality, count) in &vm.quality_counts {
                        (stat_card(&format!("{} leads", quality.as_str()), *count))
                    }
                }

                section class="card" id="priority-actions" {
                    h3 { "Today's priority actions" }
                    @if vm.priority_actions.is_empty() {
                        p { "Nothing to do yet." }
                    } @else {
                        ol {
                            @for item in vm.priority_actions {
                                li {
                                    a href=(format!("/admin/leads/{}", item.lead.id)) { (item.lead.full_name()) }
                                    " " (quality_badge(item.lead.quality()))
                                    " " (item.action)
                                }
                            }
                        }
                    }
                }

                section class="card" {
                    form id="filters" action="/admin" method="get" style="display: flex; gap: 10px; align-items: center; flex-wrap: wrap;" {
                        input type="search" name="q" value=(vm.filter.q) placeholder="Search name, email or phone" style="padding: 8px; flex: 1;";
                        select name="status" style="padding: 8px;" {
                            option value="all" selected[vm.filter.status.is_none()] { "All statuses" }
                            @for status in LeadStatus::ALL {
                                option value=(status.as_str()) selected[vm.filter.status == Some(status)] { (status.as_str()) }
                            }
                        }
                        select name="quality" style="padding: 8px;" {
                            option value="all" selected[vm.filter.quality.is_none()] { "All tiers" }
                            @for quality in Quality::ALL {
                                option value=(quality.as_str()) selected[vm.filter.quality == Some(quality)] { (quality.as_str()) }
                            }
                        }
                        button type="submit" { "Filter" }
                        a href=(format!("/admin/export.csv?{export_query}")) { "Export CSV" }
                        a href=(format!("/admin/export.xlsx?{export_query}")) { "Export XLSX" }
                        @if !vm.filter.is_empty() {
                            a id="clear-filters" href="/admin" { "Clear filters" }
                        }
                    }
                    form action="/admin/rescore" method="post" style="margin-top: .75rem;" {
                        button type="submit" { "Rescore all leads" }
                    }
                }

                section class="card" {
                    h3 { "Leads (" (vm.leads.len()) ")" }
                    div style="overflow-x: auto;" {
                        table id="leads" {
                            thead {
                                tr {
                                    th { "Name" }
                                    th { "Score" }
                                    th { "Tier" }
                                    th { "Status" }
                                    th { "Tags" }
                                    th { "Submitted" }
                                    th { "Next action" }
                                }
                            }
                            tbody {
                                @for lead in vm.leads {
                                    tr class="lead-row" data-id=(lead.id) {
                                        td { a href=(format!("/admin/leads/{}", lead.id)) { (lead.full_name()) } }
                                        td class="score" { (lead.score_total()) }
                                        td { (quality_badge(lead.quality())) }
                                        td { (status_badge(lead.status)) }
                                        td style="font-size: .85em;" { (lead.tags.join(", ")) }
                                        td style="color: #6b7280; font-size: .9em;" { (lead.submitted_at.format("%Y-%m-%d %H:%M")) }
                                        td style="font-size: .85em;" {
                                            @if let Some(score) = &lead.score {
                                                (score.next_action)
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                section class="card" {
                    h3 { "Messages" }
                    p {
                        "Emails: " (vm.stats.emails.sent) " sent, "
                        (vm.stats.emails.failed) " failed, "
                        (vm.stats.emails.total) " recorded"
                    }
                }

                section class="card" id="maintenance" {
                    h3 { "Data" }
                    p id="storage" {
                        "Storage: " (vm.storage.used / 1024) " KB of "
                        (vm.storage.limit / 1024 / 1024) " MB ("
                        (format!("{:.1}", vm.storage.percentage)) "%)"
                    }
                    p { a href="/admin/backup.json" { "Download backup" } }
                    form id="cleanup-form" action="/admin/cleanup" method="post" style="display: flex; gap: 10px; align-items: center;" {
                        label for="days" { "Remove emails, SMS and inquiries older than" }
                        input id="days" type="number" name="days" min="1" value="30" style="width: 5rem; padding: 8px;";
                        " days "
                        button type="submit" { "Clean up" }
                    }
                    form id="restore-form" class="stacked" action="/admin/restore" method="post" style="margin-top: 1rem;" onsubmit="return confirm('Replace all data with this backup?');" {
                        label for="data" { "Restore from backup (replaces everything)" }
                        textarea id="data" name="data" rows="3" {}
                        div style="margin-top: .75rem;" { button type="submit" { "Restore" } }
                    }
                }
            }
        },
    )
}

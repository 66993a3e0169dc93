use std::collections::HashMap;
use std::io::Read;

use astra::{Request, Response};
use chrono::Utc;
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::app::AppContext;
use crate::auth;
use crate::domain::{
    leads_by_quality, sort_leads_by_score, todays_priority_actions, Interaction, InteractionKind, Lead, LeadFilter,
    LeadStatus, NewLead, Outcome, Quality,
};
use crate::errors::ServerError;
use crate::db::records::STORAGE_LIMIT_BYTES;
use crate::responses::{
    csv_response, error_to_response, html_response, html_response_with_status, json_response, redirect,
    redirect_with_cookie, xlsx_response, ResultResp,
};
use crate::spreadsheets::{csv_filename, leads_csv, leads_xlsx};
use crate::telemetry::AnalyticsEvent;
use crate::templates::pages::{self, DashboardVm};

/// Form bodies larger than this are rejected.
const MAX_FORM_BYTES: u64 = 64 * 1024;
/// A restore carries a whole backup, form-encoded.
const MAX_RESTORE_BYTES: u64 = 3 * STORAGE_LIMIT_BYTES;
const DEFAULT_CLEANUP_DAYS: i64 = 30;
const PRIORITY_ACTIONS_SHOWN: usize = 5;

/// Entry point for the server loop: handler errors become error pages.
pub fn respond(req: Request, ctx: &AppContext) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    match handle(req, ctx) {
        Ok(resp) => resp,
        Err(err) => {
            debug!(%method, %path, "handler returned an error");
            error_to_response(err)
        }
    }
}

pub fn handle(mut req: Request, ctx: &AppContext) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", [""]) => html_response(pages::home_page(
            &ctx.config.agency,
            None,
            &HashMap::new(),
        )),
        ("POST", ["leads"]) => {
            let form = parse_form(&mut req, MAX_FORM_BYTES)?;
            submit_lead(ctx, form)
        }
        ("GET", ["thanks"]) => html_response(pages::thanks_page(&ctx.config.agency)),

        ("GET", ["admin", "login"]) => html_response(pages::login_page(None)),
        ("POST", ["admin", "login"]) => {
            let form = parse_form(&mut req, MAX_FORM_BYTES)?;
            login(ctx, &form)
        }
        ("POST", ["admin", "logout"]) => logout(&req, ctx),

        (_, ["admin", ..]) => {
            if !has_admin_session(&req, ctx)? {
                return redirect("/admin/login");
            }
            let query = parse_query(&req);
            let form = if method == "POST" {
                let limit = match &segments[1..] {
                    ["restore"] => MAX_RESTORE_BYTES,
                    _ => MAX_FORM_BYTES,
                };
                parse_form(&mut req, limit)?
            } else {
                HashMap::new()
            };
            admin_route(ctx, &method, &segments[1..], &query, &form)
        }

        _ => Err(ServerError::NotFound),
    }
}

fn admin_route(
    ctx: &AppContext,
    method: &str,
    rest: &[&str],
    query: &HashMap<String, String>,
    form: &HashMap<String, String>,
) -> ResultResp {
    match (method, rest) {
        ("GET", []) => dashboard(ctx, query),
        ("GET", ["leads", id]) => lead_detail(ctx, id, query),
        ("POST", ["leads", id, "status"]) => change_status(ctx, id, form),
        ("POST", ["leads", id, "interactions"]) => log_interaction(ctx, id, form),
        ("POST", ["leads", id, "delete"]) => delete_lead(ctx, id),
        ("POST", ["rescore"]) => {
            let count = ctx.leads().rescore_all(Utc::now())?;
            info!(count, "manual rescore");
            redirect("/admin?flash=rescored")
        }
        ("GET", ["export.csv"]) => export_csv(ctx, query),
        ("GET", ["export.xlsx"]) => export_xlsx(ctx, query),
        ("GET", ["backup.json"]) => backup(ctx),
        ("POST", ["restore"]) => restore(ctx, form),
        ("POST", ["cleanup"]) => cleanup(ctx, form),
        _ => Err(ServerError::NotFound),
    }
}

fn submit_lead(ctx: &AppContext, form: HashMap<String, String>) -> ResultResp {
    ctx.telemetry.track(AnalyticsEvent::form_submission("lead_capture"));

    let new_lead = match NewLead::from_form(&form) {
        Ok(new_lead) => new_lead,
        Err(ServerError::BadRequest(msg)) => {
            return html_response_with_status(
                400,
                pages::home_page(&ctx.config.agency, Some(&msg), &form),
            );
        }
        Err(e) => return Err(e),
    };

    let now = Utc::now();
    let lead = ctx.leads().create(new_lead, now)?;

    ctx.notifier.dispatch_new_lead(&ctx.store, &lead, now);
    ctx.telemetry.track(AnalyticsEvent::lead_generated(&lead));

    redirect("/thanks")
}

fn login(ctx: &AppContext, form: &HashMap<String, String>) -> ResultResp {
    let candidate = form.get("password").map(String::as_str).unwrap_or("");

    if !auth::check_password(&ctx.config.admin.password, candidate) {
        warn!("admin login failed");
        ctx.telemetry.track(AnalyticsEvent::admin_login(false));
        return html_response_with_status(401, pages::login_page(Some("Invalid password")));
    }

    let now = Utc::now().timestamp();
    let ttl = ctx.config.admin.session_ttl_secs;
    let token = ctx
        .db()
        .with_conn(|conn| auth::create_admin_session(conn, now, ttl))?;

    info!("admin logged in");
    ctx.telemetry.track(AnalyticsEvent::admin_login(true));
    redirect_with_cookie("/admin", &auth::session_cookie(&token, ttl))
}

fn logout(req: &Request, ctx: &AppContext) -> ResultResp {
    if let Some(token) = auth::session_token(req) {
        let now = Utc::now().timestamp();
        ctx.db()
            .with_conn(|conn| auth::revoke_session(conn, &token, now))?;
    }
    redirect_with_cookie("/", &auth::clear_session_cookie())
}

fn has_admin_session(req: &Request, ctx: &AppContext) -> Result<bool, ServerError> {
    let Some(token) = auth::session_token(req) else {
        return Ok(false);
    };
    let now = Utc::now().timestamp();
    ctx.db()
        .with_conn(|conn| auth::is_valid_session(conn, &token, now))
}

fn flash_message(query: &HashMap<String, String>) -> Option<&'static str> {
    match query.get("flash").map(String::as_str) {
        Some("status") => Some("Status updated."),
        Some("interaction") => Some("Interaction logged."),
        Some("deleted") => Some("Lead deleted."),
        Some("rescored") => Some("All leads rescored."),
        Some("restored") => Some("Backup restored."),
        Some("cleaned") => Some("Old messages cleaned up."),
        _ => None,
    }
}

/// Leads matching the dashboard filters, highest score first.
fn filtered_leads(ctx: &AppContext, filter: &LeadFilter) -> Result<Vec<Lead>, ServerError> {
    let mut leads = filter.apply(ctx.leads().list()?);
    sort_leads_by_score(&mut leads);
    Ok(leads)
}

fn dashboard(ctx: &AppContext, query: &HashMap<String, String>) -> ResultResp {
    let now = Utc::now();
    let filter = LeadFilter::from_query(query);
    let all = ctx.leads().list()?;
    let stats = ctx.store.stats(now)?;
    let storage = ctx.store.database_size()?;

    let mut leads = filter.apply(all.clone());
    sort_leads_by_score(&mut leads);

    let mut actions = todays_priority_actions(&all, now);
    actions.truncate(PRIORITY_ACTIONS_SHOWN);

    let count = |q: Quality| leads_by_quality(&all, q).len();
    let quality_counts = [
        (Quality::Hot, count(Quality::Hot)),
        (Quality::Warm, count(Quality::Warm)),
        (Quality::Cold, count(Quality::Cold)),
    ];

    html_response(pages::dashboard_page(&DashboardVm {
        stats: &stats,
        storage: &storage,
        filter: &filter,
        leads: &leads,
        priority_actions: &actions,
        quality_counts,
        flash: flash_message(query),
    }))
}

fn lead_detail(ctx: &AppContext, id: &str, query: &HashMap<String, String>) -> ResultResp {
    let mut lead = ctx.leads().get(id)?.ok_or(ServerError::NotFound)?;

    // Shown as of now; the stored score is only a cache.
    ctx.scorer.refresh_now(&mut lead);

    let links = ctx.notifier.contact_links(&lead);
    html_response(pages::lead_detail_page(&lead, &links, flash_message(query)))
}

fn change_status(ctx: &AppContext, id: &str, form: &HashMap<String, String>) -> ResultResp {
    let status: LeadStatus = form
        .get("status")
        .ok_or_else(|| ServerError::BadRequest("missing field: status".into()))?
        .parse()?;

    let change = ctx
        .leads()
        .update_status(id, status, Utc::now())?
        .ok_or(ServerError::NotFound)?;

    ctx.telemetry.track(AnalyticsEvent::lead_status_change(
        &change.lead,
        change.previous,
        status,
    ));

    redirect(&format!("/admin/leads/{id}?flash=status"))
}

fn log_interaction(ctx: &AppContext, id: &str, form: &HashMap<String, String>) -> ResultResp {
    let kind: InteractionKind = form
        .get("type")
        .ok_or_else(|| ServerError::BadRequest("missing field: type".into()))?
        .parse()?;
    if !InteractionKind::MANUAL.contains(&kind) {
        return Err(ServerError::BadRequest(format!(
            "'{}' cannot be logged by hand",
            kind.as_str()
        )));
    }

    let outcome = match form.get("outcome").map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => Some(raw.parse::<Outcome>()?),
        None => None,
    };
    let follow_up = form
        .get("followUpNeeded")
        .map(|v| v == "true" || v == "on");
    let description = form.get("description").map(|d| d.trim()).unwrap_or("");

    let now = Utc::now();
    let interaction = Interaction::new(kind, description, outcome, follow_up, now);
    ctx.leads()
        .add_interaction(id, interaction, now)?
        .ok_or(ServerError::NotFound)?;

    redirect(&format!("/admin/leads/{id}?flash=interaction"))
}

fn delete_lead(ctx: &AppContext, id: &str) -> ResultResp {
    if !ctx.leads().delete(id)? {
        return Err(ServerError::NotFound);
    }
    info!(lead_id = %id, "lead deleted");
    ctx.telemetry.track(AnalyticsEvent::customer_deleted(id));
    redirect("/admin?flash=deleted")
}

fn export_csv(ctx: &AppContext, query: &HashMap<String, String>) -> ResultResp {
    let leads = filtered_leads(ctx, &LeadFilter::from_query(query))?;
    ctx.telemetry
        .track(AnalyticsEvent::data_export("csv", leads.len()));
    csv_response(leads_csv(&leads), &csv_filename(Utc::now()))
}

fn export_xlsx(ctx: &AppContext, query: &HashMap<String, String>) -> ResultResp {
    let leads = filtered_leads(ctx, &LeadFilter::from_query(query))?;
    let buffer = leads_xlsx(&leads)?;
    ctx.telemetry
        .track(AnalyticsEvent::data_export("xlsx", leads.len()));
    xlsx_response(
        buffer,
        &format!("cheema-properties-leads-{}.xlsx", Utc::now().format("%Y-%m-%d")),
    )
}

fn backup(ctx: &AppContext) -> ResultResp {
    let body = ctx.store.export_database()?;
    info!(bytes = body.len(), "backup downloaded");
    json_response(
        body,
        &format!("cheema-properties-backup-{}.json", Utc::now().format("%Y-%m-%d")),
    )
}

fn restore(ctx: &AppContext, form: &HashMap<String, String>) -> ResultResp {
    let data = form.get("data").map(|d| d.trim()).unwrap_or("");
    if data.is_empty() {
        return Err(ServerError::BadRequest("missing field: data".into()));
    }
    if !ctx.store.import_database(data)? {
        return Err(ServerError::BadRequest("not a valid backup".into()));
    }
    warn!("record store replaced from backup");
    redirect("/admin?flash=restored")
}

fn cleanup(ctx: &AppContext, form: &HashMap<String, String>) -> ResultResp {
    let days_old = match form.get("days").map(|d| d.trim()).filter(|d| !d.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| ServerError::BadRequest(format!("invalid days: {raw}")))?,
        None => DEFAULT_CLEANUP_DAYS,
    };
    let removed = ctx.store.cleanup(days_old, Utc::now())?;
    info!(days_old, removed, "manual cleanup");
    redirect("/admin?flash=cleaned")
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn parse_form(req: &mut Request, limit: u64) -> Result<HashMap<String, String>, ServerError> {
    let mut raw = String::new();
    req.body_mut()
        .reader()
        .take(limit + 1)
        .read_to_string(&mut raw)
        .map_err(|e| ServerError::BadRequest(format!("unreadable request body: {e}")))?;

    if raw.len() as u64 > limit {
        return Err(ServerError::BadRequest("request body too large".into()));
    }

    Ok(form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
}

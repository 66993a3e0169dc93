use chrono::Utc;
use scraper::{Html, Selector};

use crate::app::AppContext;
use crate::domain::{InteractionKind, Lead, LeadStatus, NewLead};
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{admin_cookie, body_string, get, location, post_form, test_context};

fn seed(ctx: &AppContext, first_name: &str, description: &str) -> Lead {
    ctx.leads()
        .create(
            NewLead {
                first_name: first_name.into(),
                last_name: "Test".into(),
                email: format!("{}@example.com", first_name.to_lowercase()),
                phone: "+91 99887 76655".into(),
                property_description: description.into(),
            },
            Utc::now(),
        )
        .unwrap()
}

#[test]
fn dashboard_lists_leads_highest_score_first() {
    let ctx = test_context();
    let weak = seed(&ctx, "Aman", "house");
    let strong = seed(
        &ctx,
        "Simran",
        "Urgent 3BHK flat in Ludhiana, budget 80 lakhs, ready to buy, cash, loan approved",
    );
    assert!(strong.score_total() > weak.score_total());

    let cookie = admin_cookie(&ctx);
    let resp = handle(get("/admin", Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 200);

    let doc = Html::parse_document(&body_string(resp));
    let rows = Selector::parse("table#leads tr.lead-row").unwrap();
    let ids: Vec<&str> = doc
        .select(&rows)
        .filter_map(|row| row.value().attr("data-id"))
        .collect();
    assert_eq!(ids, vec![strong.id.as_str(), weak.id.as_str()]);

    let scores = Selector::parse("table#leads td.score").unwrap();
    let totals: Vec<u32> = doc
        .select(&scores)
        .map(|td| td.text().collect::<String>().trim().parse().unwrap())
        .collect();
    assert_eq!(totals, vec![strong.score_total(), weak.score_total()]);
}

#[test]
fn dashboard_filters_by_search_text() {
    let ctx = test_context();
    seed(&ctx, "Aman", "house");
    let simran = seed(&ctx, "Simran", "villa in Chandigarh");

    let cookie = admin_cookie(&ctx);
    let resp = handle(get("/admin?q=simran&status=all", Some(&cookie)), &ctx).unwrap();

    let doc = Html::parse_document(&body_string(resp));
    let rows = Selector::parse("tr.lead-row").unwrap();
    let ids: Vec<&str> = doc
        .select(&rows)
        .filter_map(|row| row.value().attr("data-id"))
        .collect();
    assert_eq!(ids, vec![simran.id.as_str()]);
}

#[test]
fn lead_detail_shows_contact_links_and_forms() {
    let ctx = test_context();
    let lead = seed(&ctx, "Aman", "2BHK flat in Mohali");
    let cookie = admin_cookie(&ctx);

    let resp = handle(get(&format!("/admin/leads/{}", lead.id), Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 200);

    let doc = Html::parse_document(&body_string(resp));
    let links = Selector::parse("a.contact-link").unwrap();
    let hrefs: Vec<&str> = doc
        .select(&links)
        .filter_map(|a| a.value().attr("href"))
        .collect();
    assert!(hrefs.iter().any(|h| h.starts_with("tel:")));
    assert!(hrefs.iter().any(|h| h.starts_with("https://wa.me/")));
    assert!(hrefs.iter().any(|h| h.starts_with("mailto:aman@example.com")));

    for id in ["form#status-form", "form#interaction-form"] {
        let sel = Selector::parse(id).unwrap();
        assert_eq!(doc.select(&sel).count(), 1, "{id}");
    }
}

#[test]
fn missing_lead_detail_is_not_found() {
    let ctx = test_context();
    let cookie = admin_cookie(&ctx);
    assert!(matches!(
        handle(get("/admin/leads/missing", Some(&cookie)), &ctx),
        Err(ServerError::NotFound)
    ));
}

#[test]
fn status_change_records_an_interaction_and_rescores() {
    let ctx = test_context();
    let lead = seed(&ctx, "Aman", "house");
    let cookie = admin_cookie(&ctx);

    let uri = format!("/admin/leads/{}/status", lead.id);
    let resp = handle(post_form(&uri, "status=contacted", Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), format!("/admin/leads/{}?flash=status", lead.id));

    let stored = ctx.leads().get(&lead.id).unwrap().unwrap();
    assert_eq!(stored.status, LeadStatus::Contacted);
    assert_eq!(stored.interactions.len(), 1);
    assert_eq!(stored.interactions[0].kind, InteractionKind::StatusUpdate);
    let before = lead.score.unwrap().last_updated;
    assert!(stored.score.unwrap().last_updated >= before);
}

#[test]
fn unknown_status_is_a_bad_request() {
    let ctx = test_context();
    let lead = seed(&ctx, "Aman", "house");
    let cookie = admin_cookie(&ctx);

    let uri = format!("/admin/leads/{}/status", lead.id);
    assert!(matches!(
        handle(post_form(&uri, "status=archived", Some(&cookie)), &ctx),
        Err(ServerError::BadRequest(_))
    ));
    assert_eq!(ctx.leads().get(&lead.id).unwrap().unwrap().status, LeadStatus::New);
}

#[test]
fn logging_an_interaction_appends_it() {
    let ctx = test_context();
    let lead = seed(&ctx, "Aman", "house");
    let cookie = admin_cookie(&ctx);

    let uri = format!("/admin/leads/{}/interactions", lead.id);
    let form = "type=property_view&outcome=positive&description=Saw+the+Model+Town+house&followUpNeeded=true";
    let resp = handle(post_form(&uri, form, Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 303);

    let stored = ctx.leads().get(&lead.id).unwrap().unwrap();
    assert_eq!(stored.interactions.len(), 1);
    let logged = &stored.interactions[0];
    assert_eq!(logged.kind, InteractionKind::PropertyView);
    assert_eq!(logged.description, "Saw the Model Town house");
    assert_eq!(logged.follow_up_needed, Some(true));
    assert!(stored.score_total() > lead.score_total());
}

#[test]
fn status_updates_cannot_be_logged_by_hand() {
    let ctx = test_context();
    let lead = seed(&ctx, "Aman", "house");
    let cookie = admin_cookie(&ctx);

    let uri = format!("/admin/leads/{}/interactions", lead.id);
    assert!(matches!(
        handle(post_form(&uri, "type=status_update", Some(&cookie)), &ctx),
        Err(ServerError::BadRequest(_))
    ));
}

#[test]
fn delete_removes_the_lead_once() {
    let ctx = test_context();
    let lead = seed(&ctx, "Aman", "house");
    let cookie = admin_cookie(&ctx);

    let uri = format!("/admin/leads/{}/delete", lead.id);
    let resp = handle(post_form(&uri, "", Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/admin?flash=deleted");
    assert!(ctx.leads().get(&lead.id).unwrap().is_none());

    assert!(matches!(
        handle(post_form(&uri, "", Some(&cookie)), &ctx),
        Err(ServerError::NotFound)
    ));
}

#[test]
fn rescore_redirects_with_flash() {
    let ctx = test_context();
    seed(&ctx, "Aman", "house");
    let cookie = admin_cookie(&ctx);

    let resp = handle(post_form("/admin/rescore", "", Some(&cookie)), &ctx).unwrap();
    assert_eq!(location(&resp), "/admin?flash=rescored");

    let resp = handle(get("/admin?flash=rescored", Some(&cookie)), &ctx).unwrap();
    assert!(body_string(resp).contains("All leads rescored."));
}

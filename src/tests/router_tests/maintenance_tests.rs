use chrono::{Duration, Utc};
use scraper::{Html, Selector};
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::db::records::{Collection, Record};
use crate::domain::NewLead;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{admin_cookie, body_string, get, location, post_form, test_context};

fn seed(ctx: &crate::app::AppContext, first_name: &str) -> String {
    ctx.leads()
        .create(
            NewLead {
                first_name: first_name.into(),
                last_name: "Bains".into(),
                email: format!("{}@example.com", first_name.to_lowercase()),
                phone: "9814000000".into(),
                property_description: "2BHK flat in Ludhiana".into(),
            },
            Utc::now(),
        )
        .unwrap()
        .id
}

fn record(v: Value) -> Record {
    v.as_object().cloned().unwrap()
}

#[test]
fn backup_downloads_every_collection_as_json() {
    let ctx = test_context();
    let id = seed(&ctx, "Gurpreet");
    let cookie = admin_cookie(&ctx);

    let resp = handle(get("/admin/backup.json", Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 200);
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(disposition.contains("cheema-properties-backup-"));

    let backup: Value = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(backup["customers"][0]["id"], id.as_str());
    assert!(backup["emails"].is_array());
    assert_eq!(backup["settings"]["initialized"], true);
}

#[test]
fn restore_brings_back_a_deleted_lead() {
    let ctx = test_context();
    let id = seed(&ctx, "Gurpreet");
    let cookie = admin_cookie(&ctx);

    let backup = body_string(handle(get("/admin/backup.json", Some(&cookie)), &ctx).unwrap());
    assert!(ctx.leads().delete(&id).unwrap());

    let form = form_urlencoded::Serializer::new(String::new())
        .append_pair("data", &backup)
        .finish();
    let resp = handle(post_form("/admin/restore", &form, Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/admin?flash=restored");

    let restored = ctx.leads().get(&id).unwrap().unwrap();
    assert_eq!(restored.first_name, "Gurpreet");

    // sessions live outside the record store
    let resp = handle(get("/admin", Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 200);
}

#[test]
fn restore_rejects_something_that_is_not_a_backup() {
    let ctx = test_context();
    let id = seed(&ctx, "Gurpreet");
    let cookie = admin_cookie(&ctx);

    for form in ["data=not+json", "data=%5B1%2C2%5D", ""] {
        assert!(
            matches!(
                handle(post_form("/admin/restore", form, Some(&cookie)), &ctx),
                Err(ServerError::BadRequest(_))
            ),
            "{form}"
        );
    }
    assert!(ctx.leads().get(&id).unwrap().is_some());
}

#[test]
fn cleanup_prunes_only_old_messages() {
    let ctx = test_context();
    let id = seed(&ctx, "Gurpreet");
    let now = Utc::now();
    ctx.store
        .save(Collection::Emails, record(json!({"to": "old"})), now - Duration::days(45))
        .unwrap();
    ctx.store
        .save(Collection::Emails, record(json!({"to": "new"})), now - Duration::days(2))
        .unwrap();
    let cookie = admin_cookie(&ctx);

    let resp = handle(post_form("/admin/cleanup", "days=30", Some(&cookie)), &ctx).unwrap();
    assert_eq!(location(&resp), "/admin?flash=cleaned");

    let emails = ctx.store.list(Collection::Emails, &Record::new()).unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0]["to"], "new");
    assert!(ctx.leads().get(&id).unwrap().is_some());
}

#[test]
fn cleanup_rejects_non_positive_days() {
    let ctx = test_context();
    let cookie = admin_cookie(&ctx);
    for form in ["days=0", "days=-3", "days=soon"] {
        assert!(
            matches!(
                handle(post_form("/admin/cleanup", form, Some(&cookie)), &ctx),
                Err(ServerError::BadRequest(_))
            ),
            "{form}"
        );
    }
}

#[test]
fn dashboard_reports_storage_and_offers_maintenance() {
    let ctx = test_context();
    seed(&ctx, "Gurpreet");
    let cookie = admin_cookie(&ctx);

    let doc = Html::parse_document(&body_string(
        handle(get("/admin", Some(&cookie)), &ctx).unwrap(),
    ));
    let storage = Selector::parse("#storage").unwrap();
    let text: String = doc.select(&storage).next().unwrap().text().collect();
    assert!(text.contains("of 5 MB"));

    for sel in ["form#cleanup-form", "form#restore-form", "a[href='/admin/backup.json']"] {
        let selector = Selector::parse(sel).unwrap();
        assert_eq!(doc.select(&selector).count(), 1, "{sel}");
    }
    let clear = Selector::parse("#clear-filters").unwrap();
    assert_eq!(doc.select(&clear).count(), 0);

    let doc = Html::parse_document(&body_string(
        handle(get("/admin?q=gurpreet", Some(&cookie)), &ctx).unwrap(),
    ));
    assert_eq!(doc.select(&clear).count(), 1);
}

use crate::db::records::{Collection, Record};
use crate::errors::ServerError;
use crate::router::{handle, respond};
use crate::tests::utils::{body_string, get, location, post_form, test_context};
use scraper::{Html, Selector};

const VALID_FORM: &str = "firstName=Harpreet&lastName=Kaur&email=harpreet%40example.com\
&phone=%2B91+98765+43210&propertyDescription=Urgent%2C+3BHK+flat+in+Ludhiana%2C+ready+to+buy%2C+cash";

#[test]
fn home_page_renders_the_inquiry_form() {
    let ctx = test_context();
    let resp = handle(get("/", None), &ctx).unwrap();
    assert_eq!(resp.status(), 200);

    let doc = Html::parse_document(&body_string(resp));
    let form = Selector::parse("form#lead-form").unwrap();
    assert_eq!(doc.select(&form).count(), 1);

    let field = Selector::parse("form#lead-form [name=propertyDescription]").unwrap();
    assert_eq!(doc.select(&field).count(), 1);
}

#[test]
fn valid_submission_stores_a_scored_lead_and_redirects() {
    let ctx = test_context();
    let resp = handle(post_form("/leads", VALID_FORM, None), &ctx).unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/thanks");

    let leads = ctx.leads().list().unwrap();
    assert_eq!(leads.len(), 1);
    let lead = &leads[0];
    assert_eq!(lead.first_name, "Harpreet");
    assert_eq!(lead.email, "harpreet@example.com");
    assert!(lead.score.is_some());
    assert!(lead.tags.contains(&"Ludhiana".to_string()));

    // agent notification plus customer confirmation, neither actually sent
    let emails = ctx.store.list(Collection::Emails, &Record::new()).unwrap();
    assert_eq!(emails.len(), 2);
    assert!(emails.iter().all(|e| e["status"] == "logged"));
    assert!(emails.iter().all(|e| e["customerId"] == lead.id.as_str()));
}

#[test]
fn incomplete_submission_is_rejected_with_the_form_refilled() {
    let ctx = test_context();
    let resp = handle(
        post_form("/leads", "firstName=Harpreet&email=harpreet%40example.com", None),
        &ctx,
    )
    .unwrap();

    assert_eq!(resp.status(), 400);
    let doc = Html::parse_document(&body_string(resp));
    let first = Selector::parse("input[name=firstName]").unwrap();
    let value = doc
        .select(&first)
        .next()
        .and_then(|el| el.value().attr("value"))
        .unwrap();
    assert_eq!(value, "Harpreet");

    assert!(ctx.leads().list().unwrap().is_empty());
}

#[test]
fn invalid_email_is_rejected() {
    let ctx = test_context();
    let form = VALID_FORM.replace("harpreet%40example.com", "not-an-email");
    let resp = handle(post_form("/leads", &form, None), &ctx).unwrap();
    assert_eq!(resp.status(), 400);
}

#[test]
fn thanks_page_renders() {
    let ctx = test_context();
    let resp = handle(get("/thanks", None), &ctx).unwrap();
    assert_eq!(resp.status(), 200);
}

#[test]
fn unknown_route_is_not_found() {
    let ctx = test_context();
    assert!(matches!(
        handle(get("/nowhere", None), &ctx),
        Err(ServerError::NotFound)
    ));
    assert!(matches!(
        handle(post_form("/thanks", "", None), &ctx),
        Err(ServerError::NotFound)
    ));
}

#[test]
fn server_entry_point_turns_errors_into_pages() {
    let ctx = test_context();
    let resp = respond(get("/nowhere", None), &ctx);
    assert_eq!(resp.status(), 404);
    assert!(body_string(resp).contains("Page not found"));

    let resp = respond(get("/", None), &ctx);
    assert_eq!(resp.status(), 200);
}

#[test]
fn email_with_link_syntax_is_rejected() {
    let ctx = test_context();
    let form = VALID_FORM.replace(
        "harpreet%40example.com",
        "a%40b.com%3Fcc%3Dx%40evil.test%26",
    );
    let resp = handle(post_form("/leads", &form, None), &ctx).unwrap();
    assert_eq!(resp.status(), 400);
    assert!(ctx.leads().list().unwrap().is_empty());
}

use chrono::Utc;

use crate::domain::NewLead;
use crate::router::handle;
use crate::spreadsheets::leads_csv::CSV_HEADER;
use crate::tests::utils::{admin_cookie, body_string, get, test_context};

fn header(resp: &astra::Response, name: &str) -> String {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn seed(ctx: &crate::app::AppContext, first_name: &str, description: &str) {
    ctx.leads()
        .create(
            NewLead {
                first_name: first_name.into(),
                last_name: "Sharma".into(),
                email: format!("{}@example.com", first_name.to_lowercase()),
                phone: "9876543210".into(),
                property_description: description.into(),
            },
            Utc::now(),
        )
        .unwrap();
}

#[test]
fn csv_export_flattens_commas_and_line_breaks() {
    let ctx = test_context();
    seed(&ctx, "Ravi", "Plot in Mohali, Punjab\nnear the airport");
    let cookie = admin_cookie(&ctx);

    let resp = handle(get("/admin/export.csv", Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(header(&resp, "Content-Type").starts_with("text/csv"));
    assert!(header(&resp, "Content-Disposition").contains("cheema-properties-inquiries-"));

    let body = body_string(resp);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], CSV_HEADER);
    assert!(lines[1].contains("Plot in Mohali; Punjab near the airport"));
    assert_eq!(lines[1].split(',').count(), 6);
}

#[test]
fn csv_export_honors_filters() {
    let ctx = test_context();
    seed(&ctx, "Ravi", "house");
    seed(&ctx, "Neha", "villa");
    let cookie = admin_cookie(&ctx);

    let resp = handle(get("/admin/export.csv?q=neha", Some(&cookie)), &ctx).unwrap();
    let body = body_string(resp);
    assert_eq!(body.lines().count(), 2);
    assert!(body.contains("neha@example.com"));
    assert!(!body.contains("ravi@example.com"));
}

#[test]
fn xlsx_export_is_a_zip_archive() {
    let ctx = test_context();
    seed(&ctx, "Ravi", "house");
    let cookie = admin_cookie(&ctx);

    let resp = handle(get("/admin/export.xlsx", Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(header(&resp, "Content-Disposition").contains(".xlsx"));

    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut resp.into_body().reader(), &mut bytes).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

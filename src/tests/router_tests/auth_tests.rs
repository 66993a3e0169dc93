use crate::router::handle;
use crate::tests::utils::{admin_cookie, get, location, post_form, test_context, ADMIN_PASSWORD};

fn set_cookie(resp: &astra::Response) -> String {
    resp.headers()
        .get("Set-Cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[test]
fn admin_pages_redirect_to_login_without_a_session() {
    let ctx = test_context();
    for path in ["/admin", "/admin/export.csv", "/admin/leads/abc"] {
        let resp = handle(get(path, None), &ctx).unwrap();
        assert_eq!(resp.status(), 303, "{path}");
        assert_eq!(location(&resp), "/admin/login");
    }

    let resp = handle(post_form("/admin/rescore", "", None), &ctx).unwrap();
    assert_eq!(location(&resp), "/admin/login");
}

#[test]
fn forged_cookie_is_not_a_session() {
    let ctx = test_context();
    let resp = handle(get("/admin", Some("cheema_admin=forged")), &ctx).unwrap();
    assert_eq!(location(&resp), "/admin/login");
}

#[test]
fn wrong_password_is_unauthorized() {
    let ctx = test_context();
    let resp = handle(post_form("/admin/login", "password=guess", None), &ctx).unwrap();
    assert_eq!(resp.status(), 401);
    assert!(set_cookie(&resp).is_empty());
}

#[test]
fn correct_password_issues_a_working_session_cookie() {
    let ctx = test_context();
    let form = format!("password={ADMIN_PASSWORD}");
    let resp = handle(post_form("/admin/login", &form, None), &ctx).unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/admin");
    let cookie = set_cookie(&resp);
    assert!(cookie.starts_with("cheema_admin="));
    assert!(cookie.contains("HttpOnly"));

    let pair = cookie.split(';').next().unwrap().to_string();
    let resp = handle(get("/admin", Some(&pair)), &ctx).unwrap();
    assert_eq!(resp.status(), 200);
}

#[test]
fn logout_revokes_the_session() {
    let ctx = test_context();
    let cookie = admin_cookie(&ctx);

    assert_eq!(handle(get("/admin", Some(&cookie)), &ctx).unwrap().status(), 200);

    let resp = handle(post_form("/admin/logout", "", Some(&cookie)), &ctx).unwrap();
    assert_eq!(resp.status(), 303);
    assert!(set_cookie(&resp).contains("Max-Age=0"));

    let resp = handle(get("/admin", Some(&cookie)), &ctx).unwrap();
    assert_eq!(location(&resp), "/admin/login");
}

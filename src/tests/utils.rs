use crate::app::AppContext;
use crate::auth::{create_admin_session, session_cookie};
use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const ADMIN_PASSWORD: &str = "letmein";

static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh database in the temp dir, initialized from the production schema.
pub fn init_test_db() -> Database {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let n = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "cheema_test_{}_{nanos}_{n}.sqlite",
        std::process::id()
    ));

    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

/// App context over a fresh database, scoring in UTC, no outbound mail or analytics.
pub fn test_context() -> AppContext {
    let mut config = AppConfig::default();
    config.scoring.utc_offset_minutes = Some(0);
    config.admin.password = ADMIN_PASSWORD.to_string();
    AppContext::new(config, init_test_db()).expect("test context")
}

/// `Cookie` header value for a freshly issued admin session.
pub fn admin_cookie(ctx: &AppContext) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    let ttl = ctx.config.admin.session_ttl_secs;
    let token = ctx
        .db()
        .with_conn(|conn| create_admin_session(conn, now, ttl))
        .expect("create session");
    // Only the name=value pair goes back in a Cookie header.
    session_cookie(&token, ttl)
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request {
    let mut builder = http::Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request {
    let mut builder = http::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn location(resp: &Response) -> &str {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

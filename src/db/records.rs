// src/db/records.rs

//! A small document store: named collections of JSON records kept in one
//! SQLite table. Records are flat JSON objects; `id`, `createdAt` and
//! `updatedAt` are managed by the store.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::db::connection::Database;
use crate::errors::ServerError;

pub type Record = Map<String, Value>;

/// Nominal storage budget reported by [`RecordStore::database_size`].
pub const STORAGE_LIMIT_BYTES: u64 = 5 * 1024 * 1024;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Customers,
    Properties,
    Inquiries,
    Emails,
    Sms,
    Appointments,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Customers,
        Collection::Properties,
        Collection::Inquiries,
        Collection::Emails,
        Collection::Sms,
        Collection::Appointments,
    ];

    /// Collections whose old records are pruned by [`RecordStore::cleanup`].
    pub const PRUNABLE: [Collection; 3] =
        [Collection::Emails, Collection::Sms, Collection::Inquiries];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::Properties => "properties",
            Collection::Inquiries => "inquiries",
            Collection::Emails => "emails",
            Collection::Sms => "sms",
            Collection::Appointments => "appointments",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseSize {
    pub used: u64,
    pub limit: u64,
    pub percentage: f64,
}

/// Canonical timestamp format. Fixed width, so stored values sort lexically.
pub fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Millisecond clock followed by nine random base-36 characters.
pub fn generate_record_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", now.timestamp_millis(), suffix)
}

fn parse_record(data: &str) -> Result<Record, ServerError> {
    match serde_json::from_str::<Value>(data)? {
        Value::Object(map) => Ok(map),
        _ => Err(ServerError::DbError("stored record is not a JSON object".into())),
    }
}

fn touch(conn: &Connection, ts: &str) -> Result<(), ServerError> {
    conn.execute(
        r#"
        INSERT INTO store_settings (key, value) VALUES ('last_updated', ?1)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        params![ts],
    )?;
    Ok(())
}

fn setting(conn: &Connection, key: &str) -> Result<Option<String>, ServerError> {
    conn.query_row(
        "SELECT value FROM store_settings WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(ServerError::from)
}

/// JS-style truthiness, used by string filters.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|i| as_text(i).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Null | Value::Object(_) => None,
    }
}

/// String filters match case-insensitive substrings; anything else must be equal.
/// Null filter values are ignored.
pub fn matches_filters(record: &Record, filters: &Record) -> bool {
    filters.iter().all(|(key, wanted)| match wanted {
        Value::Null => true,
        Value::String(needle) => match record.get(key) {
            Some(v) if is_truthy(v) => as_text(v)
                .map(|text| text.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            _ => false,
        },
        other => record.get(key) == Some(other),
    })
}

#[derive(Clone, Debug)]
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Insert a record; the store assigns `id`, `createdAt` and `updatedAt`.
    pub fn create_at(
        &self,
        collection: &str,
        mut fields: Record,
        now: DateTime<Utc>,
    ) -> Result<String, ServerError> {
        let id = generate_record_id(now);
        let ts = timestamp(now);

        fields.insert("id".into(), Value::String(id.clone()));
        fields.insert("createdAt".into(), Value::String(ts.clone()));
        fields.insert("updatedAt".into(), Value::String(ts.clone()));
        let data = serde_json::to_string(&fields)?;

        self.db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO records (collection, id, data, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![collection, &id, &data, &ts, &ts],
            )?;
            touch(conn, &ts)
        })?;

        debug!(collection, id = %id, "record created");
        Ok(id)
    }

    /// All records of a collection in insertion order. Unknown collections are empty.
    pub fn read_all(&self, collection: &str) -> Result<Vec<Record>, ServerError> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT data FROM records WHERE collection = ?1 ORDER BY seq")?;
            let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

            let mut out = Vec::new();
            for data in rows {
                out.push(parse_record(&data?)?);
            }
            Ok(out)
        })
    }

    pub fn read_by_id(&self, collection: &str, id: &str) -> Result<Option<Record>, ServerError> {
        let data: Option<String> = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()
            .map_err(ServerError::from)
        })?;

        data.map(|d| parse_record(&d)).transpose()
    }

    /// Shallow-merge `partial` into the record. `id` and `createdAt` are immutable.
    /// Returns false when the record does not exist.
    pub fn update_at(
        &self,
        collection: &str,
        id: &str,
        partial: Record,
        now: DateTime<Utc>,
    ) -> Result<bool, ServerError> {
        let ts = timestamp(now);

        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(existing) = existing else {
                return Ok(false);
            };

            let mut record = parse_record(&existing)?;
            for (key, value) in partial {
                if key == "id" || key == "createdAt" {
                    continue;
                }
                record.insert(key, value);
            }
            record.insert("updatedAt".into(), Value::String(ts.clone()));

            tx.execute(
                "UPDATE records SET data = ?1, updated_at = ?2 WHERE collection = ?3 AND id = ?4",
                params![serde_json::to_string(&record)?, &ts, collection, id],
            )?;
            touch(&tx, &ts)?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<bool, ServerError> {
        let ts = timestamp(Utc::now());
        self.db.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )?;
            if removed > 0 {
                touch(conn, &ts)?;
            }
            Ok(removed > 0)
        })
    }

    pub fn query(&self, collection: &str, filters: &Record) -> Result<Vec<Record>, ServerError> {
        Ok(self
            .read_all(collection)?
            .into_iter()
            .filter(|r| matches_filters(r, filters))
            .collect())
    }

    pub fn save(
        &self,
        collection: Collection,
        data: Record,
        now: DateTime<Utc>,
    ) -> Result<String, ServerError> {
        self.create_at(collection.as_str(), data, now)
    }

    pub fn list(&self, collection: Collection, filters: &Record) -> Result<Vec<Record>, ServerError> {
        self.query(collection.as_str(), filters)
    }

    /// Whole store as pretty JSON: one array per collection plus a `settings` object.
    pub fn export_database(&self) -> Result<String, ServerError> {
        let (rows, version, last_updated) = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT collection, data FROM records ORDER BY seq")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((rows, setting(conn, "version")?, setting(conn, "last_updated")?))
        })?;

        let mut out = Map::new();
        for collection in Collection::ALL {
            out.insert(collection.as_str().into(), Value::Array(Vec::new()));
        }
        for (collection, data) in rows {
            let record = Value::Object(parse_record(&data)?);
            match out
                .entry(collection)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => items.push(record),
                _ => return Err(ServerError::InternalError),
            }
        }

        let version: i64 = version.and_then(|v| v.parse().ok()).unwrap_or(1);
        out.insert(
            "settings".into(),
            json!({
                "initialized": true,
                "version": version,
                "lastUpdated": last_updated,
            }),
        );

        Ok(serde_json::to_string_pretty(&Value::Object(out))?)
    }

    /// Replace the whole store with an export. Returns false if `data` is not a valid export.
    pub fn import_database(&self, data: &str) -> Result<bool, ServerError> {
        let parsed = match serde_json::from_str::<Value>(data) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!("import rejected: top-level value is not an object");
                return Ok(false);
            }
            Err(e) => {
                warn!(error = %e, "import rejected: invalid JSON");
                return Ok(false);
            }
        };

        let now = Utc::now();
        let now_ts = timestamp(now);

        let imported = self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM records", [])?;

            let mut count = 0usize;
            for (collection, value) in &parsed {
                if collection == "settings" {
                    continue;
                }
                let Value::Array(items) = value else {
                    warn!(collection = %collection, "import skipped non-array collection");
                    continue;
                };
                for item in items {
                    let Value::Object(record) = item else {
                        warn!(collection = %collection, "import skipped non-object record");
                        continue;
                    };
                    let mut record = record.clone();

                    let id = match record.get("id") {
                        Some(Value::String(s)) if !s.is_empty() => s.clone(),
                        Some(Value::Number(n)) => n.to_string(),
                        _ => generate_record_id(now),
                    };
                    let created = normalized_timestamp(record.get("createdAt")).unwrap_or_else(|| now_ts.clone());
                    let updated = normalized_timestamp(record.get("updatedAt")).unwrap_or_else(|| created.clone());

                    record.insert("id".into(), Value::String(id.clone()));
                    record.insert("createdAt".into(), Value::String(created.clone()));
                    record.insert("updatedAt".into(), Value::String(updated.clone()));

                    tx.execute(
                        r#"
                        INSERT OR REPLACE INTO records (collection, id, data, created_at, updated_at)
                        VALUES (?1, ?2, ?3, ?4, ?5)
                        "#,
                        params![collection, &id, serde_json::to_string(&record)?, &created, &updated],
                    )?;
                    count += 1;
                }
            }

            if let Some(version) = parsed
                .get("settings")
                .and_then(|s| s.get("version"))
                .and_then(Value::as_i64)
            {
                tx.execute(
                    "INSERT OR REPLACE INTO store_settings (key, value) VALUES ('version', ?1)",
                    params![version.to_string()],
                )?;
            }
            touch(&tx, &now_ts)?;
            tx.commit()?;
            Ok(count)
        })?;

        info!(records = imported, "database imported");
        Ok(true)
    }

    /// Drop emails, sms and inquiries created more than `days_old` days before `now`.
    pub fn cleanup(&self, days_old: i64, now: DateTime<Utc>) -> Result<usize, ServerError> {
        let cutoff = timestamp(now - Duration::days(days_old));
        let ts = timestamp(now);

        let removed = self.db.with_conn(|conn| {
            let mut removed = 0;
            for collection in Collection::PRUNABLE {
                removed += conn.execute(
                    "DELETE FROM records WHERE collection = ?1 AND created_at <= ?2",
                    params![collection.as_str(), &cutoff],
                )?;
            }
            touch(conn, &ts)?;
            Ok(removed)
        })?;

        info!(days_old, removed, "database cleanup finished");
        Ok(removed)
    }

    pub fn database_size(&self) -> Result<DatabaseSize, ServerError> {
        let used = self.export_database()?.len() as u64;
        Ok(DatabaseSize {
            used,
            limit: STORAGE_LIMIT_BYTES,
            percentage: used as f64 / STORAGE_LIMIT_BYTES as f64 * 100.0,
        })
    }
}

fn normalized_timestamp(v: Option<&Value>) -> Option<String> {
    let raw = v?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| timestamp(t.with_timezone(&Utc)))
}

// src/telemetry.rs

//! Analytics events. Delivery is best-effort: a failing sink is logged and skipped.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AnalyticsConfig;
use crate::domain::{Lead, LeadStatus};

const GA4_ENDPOINT: &str = "https://www.google-analytics.com/mp/collect";
const SERVER_CLIENT_ID: &str = "cheema-leads-server";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Rejected with status {0}")]
    Rejected(u16),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub action: String,
    pub category: String,
    pub label: Option<String>,
    pub value: Option<i64>,
    pub params: BTreeMap<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(action: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            category: category.into(),
            label: None,
            value: None,
            params: BTreeMap::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn form_submission(form: &str) -> Self {
        Self::new("form_submission", "engagement").label(form)
    }

    pub fn lead_generated(lead: &Lead) -> Self {
        Self::new("lead_generated", "conversion")
            .label(lead.quality().as_str())
            .value(i64::from(lead.score_total()))
            .param("lead_id", lead.id.as_str())
            .param("tags", lead.tags.join(","))
    }

    pub fn lead_status_change(lead: &Lead, from: LeadStatus, to: LeadStatus) -> Self {
        Self::new("lead_status_change", "crm")
            .label(format!("{from}_to_{to}"))
            .value(i64::from(lead.score_total()))
            .param("lead_id", lead.id.as_str())
    }

    pub fn customer_deleted(id: &str) -> Self {
        Self::new("customer_deleted", "crm").label(id)
    }

    pub fn admin_login(success: bool) -> Self {
        let action = if success { "admin_login" } else { "admin_login_failed" };
        Self::new(action, "admin")
    }

    pub fn data_export(format: &str, rows: usize) -> Self {
        Self::new("data_export", "admin")
            .label(format)
            .value(rows as i64)
    }

    /// GA4 event shape: `{ name, params }`.
    fn to_ga4(&self) -> Value {
        let mut params = serde_json::Map::new();
        params.insert("event_category".into(), Value::String(self.category.clone()));
        if let Some(label) = &self.label {
            params.insert("event_label".into(), Value::String(label.clone()));
        }
        if let Some(value) = self.value {
            params.insert("value".into(), Value::from(value));
        }
        for (k, v) in &self.params {
            params.insert(k.clone(), v.clone());
        }
        json!({ "name": self.action, "params": params })
    }
}

pub trait TelemetrySink: Send + Sync {
    fn name(&self) -> &'static str;

    fn record(&self, event: &AnalyticsEvent) -> Result<(), TelemetryError>;
}

/// Writes every event to the tracing log.
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn record(&self, event: &AnalyticsEvent) -> Result<(), TelemetryError> {
        info!(
            target: "cheema_leads::analytics",
            action = %event.action,
            category = %event.category,
            label = event.label.as_deref().unwrap_or(""),
            value = event.value.unwrap_or(0),
            "analytics event"
        );
        Ok(())
    }
}

/// Google Analytics 4 Measurement Protocol.
pub struct MeasurementProtocolSink {
    measurement_id: String,
    api_secret: String,
    client: Client,
}

impl MeasurementProtocolSink {
    pub fn new(measurement_id: String, api_secret: String) -> Result<Self, TelemetryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| TelemetryError::RequestFailed(e.to_string()))?;
        Ok(Self {
            measurement_id,
            api_secret,
            client,
        })
    }
}

impl TelemetrySink for MeasurementProtocolSink {
    fn name(&self) -> &'static str {
        "ga4"
    }

    fn record(&self, event: &AnalyticsEvent) -> Result<(), TelemetryError> {
        let body = json!({
            "client_id": SERVER_CLIENT_ID,
            "events": [event.to_ga4()],
        });

        let resp = self
            .client
            .post(GA4_ENDPOINT)
            .query(&[
                ("measurement_id", self.measurement_id.as_str()),
                ("api_secret", self.api_secret.as_str()),
            ])
            .json(&body)
            .send()
            .map_err(|e| TelemetryError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(TelemetryError::Rejected(resp.status().as_u16()));
        }
        Ok(())
    }
}

/// Fans each event out to every sink.
pub struct Telemetry {
    sinks: Vec<Box<dyn TelemetrySink>>,
}

impl Telemetry {
    pub fn new(sinks: Vec<Box<dyn TelemetrySink>>) -> Self {
        Self { sinks }
    }

    pub fn from_config(cfg: &AnalyticsConfig) -> Self {
        let mut sinks: Vec<Box<dyn TelemetrySink>> = vec![Box::new(LogSink)];

        if let (Some(id), Some(secret)) = (&cfg.measurement_id, &cfg.api_secret) {
            match MeasurementProtocolSink::new(id.clone(), secret.clone()) {
                Ok(sink) => sinks.push(Box::new(sink)),
                Err(e) => warn!(error = %e, "GA4 sink disabled"),
            }
        }

        Self::new(sinks)
    }

    pub fn track(&self, event: AnalyticsEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.record(&event) {
                warn!(sink = sink.name(), action = %event.action, error = %e, "telemetry sink failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<AnalyticsEvent>>>);

    impl TelemetrySink for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn record(&self, event: &AnalyticsEvent) -> Result<(), TelemetryError> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct Broken;

    impl TelemetrySink for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn record(&self, _event: &AnalyticsEvent) -> Result<(), TelemetryError> {
            Err(TelemetryError::Rejected(503))
        }
    }

    #[test]
    fn failing_sink_does_not_stop_the_others() {
        let recording = Recording::default();
        let telemetry = Telemetry::new(vec![Box::new(Broken), Box::new(recording.clone())]);

        telemetry.track(AnalyticsEvent::admin_login(false));
        telemetry.track(AnalyticsEvent::data_export("csv", 12));

        let events = recording.0.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "admin_login_failed");
        assert_eq!(events[1].label.as_deref(), Some("csv"));
        assert_eq!(events[1].value, Some(12));
    }

    #[test]
    fn status_change_label_names_both_states() {
        let lead: Lead = serde_json::from_value(json!({
            "id": "abc",
            "submittedAt": "2025-01-23T09:15:00Z",
        }))
        .unwrap();
        let event = AnalyticsEvent::lead_status_change(&lead, LeadStatus::New, LeadStatus::Contacted);
        assert_eq!(event.label.as_deref(), Some("new_to_contacted"));
        assert_eq!(event.value, Some(0));
        assert_eq!(event.params["lead_id"], "abc");
    }

    #[test]
    fn ga4_payload_flattens_params() {
        let event = AnalyticsEvent::new("lead_generated", "conversion")
            .label("hot")
            .value(82)
            .param("lead_id", "x1");
        let v = event.to_ga4();
        assert_eq!(v["name"], "lead_generated");
        assert_eq!(v["params"]["event_category"], "conversion");
        assert_eq!(v["params"]["event_label"], "hot");
        assert_eq!(v["params"]["value"], 82);
        assert_eq!(v["params"]["lead_id"], "x1");
    }

    #[test]
    fn log_sink_is_always_present() {
        let telemetry = Telemetry::from_config(&AnalyticsConfig::default());
        assert_eq!(telemetry.sinks.len(), 1);
        assert_eq!(telemetry.sinks[0].name(), "log");
    }
}

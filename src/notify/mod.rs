// src/notify/mod.rs

//! Outbound contact: the agency's new-lead email, the customer's confirmation,
//! and the deep links shown on the dashboard.

pub mod links;
pub mod mailer;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::{AgencyConfig, MailConfig};
use crate::db::records::{timestamp, Collection, RecordStore};
use crate::domain::Lead;

pub use links::ContactLinks;
use mailer::{BrevoMailer, MailTransport, OutgoingEmail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed,
    /// No transport configured; the message was only recorded.
    Logged,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Logged => "logged",
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    agency: AgencyConfig,
    transport: Option<Arc<dyn MailTransport>>,
}

impl Notifier {
    pub fn new(agency: AgencyConfig, transport: Option<Box<dyn MailTransport>>) -> Self {
        Self {
            agency,
            transport: transport.map(Arc::from),
        }
    }

    /// Brevo when an API key is configured, otherwise log-only.
    pub fn from_config(agency: &AgencyConfig, mail: &MailConfig) -> Self {
        let transport = match mail.brevo_api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => match BrevoMailer::new(
                key.to_string(),
                mail.sender_email.clone(),
                mail.sender_name.clone(),
            ) {
                Ok(mailer) => Some(Box::new(mailer) as Box<dyn MailTransport>),
                Err(e) => {
                    warn!(error = %e, "mail transport unavailable; falling back to log-only");
                    None
                }
            },
            None => None,
        };

        if transport.is_none() {
            info!("no mail transport configured; emails will be recorded only");
        }
        Self::new(agency.clone(), transport)
    }

    pub fn contact_links(&self, lead: &Lead) -> ContactLinks {
        ContactLinks::for_lead(&self.agency, lead)
    }

    pub fn inquiry_notification(&self, lead: &Lead) -> OutgoingEmail {
        let (quality, total, next_action) = match &lead.score {
            Some(s) => (s.quality.as_str(), s.total, s.next_action.as_str()),
            None => ("unscored", 0, ""),
        };
        let tags = if lead.tags.is_empty() {
            "none".to_string()
        } else {
            lead.tags.join(", ")
        };

        OutgoingEmail {
            to: self.agency.notify_email.clone(),
            subject: format!("New Property Inquiry - {}", lead.full_name()),
            text: format!(
                "A new property inquiry has been received through the website.\n\n\
                 CUSTOMER DETAILS\n\
                 Name: {name}\n\
                 Email: {email}\n\
                 Phone: {phone}\n\n\
                 PROPERTY REQUIREMENTS\n\
                 {requirements}\n\n\
                 LEAD SCORE: {total}/100 ({quality})\n\
                 Tags: {tags}\n\
                 Suggested action: {next_action}\n\n\
                 Submitted: {submitted}",
                name = lead.full_name(),
                email = lead.email,
                phone = lead.phone,
                requirements = lead.property_description,
                submitted = lead.submitted_at.format("%A, %d %B %Y %H:%M UTC"),
            ),
        }
    }

    pub fn customer_confirmation(&self, lead: &Lead) -> OutgoingEmail {
        OutgoingEmail {
            to: lead.email.clone(),
            subject: format!("Thank you for your inquiry - {}", self.agency.name),
            text: format!(
                "Dear {name},\n\n\
                 Thank you for reaching out to us regarding your property requirements. \
                 We have received your inquiry and will contact you within 2-4 hours.\n\n\
                 Requirements: {requirements}\n\n\
                 Phone: {phones}\n\
                 WhatsApp: {whatsapp}\n\n\
                 {agent}\n\
                 {agency}",
                name = lead.full_name(),
                requirements = lead.property_description,
                phones = self.agency.phone_numbers.join(" / "),
                whatsapp = self.agency.whatsapp_numbers.join(" / "),
                agent = self.agency.agent_name,
                agency = self.agency.name,
            ),
        }
    }

    /// Notify the agency and confirm to the customer. Never fails; every
    /// attempt is recorded in the `emails` collection.
    pub fn notify_new_lead(
        &self,
        store: &RecordStore,
        lead: &Lead,
        now: DateTime<Utc>,
    ) -> Vec<DeliveryStatus> {
        vec![
            self.deliver(store, &self.inquiry_notification(lead), "inquiry_notification", lead, now),
            self.deliver(store, &self.customer_confirmation(lead), "customer_response", lead, now),
        ]
    }

    /// [`notify_new_lead`](Self::notify_new_lead) without holding up the caller.
    ///
    /// With a transport configured the sends run on their own thread and the
    /// handle is returned; without one, recording is local and done inline.
    pub fn dispatch_new_lead(
        &self,
        store: &RecordStore,
        lead: &Lead,
        now: DateTime<Utc>,
    ) -> Option<JoinHandle<Vec<DeliveryStatus>>> {
        if self.transport.is_none() {
            self.notify_new_lead(store, lead, now);
            return None;
        }

        let notifier = self.clone();
        let thread_store = store.clone();
        let owned = lead.clone();
        let spawned = thread::Builder::new()
            .name("lead-notify".into())
            .spawn(move || notifier.notify_new_lead(&thread_store, &owned, now));

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, lead_id = %lead.id, "could not spawn notifier thread; sending inline");
                self.notify_new_lead(store, lead, now);
                None
            }
        }
    }

    fn deliver(
        &self,
        store: &RecordStore,
        email: &OutgoingEmail,
        kind: &str,
        lead: &Lead,
        now: DateTime<Utc>,
    ) -> DeliveryStatus {
        let (status, error) = match &self.transport {
            None => (DeliveryStatus::Logged, None),
            Some(transport) => match transport.send(email) {
                Ok(()) => (DeliveryStatus::Sent, None),
                Err(e) => {
                    warn!(to = %email.to, kind, error = %e, "email delivery failed");
                    (DeliveryStatus::Failed, Some(e.to_string()))
                }
            },
        };

        let from = self
            .transport
            .as_ref()
            .map(|t| t.sender().to_string())
            .unwrap_or_else(|| self.agency.notify_email.clone());

        let mut record = json!({
            "to": email.to,
            "from": from,
            "subject": email.subject,
            "content": email.text,
            "type": kind,
            "status": status.as_str(),
            "sentAt": timestamp(now),
            "customerId": lead.id,
        });
        if let (Some(err), Value::Object(map)) = (error, &mut record) {
            map.insert("error".into(), Value::String(err));
        }

        if let Value::Object(map) = record {
            if let Err(e) = store.save(Collection::Emails, map, now) {
                warn!(error = %e, kind, "could not record email attempt");
            }
        }

        info!(to = %email.to, kind, status = status.as_str(), "email processed");
        status
    }
}

// src/notify/links.rs

//! Deep links the admin uses to reach a lead from the dashboard.

use url::form_urlencoded;

use crate::config::AgencyConfig;
use crate::domain::Lead;

/// Percent-encode a query value. Spaces become `%20`; mailto does not decode `+`.
pub fn encode_component(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

pub fn whatsapp_link(phone: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        digits_only(phone),
        encode_component(message)
    )
}

pub fn tel_link(phone: &str) -> String {
    let dialable: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{dialable}")
}

/// The address is percent-encoded as well, so it cannot add header fields of its own.
pub fn mailto_link(email: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        encode_component(email).replace("%40", "@"),
        encode_component(subject),
        encode_component(body)
    )
}

pub fn follow_up_subject(agency: &AgencyConfig) -> String {
    format!("Follow-up on Your Property Inquiry - {}", agency.name)
}

pub fn follow_up_body(agency: &AgencyConfig, name: &str, requirements: &str) -> String {
    let phones = agency.phone_numbers.join(" / ");
    let whatsapp = agency.whatsapp_numbers.join(" / ");
    format!(
        "Dear {name},\n\n\
         Thank you for your interest in properties through {agency_name}.\n\n\
         I would like to follow up on your recent inquiry regarding: {requirements}\n\n\
         We have several excellent options that might interest you in Ludhiana and Chandigarh \
         that match your requirements. I would be happy to share details and arrange property \
         visits at your convenience.\n\n\
         Please let me know when would be a convenient time for you to discuss this further.\n\n\
         Best regards,\n\
         {agent}\n\
         {agency_name}\n\
         Phone: {phones}\n\
         WhatsApp: {whatsapp}",
        agency_name = agency.name,
        agent = agency.agent_name,
    )
}

pub fn whatsapp_message(agency: &AgencyConfig, name: &str) -> String {
    format!(
        "Hello {name}, this is from {}. Thank you for your inquiry about properties in \
         Ludhiana/Chandigarh. I would like to discuss your requirements in detail.",
        agency.name
    )
}

/// Ready-made links for one lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLinks {
    pub email: String,
    pub whatsapp: String,
    pub tel: String,
}

impl ContactLinks {
    pub fn for_lead(agency: &AgencyConfig, lead: &Lead) -> Self {
        let name = lead.full_name();
        Self {
            email: mailto_link(
                &lead.email,
                &follow_up_subject(agency),
                &follow_up_body(agency, &name, &lead.property_description),
            ),
            whatsapp: whatsapp_link(&lead.phone, &whatsapp_message(agency, &name)),
            tel: tel_link(&lead.phone),
        }
    }
}

// templates/pages/home.rs

use crate::config::AgencyConfig;
use crate::notify::links::{tel_link, whatsapp_link};
use crate::templates::{
    components::{button, card},
    desktop_layout,
};
use maud::{html, Markup};
use std::collections::HashMap;

/// Previously submitted values, used to refill the form after a rejected submit.
pub type FormValues = HashMap<String, String>;

fn value<'a>(values: &'a FormValues, key: &str) -> &'a str {
    values.get(key).map(String::as_str).unwrap_or("")
}

pub fn home_page(agency: &AgencyConfig, error: Option<&str>, values: &FormValues) -> Markup {
    desktop_layout(
        "Find your property in Ludhiana & Chandigarh",
        false,
        html! {
            main class="container narrow" {
                h1 { "Find your next property" }
                p { "Tell us what you are looking for and " (agency.agent_name) " will get back to you." }

                @if let Some(msg) = error {
                    div class="error" role="alert" { (msg) }
                }

                (card("Your requirements", html! {
                    form class="stacked" id="lead-form" action="/leads" method="post" {
                        label for="firstName" { "First name" }
                        input id="firstName" name="firstName" required value=(value(values, "firstName"));

                        label for="lastName" { "Last name" }
                        input id="lastName" name="lastName" required value=(value(values, "lastName"));

                        label for="email" { "Email" }
                        input id="email" type="email" name="email" autocomplete="email" required value=(value(values, "email"));

                        label for="phone" { "Phone" }
                        input id="phone" type="tel" name="phone" autocomplete="tel" required value=(value(values, "phone"));

                        label for="propertyDescription" { "What are you looking for?" }
                        textarea id="propertyDescription" name="propertyDescription" rows="4" required
                            placeholder="e.g. 3BHK apartment in Ludhiana, budget 50-70 lakhs" {
                            (value(values, "propertyDescription"))
                        }

                        div style="margin-top: 1rem;" { (button("Send inquiry")) }
                    }
                }))

                (card("Talk to us", html! {
                    ul class="contact" {
                        @for number in &agency.phone_numbers {
                            li { "Call " a href=(tel_link(number)) { (number) } }
                        }
                        @for number in &agency.whatsapp_numbers {
                            li {
                                "WhatsApp "
                                a href=(whatsapp_link(number, "Hello, I am interested in properties in Ludhiana/Chandigarh.")) { (number) }
                            }
                        }
                    }
                }))
            }
        },
    )
}

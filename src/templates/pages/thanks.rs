use crate::config::AgencyConfig;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn thanks_page(agency: &AgencyConfig) -> Markup {
    desktop_layout(
        "Thank you",
        false,
        html! {
            main class="container narrow" {
                h1 { "Thank you!" }
                p {
                    "Your inquiry has reached " strong { (agency.name) } ". "
                    "We usually respond within a few hours."
                }
                @if let Some(number) = agency.phone_numbers.first() {
                    p { "For anything urgent, call " strong { (number) } "." }
                }
                p { a href="/" { "Back to home" } }
            }
        },
    )
}

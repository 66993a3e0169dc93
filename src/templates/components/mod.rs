use maud::{html, Markup};

pub mod badges;
pub mod card;
pub mod error;
pub mod score;

pub use badges::{quality_badge, status_badge};
pub use card::card;
pub use error::error_page;
pub use score::score_breakdown;

pub fn button(label: &str) -> Markup {
    html! {
        button type="submit" { (label) }
    }
}

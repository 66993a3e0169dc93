use maud::{html, Markup};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// Small figure with a caption, used for dashboard counters.
pub fn stat_card(label: &str, value: usize) -> Markup {
    html! {
        div class="card stat" style="text-align: center; margin: 0;" {
            div style="font-size: 1.75rem; font-weight: 700;" { (value) }
            div style="color: #6b7280; font-size: .85rem;" { (label) }
        }
    }
}

use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn login_page(error: Option<&str>) -> Markup {
    desktop_layout(
        "Admin sign in",
        false,
        html! {
            main class="container narrow" {
                h1 { "Admin sign in" }
                @if let Some(msg) = error {
                    div class="error" role="alert" { (msg) }
                }
                form class="stacked" id="login-form" action="/admin/login" method="post" {
                    label for="password" { "Password" }
                    input id="password" type="password" name="password" autocomplete="current-password" required;
                    div style="margin-top: 1rem;" {
                        button type="submit" { "Sign in" }
                    }
                }
            }
        },
    )
}

use maud::{html, Markup, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; background: #f9fafb; }
header { display: flex; align-items: center; justify-content: space-between; padding: 0.75rem 1.5rem; background: #fff; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
header h3 { margin: 0; color: #92400e; letter-spacing: .05em; }
header ul { display: flex; gap: 1rem; list-style: none; margin: 0; padding: 0; }
main.container { max-width: 1100px; margin: 2rem auto; padding: 0 1rem; }
main.narrow { max-width: 520px; }
.card { background: #fff; border-radius: 8px; padding: 1.25rem; margin-bottom: 1.5rem; box-shadow: 0 1px 2px rgba(0,0,0,.06); }
.badge { display: inline-block; padding: 2px 8px; border-radius: 999px; font-size: .8em; font-weight: 600; }
.badge-hot { background: #fee2e2; color: #b91c1c; }
.badge-warm { background: #fef3c7; color: #92400e; }
.badge-cold { background: #dbeafe; color: #1e40af; }
.badge-status { background: #e5e7eb; color: #374151; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 8px; text-align: left; border-bottom: 1px solid #f3f4f6; }
th { border-bottom: 2px solid #e5e7eb; }
.bar { background: #f3f4f6; border-radius: 4px; height: 8px; }
.bar > span { display: block; background: #d97706; height: 8px; border-radius: 4px; }
.flash { background: #ecfdf5; color: #065f46; padding: .75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.error { background: #fef2f2; color: #991b1b; padding: .75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
form.stacked label { display: block; margin-top: .75rem; font-weight: 500; }
form.stacked input, form.stacked textarea, form.stacked select { width: 100%; padding: 8px; box-sizing: border-box; border: 1px solid #d1d5db; border-radius: 4px; }
button { padding: 8px 16px; border: none; border-radius: 4px; background: #92400e; color: #fff; cursor: pointer; }
button.link { background: none; color: #dc2626; padding: 0; }
"#;

pub fn desktop_layout(title: &str, is_admin: bool, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | Cheema Properties" }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                header {
                    h3 { a href="/" style="color: inherit; text-decoration: none;" { "CHEEMA PROPERTIES" } }
                    nav {
                        ul {
                            li { a href="/" { "Home" } }
                            @if is_admin {
                                li { a href="/admin" { "Dashboard" } }
                                li {
                                    form action="/admin/logout" method="post" style="margin: 0;" {
                                        button type="submit" class="link" { "Log out" }
                                    }
                                }
                            } @else {
                                li { a href="/admin/login" { "Admin" } }
                            }
                        }
                    }
                }
                (content)
            }
        }
    }
}

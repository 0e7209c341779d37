use axum::{response::Html, routing::get, Json, Router};
use axum_embed::ServeEmbed;
use rust_embed::RustEmbed;

use crate::config::PlaygroundConfig;

#[derive(RustEmbed, Clone)]
#[folder = "assets/"]
struct Assets;

/// Landing page at `ui_path`, its settings at `<ui_path>/config.json`, and
/// the embedded explorer under `<ui_path>/explorer/`.
pub fn ui_router(config: &PlaygroundConfig) -> Router {
    let page = landing_page(config);
    let settings = config.clone();
    Router::new()
        .route(
            &config.ui_path,
            get(move || {
                let page = page.clone();
                async move { Html(page) }
            }),
        )
        .route(
            &format!("{}/config.json", config.ui_path),
            get(move || {
                let settings = settings.clone();
                async move { Json(settings) }
            }),
        )
        .nest_service(
            &format!("{}/explorer", config.ui_path),
            ServeEmbed::<Assets>::new(),
        )
}

pub fn landing_page(config: &PlaygroundConfig) -> String {
    let title = escape(&config.title);
    let description = escape(&config.description);
    let version = escape(&config.version);
    let mount_path = escape(&config.mount_path);
    let ui_path = escape(&config.ui_path);
    let auth = if config.authentication.enabled {
        format!(
            "<p class=\"auth\">Authentication: {}</p>",
            escape(&config.authentication.strategies.join(", "))
        )
    } else {
        String::new()
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="{ui_path}/explorer/style.css">
</head>
<body class="landing">
  <main>
    <h1>{title}</h1>
    <p>{description}</p>
    <p class="version">v{version}</p>
    {auth}
    <ul>
      <li><a href="{ui_path}/explorer/">Open the API explorer</a></li>
      <li><a href="{mount_path}">Service discovery (<code>{mount_path}</code>)</a></li>
    </ul>
  </main>
</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

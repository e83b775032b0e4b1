use std::path::Path;

// Import chromiumoxide for CDP automation
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use thiserror::Error;
use tokio::task::{self, JoinHandle};

use crate::config::CheckerConfig;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to build browser config: {0}")]
    Config(String),
    #[error("Failed to launch chromium: {0}")]
    Launch(String),
    #[error("Failed to create initial page: {0}")]
    Page(String),
    #[error("Navigation failed: {0}")]
    Navigation(String),
    #[error("Visibility query failed: {0}")]
    Query(String),
    #[error("Screenshot failed: {0}")]
    Screenshot(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a check locates its element on the page.
#[derive(Debug, Clone)]
pub enum ElementQuery {
    /// A heading-role element (h1..h6 or [role="heading"]) whose normalized
    /// text equals the accessible name.
    Heading { name: String },
    /// The first element directly containing the given text.
    Text { needle: String },
}

impl ElementQuery {
    pub fn heading(name: &str) -> Self {
        Self::Heading {
            name: name.to_string(),
        }
    }

    pub fn text(needle: &str) -> Self {
        Self::Text {
            needle: needle.to_string(),
        }
    }

    /// Build the in-page expression that evaluates this query to a boolean.
    pub fn visibility_js(&self) -> String {
        match self {
            Self::Heading { name } => format!(
                r#"(() => {{
    const name = {};
    const norm = s => (s || "").replace(/\s+/g, " ").trim();
    const visible = el => {{
        const r = el.getBoundingClientRect();
        const s = window.getComputedStyle(el);
        return r.width > 0 && r.height > 0 && s.display !== "none" && s.visibility !== "hidden";
    }};
    for (const el of document.querySelectorAll('h1,h2,h3,h4,h5,h6,[role="heading"]')) {{
        if (norm(el.textContent) === name) return visible(el);
    }}
    return false;
}})()"#,
                js_string(name)
            ),
            Self::Text { needle } => format!(
                r#"(() => {{
    const needle = {};
    const visible = el => {{
        const r = el.getBoundingClientRect();
        const s = window.getComputedStyle(el);
        return r.width > 0 && r.height > 0 && s.display !== "none" && s.visibility !== "hidden";
    }};
    const ownText = el => Array.from(el.childNodes)
        .filter(n => n.nodeType === Node.TEXT_NODE)
        .map(n => n.textContent)
        .join("");
    for (const el of document.querySelectorAll("body *")) {{
        if (ownText(el).includes(needle)) return visible(el);
    }}
    return false;
}})()"#,
                js_string(needle)
            ),
        }
    }
}

/// Escape a string into a double-quoted JS string literal.
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Build the chromiumoxide launch config from checker settings.
pub fn build_browser_config(config: &CheckerConfig) -> Result<BrowserConfig, BrowserError> {
    let mut builder = BrowserConfig::builder()
        .no_sandbox()
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .window_size(config.window_width, config.window_height);

    if !config.headless {
        builder = builder.with_head();
    }

    builder.build().map_err(BrowserError::Config)
}

/// A launched browser with one active page. The session owns the browser
/// process for the duration of a run; `close` must be called exactly once.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a browser instance and open an initial blank page.
    pub async fn launch(config: &CheckerConfig) -> Result<Self, BrowserError> {
        let browser_config = build_browser_config(config)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // Spawn a background task to process CDP events.
        // Without this, the browser connection will stall.
        let handler_task = task::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))?;

        tracing::debug!("Browser launched, initial page ready");

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Navigate the active page and wait for the load to settle.
    pub async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        tracing::debug!(url, "Navigating");

        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        Ok(())
    }

    /// Evaluate whether the queried element is currently rendered and visible.
    pub async fn is_visible(&self, query: &ElementQuery) -> Result<bool, BrowserError> {
        let result = self
            .page
            .evaluate(query.visibility_js())
            .await
            .map_err(|e| BrowserError::Query(e.to_string()))?;

        Ok(result
            .value()
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }

    /// Capture a PNG of the current viewport and write it to `path`,
    /// overwriting any prior file.
    pub async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        let bytes = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(false)
                    .build(),
            )
            .await
            .map_err(|e| BrowserError::Screenshot(e.to_string()))?;

        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Shut down the browser process. Dropping the handles closes the CDP
    /// connection and chromiumoxide kills the child process cleanly.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Error closing browser: {}", e);
        }
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_escapes_specials() {
        assert_eq!(js_string("plain"), r#""plain""#);
        assert_eq!(js_string(r#"a "b" c"#), r#""a \"b\" c""#);
        assert_eq!(js_string(r"back\slash"), r#""back\\slash""#);
        assert_eq!(js_string("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn heading_query_embeds_escaped_name() {
        let js = ElementQuery::heading(r#"Lazy "Task" Marketplace"#).visibility_js();
        assert!(js.contains(r#"const name = "Lazy \"Task\" Marketplace";"#));
        assert!(js.contains(r#"[role="heading"]"#));
    }

    #[test]
    fn text_query_embeds_escaped_needle() {
        let js = ElementQuery::text("Post a Job").visibility_js();
        assert!(js.contains(r#"const needle = "Post a Job";"#));
        assert!(js.contains("includes(needle)"));
    }
}

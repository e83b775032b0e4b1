use std::path::PathBuf;

use thiserror::Error;

use crate::browser::{BrowserError, BrowserSession, ElementQuery};
use crate::config::CheckerConfig;

/// One content check: a transcript label plus the query that locates it.
pub struct Check {
    pub label: &'static str,
    pub query: ElementQuery,
}

/// The three checks the LazyTask Marketplace frontend must pass.
pub fn default_checks() -> Vec<Check> {
    vec![
        Check {
            label: "Title",
            query: ElementQuery::heading("LazyTask Marketplace"),
        },
        Check {
            label: "Post a Job section",
            query: ElementQuery::text("Post a Job"),
        },
        Check {
            label: "Available Jobs section",
            query: ElementQuery::text("Available Jobs"),
        },
    ]
}

/// Which step of the run failed. Displayed as the underlying error message,
/// so the transcript's `Error:` line reads the same whichever step broke.
#[derive(Error, Debug)]
pub enum RunFailure {
    #[error("{source}")]
    Navigation { source: BrowserError },
    #[error("{source}")]
    Check {
        label: String,
        source: BrowserError,
    },
    #[error("{source}")]
    Screenshot { source: BrowserError },
}

#[derive(Debug)]
pub struct CheckResult {
    pub label: String,
    pub visible: bool,
}

/// Everything a run observed, in order. The transcript is rendered from this
/// rather than printed mid-flight, so the failure tag stays inspectable.
#[derive(Debug, Default)]
pub struct RunReport {
    pub checks: Vec<CheckResult>,
    pub screenshot: Option<PathBuf>,
    pub failure: Option<RunFailure>,
}

impl RunReport {
    /// Render the stdout lines: one per completed check, the screenshot
    /// confirmation if capture succeeded, then a single `Error:` line if any
    /// step failed. Steps after the failure point produce no lines.
    pub fn transcript(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for check in &self.checks {
            if check.visible {
                lines.push(format!("{} found.", check.label));
            } else {
                lines.push(format!("{} NOT found.", check.label));
            }
        }
        if let Some(path) = &self.screenshot {
            lines.push(format!("Screenshot saved to {}", path.display()));
        }
        if let Some(failure) = &self.failure {
            lines.push(format!("Error: {}", failure));
        }
        lines
    }
}

/// Run the full smoke check: launch, navigate, three visibility checks,
/// screenshot. The browser is closed on every path once launched; only a
/// launch failure propagates, everything later is contained in the report.
pub async fn run_check(config: &CheckerConfig) -> Result<RunReport, BrowserError> {
    let session = BrowserSession::launch(config).await?;
    let report = run_steps(&session, config).await;
    session.close().await;

    if let Some(failure) = &report.failure {
        tracing::warn!("Smoke check failed: {:?}", failure);
    }
    Ok(report)
}

async fn run_steps(session: &BrowserSession, config: &CheckerConfig) -> RunReport {
    let mut report = RunReport::default();

    if let Err(source) = session.goto(&config.target_url).await {
        report.failure = Some(RunFailure::Navigation { source });
        return report;
    }

    for check in default_checks() {
        match session.is_visible(&check.query).await {
            Ok(visible) => {
                tracing::debug!(label = check.label, visible, "Check evaluated");
                report.checks.push(CheckResult {
                    label: check.label.to_string(),
                    visible,
                });
            }
            Err(source) => {
                report.failure = Some(RunFailure::Check {
                    label: check.label.to_string(),
                    source,
                });
                return report;
            }
        }
    }

    match session.screenshot(&config.screenshot_path).await {
        Ok(()) => report.screenshot = Some(config.screenshot_path.clone()),
        Err(source) => report.failure = Some(RunFailure::Screenshot { source }),
    }

    report
}

use std::time::Duration;

use crate::domain::listing::RunMetadata;
use crate::services::browser::Browser;
use crate::services::scraper::{scrape_target, ScrapeError, ScrapeLimits};
use crate::services::sink::CsvSink;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    /// Applied after every target regardless of outcome, to bound request
    /// rate against the remote service.
    pub target_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
            target_delay: Duration::from_secs(15),
        }
    }
}

/// Processes the target list in order on one shared browser session. A
/// target that exhausts its retries is logged and skipped; the run never
/// aborts for one failing target.
pub async fn run_targets<B: Browser>(
    browser: &B,
    sink: &CsvSink,
    targets: &[String],
    meta: &RunMetadata,
    policy: &RetryPolicy,
    limits: &ScrapeLimits,
) {
    for url in targets {
        if let Err(e) = scrape_with_retries(browser, sink, url, meta, policy, limits).await {
            log::error!(
                "Skipping {} after {} failed attempts: {}",
                url,
                policy.max_attempts,
                e
            );
        }
        tokio::time::sleep(policy.target_delay).await;
    }
}

pub async fn scrape_with_retries<B: Browser>(
    browser: &B,
    sink: &CsvSink,
    url: &str,
    meta: &RunMetadata,
    policy: &RetryPolicy,
    limits: &ScrapeLimits,
) -> Result<(), ScrapeError> {
    let mut attempt = 1;
    loop {
        log::info!(
            "Starting scrape for {} (attempt {}/{})",
            url,
            attempt,
            policy.max_attempts
        );
        match scrape_target(browser, sink, url, meta, limits).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < policy.max_attempts => {
                log::warn!("Attempt {} failed for {}: {}", attempt, url, e);
                log::info!("Retrying {} in {:?}", url, policy.retry_delay);
                tokio::time::sleep(policy.retry_delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::services::browser::fake::{
        FakeBrowser, FakeRow, FakeSpotlight, FakeState, FakeTargetPage,
    };

    fn temp_csv() -> PathBuf {
        std::env::temp_dir().join(format!("pricewatch-{}.csv", uuid::Uuid::new_v4()))
    }

    fn meta() -> RunMetadata {
        RunMetadata {
            date: "2025-04-05".to_string(),
            time: "12:00:00".to_string(),
            location: "Las Vegas".to_string(),
        }
    }

    fn single_page_state(failing_navigations: u32) -> FakeState {
        FakeState {
            title: "Night Stretcher".to_string(),
            spotlight: FakeSpotlight {
                seller: "Sold by A".to_string(),
                price: "$0.99".to_string(),
                ..FakeSpotlight::default()
            },
            pages: vec![FakeTargetPage {
                rows: vec![FakeRow {
                    seller: "B".to_string(),
                    ..FakeRow::default()
                }],
                next_control: Some(true),
            }],
            current: 0,
            failing_navigations,
            stall_after_click: false,
            navigations: 0,
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn two_timeouts_then_success_matches_immediate_success() {
        let browser = FakeBrowser::new(single_page_state(2));
        let path = temp_csv();
        let sink = CsvSink::from_path(path.clone());
        let policy = RetryPolicy::default();

        let started = tokio::time::Instant::now();
        run_targets(
            &browser,
            &sink,
            &["https://example.test/p/1".to_string()],
            &meta(),
            &policy,
            &ScrapeLimits::default(),
        )
        .await;

        assert_eq!(browser.state.lock().unwrap().navigations, 3);
        // Two failed attempts each wait out the retry delay, and the
        // inter-target delay applies regardless of outcome.
        assert!(started.elapsed() >= policy.retry_delay * 2 + policy.target_delay);

        let content = std::fs::read_to_string(&path).unwrap();
        // One header, then spotlight + one regular row, same as a clean run.
        assert_eq!(content.lines().count(), 3);

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn exhausted_retries_skip_the_target_without_output() {
        let browser = FakeBrowser::new(single_page_state(3));
        let path = temp_csv();
        let sink = CsvSink::from_path(path.clone());

        run_targets(
            &browser,
            &sink,
            &["https://example.test/p/1".to_string()],
            &meta(),
            &RetryPolicy::default(),
            &ScrapeLimits::default(),
        )
        .await;

        assert_eq!(browser.state.lock().unwrap().navigations, 3);
        assert!(!path.exists());
    }
}

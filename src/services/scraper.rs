use std::time::Duration;

use thirtyfour::error::WebDriverError;

use crate::domain::descriptor;
use crate::domain::listing::{ListingRecord, RawListing, RunMetadata};
use crate::services::browser::{Browser, Region};
use crate::services::extractor::{badge_present, extract_text};
use crate::services::sink::CsvSink;

const FILTER_SETTLE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("page identity never resolved for {url}")]
    IdentityTimeout { url: String },
    #[error("listing results never populated after requesting page {page}")]
    PaginationTimeout { page: u32 },
    #[error(transparent)]
    WebDriver(#[from] WebDriverError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ScrapeLimits {
    /// Bounded wait for element resolution; timing out on the page-identity
    /// or next-page wait fails the attempt.
    pub element_timeout: Duration,
    /// Heuristic settle delay after every page activation, to let
    /// client-side rendering catch up.
    pub settle_delay: Duration,
    /// Safety valve against a next-page control that never reports
    /// disabled. The source site has no cap of its own.
    pub max_pages: u32,
}

impl Default for ScrapeLimits {
    fn default() -> Self {
        ScrapeLimits {
            element_timeout: Duration::from_secs(20),
            settle_delay: Duration::from_secs(2),
            max_pages: 200,
        }
    }
}

/// Filters are page-scoped on the source site, so this state lives for one
/// target's scrape only and must never leak across targets.
#[derive(Default)]
struct PageState {
    filters_applied: bool,
    page_size_set: bool,
}

/// Scrapes one target end to end: identity wait, one-time filters, the
/// spotlighted offer, then every paginated results page until the next-page
/// control goes absent or disabled.
pub async fn scrape_target<B: Browser>(
    browser: &B,
    sink: &CsvSink,
    url: &str,
    meta: &RunMetadata,
    limits: &ScrapeLimits,
) -> Result<(), ScrapeError> {
    browser.navigate(url).await?;
    if browser
        .wait_for(descriptor::ITEM_TITLE_PATH, limits.element_timeout)
        .await?
        .is_none()
    {
        return Err(ScrapeError::IdentityTimeout {
            url: url.to_string(),
        });
    }

    let page = browser.active_page().await?;
    let card_name = extract_text(&page, &descriptor::ITEM_TITLE).await;
    log::info!("Scraping {}", card_name);

    let mut state = PageState::default();
    apply_filters(&page, &mut state).await;

    // The spotlighted offer does not change across pages of one target.
    let spotlight = read_spotlight(&page).await;
    let featured = ListingRecord::from_spotlight(&card_name, spotlight, meta);
    let spotlight_seller = featured.seller_name.clone();

    let mut pending = vec![featured];
    let mut page_number: u32 = 1;

    loop {
        for row in page.find_all(descriptor::LISTING_ROWS).await? {
            let raw = read_listing(&row).await;
            pending.push(ListingRecord::from_raw(&card_name, raw, &spotlight_seller, meta));
        }
        sink.append(&pending)?;
        pending.clear();
        log::info!("Scraped listing page {}", page_number);

        if page_number >= limits.max_pages {
            log::warn!(
                "Reached the {}-page cap on {}; stopping pagination",
                limits.max_pages,
                url
            );
            break;
        }

        let Some(next) = page.find_one(descriptor::NEXT_PAGE).await? else {
            log::info!("No next-page control; done.");
            break;
        };
        if next.attr("aria-disabled").await?.as_deref() == Some("true") {
            log::info!("Next is disabled; done.");
            break;
        }

        next.click().await?;
        if browser
            .wait_for(descriptor::LISTING_ROWS, limits.element_timeout)
            .await?
            .is_none()
        {
            return Err(ScrapeError::PaginationTimeout {
                page: page_number + 1,
            });
        }
        tokio::time::sleep(limits.settle_delay).await;
        page_number += 1;
    }

    log::info!("Finished scraping {}", card_name);
    Ok(())
}

/// One-time page adjustments, each best-effort: a failed filter is logged
/// and the scrape proceeds with the site's defaults.
async fn apply_filters<R: Region>(page: &R, state: &mut PageState) {
    if !state.filters_applied {
        match page.find_one(descriptor::VERIFIED_SELLER_FILTER).await {
            Ok(Some(filter)) => match filter.script_click().await {
                Ok(()) => {
                    tokio::time::sleep(FILTER_SETTLE).await;
                    log::info!("Verified seller filter applied.");
                    state.filters_applied = true;
                }
                Err(e) => log::error!("Filter error: {:?}", e),
            },
            Ok(None) => log::error!("Verified seller filter not found."),
            Err(e) => log::error!("Filter error: {:?}", e),
        }
    }

    if !state.page_size_set {
        match page.find_one(descriptor::PAGE_SIZE_MAX_OPTION).await {
            Ok(Some(option)) => match option.script_click().await {
                Ok(()) => {
                    tokio::time::sleep(FILTER_SETTLE).await;
                    log::info!("Page size set to maximum.");
                    state.page_size_set = true;
                }
                Err(e) => log::error!("Page size error: {:?}", e),
            },
            Ok(None) => log::error!("Page size option not found."),
            Err(e) => log::error!("Page size error: {:?}", e),
        }
    }
}

async fn read_spotlight<R: Region>(page: &R) -> RawListing {
    RawListing {
        seller_name: extract_text(page, &descriptor::SPOTLIGHT_SELLER).await,
        condition: extract_text(page, &descriptor::SPOTLIGHT_CONDITION).await,
        price: extract_text(page, &descriptor::SPOTLIGHT_PRICE).await,
        quantity: extract_text(page, &descriptor::SPOTLIGHT_QUANTITY).await,
        is_direct: badge_present(page, &descriptor::SPOTLIGHT_DIRECT_BANNER).await,
        shipping_price: extract_text(page, &descriptor::SPOTLIGHT_SHIPPING).await,
        ..RawListing::default()
    }
}

async fn read_listing<R: Region>(row: &R) -> RawListing {
    RawListing {
        seller_name: extract_text(row, &descriptor::SELLER_NAME).await,
        condition: extract_text(row, &descriptor::CONDITION).await,
        price: extract_text(row, &descriptor::PRICE).await,
        quantity: extract_text(row, &descriptor::QUANTITY).await,
        is_direct: badge_present(row, &descriptor::DIRECT_BADGE).await,
        is_hobby_shop: badge_present(row, &descriptor::HOBBY_SHOP_BADGE).await,
        is_gold_star: badge_present(row, &descriptor::GOLD_STAR_BADGE).await,
        seller_rating: extract_text(row, &descriptor::SELLER_RATING).await,
        shipping_price: extract_text(row, &descriptor::SHIPPING_PRICE).await,
        total_sales: extract_text(row, &descriptor::TOTAL_SALES).await,
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

    fn row(seller: &str) -> FakeRow {
        FakeRow {
            seller: seller.to_string(),
            condition: "Near Mint".to_string(),
            price: "$1.23".to_string(),
            quantity: "of 8".to_string(),
            rating: "99.2%".to_string(),
            sales: "(10,000 Sales)".to_string(),
            shipping: "+ $1.27 Shipping".to_string(),
            ..FakeRow::default()
        }
    }

    fn two_page_state() -> FakeState {
        FakeState {
            title: "Hushwood Verge".to_string(),
            spotlight: FakeSpotlight {
                seller: "Sold by A".to_string(),
                condition: "Near Mint".to_string(),
                price: "$1.50".to_string(),
                quantity: "of 12".to_string(),
                direct: true,
                shipping: "Shipping: Included".to_string(),
            },
            pages: vec![
                FakeTargetPage {
                    rows: vec![row("A")],
                    next_control: Some(false),
                },
                FakeTargetPage {
                    rows: vec![row("B")],
                    next_control: Some(true),
                },
            ],
            current: 0,
            failing_navigations: 0,
            stall_after_click: false,
            navigations: 0,
        }
    }

    fn read_rows(path: &PathBuf) -> Vec<csv::StringRecord> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.records().map(|r| r.unwrap()).collect()
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn two_pages_then_disabled_next_control() {
        let browser = FakeBrowser::new(two_page_state());
        let path = temp_csv();
        let sink = CsvSink::from_path(path.clone());

        scrape_target(&browser, &sink, "https://example.test/p/1", &meta(), &ScrapeLimits::default())
            .await
            .unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);

        // Spotlight record first, flagged unconditionally.
        assert_eq!(&rows[0][1], "A");
        assert_eq!(&rows[0][11], "TRUE");
        assert_eq!(&rows[0][10], "Not Available");
        // Regular row for A flagged by name equality, B not.
        assert_eq!(&rows[1][1], "A");
        assert_eq!(&rows[1][11], "TRUE");
        assert_eq!(&rows[2][1], "B");
        assert_eq!(&rows[2][11], "FALSE");
        // Cleanup rules applied on the way through.
        assert_eq!(&rows[1][4], "8");
        assert_eq!(&rows[1][10], "10,000 Sales");
        assert_eq!(&rows[1][9], "+ $1.27 Shipping");

        let st = browser.state.lock().unwrap();
        assert_eq!(st.navigations, 1);
        assert_eq!(st.current, 1, "no third page was requested");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn run_metadata_identical_across_rows() {
        let browser = FakeBrowser::new(two_page_state());
        let path = temp_csv();
        let sink = CsvSink::from_path(path.clone());

        scrape_target(&browser, &sink, "https://example.test/p/1", &meta(), &ScrapeLimits::default())
            .await
            .unwrap();

        let rows = read_rows(&path);
        for record in &rows {
            assert_eq!(&record[12], "2025-04-05");
            assert_eq!(&record[13], "12:00:00");
            assert_eq!(&record[14], "Las Vegas");
        }

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn identity_timeout_is_fatal_for_the_attempt() {
        let mut state = two_page_state();
        state.failing_navigations = 1;
        let browser = FakeBrowser::new(state);
        let path = temp_csv();
        let sink = CsvSink::from_path(path.clone());

        let result =
            scrape_target(&browser, &sink, "https://example.test/p/1", &meta(), &ScrapeLimits::default())
                .await;

        assert!(matches!(result, Err(ScrapeError::IdentityTimeout { .. })));
        assert!(!path.exists(), "no rows are written on a failed identity wait");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn pagination_timeout_is_fatal_for_the_attempt() {
        let mut state = two_page_state();
        state.stall_after_click = true;
        let browser = FakeBrowser::new(state);
        let path = temp_csv();
        let sink = CsvSink::from_path(path.clone());

        let result =
            scrape_target(&browser, &sink, "https://example.test/p/1", &meta(), &ScrapeLimits::default())
                .await;

        assert!(matches!(
            result,
            Err(ScrapeError::PaginationTimeout { page: 2 })
        ));
        // Page one's batch was already persisted before the stall.
        assert_eq!(read_rows(&path).len(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn page_cap_bounds_a_next_control_that_never_disables() {
        let mut state = two_page_state();
        state.pages = vec![
            FakeTargetPage {
                rows: vec![row("A")],
                next_control: Some(false),
            };
            5
        ];
        let browser = FakeBrowser::new(state);
        let path = temp_csv();
        let sink = CsvSink::from_path(path.clone());
        let limits = ScrapeLimits {
            max_pages: 3,
            ..ScrapeLimits::default()
        };

        scrape_target(&browser, &sink, "https://example.test/p/1", &meta(), &limits)
            .await
            .unwrap();

        // Spotlight + one row per page, three pages.
        assert_eq!(read_rows(&path).len(), 4);
        assert_eq!(browser.state.lock().unwrap().current, 2);

        std::fs::remove_file(&path).unwrap();
    }
}

use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::{
    error::{WebDriverError, WebDriverResult},
    By, DesiredCapabilities, WebDriver, WebElement,
};

use crate::domain::descriptor::Locator;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A located subtree of the rendered page, scoped for field lookups.
/// Absence is a first-class outcome: `find_one` yields `Ok(None)` when the
/// locator resolves nothing, reserving `Err` for transport failures.
#[async_trait]
pub trait Region: Send + Sync + Sized {
    async fn find_one(&self, locator: Locator) -> WebDriverResult<Option<Self>>;
    async fn find_all(&self, locator: Locator) -> WebDriverResult<Vec<Self>>;
    async fn text(&self) -> WebDriverResult<String>;
    async fn attr(&self, name: &str) -> WebDriverResult<Option<String>>;
    async fn click(&self) -> WebDriverResult<()>;
    /// Click via script injection, for controls that intercept native clicks.
    async fn script_click(&self) -> WebDriverResult<()>;
}

/// The capability surface the scrape core needs from a browser engine.
#[async_trait]
pub trait Browser: Send + Sync {
    type Page: Region;

    async fn navigate(&self, url: &str) -> WebDriverResult<()>;
    /// The document root of whatever page is currently loaded.
    async fn active_page(&self) -> WebDriverResult<Self::Page>;
    /// Bounded wait for a locator to become resolvable. `Ok(None)` means it
    /// never did within the timeout.
    async fn wait_for(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> WebDriverResult<Option<Self::Page>>;
}

/// One WebDriver session, created once and reused across all targets.
pub struct WebSession {
    driver: WebDriver,
}

impl WebSession {
    pub async fn connect(server_url: &str) -> WebDriverResult<Self> {
        let caps = DesiredCapabilities::chrome();
        let driver = WebDriver::new(server_url, caps).await?;
        driver.maximize_window().await?;
        Ok(WebSession { driver })
    }

    pub async fn quit(self) -> WebDriverResult<()> {
        self.driver.quit().await
    }
}

pub struct PageRegion {
    element: WebElement,
}

fn found<T>(result: WebDriverResult<T>) -> WebDriverResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(WebDriverError::NoSuchElement(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl Region for PageRegion {
    async fn find_one(&self, locator: Locator) -> WebDriverResult<Option<Self>> {
        let result = self.element.find(locator.to_by()).await;
        Ok(found(result)?.map(|element| PageRegion { element }))
    }

    async fn find_all(&self, locator: Locator) -> WebDriverResult<Vec<Self>> {
        let elements = self.element.find_all(locator.to_by()).await?;
        Ok(elements
            .into_iter()
            .map(|element| PageRegion { element })
            .collect())
    }

    async fn text(&self) -> WebDriverResult<String> {
        self.element.text().await
    }

    async fn attr(&self, name: &str) -> WebDriverResult<Option<String>> {
        self.element.attr(name).await
    }

    async fn click(&self) -> WebDriverResult<()> {
        self.element.click().await
    }

    async fn script_click(&self) -> WebDriverResult<()> {
        self.element
            .handle
            .execute("arguments[0].click();", vec![self.element.to_json()?])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Browser for WebSession {
    type Page = PageRegion;

    async fn navigate(&self, url: &str) -> WebDriverResult<()> {
        self.driver.goto(url).await
    }

    async fn active_page(&self) -> WebDriverResult<PageRegion> {
        let element = self.driver.find(By::Tag("html")).await?;
        Ok(PageRegion { element })
    }

    async fn wait_for(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> WebDriverResult<Option<PageRegion>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.driver.find(locator.to_by()).await {
                Ok(element) => return Ok(Some(PageRegion { element })),
                Err(WebDriverError::NoSuchElement(_)) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Ok(None);
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::errors::{GazeError, GazeResult};

/// Extra render settle after navigation under the `networkidle` condition.
const NETWORK_IDLE_SETTLE: Duration = Duration::from_millis(1500);

/// Browser collaborator as the workflow engine consumes it. Browser-level
/// screenshots are a distinct stream from desktop captures.
#[async_trait]
pub trait BrowserSurface: Send + Sync {
    async fn navigate(&self, url: &str, wait_until: &str) -> GazeResult<()>;
    async fn screenshot(&self, path: &Path) -> GazeResult<()>;
    async fn page_html(&self) -> GazeResult<String>;
}

/// Drives a visible Chrome session over CDP. The browser process is torn
/// down when the controller drops, on every exit path.
pub struct BrowserController {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserController {
    pub async fn launch() -> GazeResult<Self> {
        let (browser, tab) = tokio::task::spawn_blocking(|| {
            let options = LaunchOptions {
                headless: false,
                // Desktop interactions happen outside CDP, so long gaps
                // without protocol traffic are normal.
                idle_browser_timeout: Duration::from_secs(600),
                args: vec![
                    OsStr::new("--no-first-run"),
                    OsStr::new("--no-default-browser-check"),
                ],
                ..Default::default()
            };
            let browser = Browser::new(options).map_err(|e| e.to_string())?;
            let tab = browser.new_tab().map_err(|e| e.to_string())?;
            Ok::<_, String>((browser, tab))
        })
        .await
        .map_err(|e| GazeError::Browser(format!("launch task failed: {e}")))?
        .map_err(GazeError::Browser)?;

        tracing::info!("browser session started");
        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

#[async_trait]
impl BrowserSurface for BrowserController {
    async fn navigate(&self, url: &str, wait_until: &str) -> GazeResult<()> {
        tracing::info!(url, wait_until, "navigating");
        let tab = self.tab.clone();
        let url = url.to_string();
        let wait = wait_until.to_string();

        tokio::task::spawn_blocking(move || {
            tab.navigate_to(&url).map_err(|e| e.to_string())?;
            tab.wait_until_navigated().map_err(|e| e.to_string())?;
            if wait == "networkidle" {
                std::thread::sleep(NETWORK_IDLE_SETTLE);
            }
            Ok::<_, String>(())
        })
        .await
        .map_err(|e| GazeError::Browser(format!("navigation task failed: {e}")))?
        .map_err(GazeError::Browser)
    }

    async fn screenshot(&self, path: &Path) -> GazeResult<()> {
        let tab = self.tab.clone();
        let png = tokio::task::spawn_blocking(move || {
            tab.capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| GazeError::Browser(format!("screenshot task failed: {e}")))?
        .map_err(GazeError::Browser)?;

        tokio::fs::write(path, png).await?;
        tracing::info!(path = %path.display(), "browser screenshot saved");
        Ok(())
    }

    async fn page_html(&self) -> GazeResult<String> {
        let tab = self.tab.clone();
        tokio::task::spawn_blocking(move || tab.get_content().map_err(|e| e.to_string()))
            .await
            .map_err(|e| GazeError::Browser(format!("content task failed: {e}")))?
            .map_err(GazeError::Browser)
    }
}

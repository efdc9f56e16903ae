use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, GetResponseBodyParams, RequestId,
    RequestPattern, RequestStage,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ScrapeError, ScrapeResult};
use crate::router::BodyFetcher;

/// One browser and one page, driven over CDP. The session owns the driver
/// for its whole lifetime and closes it explicitly.
pub struct PageDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl PageDriver {
    /// Launch the browser (visible unless `headless`) and open a blank page.
    pub async fn launch(headless: bool) -> ScrapeResult<Self> {
        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| ScrapeError::Browser(format!("launch failed: {err}")))?;

        // The handler must be pumped for the browser connection to function.
        let handler_task = tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| ScrapeError::Browser(format!("opening page failed: {err}")))?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Pause responses whose URL matches `url_pattern` and return the stream
    /// of paused requests. Each one must be resumed with [`forward_request`]
    /// or the page will stall on it.
    pub async fn intercept(
        &self,
        url_pattern: &str,
    ) -> ScrapeResult<BoxStream<'static, Arc<EventRequestPaused>>> {
        let events = self
            .page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(|err| {
                ScrapeError::Browser(format!("subscribing to paused requests: {err}"))
            })?;

        let pattern = RequestPattern::builder()
            .url_pattern(url_pattern)
            .request_stage(RequestStage::Response)
            .build();
        self.page
            .execute(EnableParams::builder().pattern(pattern).build())
            .await
            .map_err(|err| {
                ScrapeError::Browser(format!("enabling request interception: {err}"))
            })?;

        Ok(events.boxed())
    }

    pub async fn navigate(&self, url: &str) -> ScrapeResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|err| ScrapeError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|err| ScrapeError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        Ok(())
    }

    /// Fixed wait that keeps the page open so asynchronous content and the
    /// network calls it triggers can complete.
    pub async fn settle(&self, wait: Duration) {
        tokio::time::sleep(wait).await;
    }

    pub async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            debug!("closing browser: {err}");
        }
        if let Err(err) = self.browser.wait().await {
            debug!("waiting for browser exit: {err}");
        }
        self.handler_task.abort();
    }
}

/// Resume a paused request unmodified. Failures are logged only; by the time
/// this can fail the page is usually going away.
pub async fn forward_request(page: &Page, request_id: RequestId) {
    if let Err(err) = page.execute(ContinueRequestParams::new(request_id)).await {
        debug!("failed to forward intercepted request: {err}");
    }
}

/// CDP-backed body fetch for one paused request: pull the full response body
/// and decode it as JSON.
pub struct ResponseBodyFetcher {
    page: Page,
    request_id: RequestId,
}

impl ResponseBodyFetcher {
    pub fn new(page: Page, request_id: RequestId) -> Self {
        Self { page, request_id }
    }
}

#[async_trait]
impl BodyFetcher for ResponseBodyFetcher {
    async fn fetch_json(&self) -> Result<Value> {
        let response = self
            .page
            .execute(GetResponseBodyParams::new(self.request_id.clone()))
            .await?;
        let raw = if response.result.base64_encoded {
            STANDARD.decode(response.result.body.as_bytes())?
        } else {
            response.result.body.clone().into_bytes()
        };
        Ok(serde_json::from_slice(&raw)?)
    }
}

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::fetch::EventRequestPaused;
use chromiumoxide::Page;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::browser::{forward_request, PageDriver, ResponseBodyFetcher};
use crate::config::Config;
use crate::error::{ScrapeError, ScrapeResult};
use crate::router::{Router, INTERCEPT_URL_PATTERN};
use crate::store::ResultStore;

/// Run one capture session: open the profile page, let the router pick over
/// its background calls until the settle bound elapses or both endpoints
/// have been observed, and hand back whatever accumulated. Partial capture
/// is a normal outcome; only launch and navigation failures are fatal.
pub async fn run(config: &Config) -> ScrapeResult<ResultStore> {
    info!(url = %config.profile_url, "starting capture session");
    let driver = PageDriver::launch(config.headless).await?;

    let events = match driver.intercept(INTERCEPT_URL_PATTERN).await {
        Ok(events) => events,
        Err(err) => {
            driver.close().await;
            return Err(err);
        }
    };

    let router = Router::new(config.post_cap, config.entry_policy());
    let (done_tx, done_rx) = oneshot::channel();
    let worker = tokio::spawn(intercept_loop(
        events,
        driver.page().clone(),
        router,
        done_tx,
    ));

    if let Err(err) = driver.navigate(&config.profile_url).await {
        driver.close().await;
        worker.abort();
        return Err(err);
    }

    tokio::select! {
        _ = driver.settle(Duration::from_millis(config.settle_ms)) => {
            debug!("settle period elapsed");
        }
        _ = done_rx => {
            info!("both endpoints observed, ending session early");
        }
    }

    // Closing the browser ends the event stream, which ends the worker.
    driver.close().await;
    worker
        .await
        .map_err(|err| ScrapeError::Browser(format!("interception worker failed: {err}")))
}

/// Sole owner of the store for the session. Paused requests arrive one at a
/// time; each is classified, fetched and merged by the router, then resumed
/// so the page never notices the detour.
async fn intercept_loop(
    mut events: BoxStream<'static, Arc<EventRequestPaused>>,
    page: Page,
    router: Router,
    done: oneshot::Sender<()>,
) -> ResultStore {
    let mut store = ResultStore::new();
    let mut done = Some(done);
    while let Some(event) = events.next().await {
        debug!(url = %event.request.url, "intercepted request");
        let fetcher = ResponseBodyFetcher::new(page.clone(), event.request_id.clone());
        router
            .on_request(&event.request.url, &fetcher, &mut store)
            .await;
        forward_request(&page, event.request_id.clone()).await;
        if store.is_complete() {
            if let Some(done) = done.take() {
                let _ = done.send(());
            }
        }
    }
    store
}

//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use trendboard::client::{ClientError, JsonSource};
use trendboard::config::DashboardConfig;
use trendboard::controller::{DashboardController, DashboardEvent};
use trendboard::page::Page;

struct Route {
    prefix: String,
    reply: Result<Value, ClientError>,
    delay: Option<Duration>,
}

/// In-memory backend. Routes match by URL prefix, first match wins;
/// anything unrouted answers 404.
#[derive(Default)]
pub struct ScriptedSource {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, prefix: &str, body: Value) -> &Self {
        self.push(prefix, Ok(body), None)
    }

    pub fn fail(&self, prefix: &str, error: ClientError) -> &Self {
        self.push(prefix, Err(error), None)
    }

    /// Like [`serve`](Self::serve) but the reply arrives after `delay`.
    pub fn serve_after(&self, prefix: &str, body: Value, delay: Duration) -> &Self {
        self.push(prefix, Ok(body), Some(delay))
    }

    fn push(&self, prefix: &str, reply: Result<Value, ClientError>, delay: Option<Duration>) -> &Self {
        self.routes.lock().unwrap().push(Route {
            prefix: prefix.to_string(),
            reply,
            delay,
        });
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|url| url.starts_with(prefix))
            .collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl JsonSource for ScriptedSource {
    async fn fetch_json(&self, url: &str) -> Result<Value, ClientError> {
        self.requests.lock().unwrap().push(url.to_string());
        let matched = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|route| url.starts_with(&route.prefix))
            .map(|route| (route.reply.clone(), route.delay));

        match matched {
            Some((reply, delay)) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                reply
            }
            None => Err(ClientError::http(404, "Not Found", url)),
        }
    }
}

pub fn controller(
    source: Arc<ScriptedSource>,
    page: Page,
) -> (DashboardController, mpsc::UnboundedReceiver<DashboardEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let ctrl = DashboardController::new(source, page, &DashboardConfig::default(), tx);
    (ctrl, rx)
}

/// Everything emitted so far.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<DashboardEvent>) -> Vec<DashboardEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

pub fn statuses(events: &[DashboardEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DashboardEvent::Status(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

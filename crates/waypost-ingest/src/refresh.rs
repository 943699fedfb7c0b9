//! Periodic resource feed refresh.
//!
//! [`FeedRefresher`] polls a GeoJSON feed on a fixed period and hands each
//! successfully built [`ResourceIndex`] to a callback, typically one that
//! swaps the index into a running locator. A failed cycle is logged and
//! skipped: the previous index stays in service until the next tick succeeds.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::{Result, feed, records::ResourceIndex};

pub struct FeedRefresher {
    url: String,
    period: Duration,
    client: reqwest::Client,
}

impl FeedRefresher {
    pub fn new(url: impl Into<String>, period: Duration) -> Self {
        Self {
            url: url.into(),
            period,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Fetch the feed once and build an index snapshot from it.
    pub async fn refresh_once(&self) -> Result<ResourceIndex> {
        feed::fetch_resource_index(&self.client, &self.url).await
    }

    /// Run the refresh loop. The first tick fires immediately, so the callback
    /// receives an initial snapshot as soon as the feed responds; after that
    /// the loop wakes once per period. Never returns; spawn it as a task.
    pub async fn run<F>(self, mut on_index: F)
    where
        F: FnMut(ResourceIndex),
    {
        info!(url = %self.url, period = ?self.period, "Starting feed refresh loop");
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.refresh_once().await {
                Ok(index) => {
                    info!(
                        codes = index.code_count(),
                        records = index.record_count(),
                        "Resource feed refreshed"
                    );
                    on_index(index);
                }
                Err(error) => {
                    warn!(%error, url = %self.url, "Feed refresh failed, keeping the previous index");
                }
            }
        }
    }
}

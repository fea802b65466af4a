//! Waiting for asynchronous operations
//!
//! vRA answers provisioning calls with a tracker object and finishes the work
//! in the background. These helpers poll until a terminal status, sleeping a
//! fixed interval between polls, bounded by a caller supplied timeout.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::client::VraClient;
use crate::error::{Error, Result};
use crate::models::{RequestStatus, RequestTracker};

/// Outcome of one poll
#[derive(Debug)]
pub enum Poll<T> {
    Pending,
    Ready(T),
}

/// Call `check` every `interval` until it is ready, fails, or `timeout` passes
pub async fn poll_until<T, F, Fut>(
    interval: Duration,
    timeout: Duration,
    operation: &str,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Poll<T>>>,
{
    let started = Instant::now();
    loop {
        if let Poll::Ready(value) = check().await? {
            return Ok(value);
        }

        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return Err(Error::Timeout {
                operation: operation.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        tokio::time::sleep(interval.min(timeout - elapsed)).await;
    }
}

fn tracker_outcome(tracker: RequestTracker) -> Result<Poll<RequestTracker>> {
    debug!(
        "Request {} is {:?} ({}%)",
        tracker.id, tracker.status, tracker.progress
    );
    match tracker.status {
        RequestStatus::Finished => Ok(Poll::Ready(tracker)),
        RequestStatus::Failed => Err(Error::RequestFailed {
            id: tracker.id.clone(),
            message: tracker
                .message
                .unwrap_or_else(|| "no failure message".to_string()),
        }),
        RequestStatus::InProgress | RequestStatus::Unknown => Ok(Poll::Pending),
    }
}

impl VraClient {
    pub async fn get_request_tracker(&self, id: &str) -> Result<RequestTracker> {
        self.get(&format!("/iaas/api/request-tracker/{}", id), &[])
            .await
    }

    /// Poll a request tracker until it finishes
    pub async fn wait_for_request(&self, id: &str, timeout: Duration) -> Result<RequestTracker> {
        let operation = format!("request {}", id);
        poll_until(self.poll_interval(), timeout, &operation, || async move {
            tracker_outcome(self.get_request_tracker(id).await?)
        })
        .await
    }

    /// Wait for a tracker handed back by a call, skipping the poll when it is
    /// already terminal
    pub async fn wait_for_tracker(
        &self,
        tracker: RequestTracker,
        timeout: Duration,
    ) -> Result<RequestTracker> {
        let id = tracker.id.clone();
        match tracker_outcome(tracker)? {
            Poll::Ready(done) => Ok(done),
            Poll::Pending => self.wait_for_request(&id, timeout).await,
        }
    }

    /// Wait for a tracker and return the id of the object it produced
    pub async fn wait_for_resource_id(
        &self,
        tracker: RequestTracker,
        timeout: Duration,
    ) -> Result<String> {
        let done = self.wait_for_tracker(tracker, timeout).await?;
        done.resource_id().map(str::to_string).ok_or_else(|| {
            Error::UnexpectedResponse(format!("request {} finished without a resource", done.id))
        })
    }

    /// Wait on the body of a DELETE when the server answered with a tracker
    pub(crate) async fn wait_for_delete(
        &self,
        body: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<()> {
        let Some(body) = body else {
            return Ok(());
        };
        match serde_json::from_value::<RequestTracker>(body) {
            Ok(tracker) => {
                self.wait_for_tracker(tracker, timeout).await?;
                Ok(())
            }
            // Synchronous deletes may echo something else; nothing to wait for.
            Err(_) => Ok(()),
        }
    }
}

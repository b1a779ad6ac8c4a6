use crate::constants;
use crate::data::Sample;
use crate::identity::Identity;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub use reqwest::Url;

/// Issues one request on behalf of one identity and reports how it went.
///
/// Implementations never escalate request failures: transport errors and
/// non-success statuses come back as failed [`Sample`]s with their latency
/// preserved, and an attempt is never retried, since a retry would bias the
/// latency statistics.
pub trait RequestTarget: Send + Sync {
    fn execute(&self, identity: &Identity) -> impl Future<Output = Sample> + Send;
}

/// Settings for [`TimelineTarget`].
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Endpoint serving the timeline, e.g. `https://host/api/timeline`.
    pub base_url: Url,
    /// Value of the `limit` query parameter attached to every request.
    pub result_limit: u32,
    /// Per-request timeout. A timed-out request is a failed sample whose
    /// elapsed time is roughly the timeout itself.
    pub request_timeout: Duration,
}

impl TargetConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            result_limit: constants::DEFAULT_RESULT_LIMIT,
            request_timeout: constants::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("failed to build the http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// The timeline endpoint: `GET {base}?user=<identity>&limit=<n>`.
///
/// Success is a 2xx status with a fully delivered body. The clock stops
/// only after the body is down, so a slow transfer shows up as latency
/// and a mid-body stall as a timeout failure. Transport errors and
/// non-success statuses are failed samples with their latency kept.
#[derive(Debug, Clone)]
pub struct TimelineTarget {
    client: reqwest::Client,
    config: TargetConfig,
}

impl TimelineTarget {
    pub fn new(config: TargetConfig) -> Result<Self, TargetError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }
}

impl RequestTarget for TimelineTarget {
    async fn execute(&self, identity: &Identity) -> Sample {
        let limit = self.config.result_limit.to_string();
        let request = self
            .client
            .get(self.config.base_url.clone())
            .query(&[("user", identity.as_str()), ("limit", limit.as_str())]);

        let start = Instant::now();
        let response = request.send().await;
        // send() resolves at the response head; the measurement has to
        // cover the body transfer as well.
        let failed = match response {
            Ok(response) => {
                let status_ok = response.status().is_success();
                let body = response.bytes().await;
                if let Err(err) = &body {
                    trace!(user = identity.as_str(), "body error: {err}");
                }
                !status_ok || body.is_err()
            }
            Err(err) => {
                trace!(user = identity.as_str(), "request error: {err}");
                true
            }
        };
        let elapsed = start.elapsed();

        #[cfg(feature = "metrics")]
        {
            metrics::histogram!("loadsweep.request_latency").record(elapsed.as_secs_f64());
            if failed {
                metrics::counter!("loadsweep.request_failure").increment(1);
            } else {
                metrics::counter!("loadsweep.request_success").increment(1);
            }
        }

        Sample { elapsed, failed }
    }
}

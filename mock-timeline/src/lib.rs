//! An in-process stand-in for the timeline endpoint, used by the
//! integration tests and as a standalone binary for trying out sweeps
//! without a real deployment.

use axum::{
    debug_handler,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::trace::TraceLayer;
#[allow(unused)]
use tracing::{debug, info};

/// How the endpoint behaves.
#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    /// Base service time per request.
    pub delay: Duration,
    /// Standard deviation of normally distributed extra jitter; zero keeps
    /// responses at exactly `delay`.
    pub jitter: Duration,
    /// Answer every request with a 500 when set.
    pub fail: bool,
}

impl Behavior {
    pub fn delay_ms(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            jitter: Duration::ZERO,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
            fail: true,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Counters the integration tests assert traffic against.
#[derive(Debug, Default)]
pub struct Counters {
    hits: AtomicU64,
    by_user: Mutex<HashMap<String, u64>>,
}

impl Counters {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn hits_for(&self, user: &str) -> u64 {
        self.by_user.lock().unwrap().get(user).copied().unwrap_or(0)
    }

    pub fn by_user(&self) -> HashMap<String, u64> {
        self.by_user.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    behavior: Behavior,
    counters: Arc<Counters>,
}

/// A running mock endpoint bound to an ephemeral local port.
pub struct MockTimeline {
    pub addr: SocketAddr,
    pub counters: Arc<Counters>,
}

impl MockTimeline {
    /// Binds to `127.0.0.1:0` and serves until the runtime shuts down.
    pub async fn spawn(behavior: Behavior) -> Self {
        let counters = Arc::new(Counters::default());
        let state = MockState {
            behavior,
            counters: Arc::clone(&counters),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Self { addr, counters }
    }

    /// Base URL of the timeline route.
    pub fn timeline_url(&self) -> String {
        format!("http://{}/api/timeline", self.addr)
    }
}

/// Serves on a caller-supplied address; the standalone binary's entry.
pub async fn run(addr: SocketAddr, behavior: Behavior) {
    let state = MockState {
        behavior,
        counters: Arc::new(Counters::default()),
    };
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!("mock timeline listening on {addr}");
    axum::serve(listener, router(state)).await.unwrap();
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/timeline", get(timeline))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct TimelineQuery {
    user: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
struct Post {
    author: String,
    content: String,
}

#[debug_handler]
async fn timeline(
    State(state): State<MockState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Vec<Post>>, StatusCode> {
    state.counters.hits.fetch_add(1, Ordering::Relaxed);
    {
        let mut by_user = state.counters.by_user.lock().unwrap();
        *by_user.entry(query.user.clone()).or_insert(0) += 1;
    }

    let delay = jittered(state.behavior.delay, state.behavior.jitter);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if state.behavior.fail {
        debug!(user = %query.user, "answering with failure");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let posts = (0..query.limit.min(3))
        .map(|i| Post {
            author: format!("followee{}", i + 1),
            content: format!("post {} for {}", i + 1, query.user),
        })
        .collect();
    Ok(Json(posts))
}

fn jittered(delay: Duration, jitter: Duration) -> Duration {
    if jitter.is_zero() {
        return delay;
    }
    let normal = Normal::new(delay.as_secs_f64(), jitter.as_secs_f64()).unwrap();
    Duration::from_secs_f64(normal.sample(&mut rand::thread_rng()).max(0.))
}

//! Reference experiment values: the sweep shapes and dataset sizes the
//! engine reproduces out of the box.

use std::num::NonZeroU32;
use std::time::Duration;

/// Client counts swept by the concurrency experiment.
pub const CONCURRENCY_LEVELS: [u32; 6] = [1, 10, 20, 50, 100, 1000];

/// Follow counts swept by the fan-out experiment.
pub const FANOUT_LEVELS: [u32; 3] = [10, 50, 100];

/// Repeated runs per parameter value.
pub const DEFAULT_RUNS: u32 = 3;

/// Request budget of a single run.
pub const DEFAULT_TOTAL_REQUESTS: u32 = 1000;

/// Simulated clients participating in every fan-out run.
pub const DEFAULT_FANOUT_CONCURRENCY: NonZeroU32 = unsafe { NonZeroU32::new_unchecked(50) };

/// Requests time out after this long; a timeout is a failed sample.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `limit` query parameter attached to every timeline request.
pub const DEFAULT_RESULT_LIMIT: u32 = 20;

/// Identities in every seeded dataset.
pub const SEED_USERS: u32 = 1000;

/// Posts seeded into the concurrency experiment's dataset.
pub const CONCURRENCY_SEED_POSTS: u32 = 50_000;

/// Follows per identity in the concurrency experiment's dataset.
pub const CONCURRENCY_SEED_FOLLOWS: u32 = 20;

/// Posts seeded into each fan-out dataset.
pub const FANOUT_SEED_POSTS: u32 = 100_000;

/// Dataset prefix of the reference concurrency experiment.
pub const CONCURRENCY_PREFIX: &str = "conc";

/// Dataset prefix of the reference fan-out experiment; the swept level is
/// appended per dataset (`fanout10`, `fanout50`, ...).
pub const FANOUT_PREFIX: &str = "fanout";

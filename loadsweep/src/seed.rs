use std::future::Future;
use std::process::ExitStatus;
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Shape of one dataset the preparation step builds: `users` identities
/// named `{prefix}1..{prefix}N`, `posts` items spread across them, and a
/// follow count per identity drawn from `follows_min..=follows_max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSpec {
    pub users: u32,
    pub posts: u32,
    pub follows_min: u32,
    pub follows_max: u32,
    pub prefix: String,
}

impl SeedSpec {
    /// A dataset where every identity follows exactly `follows` others.
    pub fn uniform_follows(users: u32, posts: u32, follows: u32, prefix: &str) -> Self {
        Self {
            users,
            posts,
            follows_min: follows,
            follows_max: follows,
            prefix: prefix.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to launch the seeding command: {0}")]
    Io(#[from] std::io::Error),
    #[error("seeding command exited with {0}")]
    Command(ExitStatus),
}

/// Prepares the target's datasets before a sweep measures anything.
///
/// Seeding failure is the one error that aborts a whole sweep: numbers
/// measured against an unseeded dataset would not be comparable to
/// anything.
pub trait Seeder: Send + Sync {
    fn seed(&self, spec: &SeedSpec) -> impl Future<Output = Result<(), SeedError>> + Send;
}

/// Runs an external seeding program once per dataset, passing the shape as
/// flags:
///
/// `<program> <args..> --users N --posts M --follows-min A --follows-max B --prefix P`
#[derive(Debug, Clone)]
pub struct CommandSeeder {
    program: String,
    args: Vec<String>,
}

impl CommandSeeder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra argument placed before the dataset flags, e.g. a script path
    /// when the program is an interpreter.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn command_args(&self, spec: &SeedSpec) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--users".to_string(),
            spec.users.to_string(),
            "--posts".to_string(),
            spec.posts.to_string(),
            "--follows-min".to_string(),
            spec.follows_min.to_string(),
            "--follows-max".to_string(),
            spec.follows_max.to_string(),
            "--prefix".to_string(),
            spec.prefix.clone(),
        ]);
        args
    }
}

impl Seeder for CommandSeeder {
    async fn seed(&self, spec: &SeedSpec) -> Result<(), SeedError> {
        info!(
            prefix = %spec.prefix,
            users = spec.users,
            posts = spec.posts,
            "seeding dataset"
        );

        let status = tokio::process::Command::new(&self.program)
            .args(self.command_args(spec))
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(SeedError::Command(status))
        }
    }
}

/// For datasets seeded out of band, and for targets that need none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSeeder;

impl Seeder for NoopSeeder {
    async fn seed(&self, spec: &SeedSpec) -> Result<(), SeedError> {
        debug!(prefix = %spec.prefix, "seeding skipped");
        Ok(())
    }
}

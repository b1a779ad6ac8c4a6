use std::fmt;

/// A simulated client requests are issued on behalf of.
///
/// Identities are opaque tokens to the engine; the reference experiments
/// derive them from a dataset prefix and a 1-based index so that they line
/// up with the rows the seeding step creates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives `{prefix}1..={prefix}count` in index order.
    ///
    /// Derivation is deterministic: the same prefix and count always name
    /// the same identities in the same order, which keeps budget plans
    /// reproducible from run to run.
    pub fn sequence(prefix: &str, count: u32) -> Vec<Identity> {
        (1..=count)
            .map(|i| Identity(format!("{prefix}{i}")))
            .collect()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

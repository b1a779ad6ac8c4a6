use crate::identity::Identity;
use thiserror::Error;

/// How many requests one identity issues during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub identity: Identity,
    pub count: u32,
}

/// An even split of a request budget across identities.
///
/// Assignments keep the identities' input order; the first `total %
/// identities` entries carry one extra request, so counts never differ by
/// more than one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetPlan {
    assignments: Vec<Assignment>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("cannot distribute a request budget across zero identities")]
    NoIdentities,
}

impl BudgetPlan {
    /// Splits `total` requests across `identities` as evenly as possible.
    ///
    /// Deterministic: identical inputs always produce identical plans. A
    /// zero `total` is a valid (empty) plan; zero identities is a
    /// configuration error.
    pub fn distribute(total: u32, identities: &[Identity]) -> Result<Self, PlanError> {
        if identities.is_empty() {
            return Err(PlanError::NoIdentities);
        }

        let parts = identities.len() as u32;
        let base = total / parts;
        let remainder = total % parts;

        let assignments = identities
            .iter()
            .enumerate()
            .map(|(i, identity)| Assignment {
                identity: identity.clone(),
                count: if (i as u32) < remainder { base + 1 } else { base },
            })
            .collect();

        Ok(Self { assignments })
    }

    /// Every assignment in input order, zero counts included.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Assignments that actually issue requests. An identity with a zero
    /// count takes no part in the run; no worker is spawned for it.
    pub fn active(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(|a| a.count > 0)
    }

    /// Number of workers a run of this plan fans out to.
    pub fn active_len(&self) -> usize {
        self.active().count()
    }

    pub fn total(&self) -> u32 {
        self.assignments.iter().map(|a| a.count).sum()
    }
}

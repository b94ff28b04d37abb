//! Reference-chain tracking for traversals that expand `$ref` nodes.

/// The chain of reference names visited along the current descent.
///
/// The chain is extended by value: every branch owns its copy, so siblings
/// never see each other's visits. A name that reaches the chain twice marks
/// reentry into a definition already being expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleGuard {
    chain: Vec<String>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard already holding `name`, for resolving a named definition at
    /// the top level.
    pub fn rooted_at(name: impl Into<String>) -> Self {
        Self {
            chain: vec![name.into()],
        }
    }

    /// The chain extended with `name`. `self` is left untouched.
    pub fn descend(&self, name: &str) -> CycleGuard {
        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        chain.extend(self.chain.iter().cloned());
        chain.push(name.to_string());
        CycleGuard { chain }
    }

    /// Whether any name appears more than once in the chain.
    pub fn is_reentrant(&self) -> bool {
        self.chain
            .iter()
            .enumerate()
            .any(|(i, name)| self.chain[..i].contains(name))
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// The repository a DAK is hosted in. Relative-URL sources resolve against
/// the `input/` content root of this repository and branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RepositoryContext {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepositoryContext {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: "main".to_string(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }
}

impl fmt::Display for RepositoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.repo, self.branch)
    }
}

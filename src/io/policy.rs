//! Shared vs owned collection policy.

use crate::models::Scope;
use std::collections::HashSet;

/// Decides whether a collection's rows are shared by all users.
///
/// Closures implement this trait, which keeps tests free of configuration.
pub trait SharingPolicy: Send + Sync {
    /// Returns `true` when the collection is visible to every user.
    fn is_shared(&self, collection: &str) -> bool;

    /// Returns the row scope of the collection.
    fn scope(&self, collection: &str) -> Scope {
        if self.is_shared(collection) {
            Scope::Shared
        } else {
            Scope::Owned
        }
    }
}

impl<F> SharingPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_shared(&self, collection: &str) -> bool {
        self(collection)
    }
}

/// Policy backed by a fixed set of shared collection names.
#[derive(Debug, Clone, Default)]
pub struct SharedCollections {
    names: HashSet<String>,
}

impl SharedCollections {
    /// Creates a policy from collection names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl SharingPolicy for SharedCollections {
    fn is_shared(&self, collection: &str) -> bool {
        self.names.contains(collection)
    }
}

//! Query type to resolver table.
//!
//! Exactly one resolver answers each query type. The table is built
//! explicitly at startup; a second resolver for the same type is rejected.

use std::collections::BTreeMap;
use std::fmt;

use tracing::error;

use crate::error::{Error, Result};
use crate::query::QueryType;
use crate::resolvers::{default_resolvers, QueryResolver};

/// Maps each query type to the resolver that answers it.
///
/// At most one resolver is registered per query type. Lookups for an
/// unregistered type return `None`; the caller decides how to report it.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: BTreeMap<QueryType, Box<dyn QueryResolver>>,
}

impl ResolverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in resolver.
    pub fn with_defaults() -> Self {
        Self::from_resolvers(default_resolvers())
    }

    /// Build a registry, keeping the first resolver seen for each query type.
    ///
    /// Later duplicates are logged as configuration errors and dropped.
    pub fn from_resolvers(resolvers: impl IntoIterator<Item = Box<dyn QueryResolver>>) -> Self {
        let mut registry = Self::new();
        for resolver in resolvers {
            if let Err(err) = registry.register(resolver) {
                error!(error = %err, "ignoring duplicate resolver");
            }
        }
        registry
    }

    /// Add a resolver. Fails if its query type already has one.
    pub fn register(&mut self, resolver: Box<dyn QueryResolver>) -> Result<()> {
        let query = resolver.query_type();
        if self.resolvers.contains_key(&query) {
            return Err(Error::DuplicateResolver { query });
        }
        self.resolvers.insert(query, resolver);
        Ok(())
    }

    pub fn get(&self, query: QueryType) -> Option<&dyn QueryResolver> {
        self.resolvers.get(&query).map(|resolver| resolver.as_ref())
    }

    pub fn contains(&self, query: QueryType) -> bool {
        self.resolvers.contains_key(&query)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Registered query types, in declaration order.
    pub fn query_types(&self) -> impl Iterator<Item = QueryType> + '_ {
        self.resolvers.keys().copied()
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("query_types", &self.resolvers.keys().collect::<Vec<_>>())
            .finish()
    }
}

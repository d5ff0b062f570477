//! Middleware chain
//!
//! Links decorators in front of a terminal store and broadcasts lifecycle
//! notifications through them.

use crate::config::{Config, MiddlewareKind};
use crate::error::Result;
use crate::store::Store;

use super::{LoggingMiddleware, Middleware, Notification, WriteBackCache};

/// The remainder of a chain seen from one layer: the layers below it plus
/// the terminal store
struct Link<'a, 's> {
    layers: &'a mut [Box<dyn Middleware>],
    store: &'a mut (dyn Store + 's),
}

impl Store for Link<'_, '_> {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.layers.split_first_mut() {
            Some((layer, rest)) => layer.get(&mut Link { layers: rest, store: &mut *self.store }, key),
            None => self.store.get(key),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        match self.layers.split_first_mut() {
            Some((layer, rest)) => {
                layer.put(&mut Link { layers: rest, store: &mut *self.store }, key, value)
            }
            None => self.store.put(key, value),
        }
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        match self.layers.split_first_mut() {
            Some((layer, rest)) => {
                layer.delete(&mut Link { layers: rest, store: &mut *self.store }, key)
            }
            None => self.store.delete(key),
        }
    }

    fn scan_prefix(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        match self.layers.split_first_mut() {
            Some((layer, rest)) => {
                layer.scan_prefix(&mut Link { layers: rest, store: &mut *self.store }, prefix)
            }
            None => self.store.scan_prefix(prefix),
        }
    }
}

/// An ordered sequence of decorators in front of a terminal store
///
/// The chain itself implements [`Store`]; calls enter at the head.
pub struct MiddlewareChain<S: Store> {
    store: S,

    /// Head first
    layers: Vec<Box<dyn Middleware>>,
}

impl<S: Store> MiddlewareChain<S> {
    /// Start building a chain over `store`
    pub fn builder(store: S) -> ChainBuilder<S> {
        ChainBuilder::new(store)
    }

    /// A chain without decorators; every call goes straight to the store
    pub fn empty(store: S) -> Self {
        Self {
            store,
            layers: Vec::new(),
        }
    }

    /// Build the chain declared in `config`
    pub fn from_config(store: S, config: &Config) -> Self {
        config
            .middlewares
            .iter()
            .fold(ChainBuilder::new(store), |builder, kind| builder.push_kind(*kind, config))
            .build()
    }

    /// Deliver `notification` to every decorator, head first
    ///
    /// Delivery stops at the first decorator that fails; its error is
    /// returned unchanged.
    pub fn notify(&mut self, notification: Notification) -> Result<()> {
        tracing::trace!(?notification, layers = self.layers.len(), "Broadcasting notification");

        for index in 0..self.layers.len() {
            if let Some((layer, rest)) = self.layers[index..].split_first_mut() {
                let mut next = Link {
                    layers: rest,
                    store: &mut self.store,
                };
                layer.on_notification(&mut next, notification)?;
            }
        }

        Ok(())
    }

    /// Decorator names, head first
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Name of the decorator callers hit first, if any
    pub fn head_name(&self) -> Option<&str> {
        self.layers.first().map(|layer| layer.name())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The terminal store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear the chain down, returning the terminal store
    pub fn into_store(self) -> S {
        self.store
    }

    fn link(&mut self) -> Link<'_, '_> {
        Link {
            layers: &mut self.layers,
            store: &mut self.store,
        }
    }
}

impl<S: Store> Store for MiddlewareChain<S> {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        self.link().get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.link().put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.link().delete(key)
    }

    fn scan_prefix(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.link().scan_prefix(prefix)
    }
}

/// Builder for a middleware chain
///
/// Decorators are pushed innermost first: each pushed decorator wraps the
/// previously pushed one (or the store), so the last one pushed becomes the
/// head.
///
/// ```text
/// builder(store).push(cache).push(logging)
///   => logging --> cache --> store
/// ```
pub struct ChainBuilder<S: Store> {
    store: S,

    /// Innermost first
    layers: Vec<Box<dyn Middleware>>,
}

impl<S: Store> ChainBuilder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            layers: Vec::new(),
        }
    }

    /// Wrap the current chain in `middleware`
    pub fn push(self, middleware: impl Middleware + 'static) -> Self {
        self.push_boxed(Box::new(middleware))
    }

    pub fn push_boxed(mut self, middleware: Box<dyn Middleware>) -> Self {
        tracing::debug!(middleware = middleware.name(), "Chaining in middleware");
        self.layers.push(middleware);
        self
    }

    /// Wrap the current chain in a built-in decorator configured from `config`
    pub fn push_kind(self, kind: MiddlewareKind, config: &Config) -> Self {
        match kind {
            MiddlewareKind::WriteBackCache => self.push(WriteBackCache::new()),
            MiddlewareKind::Logging => {
                self.push(LoggingMiddleware::new(config.log_level, config.log_values))
            }
        }
    }

    /// Wrap the current chain in a built-in decorator named `name`
    ///
    /// Unknown names are a configuration error raised here, at build time.
    pub fn push_named(self, name: &str, config: &Config) -> Result<Self> {
        let kind: MiddlewareKind = name.parse()?;
        Ok(self.push_kind(kind, config))
    }

    pub fn build(self) -> MiddlewareChain<S> {
        let mut layers = self.layers;
        layers.reverse();
        MiddlewareChain {
            store: self.store,
            layers,
        }
    }
}

//! Transaction Context
//!
//! Owns the middleware chain of exactly one transaction and drives its
//! lifecycle.
//!
//! ## Lifecycle
//! ```text
//!   open ──▶ begin ──▶ (registry calls) ──▶ commit
//!                             │
//!                             └──────────▶ rollback / drop
//! ```
//! `begin` and `commit` broadcast `TransactionBegin` / `TransactionEnd`
//! through the chain exactly once. Buffered mutations reach the store only
//! on commit; a context that is rolled back or dropped while active loses
//! them.

use crate::codec::{Codec, JsonCodec};
use crate::config::Config;
use crate::entity::Schema;
use crate::error::{EntityKvError, Result};
use crate::middleware::{MiddlewareChain, Notification};
use crate::registry::Registry;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Opened,
    Active,
    Ended,
}

/// One transaction's chain and lifecycle state
pub struct TxContext<S: Store> {
    chain: MiddlewareChain<S>,
    phase: Phase,
}

impl<S: Store> TxContext<S> {
    /// Build the chain declared in `config` over `store`
    pub fn open(store: S, config: &Config) -> Self {
        Self::with_chain(MiddlewareChain::from_config(store, config))
    }

    /// Use an already built chain
    pub fn with_chain(chain: MiddlewareChain<S>) -> Self {
        Self {
            chain,
            phase: Phase::Opened,
        }
    }

    /// Run `body` inside a fresh transaction over `store`
    ///
    /// Commits if `body` succeeds. If it fails, the transaction is rolled
    /// back and the body's error returned.
    pub fn run<T, F>(store: S, config: &Config, schema: &Schema, body: F) -> Result<T>
    where
        F: FnOnce(&mut Registry<'_>) -> Result<T>,
    {
        let mut ctx = Self::open(store, config);
        ctx.begin()?;

        let result = {
            let mut registry = ctx.registry(schema)?;
            body(&mut registry)
        };

        match result {
            Ok(value) => {
                ctx.commit()?;
                Ok(value)
            }
            Err(e) => {
                ctx.rollback();
                Err(e)
            }
        }
    }

    /// Deliver `TransactionBegin`
    ///
    /// The context becomes active only if every decorator accepted the
    /// notification; otherwise it is ended and the error returned.
    pub fn begin(&mut self) -> Result<()> {
        if self.phase != Phase::Opened {
            return Err(self.lifecycle_error("begin"));
        }
        tracing::debug!(chain = ?self.chain.names(), "Transaction begin");

        if let Err(e) = self.chain.notify(Notification::TransactionBegin) {
            tracing::warn!(error = %e, "Transaction begin failed");
            self.phase = Phase::Ended;
            return Err(e);
        }
        self.phase = Phase::Active;
        Ok(())
    }

    /// Registry bound to the chain head, using the JSON codec
    pub fn registry<'a>(&'a mut self, schema: &'a Schema) -> Result<Registry<'a>> {
        self.registry_with_codec(schema, JsonCodec)
    }

    pub fn registry_with_codec<'a, C: Codec>(
        &'a mut self,
        schema: &'a Schema,
        codec: C,
    ) -> Result<Registry<'a, C>> {
        Ok(Registry::with_codec(self.head()?, schema, codec))
    }

    /// The chain head, for raw key-value access within the transaction
    pub fn head(&mut self) -> Result<&mut dyn Store> {
        if self.phase != Phase::Active {
            return Err(self.lifecycle_error("access the store"));
        }
        Ok(&mut self.chain)
    }

    /// Deliver `TransactionEnd`, flushing buffered mutations
    ///
    /// The transaction is over even if the flush fails; the error is
    /// returned and nothing is retried.
    pub fn commit(&mut self) -> Result<()> {
        if self.phase != Phase::Active {
            return Err(self.lifecycle_error("commit"));
        }
        self.phase = Phase::Ended;
        let result = self.chain.notify(Notification::TransactionEnd);
        match &result {
            Ok(()) => tracing::debug!("Transaction committed"),
            Err(e) => tracing::warn!(error = %e, "Transaction end failed"),
        }
        result
    }

    /// End the transaction without delivering `TransactionEnd`
    pub fn rollback(&mut self) {
        if self.phase == Phase::Active {
            tracing::debug!("Transaction rolled back; buffered mutations discarded");
        }
        self.phase = Phase::Ended;
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn chain(&self) -> &MiddlewareChain<S> {
        &self.chain
    }

    fn lifecycle_error(&self, action: &str) -> EntityKvError {
        EntityKvError::Lifecycle(format!(
            "cannot {} a transaction in phase {:?}",
            action, self.phase
        ))
    }
}

impl<S: Store> Drop for TxContext<S> {
    fn drop(&mut self) {
        if self.phase == Phase::Active {
            tracing::warn!("Transaction context dropped before commit; buffered mutations discarded");
        }
    }
}

//! Resource slots of a binding.
//!
//! A binding has three slots. Each is either [`Unset`] or holds a resource:
//!
//! - [`Anchor`]: the existing row the request is scoped to, keyed from the path
//! - [`Write`]: the payload to insert or apply, bound from the JSON body
//! - [`Output`]: the engine and query that produce the response body
//!
//! Slot state lives in the type, so asking the dispatcher to execute a shape
//! whose required slot is empty does not compile.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use solon_extract::{ExtractionContext, ExtractionError, FromRequest, Json, Path, Query};

use crate::engine::{EngineError, StorageEngine};
use crate::query::{ListLimits, QueryParameters};

/// An empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unset;

/// The row a request is scoped to.
pub struct Anchor<E: StorageEngine> {
    pub(crate) engine: Arc<E>,
    pub(crate) key: Option<E::Key>,
    fixed: bool,
}

impl<E: StorageEngine> Anchor<E> {
    /// An anchor whose key is bound from path parameters.
    #[must_use]
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            key: None,
            fixed: false,
        }
    }

    /// An anchor whose key is supplied by endpoint setup; path binding is skipped.
    #[must_use]
    pub fn with_key(key: E::Key, engine: Arc<E>) -> Self {
        Self {
            engine,
            key: Some(key),
            fixed: true,
        }
    }

    /// Returns the anchor engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Returns the bound key.
    #[must_use]
    pub fn key(&self) -> Option<&E::Key> {
        self.key.as_ref()
    }
}

/// The payload of an insert or update.
pub struct Write<E: StorageEngine> {
    pub(crate) engine: Arc<E>,
    pub(crate) payload: Option<E::Payload>,
}

impl<E: StorageEngine> Write<E> {
    /// A write slot whose payload is bound from the request body.
    #[must_use]
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            payload: None,
        }
    }

    /// Returns the write engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Returns the bound payload.
    #[must_use]
    pub fn payload(&self) -> Option<&E::Payload> {
        self.payload.as_ref()
    }

    /// Returns the bound payload for in-place adjustments (e.g. stamping the
    /// caller's id) between bind and execute.
    pub fn payload_mut(&mut self) -> Option<&mut E::Payload> {
        self.payload.as_mut()
    }
}

/// The engine and query producing the response body.
pub struct Output<E: StorageEngine> {
    pub(crate) engine: Arc<E>,
    pub(crate) query: Option<E::Query>,
    fixed: bool,
}

impl<E: StorageEngine> Output<E> {
    /// An output whose query is bound from the query string.
    #[must_use]
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            query: None,
            fixed: false,
        }
    }

    /// An output with a query supplied by endpoint setup.
    #[must_use]
    pub fn with_query(engine: Arc<E>, query: E::Query) -> Self {
        Self {
            engine,
            query: Some(query),
            fixed: true,
        }
    }

    /// Returns the output engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Returns the bound query.
    #[must_use]
    pub fn query(&self) -> Option<&E::Query> {
        self.query.as_ref()
    }
}

impl<E: StorageEngine> fmt::Debug for Anchor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anchor")
            .field("bound", &self.key.is_some())
            .field("fixed", &self.fixed)
            .finish_non_exhaustive()
    }
}

impl<E: StorageEngine> fmt::Debug for Write<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Write")
            .field("bound", &self.payload.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: StorageEngine> fmt::Debug for Output<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("bound", &self.query.is_some())
            .field("fixed", &self.fixed)
            .finish_non_exhaustive()
    }
}

/// Anchor slot behavior shared by [`Unset`] and [`Anchor`].
pub trait AnchorSlot: Send + Sync {
    /// Returns true if an anchor is attached.
    fn is_set(&self) -> bool;

    /// Binds the anchor key from path parameters.
    fn bind_path(&mut self, ctx: &ExtractionContext) -> Result<(), ExtractionError>;

    /// Returns whether the anchored row exists. An empty slot always exists.
    fn exists(&self) -> impl Future<Output = Result<bool, EngineError>> + Send;
}

/// An anchor slot usable as a key of type `K`.
pub trait AnchorKey<K>: AnchorSlot {
    /// Returns the bound key, or `None` for an empty slot.
    fn key(&self) -> Option<&K>;
}

/// Write slot behavior shared by [`Unset`] and [`Write`].
pub trait WriteSlot: Send + Sync {
    /// Binds the payload from the JSON body, rejecting bodies over `limit` bytes.
    fn bind_body(&mut self, ctx: &ExtractionContext, limit: usize) -> Result<(), ExtractionError>;
}

/// Output slot behavior shared by [`Unset`] and [`Output`].
pub trait OutputSlot: Send + Sync {
    /// Binds and normalizes the query from the query string.
    fn bind_query(
        &mut self,
        ctx: &ExtractionContext,
        limits: &ListLimits,
    ) -> Result<(), ExtractionError>;
}

impl AnchorSlot for Unset {
    fn is_set(&self) -> bool {
        false
    }

    fn bind_path(&mut self, _ctx: &ExtractionContext) -> Result<(), ExtractionError> {
        Ok(())
    }

    async fn exists(&self) -> Result<bool, EngineError> {
        Ok(true)
    }
}

impl<K> AnchorKey<K> for Unset {
    fn key(&self) -> Option<&K> {
        None
    }
}

impl WriteSlot for Unset {
    fn bind_body(&mut self, _ctx: &ExtractionContext, _limit: usize) -> Result<(), ExtractionError> {
        Ok(())
    }
}

impl OutputSlot for Unset {
    fn bind_query(
        &mut self,
        _ctx: &ExtractionContext,
        _limits: &ListLimits,
    ) -> Result<(), ExtractionError> {
        Ok(())
    }
}

impl<E: StorageEngine> AnchorSlot for Anchor<E> {
    fn is_set(&self) -> bool {
        true
    }

    fn bind_path(&mut self, ctx: &ExtractionContext) -> Result<(), ExtractionError> {
        if self.fixed {
            return Ok(());
        }
        let Path(key) = Path::<E::Key>::from_request(ctx)?;
        self.key = Some(key);
        Ok(())
    }

    async fn exists(&self) -> Result<bool, EngineError> {
        match &self.key {
            Some(key) => self.engine.has(key).await,
            None => Ok(false),
        }
    }
}

impl<E: StorageEngine> AnchorKey<E::Key> for Anchor<E> {
    fn key(&self) -> Option<&E::Key> {
        self.key.as_ref()
    }
}

impl<E: StorageEngine> WriteSlot for Write<E> {
    fn bind_body(&mut self, ctx: &ExtractionContext, limit: usize) -> Result<(), ExtractionError> {
        let Json(payload) = Json::<E::Payload>::from_request_limited(ctx, limit)?;
        self.payload = Some(payload);
        Ok(())
    }
}

impl<E: StorageEngine> OutputSlot for Output<E> {
    fn bind_query(
        &mut self,
        ctx: &ExtractionContext,
        limits: &ListLimits,
    ) -> Result<(), ExtractionError> {
        if !self.fixed {
            let Query(query) = Query::<E::Query>::from_request(ctx)?;
            self.query = Some(query);
        }
        if let Some(query) = self.query.as_mut() {
            query.normalize(limits);
        }
        Ok(())
    }
}

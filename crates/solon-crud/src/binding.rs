//! Request-scoped binding of identity and resources.

use std::fmt;
use std::sync::Arc;

use solon_core::{Identity, RequestId, RoleKind};

use crate::engine::{EngineError, StorageEngine};
use crate::resource::{Anchor, Output, Unset, Write};

/// Lifecycle of a [`Binding`].
///
/// `Unbound -> Binding -> Bound -> Executing -> Succeeded | Failed`. A failed
/// bind jumps straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Created, inputs not yet bound.
    #[default]
    Unbound,
    /// Bind in progress.
    Binding,
    /// Inputs bound; ready to execute.
    Bound,
    /// Execute in progress.
    Executing,
    /// Execute completed successfully.
    Succeeded,
    /// Bind or execute failed.
    Failed,
}

impl Phase {
    /// Returns the lowercase phase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Binding => "binding",
            Self::Bound => "bound",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Identity and resources of one request.
///
/// Created per request for a fixed [`RoleKind`], given resources by endpoint
/// setup, filled in by a dispatcher bind call, then consumed by the matching
/// execute call.
///
/// # Example
///
/// ```rust,ignore
/// let binding = Binding::new(RoleKind::User)
///     .set_anchor(users.clone())
///     .set_output(rewards.clone());
/// ```
pub struct Binding<A = Unset, W = Unset, O = Unset> {
    pub(crate) role: RoleKind,
    pub(crate) identity: Identity,
    pub(crate) request_id: RequestId,
    pub(crate) phase: Phase,
    pub(crate) anchor: A,
    pub(crate) write: W,
    pub(crate) output: O,
}

impl Binding {
    /// Creates an empty binding for endpoints serving `role`.
    #[must_use]
    pub fn new(role: RoleKind) -> Self {
        Self {
            role,
            identity: Identity::None,
            request_id: RequestId::new(),
            phase: Phase::Unbound,
            anchor: Unset,
            write: Unset,
            output: Unset,
        }
    }
}

impl<A, W, O> Binding<A, W, O> {
    /// Uses `request_id` instead of a freshly generated one.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the endpoint's role kind.
    #[must_use]
    pub const fn role(&self) -> RoleKind {
        self.role
    }

    /// Returns the resolved identity (`Identity::None` before binding).
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the request id.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the anchor slot.
    #[must_use]
    pub const fn anchor(&self) -> &A {
        &self.anchor
    }

    /// Returns the write slot.
    #[must_use]
    pub const fn write(&self) -> &W {
        &self.write
    }

    /// Returns the write slot mutably.
    pub fn write_mut(&mut self) -> &mut W {
        &mut self.write
    }

    /// Returns the output slot.
    #[must_use]
    pub const fn output(&self) -> &O {
        &self.output
    }
}

impl<W, O> Binding<Unset, W, O> {
    /// Attaches an anchor whose key is bound from path parameters.
    #[must_use]
    pub fn set_anchor<E: StorageEngine>(self, engine: Arc<E>) -> Binding<Anchor<E>, W, O> {
        let (write, output) = (self.write, self.output);
        Binding {
            role: self.role,
            identity: self.identity,
            request_id: self.request_id,
            phase: self.phase,
            anchor: Anchor::new(engine),
            write,
            output,
        }
    }

    /// Attaches an anchor with a key fixed by endpoint setup.
    #[must_use]
    pub fn set_anchor_with<E: StorageEngine>(
        self,
        key: E::Key,
        engine: Arc<E>,
    ) -> Binding<Anchor<E>, W, O> {
        let (write, output) = (self.write, self.output);
        Binding {
            role: self.role,
            identity: self.identity,
            request_id: self.request_id,
            phase: self.phase,
            anchor: Anchor::with_key(key, engine),
            write,
            output,
        }
    }
}

impl<A, O> Binding<A, Unset, O> {
    /// Attaches a write slot whose payload is bound from the JSON body.
    #[must_use]
    pub fn set_write<E: StorageEngine>(self, engine: Arc<E>) -> Binding<A, Write<E>, O> {
        let (anchor, output) = (self.anchor, self.output);
        Binding {
            role: self.role,
            identity: self.identity,
            request_id: self.request_id,
            phase: self.phase,
            anchor,
            write: Write::new(engine),
            output,
        }
    }
}

impl<A, W> Binding<A, W, Unset> {
    /// Attaches an output slot whose query is bound from the query string.
    #[must_use]
    pub fn set_output<E: StorageEngine>(self, engine: Arc<E>) -> Binding<A, W, Output<E>> {
        let (anchor, write) = (self.anchor, self.write);
        Binding {
            role: self.role,
            identity: self.identity,
            request_id: self.request_id,
            phase: self.phase,
            anchor,
            write,
            output: Output::new(engine),
        }
    }

    /// Attaches an output slot with a query fixed by endpoint setup.
    #[must_use]
    pub fn set_output_with<E: StorageEngine>(
        self,
        engine: Arc<E>,
        query: E::Query,
    ) -> Binding<A, W, Output<E>> {
        let (anchor, write) = (self.anchor, self.write);
        Binding {
            role: self.role,
            identity: self.identity,
            request_id: self.request_id,
            phase: self.phase,
            anchor,
            write,
            output: Output::with_query(engine, query),
        }
    }
}

impl<E: StorageEngine, W, O> Binding<Anchor<E>, W, O> {
    /// Returns whether the anchored row exists.
    ///
    /// Useful for read-before-write checks in endpoint code between bind and
    /// execute.
    ///
    /// # Errors
    ///
    /// Returns the engine failure, or an `Other` error if no key is bound yet.
    pub async fn anchor_exists(&self) -> Result<bool, EngineError> {
        let key = self.anchor_key()?;
        self.anchor.engine.has(key).await
    }

    /// Fetches the anchored row.
    ///
    /// # Errors
    ///
    /// Returns the engine failure (`NoRows` if absent), or an `Other` error if
    /// no key is bound yet.
    pub async fn anchor_fetch_row(&self) -> Result<E::Row, EngineError> {
        let key = self.anchor_key()?;
        self.anchor.engine.fetch_row(key).await
    }

    fn anchor_key(&self) -> Result<&E::Key, EngineError> {
        self.anchor
            .key
            .as_ref()
            .ok_or_else(|| EngineError::other("anchor key not bound"))
    }
}

impl<A, W, O> fmt::Debug for Binding<A, W, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("role", &self.role)
            .field("identity", &self.identity.log_id())
            .field("request_id", &self.request_id)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//! CRUD dispatcher.
//!
//! Each shape runs in two calls. The bind call resolves the caller and binds
//! the request's path, body, and query into the binding's slots, in that
//! order, stopping at the first failure:
//!
//! | Step | Failure |
//! |---|---|
//! | identity | 401 |
//! | path -> anchor key | 404 |
//! | JSON body -> write payload | 400 |
//! | query string -> output query (list only) | 500 |
//!
//! The execute call consumes the bound binding, drives the storage engine,
//! and routes engine failures through the [`ErrorTranslator`].

use std::future::Future;
use std::time::Instant;

use bytes::Bytes;
use http::{HeaderValue, Response};
use solon_config::{DispatchConfig, SolonConfig};
use solon_core::{
    CrudError, CrudResult, ErrorCategory, Identity, IdentityConfig, RequestId, UpdatePolicy,
};
use solon_extract::ExtractionContext;
use solon_telemetry::metrics;
use tracing::{debug, error, info_span, warn, Instrument, Span};

use crate::binding::{Binding, Phase};
use crate::engine::{EngineErrorKind, StorageEngine};
use crate::operation::Operation;
use crate::query::ListLimits;
use crate::resource::{Anchor, AnchorKey, AnchorSlot, Output, OutputSlot, Unset, Write, WriteSlot};
use crate::response::CrudResponse;
use crate::translate::ErrorTranslator;

/// Header carrying the request id on rendered responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Runs bind and execute phases for the five CRUD shapes.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = Dispatcher::new(&config);
///
/// let mut binding = Binding::new(RoleKind::User).set_anchor(rewards.clone()).set_output(rewards);
/// dispatcher.bind_get(&mut binding, &ctx)?;
/// let response = dispatcher.get(binding).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    identity: IdentityConfig,
    translator: ErrorTranslator,
    update_policy: UpdatePolicy,
    limits: ListLimits,
    max_body_bytes: usize,
    expose_internal: bool,
}

impl Dispatcher {
    /// Creates a dispatcher from a loaded configuration.
    #[must_use]
    pub fn new(config: &SolonConfig) -> Self {
        Self::from_parts(
            config.identity.clone(),
            &config.dispatch,
            config.expose_internal_errors(),
        )
    }

    /// Creates a dispatcher from individual configuration sections.
    #[must_use]
    pub fn from_parts(
        identity: IdentityConfig,
        dispatch: &DispatchConfig,
        expose_internal: bool,
    ) -> Self {
        Self {
            identity,
            translator: ErrorTranslator::new(dispatch.foreign_key_policy),
            update_policy: dispatch.update_policy,
            limits: ListLimits::from(dispatch),
            max_body_bytes: dispatch.max_body_bytes,
            expose_internal,
        }
    }

    /// Returns the error translator.
    #[must_use]
    pub const fn translator(&self) -> &ErrorTranslator {
        &self.translator
    }

    /// Returns the update policy.
    #[must_use]
    pub const fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    /// Returns the list page-size limits.
    #[must_use]
    pub const fn limits(&self) -> &ListLimits {
        &self.limits
    }

    // ------------------------------------------------------------------
    // Bind
    // ------------------------------------------------------------------

    /// Binds an insert: identity, optional anchor key, payload.
    pub fn bind_insert<A, WE>(
        &self,
        binding: &mut Binding<A, Write<WE>, Unset>,
        ctx: &ExtractionContext,
    ) -> CrudResult<()>
    where
        A: AnchorSlot,
        WE: StorageEngine,
    {
        self.bind(Operation::Insert, binding, ctx)
    }

    /// Binds a list: identity, optional anchor key, query.
    pub fn bind_list<A, OE>(
        &self,
        binding: &mut Binding<A, Unset, Output<OE>>,
        ctx: &ExtractionContext,
    ) -> CrudResult<()>
    where
        A: AnchorKey<OE::Scope>,
        OE: StorageEngine,
    {
        self.bind(Operation::List, binding, ctx)
    }

    /// Binds a get: identity, anchor key.
    pub fn bind_get<AE, OE>(
        &self,
        binding: &mut Binding<Anchor<AE>, Unset, Output<OE>>,
        ctx: &ExtractionContext,
    ) -> CrudResult<()>
    where
        AE: StorageEngine,
        OE: StorageEngine<Key = AE::Key>,
    {
        self.bind(Operation::Get, binding, ctx)
    }

    /// Binds an update: identity, anchor key, payload.
    pub fn bind_update<AE, WE>(
        &self,
        binding: &mut Binding<Anchor<AE>, Write<WE>, Unset>,
        ctx: &ExtractionContext,
    ) -> CrudResult<()>
    where
        AE: StorageEngine,
        WE: StorageEngine<Key = AE::Key>,
    {
        self.bind(Operation::Update, binding, ctx)
    }

    /// Binds a delete: identity, anchor key.
    pub fn bind_delete<AE>(
        &self,
        binding: &mut Binding<Anchor<AE>, Unset, Unset>,
        ctx: &ExtractionContext,
    ) -> CrudResult<()>
    where
        AE: StorageEngine,
    {
        self.bind(Operation::Delete, binding, ctx)
    }

    fn bind<A, W, O>(
        &self,
        operation: Operation,
        binding: &mut Binding<A, W, O>,
        ctx: &ExtractionContext,
    ) -> CrudResult<()>
    where
        A: AnchorSlot,
        W: WriteSlot,
        O: OutputSlot,
    {
        let span = crud_span(operation, binding);
        let _entered = span.enter();

        if binding.phase != Phase::Unbound {
            return Err(CrudError::internal(format!(
                "cannot bind a binding in phase {}",
                binding.phase.as_str()
            )));
        }
        binding.phase = Phase::Binding;

        match self.bind_inputs(operation, binding, ctx) {
            Ok(()) => {
                binding.phase = Phase::Bound;
                debug!(identity = %binding.identity.log_id(), "request bound");
                Ok(())
            }
            Err((source, err)) => {
                binding.phase = Phase::Failed;
                metrics::record_bind_failure(operation.as_str(), source);
                debug!(source, error = %err, "bind rejected");
                Err(err)
            }
        }
    }

    fn bind_inputs<A, W, O>(
        &self,
        operation: Operation,
        binding: &mut Binding<A, W, O>,
        ctx: &ExtractionContext,
    ) -> Result<(), (&'static str, CrudError)>
    where
        A: AnchorSlot,
        W: WriteSlot,
        O: OutputSlot,
    {
        binding.identity = Identity::resolve(binding.role, ctx.headers(), &self.identity);
        if !binding.identity.is_legitimate() {
            return Err((
                "identity",
                CrudError::unauthorized(format!(
                    "missing or malformed {} identity",
                    binding.role
                )),
            ));
        }

        binding
            .anchor
            .bind_path(ctx)
            .map_err(|e| ("path", CrudError::not_found(e.to_string())))?;

        binding
            .write
            .bind_body(ctx, self.max_body_bytes)
            .map_err(|e| ("body", CrudError::bad_request(e.to_string())))?;

        if operation == Operation::List {
            binding
                .output
                .bind_query(ctx, &self.limits)
                .map_err(|e| ("query", CrudError::internal_with_source("invalid list query", e)))?;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Execute
    // ------------------------------------------------------------------

    /// Inserts the bound payload; 201 echoing the stored payload.
    ///
    /// With an anchor attached, the anchored row must exist first.
    pub async fn insert<A, WE>(
        &self,
        binding: Binding<A, Write<WE>, Unset>,
    ) -> CrudResult<CrudResponse>
    where
        A: AnchorSlot,
        WE: StorageEngine,
    {
        let operation = Operation::Insert;
        let span = crud_span(operation, &binding);
        self.observe(operation, async move {
            let binding = begin(binding)?;

            if binding.anchor.is_set() {
                let exists = binding
                    .anchor
                    .exists()
                    .await
                    .map_err(|e| self.translator.translate(operation, &e))?;
                if !exists {
                    return Err(CrudError::not_found("anchor row does not exist"));
                }
            }

            let Write { engine, payload } = binding.write;
            let mut payload = payload.ok_or_else(|| unbound("write payload"))?;
            engine
                .insert(&mut payload)
                .await
                .map_err(|e| self.translator.translate(operation, &e))?;

            CrudResponse::created(&payload)
        })
        .instrument(span)
        .await
    }

    /// Lists one page of rows; always 200, possibly empty.
    pub async fn list<A, OE>(&self, binding: Binding<A, Unset, Output<OE>>) -> CrudResult<CrudResponse>
    where
        A: AnchorKey<OE::Scope>,
        OE: StorageEngine,
    {
        let operation = Operation::List;
        let span = crud_span(operation, &binding);
        self.observe(operation, async move {
            let binding = begin(binding)?;

            let scope = binding.anchor.key();
            if binding.anchor.is_set() && scope.is_none() {
                return Err(unbound("anchor key"));
            }
            let query = binding
                .output
                .query
                .as_ref()
                .ok_or_else(|| unbound("output query"))?;

            let rows = match binding.output.engine.fetch_rows(scope, query).await {
                Ok(rows) => rows,
                Err(e) if e.kind() == EngineErrorKind::NoRows => Vec::new(),
                Err(e) => return Err(self.translator.translate(operation, &e)),
            };

            CrudResponse::ok(&rows)
        })
        .instrument(span)
        .await
    }

    /// Fetches the anchored row from the output engine; 404 when absent.
    pub async fn get<AE, OE>(
        &self,
        binding: Binding<Anchor<AE>, Unset, Output<OE>>,
    ) -> CrudResult<CrudResponse>
    where
        AE: StorageEngine,
        OE: StorageEngine<Key = AE::Key>,
    {
        let operation = Operation::Get;
        let span = crud_span(operation, &binding);
        self.observe(operation, async move {
            let binding = begin(binding)?;
            let key = binding.anchor.key().ok_or_else(|| unbound("anchor key"))?;

            let row = binding
                .output
                .engine
                .fetch_row(key)
                .await
                .map_err(|e| self.translator.translate(operation, &e))?;

            CrudResponse::ok(&row)
        })
        .instrument(span)
        .await
    }

    /// Applies the bound payload to the anchored row; 204.
    ///
    /// Zero affected rows follows the configured [`UpdatePolicy`].
    pub async fn update<AE, WE>(
        &self,
        binding: Binding<Anchor<AE>, Write<WE>, Unset>,
    ) -> CrudResult<CrudResponse>
    where
        AE: StorageEngine,
        WE: StorageEngine<Key = AE::Key>,
    {
        let operation = Operation::Update;
        let span = crud_span(operation, &binding);
        self.observe(operation, async move {
            let binding = begin(binding)?;
            let key = binding.anchor.key().ok_or_else(|| unbound("anchor key"))?;
            let payload = binding
                .write
                .payload
                .as_ref()
                .ok_or_else(|| unbound("write payload"))?;
            let translate = |e| self.translator.translate(operation, &e);

            match self.update_policy {
                UpdatePolicy::VerifyAnchor => {
                    if !binding.anchor.engine.has(key).await.map_err(translate)? {
                        return Err(CrudError::not_found("anchor row does not exist"));
                    }
                    binding
                        .write
                        .engine
                        .update(key, payload)
                        .await
                        .map_err(translate)?;
                }
                UpdatePolicy::RequireMatch => {
                    let affected = binding
                        .write
                        .engine
                        .update(key, payload)
                        .await
                        .map_err(translate)?;
                    if affected == 0 {
                        return Err(CrudError::not_found("update matched no rows"));
                    }
                }
            }

            Ok(CrudResponse::no_content())
        })
        .instrument(span)
        .await
    }

    /// Deletes the anchored row; 204, or 404 when nothing was deleted.
    pub async fn delete<AE>(
        &self,
        binding: Binding<Anchor<AE>, Unset, Unset>,
    ) -> CrudResult<CrudResponse>
    where
        AE: StorageEngine,
    {
        let operation = Operation::Delete;
        let span = crud_span(operation, &binding);
        self.observe(operation, async move {
            let binding = begin(binding)?;
            let key = binding.anchor.key().ok_or_else(|| unbound("anchor key"))?;

            let affected = binding
                .anchor
                .engine
                .delete(key)
                .await
                .map_err(|e| self.translator.translate(operation, &e))?;
            if affected == 0 {
                return Err(CrudError::not_found("delete matched no rows"));
            }

            Ok(CrudResponse::no_content())
        })
        .instrument(span)
        .await
    }

    // ------------------------------------------------------------------
    // Bind + execute + render
    // ------------------------------------------------------------------

    /// Binds and executes an insert, rendering either outcome.
    pub async fn handle_insert<A, WE>(
        &self,
        mut binding: Binding<A, Write<WE>, Unset>,
        ctx: &ExtractionContext,
    ) -> Response<Bytes>
    where
        A: AnchorSlot,
        WE: StorageEngine,
    {
        let request_id = binding.request_id();
        let result = match self.bind_insert(&mut binding, ctx) {
            Ok(()) => self.insert(binding).await,
            Err(err) => Err(err),
        };
        self.render(result, request_id)
    }

    /// Binds and executes a list, rendering either outcome.
    pub async fn handle_list<A, OE>(
        &self,
        mut binding: Binding<A, Unset, Output<OE>>,
        ctx: &ExtractionContext,
    ) -> Response<Bytes>
    where
        A: AnchorKey<OE::Scope>,
        OE: StorageEngine,
    {
        let request_id = binding.request_id();
        let result = match self.bind_list(&mut binding, ctx) {
            Ok(()) => self.list(binding).await,
            Err(err) => Err(err),
        };
        self.render(result, request_id)
    }

    /// Binds and executes a get, rendering either outcome.
    pub async fn handle_get<AE, OE>(
        &self,
        mut binding: Binding<Anchor<AE>, Unset, Output<OE>>,
        ctx: &ExtractionContext,
    ) -> Response<Bytes>
    where
        AE: StorageEngine,
        OE: StorageEngine<Key = AE::Key>,
    {
        let request_id = binding.request_id();
        let result = match self.bind_get(&mut binding, ctx) {
            Ok(()) => self.get(binding).await,
            Err(err) => Err(err),
        };
        self.render(result, request_id)
    }

    /// Binds and executes an update, rendering either outcome.
    pub async fn handle_update<AE, WE>(
        &self,
        mut binding: Binding<Anchor<AE>, Write<WE>, Unset>,
        ctx: &ExtractionContext,
    ) -> Response<Bytes>
    where
        AE: StorageEngine,
        WE: StorageEngine<Key = AE::Key>,
    {
        let request_id = binding.request_id();
        let result = match self.bind_update(&mut binding, ctx) {
            Ok(()) => self.update(binding).await,
            Err(err) => Err(err),
        };
        self.render(result, request_id)
    }

    /// Binds and executes a delete, rendering either outcome.
    pub async fn handle_delete<AE>(
        &self,
        mut binding: Binding<Anchor<AE>, Unset, Unset>,
        ctx: &ExtractionContext,
    ) -> Response<Bytes>
    where
        AE: StorageEngine,
    {
        let request_id = binding.request_id();
        let result = match self.bind_delete(&mut binding, ctx) {
            Ok(()) => self.delete(binding).await,
            Err(err) => Err(err),
        };
        self.render(result, request_id)
    }

    /// Renders an outcome as an HTTP response tagged with the request id.
    ///
    /// Internal error text is included only when the dispatcher was built for
    /// a non-production environment.
    #[must_use]
    pub fn render(&self, result: CrudResult<CrudResponse>, request_id: RequestId) -> Response<Bytes> {
        let request_id = request_id.to_string();
        let mut response = match result {
            Ok(response) => response.into_response(),
            Err(err) => err.into_response(Some(&request_id), self.expose_internal),
        };
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }

    async fn observe<F>(&self, operation: Operation, execute: F) -> CrudResult<CrudResponse>
    where
        F: Future<Output = CrudResult<CrudResponse>>,
    {
        let started = Instant::now();
        let result = execute.await;

        let status = match &result {
            Ok(response) => response.status(),
            Err(err) => err.status_code(),
        };
        metrics::record_operation(operation.as_str(), status.as_u16(), started.elapsed());

        match &result {
            Ok(_) => debug!(
                phase = Phase::Succeeded.as_str(),
                http.status_code = status.as_u16(),
                "operation completed"
            ),
            Err(err) => match err.category() {
                ErrorCategory::Internal => error!(
                    phase = Phase::Failed.as_str(),
                    http.status_code = status.as_u16(),
                    error.category = err.category().as_str(),
                    error = ?err,
                    "operation failed"
                ),
                ErrorCategory::Conflict => warn!(
                    phase = Phase::Failed.as_str(),
                    http.status_code = status.as_u16(),
                    error.category = err.category().as_str(),
                    error = %err,
                    "operation rejected"
                ),
                _ => debug!(
                    phase = Phase::Failed.as_str(),
                    http.status_code = status.as_u16(),
                    error.category = err.category().as_str(),
                    error = %err,
                    "operation rejected"
                ),
            },
        }

        result
    }
}

fn crud_span<A, W, O>(operation: Operation, binding: &Binding<A, W, O>) -> Span {
    info_span!(
        "crud",
        operation = operation.as_str(),
        role = binding.role.as_str(),
        request_id = %binding.request_id,
    )
}

// Only bound bindings may execute; the phase is advanced for the span's events.
fn begin<A, W, O>(mut binding: Binding<A, W, O>) -> CrudResult<Binding<A, W, O>> {
    if binding.phase != Phase::Bound {
        return Err(CrudError::internal(format!(
            "cannot execute a binding in phase {}",
            binding.phase.as_str()
        )));
    }
    binding.phase = Phase::Executing;
    Ok(binding)
}

fn unbound(slot: &str) -> CrudError {
    CrudError::internal(format!("{slot} not bound"))
}

// Resolver: a pure function from the request context to one handler argument

use std::fmt;
use std::sync::Arc;

use crate::bind::context::RequestContext;
use crate::core::errors::GatewayError;

type ResolveFn<T> = dyn Fn(&RequestContext) -> Result<T, GatewayError> + Send + Sync;

/// Produces one typed handler argument from the request.
///
/// Resolvers hold no state and must not depend on each other; a binder
/// runs them strictly left to right.
pub struct Resolver<T> {
    inner: Arc<ResolveFn<T>>,
}

impl<T> Resolver<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<T, GatewayError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub fn resolve(&self, ctx: &RequestContext) -> Result<T, GatewayError> {
        (self.inner)(ctx)
    }

    /// Transform the resolved value
    pub fn map<U, F>(self, f: F) -> Resolver<U>
    where
        T: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Resolver::new(move |ctx| self.resolve(ctx).map(&f))
    }
}

impl Resolver<()> {
    /// Fills an unused binder slot; always succeeds
    pub fn none() -> Self {
        Self::new(|_| Ok(()))
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

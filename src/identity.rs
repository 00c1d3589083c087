//! Carries verified claims through a request's [`Context`].

use std::sync::Arc;

use crate::context::Context;
use crate::models::jwt::Claims;

// Private key type: nothing outside this module can read or overwrite the entry.
struct ClaimsKey;

/// Returns a new context carrying `claims`; `ctx` itself is unchanged.
pub fn attach(ctx: &Context, claims: Arc<Claims>) -> Context {
    ctx.with_value::<ClaimsKey, _>(claims)
}

/// The claims attached to this context chain, if any.
///
/// `None` must be treated as "unauthenticated".
pub fn retrieve(ctx: &Context) -> Option<Arc<Claims>> {
    ctx.value::<ClaimsKey, Claims>()
}

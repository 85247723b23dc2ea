//! Request-time route guard.
//!
//! Runs before any handler on every request. Paths outside the guard's
//! matcher pass straight through; for the rest the `token` cookie is checked
//! for presence and [`decide`] picks between letting the request continue and
//! redirecting it.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::{
    models::GuardDecision,
    service::{decide, guard_applies},
    session::read_credential,
};

pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !guard_applies(&path) {
        return next.run(request).await;
    }

    match decide(&path, read_credential(&jar).is_some()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            debug!(%path, %target, "Route guard redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}

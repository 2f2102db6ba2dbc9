//! Shared-password gate in front of the report pages.
//!
//! This is a convenience gate, not authentication: the cookie carries the
//! password itself and nothing is signed.

use std::sync::Arc;

use axum::{
    Form,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::report::html::render_login;

pub const COOKIE_NAME: &str = "password-protected";
pub const WRONG_PASSWORD_MESSAGE: &str = "パスワードが正しくありません。";
pub const PASSWORD_UNSET_MESSAGE: &str = "エラー: アプリケーションのパスワードが設定されていません。";

/// Gate secret as carried in router state. `None` lets every request through.
#[derive(Clone, Debug, Default)]
pub struct GatePassword(pub Option<Arc<str>>);

impl GatePassword {
    pub fn new(password: Option<String>) -> Self {
        Self(password.map(Arc::from))
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_deref().is_some_and(|p| p == candidate)
    }
}

/// Paths that never require the cookie
pub fn is_bypassed(path: &str) -> bool {
    path.starts_with("/login") || path.starts_with("/api/") || path == "/health" || path.contains('.')
}

/// Value of a named cookie from the `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((k, v)) = pair.trim().split_once('=')
                && k == name
            {
                return Some(v);
            }
        }
    }
    None
}

/// Decoded gate cookie. The value is percent-encoded when issued so that
/// non-ASCII passwords and `;` survive the `Cookie` header.
pub fn cookie_password(headers: &HeaderMap) -> Option<String> {
    let raw = cookie_value(headers, COOKIE_NAME)?;
    urlencoding::decode(raw).ok().map(|v| v.into_owned())
}

/// `Set-Cookie` value carrying the password
pub fn session_cookie(password: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        COOKIE_NAME,
        urlencoding::encode(password)
    )
}

/// Middleware: redirect to `/login` unless the cookie carries the password.
pub async fn require_password(
    State(password): State<GatePassword>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = password.0.as_deref() else {
        return next.run(req).await;
    };
    if is_bypassed(req.uri().path()) {
        return next.run(req).await;
    }
    if cookie_password(req.headers()).as_deref() == Some(expected) {
        return next.run(req).await;
    }
    tracing::debug!(path = %req.uri().path(), "gate redirecting to login");
    Redirect::to("/login").into_response()
}

pub async fn login_page() -> Html<String> {
    Html(render_login(None))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

pub async fn login_submit(
    State(password): State<GatePassword>,
    Form(form): Form<LoginForm>,
) -> Response {
    if password.0.is_none() {
        return Html(render_login(Some(PASSWORD_UNSET_MESSAGE))).into_response();
    }
    if !password.matches(&form.password) {
        tracing::info!("login rejected");
        return Html(render_login(Some(WRONG_PASSWORD_MESSAGE))).into_response();
    }
    (
        [(header::SET_COOKIE, session_cookie(&form.password))],
        Redirect::to("/"),
    )
        .into_response()
}

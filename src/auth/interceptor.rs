// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication interceptor for Axum.
//!
//! Runs once for every inbound request before any handler. A request starts
//! unauthenticated; if it carries a valid bearer token whose subject resolves
//! to a principal, an [`AuthenticatedPrincipal`] is inserted into the request
//! extensions. The interceptor never rejects a request: route-level
//! extractors decide whether an anonymous request is acceptable.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/v1/users/me", get(get_current_user))
//!     .layer(axum::middleware::from_fn_with_state(
//!         authenticator.clone(),
//!         authenticate,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use super::claims::AuthenticatedPrincipal;
use super::error::AuthFailure;
use super::principal::PrincipalLookup;
use super::token_service::TokenService;
use crate::config::BearerMode;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves request headers to an authenticated principal.
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenService>,
    principals: Arc<dyn PrincipalLookup>,
    bearer_mode: BearerMode,
}

impl Authenticator {
    pub fn new(
        tokens: Arc<TokenService>,
        principals: Arc<dyn PrincipalLookup>,
        bearer_mode: BearerMode,
    ) -> Self {
        Self {
            tokens,
            principals,
            bearer_mode,
        }
    }

    /// Authenticate the request headers as of now.
    ///
    /// `Ok(None)` means no `Authorization` header was sent.
    pub async fn resolve(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<AuthenticatedPrincipal>, AuthFailure> {
        self.resolve_at(headers, Utc::now()).await
    }

    /// Authenticate the request headers as of `now`.
    pub async fn resolve_at(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthenticatedPrincipal>, AuthFailure> {
        let Some(token) = bearer_token(headers, self.bearer_mode)? else {
            return Ok(None);
        };

        let identity = self.tokens.verify_at(token, now)?;

        let principal = match self
            .principals
            .find_principal_by_identifier(&identity.subject)
            .await
        {
            Ok(Some(principal)) => principal,
            Ok(None) => return Err(AuthFailure::PrincipalNotFound),
            Err(e) => {
                tracing::warn!(error = %e, "Principal lookup failed");
                return Err(AuthFailure::PrincipalNotFound);
            }
        };

        Ok(Some(AuthenticatedPrincipal::new(principal, &identity)))
    }
}

/// Extract the token candidate from the `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent. In strict mode a value
/// without the `Bearer ` prefix is malformed; in permissive mode it is
/// passed through unchanged.
pub fn bearer_token(headers: &HeaderMap, mode: BearerMode) -> Result<Option<&str>, AuthFailure> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthFailure::Malformed)?;

    let token = match (strip_bearer_scheme(value), mode) {
        (Some(token), _) => token.trim(),
        (None, BearerMode::Permissive) => value.trim(),
        (None, BearerMode::Strict) => return Err(AuthFailure::Malformed),
    };

    if token.is_empty() {
        return Err(AuthFailure::Malformed);
    }
    Ok(Some(token))
}

/// The auth scheme name is case-insensitive.
fn strip_bearer_scheme(value: &str) -> Option<&str> {
    let (scheme, rest) = value.split_at_checked(BEARER_PREFIX.len())?;
    scheme.eq_ignore_ascii_case(BEARER_PREFIX).then_some(rest)
}

/// Authentication middleware function.
///
/// Always forwards the request; attaches the principal on success.
pub async fn authenticate(
    State(authenticator): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = authenticator.resolve(request.headers()).await;
    match outcome {
        Ok(Some(principal)) => {
            tracing::debug!(subject = %principal.login(), "Request authenticated");
            request.extensions_mut().insert(principal);
        }
        Ok(None) => {}
        Err(failure) => {
            tracing::debug!(
                reason = failure.kind(),
                path = %request.uri().path(),
                "Request continues unauthenticated"
            );
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderValue, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    use crate::auth::principal::{DirectoryError, Principal};
    use crate::auth::CurrentPrincipal;
    use crate::config::{TokenSecret, TokenSettings};

    /// Lookup backed by a fixed map that counts calls.
    #[derive(Default)]
    struct FixedLookup {
        principals: HashMap<String, Principal>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PrincipalLookup for FixedLookup {
        async fn find_principal_by_identifier(
            &self,
            subject: &str,
        ) -> Result<Option<Principal>, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.principals.get(subject).cloned())
        }
    }

    /// Lookup whose backing store is down.
    struct UnavailableLookup;

    #[async_trait]
    impl PrincipalLookup for UnavailableLookup {
        async fn find_principal_by_identifier(
            &self,
            _subject: &str,
        ) -> Result<Option<Principal>, DirectoryError> {
            Err(DirectoryError::Unavailable("store offline".to_string()))
        }
    }

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(&TokenSettings::new(
            TokenSecret::new("interceptor-secret").unwrap(),
        )))
    }

    fn alice() -> Principal {
        Principal::new("alice@example.com")
            .with_id(1)
            .with_capabilities(["ROLE_USER"])
    }

    fn setup(mode: BearerMode) -> (Authenticator, Arc<FixedLookup>, Arc<TokenService>) {
        let tokens = tokens();
        let lookup = Arc::new(FixedLookup {
            principals: HashMap::from([(alice().login.clone(), alice())]),
            calls: AtomicUsize::new(0),
        });
        let authenticator = Authenticator::new(tokens.clone(), lookup.clone(), mode);
        (authenticator, lookup, tokens)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parsing() {
        let strict = BearerMode::Strict;
        let permissive = BearerMode::Permissive;

        assert_eq!(bearer_token(&HeaderMap::new(), strict), Ok(None));
        assert_eq!(bearer_token(&headers_with("Bearer abc"), strict), Ok(Some("abc")));
        assert_eq!(
            bearer_token(&headers_with("abc"), strict),
            Err(AuthFailure::Malformed)
        );
        assert_eq!(bearer_token(&headers_with("bearer abc"), strict), Ok(Some("abc")));
        assert_eq!(bearer_token(&headers_with("BEARER abc"), strict), Ok(Some("abc")));
        assert_eq!(
            bearer_token(&headers_with("Bearerabc"), strict),
            Err(AuthFailure::Malformed)
        );
        assert_eq!(bearer_token(&headers_with("abc"), permissive), Ok(Some("abc")));
        assert_eq!(
            bearer_token(&headers_with("Bearer "), permissive),
            Err(AuthFailure::Malformed)
        );
        assert_eq!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz"), strict),
            Err(AuthFailure::Malformed)
        );
    }

    #[tokio::test]
    async fn missing_header_stays_unauthenticated_without_lookup() {
        let (authenticator, lookup, _) = setup(BearerMode::Strict);
        let result = authenticator.resolve(&HeaderMap::new()).await;

        assert_eq!(result, Ok(None));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_token_resolves_principal_with_one_lookup() {
        let (authenticator, lookup, tokens) = setup(BearerMode::Strict);
        let issued = tokens.issue(&alice()).unwrap();

        let resolved = authenticator
            .resolve(&headers_with(&format!("Bearer {}", issued.token)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.login(), "alice@example.com");
        assert!(resolved.has_capability("ROLE_USER"));
        assert_eq!(resolved.expires_at, issued.expires_at.timestamp());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_subject_is_principal_not_found() {
        let (authenticator, _, tokens) = setup(BearerMode::Strict);
        let issued = tokens.issue(&Principal::new("ghost@example.com")).unwrap();

        let result = authenticator
            .resolve(&headers_with(&format!("Bearer {}", issued.token)))
            .await;
        assert_eq!(result, Err(AuthFailure::PrincipalNotFound));
    }

    #[tokio::test]
    async fn invalid_token_skips_lookup() {
        let (authenticator, lookup, _) = setup(BearerMode::Strict);
        let result = authenticator.resolve(&headers_with("Bearer not.a.token")).await;

        assert!(result.is_err());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let (authenticator, _, tokens) = setup(BearerMode::Strict);
        let issued = tokens.issue(&alice()).unwrap();
        let later = issued.expires_at + chrono::Duration::seconds(1);

        let result = authenticator
            .resolve_at(&headers_with(&format!("Bearer {}", issued.token)), later)
            .await;
        assert_eq!(result, Err(AuthFailure::Expired));
    }

    #[tokio::test]
    async fn unprefixed_token_depends_on_mode() {
        let (strict, _, tokens) = setup(BearerMode::Strict);
        let issued = tokens.issue(&alice()).unwrap();
        let headers = headers_with(&issued.token);

        assert_eq!(strict.resolve(&headers).await, Err(AuthFailure::Malformed));

        let (permissive, _, _) = setup(BearerMode::Permissive);
        let resolved = permissive.resolve(&headers).await.unwrap().unwrap();
        assert_eq!(resolved.login(), "alice@example.com");
    }

    #[tokio::test]
    async fn lookup_error_leaves_request_unauthenticated() {
        let tokens = tokens();
        let authenticator =
            Authenticator::new(tokens.clone(), Arc::new(UnavailableLookup), BearerMode::Strict);
        let issued = tokens.issue(&alice()).unwrap();
        let header = format!("Bearer {}", issued.token);

        let result = authenticator.resolve(&headers_with(&header)).await;
        assert_eq!(result, Err(AuthFailure::PrincipalNotFound));

        let (status, body) = call(app(authenticator), Some(header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    async fn whoami(CurrentPrincipal(principal): CurrentPrincipal) -> String {
        match principal {
            Some(p) => format!("{}:{}", p.login(), p.capabilities().len()),
            None => "anonymous".to_string(),
        }
    }

    fn app(authenticator: Authenticator) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(authenticator, authenticate))
    }

    async fn call(app: Router, auth: Option<String>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn middleware_passes_anonymous_requests_through() {
        let (authenticator, _, _) = setup(BearerMode::Strict);
        let (status, body) = call(app(authenticator), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn middleware_passes_invalid_tokens_through_unauthenticated() {
        let (authenticator, _, _) = setup(BearerMode::Strict);
        let (status, body) =
            call(app(authenticator), Some("Bearer garbage".to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn middleware_attaches_principal_for_valid_token() {
        let (authenticator, _, tokens) = setup(BearerMode::Strict);
        let issued = tokens.issue(&alice()).unwrap();
        let (status, body) =
            call(app(authenticator), Some(format!("Bearer {}", issued.token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice@example.com:1");
    }
}

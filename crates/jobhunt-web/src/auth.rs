//! Session extractors, session cookies and password hashing.
//!
//! The signed `jobhunt_session` cookie carries the user id. Its signature is
//! the only thing that makes a request authenticated; there is no server-side
//! session table.

use std::convert::Infallible;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::request::Parts,
  response::Redirect,
};
use axum_extra::extract::{
  SignedCookieJar,
  cookie::{Cookie, Key, SameSite},
};
use jobhunt_core::{ids::UserId, store::TrackerStore};
use rand_core::OsRng;
use sha2::{Digest, Sha512};

use crate::{AppState, error::Error};

pub const SESSION_COOKIE: &str = "jobhunt_session";

/// Derive the cookie-signing key from the configured secret.
pub fn session_key(secret: &str) -> Key {
  Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Who is making this request, as far as the session cookie can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
  Authenticated(UserId),
  Anonymous,
}

impl Session {
  pub fn from_jar(jar: &SignedCookieJar) -> Self {
    jar
      .get(SESSION_COOKIE)
      .and_then(|cookie| cookie.value().parse().ok())
      .map_or(Session::Anonymous, Session::Authenticated)
  }
}

impl<S> FromRequestParts<AppState<S>> for Session
where
  S: TrackerStore + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar = SignedCookieJar::<Key>::from_request_parts(parts, state).await?;
    Ok(Session::from_jar(&jar))
  }
}

/// A logged-in user. Extracting it from an anonymous request redirects to the
/// landing page instead of running the handler.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: TrackerStore + 'static,
{
  type Rejection = Redirect;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let session = match Session::from_request_parts(parts, state).await {
      Ok(session) => session,
      Err(never) => match never {},
    };

    match session {
      Session::Authenticated(user) => Ok(CurrentUser(user)),
      Session::Anonymous => {
        tracing::debug!(path = %parts.uri.path(), "no session, redirecting");
        Err(Redirect::to("/"))
      }
    }
  }
}

// ─── Cookies ─────────────────────────────────────────────────────────────────

pub fn start_session(jar: SignedCookieJar, user: UserId) -> SignedCookieJar {
  jar.add(
    Cookie::build((SESSION_COOKIE, user.to_string()))
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax),
  )
}

pub fn end_session(jar: SignedCookieJar) -> SignedCookieJar {
  jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| Error::PasswordHash(e.to_string()))?
      .to_string(),
  )
}

/// Check a password against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
  PasswordHash::new(hash)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::{Request, StatusCode, header};
  use axum::response::IntoResponse;
  use jobhunt_store_sqlite::SqliteStore;

  use super::*;

  async fn make_state() -> AppState<SqliteStore> {
    AppState {
      store: Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      key:   session_key("test secret, not for production use"),
    }
  }

  /// A `Cookie` header carrying a session for `user`, signed with the
  /// state's key.
  fn session_header(state: &AppState<SqliteStore>, user: UserId) -> String {
    let jar = start_session(SignedCookieJar::new(state.key.clone()), user);
    let response = (jar, ()).into_response();
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
  }

  async fn extract<T>(
    state: &AppState<SqliteStore>,
    cookie: Option<&str>,
  ) -> Result<T, T::Rejection>
  where
    T: FromRequestParts<AppState<SqliteStore>>,
  {
    let mut builder = Request::builder().uri("/dashboard/jobs");
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    let (mut parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    T::from_request_parts(&mut parts, state).await
  }

  #[tokio::test]
  async fn signed_cookie_authenticates() {
    let state = make_state().await;
    let cookie = session_header(&state, UserId(7));

    let session = extract::<Session>(&state, Some(&cookie)).await.unwrap();
    assert_eq!(session, Session::Authenticated(UserId(7)));
    assert!(extract::<CurrentUser>(&state, Some(&cookie)).await.is_ok());
  }

  #[tokio::test]
  async fn missing_cookie_is_anonymous() {
    let state = make_state().await;
    let session = extract::<Session>(&state, None).await.unwrap();
    assert_eq!(session, Session::Anonymous);
  }

  #[tokio::test]
  async fn forged_cookie_is_anonymous() {
    let state = make_state().await;
    let forged = format!("{SESSION_COOKIE}=7");
    let session = extract::<Session>(&state, Some(&forged)).await.unwrap();
    assert_eq!(session, Session::Anonymous);
  }

  #[tokio::test]
  async fn anonymous_current_user_redirects_home() {
    let state = make_state().await;
    let rejection = extract::<CurrentUser>(&state, None).await.unwrap_err();
    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
  }

  #[test]
  fn password_roundtrip() {
    let hash = hash_password("hunter2").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("hunter2", &hash));
    assert!(!verify_password("hunter3", &hash));
    assert!(!verify_password("hunter2", "not a phc string"));
  }
}

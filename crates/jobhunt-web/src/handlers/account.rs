//! Landing page, registration, login and logout.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Landing page |
//! | `GET`/`POST` | `/register` | Duplicate email flashes an error |
//! | `GET`/`POST` | `/login` | Unknown email and bad password look the same |
//! | `GET`  | `/logout` | |
//! | `GET`  | `/dashboard` | Redirects by session |

use axum::{
  Form,
  extract::State,
  response::Response,
};
use axum_extra::extract::SignedCookieJar;
use jobhunt_core::{model::NewUser, store::TrackerStore};
use serde::Serialize;

use super::{flash_redirect, redirect, render};
use crate::{
  AppState,
  auth::{Session, end_session, hash_password, start_session, verify_password},
  error::{Error, store_err},
  flash::FlashLevel,
  forms::{LoginForm, RegisterForm, normalize_email, normalize_phone},
};

pub const EMAIL_TAKEN: &str =
  "A user is already registered under that email address.";
pub const REGISTERED: &str = "Thanks for registering! Please log in.";
pub const BAD_LOGIN: &str = "Invalid email or password.";
pub const WELCOME: &str = "May the job force be with you...";
pub const LOGGED_OUT: &str = "Logged out.";

#[derive(Debug, Serialize)]
pub struct Landing {
  pub logged_in: bool,
}

/// `GET /`
pub async fn landing(session: Session, jar: SignedCookieJar) -> Response {
  render(jar, Landing {
    logged_in: matches!(session, Session::Authenticated(_)),
  })
}

/// `GET /register` and `GET /login`
pub async fn blank_form(jar: SignedCookieJar) -> Response { render(jar, ()) }

/// `POST /register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  jar: SignedCookieJar,
  Form(form): Form<RegisterForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let input = NewUser {
    fname:         form.fname.trim().to_string(),
    lname:         form.lname.trim().to_string(),
    email:         normalize_email(&form.email),
    password_hash: hash_password(&form.password)?,
    phone:         normalize_phone(&form.phone),
  };

  match state.store.register_user(input).await.map_err(store_err) {
    Ok(_) => Ok(flash_redirect(jar, FlashLevel::Success, REGISTERED, "/login")),
    Err(Error::Conflict(_)) => {
      Ok(flash_redirect(jar, FlashLevel::Error, EMAIL_TAKEN, "/register"))
    }
    Err(e) => Err(e),
  }
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  jar: SignedCookieJar,
  Form(form): Form<LoginForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let user = state
    .store
    .find_user_by_email(normalize_email(&form.email))
    .await
    .map_err(store_err)?
    .filter(|user| verify_password(&form.password, &user.password_hash));

  let Some(user) = user else {
    tracing::info!("rejected login");
    return Ok(flash_redirect(jar, FlashLevel::Error, BAD_LOGIN, "/login"));
  };

  tracing::info!(user = %user.user_id, "logged in");
  let jar = start_session(jar, user.user_id);
  Ok(flash_redirect(jar, FlashLevel::Success, WELCOME, "/dashboard/jobs"))
}

/// `GET /logout`
pub async fn logout(jar: SignedCookieJar) -> Response {
  flash_redirect(end_session(jar), FlashLevel::Success, LOGGED_OUT, "/")
}

/// `GET /dashboard`
pub async fn dashboard(session: Session, jar: SignedCookieJar) -> Response {
  match session {
    Session::Authenticated(_) => redirect(jar, "/dashboard/jobs"),
    Session::Anonymous => redirect(jar, "/"),
  }
}

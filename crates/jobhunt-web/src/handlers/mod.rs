//! Route handlers, one module per dashboard section.
//!
//! GET handlers answer with a JSON [`Page`]: the view model for the page plus
//! any flash messages queued by the previous request. POST handlers redirect.

pub mod account;
pub mod companies;
pub mod contacts;
pub mod jobs;
pub mod profile;
pub mod todos;

use axum::{
  Json,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use serde::Serialize;

use crate::flash::{self, Flash, FlashLevel};

/// Body of every rendered page.
#[derive(Debug, Serialize)]
pub struct Page<T> {
  pub flash: Vec<Flash>,
  pub view:  T,
}

/// Render `view`, consuming the queued flash messages.
pub fn render<T: Serialize>(jar: SignedCookieJar, view: T) -> Response {
  let (jar, flash) = flash::take(jar);
  (jar, Json(Page { flash, view })).into_response()
}

pub fn redirect(jar: SignedCookieJar, to: &str) -> Response {
  (jar, Redirect::to(to)).into_response()
}

/// Queue a message and redirect; the message shows on the target page.
pub fn flash_redirect(
  jar: SignedCookieJar,
  level: FlashLevel,
  message: impl Into<String>,
  to: &str,
) -> Response {
  redirect(flash::push(jar, level, message), to)
}

//! `GET /dashboard/profile`

use axum::{
  extract::{Query, State},
  response::Response,
};
use axum_extra::extract::SignedCookieJar;
use jobhunt_core::{Error as CoreError, model::User, store::TrackerStore};
use serde::Serialize;

use super::render;
use crate::{
  AppState,
  auth::CurrentUser,
  error::{Error, store_err},
  forms::EditQuery,
};

#[derive(Debug, Serialize)]
pub struct Profile {
  pub user: User,
  pub edit: Option<String>,
}

pub async fn show<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Query(query): Query<EditQuery>,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  // A signed cookie can outlive its account if the database is reset.
  let user = state
    .store
    .get_user(user)
    .await
    .map_err(store_err)?
    .ok_or(CoreError::UserNotFound(user))?;

  Ok(render(jar, Profile {
    user,
    edit: query.edit,
  }))
}

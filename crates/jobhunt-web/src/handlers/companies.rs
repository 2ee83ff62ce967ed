//! Handlers for `/dashboard/companies`.

use axum::{
  Form,
  extract::{Path, Query, State},
  response::Response,
};
use axum_extra::extract::SignedCookieJar;
use jobhunt_core::{
  Error as CoreError,
  ids::CompanyId,
  model::{Company, CompanySummary, CompanyUpdate, Contact, Job},
  store::TrackerStore,
  view,
};
use serde::Serialize;

use super::{flash_redirect, render};
use crate::{
  AppState,
  auth::CurrentUser,
  error::{Error, store_err},
  flash::FlashLevel,
  forms::{CompanyForm, EditQuery, US_STATES, normalize_website, validate_state},
};

#[derive(Debug, Serialize)]
pub struct CompanyList {
  pub companies: Vec<CompanySummary>,
}

#[derive(Debug, Serialize)]
pub struct CompanyDetail {
  pub company:  Company,
  pub jobs:     Vec<Job>,
  pub contacts: Vec<Contact>,
  pub states:   &'static [&'static str],
  pub edit:     Option<String>,
}

/// `GET /dashboard/companies`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let companies = view::user_companies(state.store.as_ref(), user)
    .await
    .map_err(store_err)?;
  Ok(render(jar, CompanyList { companies }))
}

/// `GET /dashboard/companies/{id}[?edit=]`
pub async fn show<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_): CurrentUser,
  Path(id): Path<CompanyId>,
  Query(query): Query<EditQuery>,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let store = state.store.as_ref();
  let company = store
    .get_company(id)
    .await
    .map_err(store_err)?
    .ok_or(CoreError::CompanyNotFound(id))?;
  let jobs = store.company_jobs(id).await.map_err(store_err)?;
  let contacts = store.company_contacts(id).await.map_err(store_err)?;

  Ok(render(jar, CompanyDetail {
    company,
    jobs,
    contacts,
    states: US_STATES,
    edit: query.edit,
  }))
}

/// `POST /dashboard/companies/{id}`
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<CompanyId>,
  jar: SignedCookieJar,
  Form(form): Form<CompanyForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let update = CompanyUpdate {
    street:  form.street,
    city:    form.city,
    state:   validate_state(&form.state)?,
    zipcode: form.zipcode,
    website: normalize_website(&form.website),
    notes:   form.notes,
  };
  let company = state
    .store
    .update_company(id, update)
    .await
    .map_err(store_err)?;
  tracing::info!(%user, company = %id, "edited company");

  Ok(flash_redirect(
    jar,
    FlashLevel::Success,
    format!("Change made for {}", company.name),
    &format!("/dashboard/companies/{id}"),
  ))
}

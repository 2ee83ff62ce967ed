//! Handlers for `/dashboard/contacts` and `/dashboard/contact-status`.

use axum::{
  Form,
  extract::{Path, Query, State},
  response::Response,
};
use axum_extra::extract::SignedCookieJar;
use jobhunt_core::{
  Error as CoreError,
  codes::{CodeLabel, ContactCode},
  status,
  ids::ContactId,
  model::{Company, Contact, ContactEvent, ContactUpdate, NewContact},
  store::TrackerStore,
  view::{self, ContactCard},
};
use serde::Serialize;

use super::{flash_redirect, redirect, render};
use crate::{
  AppState,
  auth::CurrentUser,
  error::{Error, store_err},
  flash::FlashLevel,
  forms::{
    AddContactForm, ContactStatusForm, EditContactForm, EditQuery,
    company_choice, normalize_phone,
  },
};

#[derive(Debug, Serialize)]
pub struct ContactList {
  pub contacts: Vec<ContactCard>,
  pub codes:    Vec<CodeLabel>,
}

#[derive(Debug, Serialize)]
pub struct ContactDetail {
  pub contact:   Contact,
  pub company:   Company,
  /// The current user's interactions only, newest first.
  pub history:   Vec<ContactEvent>,
  pub current:   Option<ContactCode>,
  pub companies: Vec<Company>,
  pub codes:     Vec<CodeLabel>,
  pub edit:      Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddContactPage {
  pub companies: Vec<Company>,
  pub codes:     Vec<CodeLabel>,
}

fn contact_url(id: ContactId) -> String { format!("/dashboard/contacts/{id}") }

fn non_empty(value: String) -> Option<String> {
  Some(value).filter(|v| !v.trim().is_empty())
}

/// `GET /dashboard/contacts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let contacts = view::tracked_contacts(state.store.as_ref(), user)
    .await
    .map_err(store_err)?;
  Ok(render(jar, ContactList {
    contacts,
    codes: ContactCode::all(),
  }))
}

/// `GET /dashboard/contacts/{id}[?edit=]`
pub async fn show<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<ContactId>,
  Query(query): Query<EditQuery>,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let store = state.store.as_ref();
  let contact = store
    .get_contact(id)
    .await
    .map_err(store_err)?
    .ok_or(CoreError::ContactNotFound(id))?;
  let company = store
    .get_company(contact.company_id)
    .await
    .map_err(store_err)?
    .ok_or(CoreError::CompanyNotFound(contact.company_id))?;
  let history = store.contact_history(user, id).await.map_err(store_err)?;
  let companies = view::job_companies(store, user).await.map_err(store_err)?;
  let current = status::current_code(&history);

  Ok(render(jar, ContactDetail {
    contact,
    company,
    history,
    current,
    companies,
    codes: ContactCode::all(),
    edit: query.edit,
  }))
}

/// `POST /dashboard/contacts/{id}`
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<ContactId>,
  jar: SignedCookieJar,
  Form(form): Form<EditContactForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let update = ContactUpdate {
    fname:   form.fname.trim().to_string(),
    lname:   form.lname.trim().to_string(),
    email:   non_empty(form.email).map(|e| e.trim().to_string()),
    phone:   non_empty(form.phone).map(|p| normalize_phone(&p)),
    company: company_choice(&form.company_id, &form.company_name)?,
  };
  let contact = state
    .store
    .update_contact(id, update)
    .await
    .map_err(store_err)?;
  tracing::info!(%user, contact = %id, "edited contact");

  Ok(flash_redirect(
    jar,
    FlashLevel::Success,
    format!("Change made for {} {}", contact.fname, contact.lname),
    &contact_url(id),
  ))
}

/// `GET /dashboard/contacts/add`
pub async fn add_form<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let companies = view::job_companies(state.store.as_ref(), user)
    .await
    .map_err(store_err)?;
  Ok(render(jar, AddContactPage {
    companies,
    codes: ContactCode::all(),
  }))
}

/// `POST /dashboard/contacts/add`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
  Form(form): Form<AddContactForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let input = NewContact {
    fname:   form.fname.trim().to_string(),
    lname:   form.lname.trim().to_string(),
    email:   form.email.trim().to_string(),
    phone:   normalize_phone(&form.phone),
    notes:   form.notes,
    company: company_choice(&form.company_id, &form.company_name)?,
    code:    ContactCode::new(form.contact_event)?,
  };
  let (contact, _) = state
    .store
    .add_contact(user, input)
    .await
    .map_err(store_err)?;

  Ok(flash_redirect(
    jar,
    FlashLevel::Success,
    format!("{} {} added to your contacts", contact.fname, contact.lname),
    "/dashboard/contacts",
  ))
}

/// `POST /dashboard/contact-status`
pub async fn record_event<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
  Form(form): Form<ContactStatusForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let code = ContactCode::new(form.contact_code)?;
  state
    .store
    .record_contact_event(user, form.contact_id, code)
    .await
    .map_err(store_err)?;

  Ok(redirect(jar, &contact_url(form.contact_id)))
}

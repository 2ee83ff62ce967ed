//! Form bodies posted by the dashboard pages, and the normalisation applied to
//! their fields before they reach the store.

use jobhunt_core::{
  ids::{CompanyId, ContactId, JobId, ToDoId},
  model::CompanyChoice,
};
use serde::Deserialize;

use crate::error::Error;

/// State codes accepted on the company form. The empty entry stands for "not
/// set".
pub const US_STATES: &[&str] = &[
  "", "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI",
  "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS",
  "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR",
  "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",
];

// ─── Account ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
  pub fname:    String,
  pub lname:    String,
  pub email:    String,
  pub password: String,
  #[serde(default)]
  pub phone:    String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
  pub email:    String,
  pub password: String,
}

/// `?edit=` toggle on detail pages.
#[derive(Debug, Default, Deserialize)]
pub struct EditQuery {
  pub edit: Option<String>,
}

// ─── Jobs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddJobForm {
  pub job_title:    String,
  pub job_status:   u8,
  #[serde(default)]
  pub job_link:     String,
  #[serde(default)]
  pub job_notes:    String,
  #[serde(default)]
  pub company_id:   String,
  #[serde(default)]
  pub company_name: String,
}

#[derive(Debug, Deserialize)]
pub struct JobStatusForm {
  pub job_id:   JobId,
  pub job_code: u8,
}

#[derive(Debug, Deserialize)]
pub struct EditJobForm {
  #[serde(default)]
  pub link:       String,
  #[serde(default)]
  pub avg_salary: String,
  #[serde(default)]
  pub notes:      String,
}

#[derive(Debug, Deserialize)]
pub struct SalaryForm {
  pub metro:     String,
  pub job_title: String,
  pub job_id:    JobId,
}

// ─── Companies ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompanyForm {
  #[serde(default)]
  pub street:  String,
  #[serde(default)]
  pub city:    String,
  #[serde(default)]
  pub state:   String,
  #[serde(default)]
  pub zipcode: String,
  #[serde(default)]
  pub notes:   String,
  #[serde(default)]
  pub website: String,
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddContactForm {
  pub fname:         String,
  pub lname:         String,
  #[serde(default)]
  pub email:         String,
  #[serde(default)]
  pub phone:         String,
  #[serde(default)]
  pub notes:         String,
  #[serde(default)]
  pub company_id:    String,
  #[serde(default)]
  pub company_name:  String,
  pub contact_event: u8,
}

#[derive(Debug, Deserialize)]
pub struct EditContactForm {
  pub fname:        String,
  pub lname:        String,
  #[serde(default)]
  pub email:        String,
  #[serde(default)]
  pub phone:        String,
  #[serde(default)]
  pub company_id:   String,
  #[serde(default)]
  pub company_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactStatusForm {
  pub contact_id:   ContactId,
  pub contact_code: u8,
}

// ─── To-dos ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddToDoForm {
  pub description: String,
  #[serde(default)]
  pub job_id:      String,
  pub todo_code:   u8,
}

#[derive(Debug, Deserialize)]
pub struct ToDoStatusForm {
  pub todo_id:   ToDoId,
  pub todo_code: u8,
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Links without a scheme get `http://` prepended. An empty link stays empty.
pub fn normalize_link(link: &str) -> String {
  let link = link.trim();
  if link.is_empty() || link.starts_with("http") {
    link.to_string()
  } else {
    format!("http://{link}")
  }
}

/// Like [`normalize_link`], but an empty website is no website.
pub fn normalize_website(website: &str) -> Option<String> {
  Some(normalize_link(website)).filter(|w| !w.is_empty())
}

pub fn normalize_phone(phone: &str) -> String {
  phone.trim().replace('-', "")
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

/// An existing company id wins over a new name; neither is a bad request.
pub fn company_choice(id: &str, name: &str) -> Result<CompanyChoice, Error> {
  let (id, name) = (id.trim(), name.trim());
  if !id.is_empty() {
    return id
      .parse::<CompanyId>()
      .map(CompanyChoice::Existing)
      .map_err(|_| Error::BadRequest(format!("invalid company id: {id}")));
  }
  if !name.is_empty() {
    return Ok(CompanyChoice::New(name.to_string()));
  }
  Err(Error::BadRequest(
    "choose an existing company or name a new one".into(),
  ))
}

/// An empty salary field clears the salary; anything else must be a whole
/// number.
pub fn optional_salary(raw: &str) -> Result<Option<i64>, Error> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(None);
  }
  raw
    .parse()
    .map(Some)
    .map_err(|_| Error::BadRequest(format!("invalid salary: {raw}")))
}

/// An empty job field means the to-do is not tied to a job.
pub fn optional_job(raw: &str) -> Result<Option<JobId>, Error> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(None);
  }
  raw
    .parse()
    .map(Some)
    .map_err(|_| Error::BadRequest(format!("invalid job id: {raw}")))
}

pub fn validate_state(state: &str) -> Result<String, Error> {
  let state = state.trim().to_uppercase();
  if US_STATES.contains(&state.as_str()) {
    Ok(state)
  } else {
    Err(Error::BadRequest(format!("unknown state code: {state}")))
  }
}

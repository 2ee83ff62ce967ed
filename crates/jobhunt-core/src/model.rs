//! Entity types (users, companies, jobs, contacts, to-dos) and their
//! append-only event records.
//!
//! Entities hold descriptive fields only. Anything that changes over time
//! (pipeline stage, interactions) is recorded as an event row and reduced on
//! read; see [`crate::status`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  codes::{ContactCode, JobCode, ToDoCode},
  ids::{
    CompanyId, ContactEventId, ContactId, JobEventId, JobId, SalaryId,
    ToDoEventId, ToDoId, UserId,
  },
};

// ─── Users ───────────────────────────────────────────────────────────────────

/// A registered account. `password_hash` is an argon2 PHC string and is never
/// serialised into a page.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub user_id:       UserId,
  pub fname:         String,
  pub lname:         String,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub phone:         String,
}

/// Input to [`crate::store::TrackerStore::register_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub fname:         String,
  pub lname:         String,
  pub email:         String,
  pub password_hash: String,
  pub phone:         String,
}

// ─── Companies ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
  pub company_id: CompanyId,
  pub name:       String,
  pub street:     String,
  pub city:       String,
  pub state:      String,
  pub zipcode:    String,
  pub website:    Option<String>,
  pub notes:      String,
}

/// Which company a job or contact belongs to, as chosen on a form: either a
/// row that already exists or a new one to be created by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyChoice {
  Existing(CompanyId),
  New(String),
}

/// Editable address and note fields of a company.
#[derive(Debug, Clone, Default)]
pub struct CompanyUpdate {
  pub street:  String,
  pub city:    String,
  pub state:   String,
  pub zipcode: String,
  pub website: Option<String>,
  pub notes:   String,
}

/// A company together with how many jobs are filed under it.
#[derive(Debug, Clone, Serialize)]
pub struct CompanySummary {
  pub company:   Company,
  pub job_count: u32,
}

// ─── Jobs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Job {
  pub job_id:        JobId,
  pub company_id:    CompanyId,
  pub title:         String,
  pub link:          String,
  pub notes:         String,
  pub avg_salary:    Option<i64>,
  /// Cached copy of "the latest event for this job is not terminal";
  /// maintained by the store whenever an event is recorded.
  pub active_status: bool,
}

/// Input to [`crate::store::TrackerStore::add_job`]. The initial status is
/// recorded as the job's first event.
#[derive(Debug, Clone)]
pub struct NewJob {
  pub title:   String,
  pub link:    String,
  pub notes:   String,
  pub company: CompanyChoice,
  pub code:    JobCode,
}

#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
  pub link:       String,
  pub avg_salary: Option<i64>,
  pub notes:      String,
}

/// "User U marked job J as status C at time T."
#[derive(Debug, Clone, Serialize)]
pub struct JobEvent {
  pub job_event_id: JobEventId,
  pub user_id:      UserId,
  pub job_id:       JobId,
  pub job_code:     JobCode,
  pub date_created: DateTime<Utc>,
}

/// A job event joined with the job and company it refers to.
#[derive(Debug, Clone, Serialize)]
pub struct JobEventRow {
  pub event:   JobEvent,
  pub job:     Job,
  pub company: Company,
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Contact {
  pub contact_id: ContactId,
  pub company_id: CompanyId,
  pub fname:      String,
  pub lname:      String,
  pub email:      String,
  pub phone:      String,
  pub notes:      String,
}

#[derive(Debug, Clone)]
pub struct NewContact {
  pub fname:   String,
  pub lname:   String,
  pub email:   String,
  pub phone:   String,
  pub notes:   String,
  pub company: CompanyChoice,
  pub code:    ContactCode,
}

/// Contact edit. `None` for email or phone keeps the stored value.
#[derive(Debug, Clone)]
pub struct ContactUpdate {
  pub fname:   String,
  pub lname:   String,
  pub email:   Option<String>,
  pub phone:   Option<String>,
  pub company: CompanyChoice,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactEvent {
  pub contact_event_id: ContactEventId,
  pub user_id:          UserId,
  pub contact_id:       ContactId,
  pub contact_code:     ContactCode,
  pub date_created:     DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactEventRow {
  pub event:   ContactEvent,
  pub contact: Contact,
  pub company: Company,
}

// ─── To-dos ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ToDo {
  pub todo_id:     ToDoId,
  pub description: String,
  /// The job this task relates to, if any.
  pub job_id:      Option<JobId>,
}

#[derive(Debug, Clone)]
pub struct NewToDo {
  pub description: String,
  pub job_id:      Option<JobId>,
  pub code:        ToDoCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToDoEvent {
  pub todo_event_id: ToDoEventId,
  pub user_id:       UserId,
  pub todo_id:       ToDoId,
  pub todo_code:     ToDoCode,
  pub date_created:  DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToDoEventRow {
  pub event: ToDoEvent,
  pub todo:  ToDo,
}

// ─── Salary reference ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Salary {
  pub salary_id:  SalaryId,
  pub metro:      String,
  pub job_title:  String,
  pub avg_salary: i64,
}

/// One row of a salary seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSalary {
  pub metro:      String,
  pub job_title:  String,
  pub avg_salary: i64,
}

/// Distinct lookup keys offered when a job has no average salary yet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SalaryOptions {
  pub metros:     Vec<String>,
  pub job_titles: Vec<String>,
}

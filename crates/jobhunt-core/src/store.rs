//! The `TrackerStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `jobhunt-store-sqlite`).
//! The web layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  codes::{ContactCode, JobCode, ToDoCode},
  ids::{CompanyId, ContactId, JobId, ToDoId, UserId},
  model::{
    Company, CompanyUpdate, Contact, ContactEvent,
    ContactEventRow, ContactUpdate, Job, JobEvent, JobEventRow, JobUpdate,
    NewContact, NewJob, NewSalary, NewToDo, NewUser, Salary, SalaryOptions,
    ToDo, ToDoEvent, ToDoEventRow, User,
  },
};

/// Abstraction over a jobhunt storage backend.
///
/// Event tables are append-only: nothing here updates or deletes an event.
/// Writes that touch more than one row (a job plus its first event, an event
/// plus the job's cached `active_status`) are atomic.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TrackerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create an account. Fails with [`crate::Error::EmailTaken`] if the email
  /// is already registered; no row is written in that case.
  fn register_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Companies ─────────────────────────────────────────────────────────

  fn get_company(
    &self,
    id: CompanyId,
  ) -> impl Future<Output = Result<Option<Company>, Self::Error>> + Send + '_;

  fn update_company(
    &self,
    id: CompanyId,
    update: CompanyUpdate,
  ) -> impl Future<Output = Result<Company, Self::Error>> + Send + '_;

  /// Number of jobs filed under each of `ids`; companies with none are
  /// reported as zero.
  fn job_counts(
    &self,
    ids: Vec<CompanyId>,
  ) -> impl Future<Output = Result<Vec<(CompanyId, u32)>, Self::Error>> + Send + '_;

  fn company_jobs(
    &self,
    id: CompanyId,
  ) -> impl Future<Output = Result<Vec<Job>, Self::Error>> + Send + '_;

  fn company_contacts(
    &self,
    id: CompanyId,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  // ── Jobs ──────────────────────────────────────────────────────────────

  /// Create a job (and its company, if new) together with its first event.
  fn add_job(
    &self,
    user: UserId,
    input: NewJob,
  ) -> impl Future<Output = Result<(Job, JobEvent), Self::Error>> + Send + '_;

  fn get_job(
    &self,
    id: JobId,
  ) -> impl Future<Output = Result<Option<Job>, Self::Error>> + Send + '_;

  fn update_job(
    &self,
    id: JobId,
    update: JobUpdate,
  ) -> impl Future<Output = Result<Job, Self::Error>> + Send + '_;

  /// Set only the average salary; other job fields are untouched.
  fn set_job_salary(
    &self,
    id: JobId,
    avg_salary: i64,
  ) -> impl Future<Output = Result<Job, Self::Error>> + Send + '_;

  /// Append a status event in one transaction. A code past the archive
  /// threshold clears the job's `active_status`; nothing ever sets it back.
  fn record_job_event(
    &self,
    user: UserId,
    job: JobId,
    code: JobCode,
  ) -> impl Future<Output = Result<JobEvent, Self::Error>> + Send + '_;

  /// Every job event the user has recorded, joined with job and company.
  fn job_events_for_user(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Vec<JobEventRow>, Self::Error>> + Send + '_;

  /// The user's events for one job, newest first.
  fn job_history(
    &self,
    user: UserId,
    job: JobId,
  ) -> impl Future<Output = Result<Vec<JobEvent>, Self::Error>> + Send + '_;

  // ── Salary reference ──────────────────────────────────────────────────

  fn add_salaries(
    &self,
    rows: Vec<NewSalary>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn salary_options(
    &self,
  ) -> impl Future<Output = Result<SalaryOptions, Self::Error>> + Send + '_;

  fn find_salary(
    &self,
    metro: String,
    job_title: String,
  ) -> impl Future<Output = Result<Option<Salary>, Self::Error>> + Send + '_;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Create a contact (and its company, if new) with its first event.
  fn add_contact(
    &self,
    user: UserId,
    input: NewContact,
  ) -> impl Future<Output = Result<(Contact, ContactEvent), Self::Error>> + Send + '_;

  fn get_contact(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  fn update_contact(
    &self,
    id: ContactId,
    update: ContactUpdate,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  fn record_contact_event(
    &self,
    user: UserId,
    contact: ContactId,
    code: ContactCode,
  ) -> impl Future<Output = Result<ContactEvent, Self::Error>> + Send + '_;

  fn contact_events_for_user(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Vec<ContactEventRow>, Self::Error>> + Send + '_;

  /// The user's interactions with one contact, newest first.
  fn contact_history(
    &self,
    user: UserId,
    contact: ContactId,
  ) -> impl Future<Output = Result<Vec<ContactEvent>, Self::Error>> + Send + '_;

  // ── To-dos ────────────────────────────────────────────────────────────

  fn add_todo(
    &self,
    user: UserId,
    input: NewToDo,
  ) -> impl Future<Output = Result<(ToDo, ToDoEvent), Self::Error>> + Send + '_;

  fn record_todo_event(
    &self,
    user: UserId,
    todo: ToDoId,
    code: ToDoCode,
  ) -> impl Future<Output = Result<ToDoEvent, Self::Error>> + Send + '_;

  fn todo_events_for_user(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Vec<ToDoEventRow>, Self::Error>> + Send + '_;
}

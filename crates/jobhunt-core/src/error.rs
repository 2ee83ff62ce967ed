//! Error types for `jobhunt-core`.

use thiserror::Error;

use crate::ids::{CompanyId, ContactId, JobId, ToDoId, UserId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("company not found: {0}")]
  CompanyNotFound(CompanyId),

  #[error("job not found: {0}")]
  JobNotFound(JobId),

  #[error("contact not found: {0}")]
  ContactNotFound(ContactId),

  #[error("to-do not found: {0}")]
  ToDoNotFound(ToDoId),

  #[error("no salary on record for {job_title:?} in {metro:?}")]
  SalaryNotFound { metro: String, job_title: String },

  #[error("a user is already registered under {0:?}")]
  EmailTaken(String),

  #[error("unknown {table} code: {code}")]
  UnknownCode { table: &'static str, code: u8 },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Encoding and decoding helpers between domain types and SQLite rows.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that `ORDER BY date_created` sorts chronologically. Status
//! codes are stored as plain integers and re-validated against the core code
//! tables on the way out.

use chrono::{DateTime, SecondsFormat, Utc};
use jobhunt_core::{
  codes::{ContactCode, JobCode, ToDoCode},
  ids::{
    CompanyId, ContactEventId, ContactId, JobEventId, JobId, SalaryId,
    ToDoEventId, ToDoId, UserId,
  },
  model::{
    Company, Contact, ContactEvent, ContactEventRow, Job, JobEvent, JobEventRow,
    Salary, ToDo, ToDoEvent, ToDoEventRow, User,
  },
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Column lists ────────────────────────────────────────────────────────────

// Each list is paired with a `*_at` reader below that takes the offset of
// its first column.

pub const USER_COLS: &str = "u.user_id, u.fname, u.lname, u.email, u.password_hash, u.phone";

pub const COMPANY_COLS: &str =
  "c.company_id, c.name, c.street, c.city, c.state, c.zipcode, c.website, c.notes";

pub const JOB_COLS: &str =
  "j.job_id, j.company_id, j.title, j.link, j.notes, j.avg_salary, j.active_status";
pub const JOB_WIDTH: usize = 7;

pub const CONTACT_COLS: &str =
  "k.contact_id, k.company_id, k.fname, k.lname, k.email, k.phone, k.notes";
pub const CONTACT_WIDTH: usize = 7;

pub const TODO_COLS: &str = "t.todo_id, t.description, t.job_id";

pub const SALARY_COLS: &str = "s.salary_id, s.metro, s.job_title, s.avg_salary";

// ─── Plain rows ──────────────────────────────────────────────────────────────

pub fn user_at(row: &Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    user_id:       UserId(row.get(0)?),
    fname:         row.get(1)?,
    lname:         row.get(2)?,
    email:         row.get(3)?,
    password_hash: row.get(4)?,
    phone:         row.get(5)?,
  })
}

pub fn company_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Company> {
  Ok(Company {
    company_id: CompanyId(row.get(at)?),
    name:       row.get(at + 1)?,
    street:     row.get(at + 2)?,
    city:       row.get(at + 3)?,
    state:      row.get(at + 4)?,
    zipcode:    row.get(at + 5)?,
    website:    row.get(at + 6)?,
    notes:      row.get(at + 7)?,
  })
}

pub fn job_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Job> {
  Ok(Job {
    job_id:        JobId(row.get(at)?),
    company_id:    CompanyId(row.get(at + 1)?),
    title:         row.get(at + 2)?,
    link:          row.get(at + 3)?,
    notes:         row.get(at + 4)?,
    avg_salary:    row.get(at + 5)?,
    active_status: row.get(at + 6)?,
  })
}

pub fn contact_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Contact> {
  Ok(Contact {
    contact_id: ContactId(row.get(at)?),
    company_id: CompanyId(row.get(at + 1)?),
    fname:      row.get(at + 2)?,
    lname:      row.get(at + 3)?,
    email:      row.get(at + 4)?,
    phone:      row.get(at + 5)?,
    notes:      row.get(at + 6)?,
  })
}

pub fn todo_at(row: &Row<'_>, at: usize) -> rusqlite::Result<ToDo> {
  Ok(ToDo {
    todo_id:     ToDoId(row.get(at)?),
    description: row.get(at + 1)?,
    job_id:      row.get::<_, Option<i64>>(at + 2)?.map(JobId),
  })
}

pub fn salary_at(row: &Row<'_>) -> rusqlite::Result<Salary> {
  Ok(Salary {
    salary_id:  SalaryId(row.get(0)?),
    metro:      row.get(1)?,
    job_title:  row.get(2)?,
    avg_salary: row.get(3)?,
  })
}

// ─── Event rows ──────────────────────────────────────────────────────────────

/// The five columns every event table shares, before decoding:
/// `(id, user_id, target_id, code, date_created)`.
pub struct RawEvent {
  pub id:           i64,
  pub user_id:      i64,
  pub target_id:    i64,
  pub code:         u8,
  pub date_created: String,
}

pub const EVENT_WIDTH: usize = 5;

pub fn raw_event_at(row: &Row<'_>, at: usize) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    id:           row.get(at)?,
    user_id:      row.get(at + 1)?,
    target_id:    row.get(at + 2)?,
    code:         row.get(at + 3)?,
    date_created: row.get(at + 4)?,
  })
}

impl RawEvent {
  pub fn into_job_event(self) -> Result<JobEvent> {
    Ok(JobEvent {
      job_event_id: JobEventId(self.id),
      user_id:      UserId(self.user_id),
      job_id:       JobId(self.target_id),
      job_code:     JobCode::new(self.code)?,
      date_created: decode_dt(&self.date_created)?,
    })
  }

  pub fn into_contact_event(self) -> Result<ContactEvent> {
    Ok(ContactEvent {
      contact_event_id: ContactEventId(self.id),
      user_id:          UserId(self.user_id),
      contact_id:       ContactId(self.target_id),
      contact_code:     ContactCode::new(self.code)?,
      date_created:     decode_dt(&self.date_created)?,
    })
  }

  pub fn into_todo_event(self) -> Result<ToDoEvent> {
    Ok(ToDoEvent {
      todo_event_id: ToDoEventId(self.id),
      user_id:       UserId(self.user_id),
      todo_id:       ToDoId(self.target_id),
      todo_code:     ToDoCode::new(self.code)?,
      date_created:  decode_dt(&self.date_created)?,
    })
  }
}

/// A `job_events` row joined with its job and company.
pub struct RawJobEventRow {
  pub event:   RawEvent,
  pub job:     Job,
  pub company: Company,
}

impl RawJobEventRow {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event:   raw_event_at(row, 0)?,
      job:     job_at(row, EVENT_WIDTH)?,
      company: company_at(row, EVENT_WIDTH + JOB_WIDTH)?,
    })
  }

  pub fn into_row(self) -> Result<JobEventRow> {
    Ok(JobEventRow {
      event:   self.event.into_job_event()?,
      job:     self.job,
      company: self.company,
    })
  }
}

pub struct RawContactEventRow {
  pub event:   RawEvent,
  pub contact: Contact,
  pub company: Company,
}

impl RawContactEventRow {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event:   raw_event_at(row, 0)?,
      contact: contact_at(row, EVENT_WIDTH)?,
      company: company_at(row, EVENT_WIDTH + CONTACT_WIDTH)?,
    })
  }

  pub fn into_row(self) -> Result<ContactEventRow> {
    Ok(ContactEventRow {
      event:   self.event.into_contact_event()?,
      contact: self.contact,
      company: self.company,
    })
  }
}

pub struct RawToDoEventRow {
  pub event: RawEvent,
  pub todo:  ToDo,
}

impl RawToDoEventRow {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event: raw_event_at(row, 0)?,
      todo:  todo_at(row, EVENT_WIDTH)?,
    })
  }

  pub fn into_row(self) -> Result<ToDoEventRow> {
    Ok(ToDoEventRow {
      event: self.event.into_todo_event()?,
      todo:  self.todo,
    })
  }
}

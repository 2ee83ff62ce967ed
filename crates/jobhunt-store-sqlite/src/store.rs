//! [`SqliteStore`], the SQLite implementation of [`TrackerStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{Connection, OptionalExtension as _};

use jobhunt_core::{
  Error as CoreError,
  codes::{CONTACT_CODES, ContactCode, JOB_CODES, JobCode, TODO_CODES, ToDoCode},
  ids::{CompanyId, ContactEventId, ContactId, JobEventId, JobId, ToDoEventId, ToDoId, UserId},
  model::{
    Company, CompanyChoice, CompanyUpdate, Contact, ContactEvent,
    ContactEventRow, ContactUpdate, Job, JobEvent, JobEventRow, JobUpdate,
    NewContact, NewJob, NewSalary, NewToDo, NewUser, Salary, SalaryOptions,
    ToDo, ToDoEvent, ToDoEventRow, User,
  },
  store::TrackerStore,
};

use crate::{
  Result,
  encode::{
    COMPANY_COLS, CONTACT_COLS, JOB_COLS, RawContactEventRow, RawJobEventRow,
    RawToDoEventRow, SALARY_COLS, TODO_COLS, USER_COLS, company_at, contact_at,
    encode_dt, job_at, raw_event_at, salary_at, todo_at, user_at,
  },
  schema::SCHEMA,
};

/// What a transaction closure hands back: either the value or the domain
/// error that made it roll back.
type Outcome<T> = std::result::Result<T, CoreError>;

// ─── Event tables ────────────────────────────────────────────────────────────

/// Column names of one append-only event table.
struct EventTable {
  table:      &'static str,
  id_col:     &'static str,
  target_col: &'static str,
  code_col:   &'static str,
}

const JOB_EVENTS: EventTable = EventTable {
  table:      "job_events",
  id_col:     "job_event_id",
  target_col: "job_id",
  code_col:   "job_code",
};

const CONTACT_EVENTS: EventTable = EventTable {
  table:      "contact_events",
  id_col:     "contact_event_id",
  target_col: "contact_id",
  code_col:   "contact_code",
};

const TODO_EVENTS: EventTable = EventTable {
  table:      "todo_events",
  id_col:     "todo_event_id",
  target_col: "todo_id",
  code_col:   "todo_code",
};

impl EventTable {
  /// The five shared columns, aliased as `e`, in [`raw_event_at`] order.
  fn cols(&self) -> String {
    format!(
      "e.{}, e.user_id, e.{}, e.{}, e.date_created",
      self.id_col, self.target_col, self.code_col
    )
  }

  fn insert(
    &self,
    conn: &Connection,
    user: UserId,
    target: i64,
    code: u8,
    at: &str,
  ) -> rusqlite::Result<i64> {
    let sql = format!(
      "INSERT INTO {} (user_id, {}, {}, date_created) VALUES (?1, ?2, ?3, ?4)",
      self.table, self.target_col, self.code_col
    );
    conn.execute(&sql, rusqlite::params![user.0, target, code, at])?;
    Ok(conn.last_insert_rowid())
  }

  /// One user's events for one target, newest first.
  fn history(
    &self,
    conn: &Connection,
    user: UserId,
    target: i64,
  ) -> rusqlite::Result<Vec<crate::encode::RawEvent>> {
    let sql = format!(
      "SELECT {} FROM {} e
       WHERE e.user_id = ?1 AND e.{} = ?2
       ORDER BY e.date_created DESC, e.{} DESC",
      self.cols(),
      self.table,
      self.target_col,
      self.id_col
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
      .query_map(rusqlite::params![user.0, target], |row| raw_event_at(row, 0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// Event timestamps are truncated to the stored precision so the value handed
/// back from a write equals what a later read decodes.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

fn fetch_company(conn: &Connection, id: i64) -> rusqlite::Result<Option<Company>> {
  conn
    .query_row(
      &format!("SELECT {COMPANY_COLS} FROM companies c WHERE c.company_id = ?1"),
      [id],
      |row| company_at(row, 0),
    )
    .optional()
}

fn fetch_job(conn: &Connection, id: i64) -> rusqlite::Result<Option<Job>> {
  conn
    .query_row(
      &format!("SELECT {JOB_COLS} FROM jobs j WHERE j.job_id = ?1"),
      [id],
      |row| job_at(row, 0),
    )
    .optional()
}

fn fetch_contact(conn: &Connection, id: i64) -> rusqlite::Result<Option<Contact>> {
  conn
    .query_row(
      &format!("SELECT {CONTACT_COLS} FROM contacts k WHERE k.contact_id = ?1"),
      [id],
      |row| contact_at(row, 0),
    )
    .optional()
}

fn fetch_todo(conn: &Connection, id: i64) -> rusqlite::Result<Option<ToDo>> {
  conn
    .query_row(
      &format!("SELECT {TODO_COLS} FROM todos t WHERE t.todo_id = ?1"),
      [id],
      |row| todo_at(row, 0),
    )
    .optional()
}

/// Turn a [`CompanyChoice`] into a row id, inserting a new company if asked.
fn resolve_company_in(
  conn: &Connection,
  choice: &CompanyChoice,
) -> rusqlite::Result<Outcome<i64>> {
  match choice {
    CompanyChoice::Existing(id) => Ok(match fetch_company(conn, id.0)? {
      Some(company) => Ok(company.company_id.0),
      None => Err(CoreError::CompanyNotFound(*id)),
    }),
    CompanyChoice::New(name) => {
      conn.execute("INSERT INTO companies (name) VALUES (?1)", [name])?;
      Ok(Ok(conn.last_insert_rowid()))
    }
  }
}

fn seed_codes(conn: &Connection, table: &str, column: &str, codes: &[(u8, &str)]) -> rusqlite::Result<()> {
  let sql = format!("INSERT OR REPLACE INTO {table} ({column}, description) VALUES (?1, ?2)");
  let mut stmt = conn.prepare(&sql)?;
  for (code, label) in codes {
    stmt.execute(rusqlite::params![code, label])?;
  }
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A jobhunt store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every
/// closure passed to the connection runs on its one background thread, so
/// statements never interleave.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        let tx = conn.transaction()?;
        seed_codes(&tx, "job_codes", "job_code", JOB_CODES)?;
        seed_codes(&tx, "contact_codes", "contact_code", CONTACT_CODES)?;
        seed_codes(&tx, "todo_codes", "todo_code", TODO_CODES)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn register_user(&self, input: NewUser) -> Result<User> {
    let user_id: Outcome<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row("SELECT 1 FROM users WHERE email = ?1", [&input.email], |_| Ok(()))
          .optional()?
          .is_some();
        if taken {
          return Ok(Err(CoreError::EmailTaken(input.email)));
        }

        tx.execute(
          "INSERT INTO users (fname, lname, email, password_hash, phone)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.fname,
            input.lname,
            input.email,
            input.password_hash,
            input.phone,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;
    let user_id = UserId(user_id?);

    tracing::info!(%user_id, "registered user");
    self
      .get_user(user_id)
      .await?
      .ok_or_else(|| CoreError::UserNotFound(user_id).into())
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {USER_COLS} FROM users u WHERE u.user_id = ?1"),
                [id.0],
                user_at,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn find_user_by_email(&self, email: String) -> Result<Option<User>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {USER_COLS} FROM users u WHERE u.email = ?1"),
                [email],
                user_at,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  // ── Companies ─────────────────────────────────────────────────────────────

  async fn get_company(&self, id: CompanyId) -> Result<Option<Company>> {
    Ok(self.conn.call(move |conn| Ok(fetch_company(conn, id.0)?)).await?)
  }

  async fn update_company(&self, id: CompanyId, update: CompanyUpdate) -> Result<Company> {
    let company: Option<Company> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE companies
           SET street = ?1, city = ?2, state = ?3, zipcode = ?4, website = ?5, notes = ?6
           WHERE company_id = ?7",
          rusqlite::params![
            update.street,
            update.city,
            update.state,
            update.zipcode,
            update.website,
            update.notes,
            id.0,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(fetch_company(conn, id.0)?)
      })
      .await?;

    Ok(company.ok_or(CoreError::CompanyNotFound(id))?)
  }

  async fn job_counts(&self, ids: Vec<CompanyId>) -> Result<Vec<(CompanyId, u32)>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare("SELECT COUNT(*) FROM jobs WHERE company_id = ?1")?;
          let mut counts = Vec::with_capacity(ids.len());
          for id in ids {
            let count: u32 = stmt.query_row([id.0], |row| row.get(0))?;
            counts.push((id, count));
          }
          Ok(counts)
        })
        .await?,
    )
  }

  async fn company_jobs(&self, id: CompanyId) -> Result<Vec<Job>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {JOB_COLS} FROM jobs j WHERE j.company_id = ?1 ORDER BY j.job_id"
          ))?;
          let rows = stmt
            .query_map([id.0], |row| job_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn company_contacts(&self, id: CompanyId) -> Result<Vec<Contact>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLS} FROM contacts k
             WHERE k.company_id = ?1 ORDER BY k.lname, k.fname"
          ))?;
          let rows = stmt
            .query_map([id.0], |row| contact_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Jobs ──────────────────────────────────────────────────────────────────

  async fn add_job(&self, user: UserId, input: NewJob) -> Result<(Job, JobEvent)> {
    let date_created = now();
    let at = encode_dt(date_created);
    let code = input.code;

    let created: Outcome<(Job, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let company_id = match resolve_company_in(&tx, &input.company)? {
          Ok(id) => id,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "INSERT INTO jobs (company_id, title, link, notes, active_status)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            company_id,
            input.title,
            input.link,
            input.notes,
            !code.is_archived(),
          ],
        )?;
        let job_id = tx.last_insert_rowid();
        let event_id = JOB_EVENTS.insert(&tx, user, job_id, code.value(), &at)?;
        let job = fetch_job(&tx, job_id)?;
        tx.commit()?;

        Ok(job.map(|job| (job, event_id)).ok_or(CoreError::JobNotFound(JobId(job_id))))
      })
      .await?;
    let (job, event_id) = created?;

    tracing::info!(job_id = %job.job_id, %user, code = code.value(), "added job");
    let event = JobEvent {
      job_event_id: JobEventId(event_id),
      user_id: user,
      job_id: job.job_id,
      job_code: code,
      date_created,
    };
    Ok((job, event))
  }

  async fn get_job(&self, id: JobId) -> Result<Option<Job>> {
    Ok(self.conn.call(move |conn| Ok(fetch_job(conn, id.0)?)).await?)
  }

  async fn update_job(&self, id: JobId, update: JobUpdate) -> Result<Job> {
    let job: Option<Job> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE jobs SET link = ?1, avg_salary = ?2, notes = ?3 WHERE job_id = ?4",
          rusqlite::params![update.link, update.avg_salary, update.notes, id.0],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(fetch_job(conn, id.0)?)
      })
      .await?;

    Ok(job.ok_or(CoreError::JobNotFound(id))?)
  }

  async fn set_job_salary(&self, id: JobId, avg_salary: i64) -> Result<Job> {
    let job: Option<Job> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE jobs SET avg_salary = ?1 WHERE job_id = ?2",
          rusqlite::params![avg_salary, id.0],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(fetch_job(conn, id.0)?)
      })
      .await?;
    let job = job.ok_or(CoreError::JobNotFound(id))?;

    tracing::info!(job_id = %id, avg_salary, "set job salary");
    Ok(job)
  }

  async fn record_job_event(&self, user: UserId, job: JobId, code: JobCode) -> Result<JobEvent> {
    let date_created = now();
    let at = encode_dt(date_created);

    let event_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_job(&tx, job.0)?.is_none() {
          return Ok(None);
        }
        let event_id = JOB_EVENTS.insert(&tx, user, job.0, code.value(), &at)?;
        // One-way: a terminal code archives the job, nothing reactivates it.
        if code.is_archived() {
          tx.execute("UPDATE jobs SET active_status = 0 WHERE job_id = ?1", [job.0])?;
        }
        tx.commit()?;
        Ok(Some(event_id))
      })
      .await?;
    let event_id = event_id.ok_or(CoreError::JobNotFound(job))?;

    tracing::info!(
      job_id = %job,
      %user,
      code = code.value(),
      archived = code.is_archived(),
      "recorded job status"
    );
    Ok(JobEvent {
      job_event_id: JobEventId(event_id),
      user_id: user,
      job_id: job,
      job_code: code,
      date_created,
    })
  }

  async fn job_events_for_user(&self, user: UserId) -> Result<Vec<JobEventRow>> {
    let raws: Vec<RawJobEventRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {}, {JOB_COLS}, {COMPANY_COLS}
           FROM job_events e
           JOIN jobs      j ON j.job_id     = e.job_id
           JOIN companies c ON c.company_id = j.company_id
           WHERE e.user_id = ?1
           ORDER BY e.date_created DESC, e.job_event_id DESC",
          JOB_EVENTS.cols()
        ))?;
        let rows = stmt
          .query_map([user.0], RawJobEventRow::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJobEventRow::into_row).collect()
  }

  async fn job_history(&self, user: UserId, job: JobId) -> Result<Vec<JobEvent>> {
    let raws = self
      .conn
      .call(move |conn| Ok(JOB_EVENTS.history(conn, user, job.0)?))
      .await?;
    raws.into_iter().map(|raw| raw.into_job_event()).collect()
  }

  // ── Salary reference ──────────────────────────────────────────────────────

  async fn add_salaries(&self, rows: Vec<NewSalary>) -> Result<usize> {
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO salaries (metro, job_title, avg_salary) VALUES (?1, ?2, ?3)",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![row.metro, row.job_title, row.avg_salary])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    tracing::info!(inserted, "loaded salary reference rows");
    Ok(inserted)
  }

  async fn salary_options(&self) -> Result<SalaryOptions> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut metros = conn.prepare("SELECT DISTINCT metro FROM salaries ORDER BY metro")?;
          let metros = metros
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

          let mut titles =
            conn.prepare("SELECT DISTINCT job_title FROM salaries ORDER BY job_title")?;
          let job_titles = titles
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

          Ok(SalaryOptions { metros, job_titles })
        })
        .await?,
    )
  }

  async fn find_salary(&self, metro: String, job_title: String) -> Result<Option<Salary>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!(
                  "SELECT {SALARY_COLS} FROM salaries s
                   WHERE s.metro = ?1 AND s.job_title = ?2
                   ORDER BY s.salary_id LIMIT 1"
                ),
                [metro, job_title],
                salary_at,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn add_contact(&self, user: UserId, input: NewContact) -> Result<(Contact, ContactEvent)> {
    let date_created = now();
    let at = encode_dt(date_created);
    let code = input.code;

    let created: Outcome<(Contact, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let company_id = match resolve_company_in(&tx, &input.company)? {
          Ok(id) => id,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "INSERT INTO contacts (company_id, fname, lname, email, phone, notes)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            company_id,
            input.fname,
            input.lname,
            input.email,
            input.phone,
            input.notes,
          ],
        )?;
        let contact_id = tx.last_insert_rowid();
        let event_id = CONTACT_EVENTS.insert(&tx, user, contact_id, code.value(), &at)?;
        let contact = fetch_contact(&tx, contact_id)?;
        tx.commit()?;

        Ok(
          contact
            .map(|contact| (contact, event_id))
            .ok_or(CoreError::ContactNotFound(ContactId(contact_id))),
        )
      })
      .await?;
    let (contact, event_id) = created?;

    tracing::info!(contact_id = %contact.contact_id, %user, "added contact");
    let event = ContactEvent {
      contact_event_id: ContactEventId(event_id),
      user_id: user,
      contact_id: contact.contact_id,
      contact_code: code,
      date_created,
    };
    Ok((contact, event))
  }

  async fn get_contact(&self, id: ContactId) -> Result<Option<Contact>> {
    Ok(self.conn.call(move |conn| Ok(fetch_contact(conn, id.0)?)).await?)
  }

  async fn update_contact(&self, id: ContactId, update: ContactUpdate) -> Result<Contact> {
    let contact: Outcome<Contact> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_contact(&tx, id.0)?.is_none() {
          return Ok(Err(CoreError::ContactNotFound(id)));
        }
        let company_id = match resolve_company_in(&tx, &update.company)? {
          Ok(company_id) => company_id,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "UPDATE contacts
           SET fname = ?1, lname = ?2,
               email = COALESCE(?3, email), phone = COALESCE(?4, phone),
               company_id = ?5
           WHERE contact_id = ?6",
          rusqlite::params![
            update.fname,
            update.lname,
            update.email,
            update.phone,
            company_id,
            id.0,
          ],
        )?;
        let contact = fetch_contact(&tx, id.0)?;
        tx.commit()?;
        Ok(contact.ok_or(CoreError::ContactNotFound(id)))
      })
      .await?;
    Ok(contact?)
  }

  async fn record_contact_event(
    &self,
    user: UserId,
    contact: ContactId,
    code: ContactCode,
  ) -> Result<ContactEvent> {
    let date_created = now();
    let at = encode_dt(date_created);

    let event_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_contact(&tx, contact.0)?.is_none() {
          return Ok(None);
        }
        let event_id = CONTACT_EVENTS.insert(&tx, user, contact.0, code.value(), &at)?;
        tx.commit()?;
        Ok(Some(event_id))
      })
      .await?;
    let event_id = event_id.ok_or(CoreError::ContactNotFound(contact))?;

    tracing::debug!(contact_id = %contact, %user, code = code.value(), "recorded contact event");
    Ok(ContactEvent {
      contact_event_id: ContactEventId(event_id),
      user_id: user,
      contact_id: contact,
      contact_code: code,
      date_created,
    })
  }

  async fn contact_events_for_user(&self, user: UserId) -> Result<Vec<ContactEventRow>> {
    let raws: Vec<RawContactEventRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {}, {CONTACT_COLS}, {COMPANY_COLS}
           FROM contact_events e
           JOIN contacts  k ON k.contact_id = e.contact_id
           JOIN companies c ON c.company_id = k.company_id
           WHERE e.user_id = ?1
           ORDER BY e.date_created DESC, e.contact_event_id DESC",
          CONTACT_EVENTS.cols()
        ))?;
        let rows = stmt
          .query_map([user.0], RawContactEventRow::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContactEventRow::into_row).collect()
  }

  async fn contact_history(&self, user: UserId, contact: ContactId) -> Result<Vec<ContactEvent>> {
    let raws = self
      .conn
      .call(move |conn| Ok(CONTACT_EVENTS.history(conn, user, contact.0)?))
      .await?;
    raws.into_iter().map(|raw| raw.into_contact_event()).collect()
  }

  // ── To-dos ────────────────────────────────────────────────────────────────

  async fn add_todo(&self, user: UserId, input: NewToDo) -> Result<(ToDo, ToDoEvent)> {
    let date_created = now();
    let at = encode_dt(date_created);
    let code = input.code;

    let created: Outcome<(ToDo, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(job) = input.job_id
          && fetch_job(&tx, job.0)?.is_none()
        {
          return Ok(Err(CoreError::JobNotFound(job)));
        }

        tx.execute(
          "INSERT INTO todos (description, job_id) VALUES (?1, ?2)",
          rusqlite::params![input.description, input.job_id.map(|j| j.0)],
        )?;
        let todo_id = tx.last_insert_rowid();
        let event_id = TODO_EVENTS.insert(&tx, user, todo_id, code.value(), &at)?;
        let todo = fetch_todo(&tx, todo_id)?;
        tx.commit()?;

        Ok(todo.map(|todo| (todo, event_id)).ok_or(CoreError::ToDoNotFound(ToDoId(todo_id))))
      })
      .await?;
    let (todo, event_id) = created?;

    let event = ToDoEvent {
      todo_event_id: ToDoEventId(event_id),
      user_id: user,
      todo_id: todo.todo_id,
      todo_code: code,
      date_created,
    };
    Ok((todo, event))
  }

  async fn record_todo_event(&self, user: UserId, todo: ToDoId, code: ToDoCode) -> Result<ToDoEvent> {
    let date_created = now();
    let at = encode_dt(date_created);

    let event_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_todo(&tx, todo.0)?.is_none() {
          return Ok(None);
        }
        let event_id = TODO_EVENTS.insert(&tx, user, todo.0, code.value(), &at)?;
        tx.commit()?;
        Ok(Some(event_id))
      })
      .await?;
    let event_id = event_id.ok_or(CoreError::ToDoNotFound(todo))?;

    Ok(ToDoEvent {
      todo_event_id: ToDoEventId(event_id),
      user_id: user,
      todo_id: todo,
      todo_code: code,
      date_created,
    })
  }

  async fn todo_events_for_user(&self, user: UserId) -> Result<Vec<ToDoEventRow>> {
    let raws: Vec<RawToDoEventRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {}, {TODO_COLS}
           FROM todo_events e
           JOIN todos t ON t.todo_id = e.todo_id
           WHERE e.user_id = ?1
           ORDER BY e.date_created DESC, e.todo_event_id DESC",
          TODO_EVENTS.cols()
        ))?;
        let rows = stmt
          .query_map([user.0], RawToDoEventRow::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawToDoEventRow::into_row).collect()
  }
}

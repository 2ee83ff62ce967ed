//! View assembly: the per-page read models built from event logs.
//!
//! Every list page follows the same recipe: load the user's events, keep the
//! latest one per target (see [`crate::status::latest_per_target`]), then
//! filter or group on the joined entity.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
  ids::{CompanyId, UserId},
  model::{Company, CompanySummary, Contact, ContactEvent, Job, JobEvent, ToDo, ToDoEvent},
  status::latest_per_target,
  store::TrackerStore,
};

// ─── Jobs ────────────────────────────────────────────────────────────────────

/// Which half of the job board to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobFilter {
  Active,
  Archived,
}

impl JobFilter {
  fn keeps(self, job: &Job) -> bool {
    match self {
      Self::Active => job.active_status,
      Self::Archived => !job.active_status,
    }
  }
}

/// A job with the user's current status for it.
#[derive(Debug, Clone, Serialize)]
pub struct JobCard {
  pub job:          Job,
  pub company:      Company,
  pub current:      JobEvent,
  pub status_label: &'static str,
}

/// One card per job the user has tracked, filtered on the job's
/// `active_status`, newest activity first.
async fn job_board<S: TrackerStore>(
  store: &S,
  user: UserId,
  filter: JobFilter,
) -> Result<Vec<JobCard>, S::Error> {
  let rows = store.job_events_for_user(user).await?;

  Ok(
    latest_per_target(rows)
      .into_iter()
      .filter(|row| filter.keeps(&row.job))
      .map(|row| JobCard {
        status_label: row.event.job_code.label(),
        job:          row.job,
        company:      row.company,
        current:      row.event,
      })
      .collect(),
  )
}

pub async fn active_jobs<S: TrackerStore>(
  store: &S,
  user: UserId,
) -> Result<Vec<JobCard>, S::Error> {
  job_board(store, user, JobFilter::Active).await
}

pub async fn archived_jobs<S: TrackerStore>(
  store: &S,
  user: UserId,
) -> Result<Vec<JobCard>, S::Error> {
  job_board(store, user, JobFilter::Archived).await
}

// ─── Companies ───────────────────────────────────────────────────────────────

/// Companies of the jobs the user tracks, sorted by name. Feeds the
/// "existing company" select box on the add forms.
pub async fn job_companies<S: TrackerStore>(
  store: &S,
  user: UserId,
) -> Result<Vec<Company>, S::Error> {
  let rows = store.job_events_for_user(user).await?;
  let unique: BTreeMap<CompanyId, Company> = rows
    .into_iter()
    .map(|row| (row.company.company_id, row.company))
    .collect();

  Ok(sorted_by_name(unique.into_values().collect()))
}

/// Every company reachable from the user's job or contact events, with the
/// number of jobs filed under each.
pub async fn user_companies<S: TrackerStore>(
  store: &S,
  user: UserId,
) -> Result<Vec<CompanySummary>, S::Error> {
  let mut unique: BTreeMap<CompanyId, Company> = BTreeMap::new();
  for row in store.job_events_for_user(user).await? {
    unique.entry(row.company.company_id).or_insert(row.company);
  }
  for row in store.contact_events_for_user(user).await? {
    unique.entry(row.company.company_id).or_insert(row.company);
  }

  let counts: BTreeMap<CompanyId, u32> = store
    .job_counts(unique.keys().copied().collect())
    .await?
    .into_iter()
    .collect();

  Ok(
    sorted_by_name(unique.into_values().collect())
      .into_iter()
      .map(|company| CompanySummary {
        job_count: counts.get(&company.company_id).copied().unwrap_or(0),
        company,
      })
      .collect(),
  )
}

fn sorted_by_name(mut companies: Vec<Company>) -> Vec<Company> {
  companies.sort_by(|a, b| {
    a.name
      .to_lowercase()
      .cmp(&b.name.to_lowercase())
      .then(a.company_id.cmp(&b.company_id))
  });
  companies
}

// ─── Contacts ────────────────────────────────────────────────────────────────

/// A contact with the user's most recent interaction.
#[derive(Debug, Clone, Serialize)]
pub struct ContactCard {
  pub contact:     Contact,
  pub company:     Company,
  pub last:        ContactEvent,
  pub event_label: &'static str,
}

pub async fn tracked_contacts<S: TrackerStore>(
  store: &S,
  user: UserId,
) -> Result<Vec<ContactCard>, S::Error> {
  let rows = store.contact_events_for_user(user).await?;

  Ok(
    latest_per_target(rows)
      .into_iter()
      .map(|row| ContactCard {
        event_label: row.event.contact_code.label(),
        contact:     row.contact,
        company:     row.company,
        last:        row.event,
      })
      .collect(),
  )
}

// ─── To-dos ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ToDoCard {
  pub todo:         ToDo,
  pub current:      ToDoEvent,
  pub status_label: &'static str,
  pub closed:       bool,
}

/// Every to-do the user has touched, open ones first, newest first within
/// each group.
pub async fn todo_board<S: TrackerStore>(
  store: &S,
  user: UserId,
) -> Result<Vec<ToDoCard>, S::Error> {
  let rows = store.todo_events_for_user(user).await?;

  let (open, closed): (Vec<_>, Vec<_>) = latest_per_target(rows)
    .into_iter()
    .map(|row| ToDoCard {
      status_label: row.event.todo_code.label(),
      closed:       row.event.todo_code.is_closed(),
      todo:         row.todo,
      current:      row.event,
    })
    .partition(|card| !card.closed);

  Ok(open.into_iter().chain(closed).collect())
}

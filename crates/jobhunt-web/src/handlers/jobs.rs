//! Handlers for the job board.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dashboard/jobs` | Active jobs |
//! | `GET`  | `/dashboard/jobs/archived` | Archived jobs |
//! | `GET`/`POST` | `/dashboard/jobs/add` | |
//! | `POST` | `/dashboard/jobs/salary` | Copies a reference salary |
//! | `GET`/`POST` | `/dashboard/jobs/{id}` | Detail and edit |
//! | `POST` | `/dashboard/job-status` | Appends a job event |

use axum::{
  Form,
  extract::{Path, Query, State},
  response::Response,
};
use axum_extra::extract::SignedCookieJar;
use jobhunt_core::{
  Error as CoreError,
  codes::{CodeLabel, JobCode},
  status,
  ids::JobId,
  model::{Company, Job, JobEvent, JobUpdate, NewJob, SalaryOptions},
  store::TrackerStore,
  view::{self, JobCard},
};
use serde::Serialize;

use super::{flash_redirect, redirect, render};
use crate::{
  AppState,
  auth::CurrentUser,
  error::{Error, store_err},
  flash::FlashLevel,
  forms::{
    AddJobForm, EditJobForm, EditQuery, JobStatusForm, SalaryForm,
    company_choice, normalize_link, optional_salary,
  },
};

#[derive(Debug, Serialize)]
pub struct JobBoard {
  pub jobs:  Vec<JobCard>,
  pub codes: Vec<CodeLabel>,
}

#[derive(Debug, Serialize)]
pub struct JobDetail {
  pub job:            Job,
  pub company:        Company,
  pub history:        Vec<JobEvent>,
  pub current:        Option<JobCode>,
  /// Offered only while the job has no average salary.
  pub salary_options: Option<SalaryOptions>,
  pub codes:          Vec<CodeLabel>,
  pub edit:           Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddJobPage {
  pub companies: Vec<Company>,
  pub codes:     Vec<CodeLabel>,
}

fn job_url(id: JobId) -> String { format!("/dashboard/jobs/{id}") }

async fn load_job<S: TrackerStore>(store: &S, id: JobId) -> Result<Job, Error> {
  store
    .get_job(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| CoreError::JobNotFound(id).into())
}

/// `GET /dashboard/jobs`
pub async fn active<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let jobs = view::active_jobs(state.store.as_ref(), user)
    .await
    .map_err(store_err)?;
  Ok(render(jar, JobBoard {
    jobs,
    codes: JobCode::all(),
  }))
}

/// `GET /dashboard/jobs/archived`
pub async fn archived<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let jobs = view::archived_jobs(state.store.as_ref(), user)
    .await
    .map_err(store_err)?;
  Ok(render(jar, JobBoard {
    jobs,
    codes: JobCode::all(),
  }))
}

/// `GET /dashboard/jobs/{id}[?edit=]`
pub async fn show<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<JobId>,
  Query(query): Query<EditQuery>,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let store = state.store.as_ref();
  let job = load_job(store, id).await?;
  let company = store
    .get_company(job.company_id)
    .await
    .map_err(store_err)?
    .ok_or(CoreError::CompanyNotFound(job.company_id))?;
  let history = store.job_history(user, id).await.map_err(store_err)?;
  let current = status::current_code(&history);

  let salary_options = match job.avg_salary {
    Some(_) => None,
    None => Some(store.salary_options().await.map_err(store_err)?),
  };

  Ok(render(jar, JobDetail {
    job,
    company,
    history,
    current,
    salary_options,
    codes: JobCode::all(),
    edit: query.edit,
  }))
}

/// `POST /dashboard/jobs/{id}`
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<JobId>,
  jar: SignedCookieJar,
  Form(form): Form<EditJobForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let update = JobUpdate {
    link:       normalize_link(&form.link),
    avg_salary: optional_salary(&form.avg_salary)?,
    notes:      form.notes,
  };
  state.store.update_job(id, update).await.map_err(store_err)?;
  tracing::info!(%user, job = %id, "edited job");

  Ok(redirect(jar, &job_url(id)))
}

/// `POST /dashboard/jobs/salary`
pub async fn salary<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
  Form(form): Form<SalaryForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let store = state.store.as_ref();
  let salary = store
    .find_salary(form.metro.clone(), form.job_title.clone())
    .await
    .map_err(store_err)?
    .ok_or(CoreError::SalaryNotFound {
      metro:     form.metro,
      job_title: form.job_title,
    })?;

  let job = store
    .set_job_salary(form.job_id, salary.avg_salary)
    .await
    .map_err(store_err)?;
  tracing::info!(%user, job = %job.job_id, salary = salary.avg_salary, "applied reference salary");

  Ok(redirect(jar, &job_url(job.job_id)))
}

/// `GET /dashboard/jobs/add`
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
  Ok(render(jar, AddJobPage {
    companies,
    codes: JobCode::all(),
  }))
}

/// `POST /dashboard/jobs/add`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
  Form(form): Form<AddJobForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let title = form.job_title.trim().to_string();
  if title.is_empty() {
    return Err(Error::BadRequest("a job needs a title".into()));
  }

  let input = NewJob {
    title,
    link: normalize_link(&form.job_link),
    notes: form.job_notes,
    company: company_choice(&form.company_id, &form.company_name)?,
    code: JobCode::new(form.job_status)?,
  };
  let (job, _) = state.store.add_job(user, input).await.map_err(store_err)?;

  Ok(flash_redirect(
    jar,
    FlashLevel::Success,
    format!("{} added to your jobs.", job.title),
    "/dashboard/jobs",
  ))
}

/// `POST /dashboard/job-status`
pub async fn record_status<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
  Form(form): Form<JobStatusForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let code = JobCode::new(form.job_code)?;
  state
    .store
    .record_job_event(user, form.job_id, code)
    .await
    .map_err(store_err)?;

  Ok(redirect(jar, "/dashboard/jobs"))
}

//! HTTP layer for jobhunt.
//!
//! Exposes an axum [`Router`] serving the dashboard pages, backed by any
//! [`TrackerStore`]. Sessions and flash messages live in signed cookies; see
//! [`auth`] and [`flash`].

pub mod auth;
pub mod error;
pub mod flash;
pub mod forms;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::FromRef,
  routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use jobhunt_core::store::TrackerStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{account, companies, contacts, jobs, profile, todos};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `JOBHUNT_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub database_path:  PathBuf,
  /// Signs the session and flash cookies. Changing it logs everyone out.
  pub session_secret: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: TrackerStore> {
  pub store: Arc<S>,
  pub key:   Key,
}

impl<S: TrackerStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      key:   self.key.clone(),
    }
  }
}

impl<S: TrackerStore> FromRef<AppState<S>> for Key {
  fn from_ref(state: &AppState<S>) -> Self { state.key.clone() }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the dashboard [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TrackerStore + 'static,
{
  Router::new()
    // Account
    .route("/",          get(account::landing))
    .route("/register",  get(account::blank_form).post(account::register::<S>))
    .route("/login",     get(account::blank_form).post(account::login::<S>))
    .route("/logout",    get(account::logout))
    .route("/dashboard", get(account::dashboard))
    // Jobs
    .route("/dashboard/jobs",          get(jobs::active::<S>))
    .route("/dashboard/jobs/archived", get(jobs::archived::<S>))
    .route("/dashboard/jobs/add",      get(jobs::add_form::<S>).post(jobs::add::<S>))
    .route("/dashboard/jobs/salary",   post(jobs::salary::<S>))
    .route("/dashboard/jobs/{id}",     get(jobs::show::<S>).post(jobs::edit::<S>))
    .route("/dashboard/job-status",    post(jobs::record_status::<S>))
    // Companies
    .route("/dashboard/companies",      get(companies::list::<S>))
    .route("/dashboard/companies/{id}", get(companies::show::<S>).post(companies::edit::<S>))
    // Contacts
    .route("/dashboard/contacts",       get(contacts::list::<S>))
    .route("/dashboard/contacts/add",   get(contacts::add_form::<S>).post(contacts::add::<S>))
    .route("/dashboard/contacts/{id}",  get(contacts::show::<S>).post(contacts::edit::<S>))
    .route("/dashboard/contact-status", post(contacts::record_event::<S>))
    // To-dos
    .route("/dashboard/todos",       get(todos::list::<S>))
    .route("/dashboard/todos/add",   post(todos::add::<S>))
    .route("/dashboard/todo-status", post(todos::record_status::<S>))
    // Profile
    .route("/dashboard/profile", get(profile::show::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use jobhunt_core::model::NewSalary;
  use jobhunt_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt;

  use super::*;
  use crate::handlers::account::{
    BAD_LOGIN, EMAIL_TAKEN, LOGGED_OUT, REGISTERED, WELCOME,
  };

  /// Drives the router like a browser would, replaying cookies set by
  /// earlier responses.
  struct Browser {
    app:     Router,
    store:   Arc<SqliteStore>,
    cookies: BTreeMap<String, String>,
  }

  /// Where a request ended up once every `303 See Other` was followed.
  struct Landing {
    status:   StatusCode,
    /// The last redirect target, if the first response redirected.
    location: Option<String>,
    page:     Option<Value>,
  }

  impl Landing {
    fn location(&self) -> &str { self.location.as_deref().expect("no redirect") }

    fn page(&self) -> &Value { self.page.as_ref().expect("no rendered page") }

    fn flashes(&self) -> Vec<String> { flash_messages(self.page()) }
  }

  const MAX_HOPS: usize = 5;

  impl Browser {
    async fn new() -> Self {
      let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
      let state = AppState {
        store: Arc::clone(&store),
        key:   auth::session_key("router test secret"),
      };
      Self {
        app: router(state),
        store,
        cookies: BTreeMap::new(),
      }
    }

    async fn send(&mut self, req: axum::http::request::Builder, body: Body) -> Response {
      let cookie = self
        .cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
      let req = if cookie.is_empty() { req } else { req.header(header::COOKIE, cookie) };

      let response = self
        .app
        .clone()
        .oneshot(req.body(body).unwrap())
        .await
        .unwrap();

      for set in response.headers().get_all(header::SET_COOKIE) {
        let pair = set.to_str().unwrap().split(';').next().unwrap();
        let (name, value) = pair.split_once('=').unwrap();
        if value.is_empty() {
          self.cookies.remove(name);
        } else {
          self.cookies.insert(name.to_string(), value.to_string());
        }
      }
      response
    }

    /// A single GET; redirects are returned, not followed.
    async fn get(&mut self, uri: &str) -> Response {
      self.send(Request::get(uri), Body::empty()).await
    }

    /// Follow `response` through its redirects and decode the final page.
    async fn follow(&mut self, mut response: Response) -> Landing {
      let mut location = None;
      for _ in 0..MAX_HOPS {
        if response.status() != StatusCode::SEE_OTHER {
          break;
        }
        let to = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        response = self.get(&to).await;
        location = Some(to);
      }

      let status = response.status();
      let page = if status == StatusCode::OK {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
          .await
          .unwrap();
        Some(serde_json::from_slice(&bytes).unwrap())
      } else {
        None
      };
      Landing { status, location, page }
    }

    /// GET `uri`, following redirects.
    async fn visit(&mut self, uri: &str) -> Landing {
      let response = self.get(uri).await;
      self.follow(response).await
    }

    /// POST a urlencoded form, following redirects.
    async fn submit(&mut self, uri: &str, form: &str) -> Landing {
      let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
      let response = self.send(req, Body::from(form.to_string())).await;
      self.follow(response).await
    }

    /// GET a page that must render directly.
    async fn page(&mut self, uri: &str) -> Value {
      let landing = self.visit(uri).await;
      assert_eq!(landing.status, StatusCode::OK, "GET {uri}");
      assert!(landing.location.is_none(), "GET {uri} redirected");
      landing.page.unwrap()
    }

    async fn register(&mut self, email: &str, password: &str) -> Landing {
      self
        .submit(
          "/register",
          &format!("fname=Ada&lname=Lovelace&email={email}&password={password}"),
        )
        .await
    }

    async fn login(&mut self, email: &str, password: &str) -> Landing {
      self
        .submit("/login", &format!("email={email}&password={password}"))
        .await
    }

    async fn signed_in() -> Self {
      let mut browser = Self::new().await;
      browser.register("ada%40example.com", "hunter2").await;
      let landing = browser.login("ada%40example.com", "hunter2").await;
      assert_eq!(landing.location(), "/dashboard/jobs");
      browser
    }

    /// Add a job through the form and return its id.
    async fn add_job(&mut self, form: &str) -> i64 {
      let landing = self.submit("/dashboard/jobs/add", form).await;
      assert_eq!(landing.location(), "/dashboard/jobs");
      landing.page()["view"]["jobs"][0]["job"]["job_id"].as_i64().unwrap()
    }
  }

  fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[header::LOCATION].to_str().unwrap()
  }

  fn flash_messages(page: &Value) -> Vec<String> {
    page["flash"]
      .as_array()
      .unwrap()
      .iter()
      .map(|f| f["message"].as_str().unwrap().to_string())
      .collect()
  }

  // ── Sessions ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn anonymous_dashboard_redirects_home() {
    let mut browser = Browser::new().await;
    for uri in ["/dashboard", "/dashboard/jobs", "/dashboard/contacts", "/dashboard/profile"] {
      let response = browser.get(uri).await;
      assert_eq!(location(&response), "/", "GET {uri}");
    }

    let landing = browser.visit("/dashboard/jobs").await;
    assert_eq!(landing.status, StatusCode::OK);
    assert_eq!(landing.page()["view"]["logged_in"], false);
    assert!(landing.flashes().is_empty());
  }

  #[tokio::test]
  async fn register_twice_is_rejected() {
    let mut browser = Browser::new().await;

    let landing = browser.register("ada%40example.com", "hunter2").await;
    assert_eq!(landing.location(), "/login");
    assert_eq!(landing.flashes(), vec![REGISTERED]);

    let landing = browser.register("ADA%40example.com", "other").await;
    assert_eq!(landing.location(), "/register");
    assert_eq!(landing.flashes(), vec![EMAIL_TAKEN]);

    // Consumed by the previous render.
    let page = browser.page("/register").await;
    assert!(flash_messages(&page).is_empty());
  }

  #[tokio::test]
  async fn bad_password_and_unknown_email_look_the_same() {
    let mut browser = Browser::new().await;
    browser.register("ada%40example.com", "hunter2").await;

    let wrong_password = browser.login("ada%40example.com", "wrong").await;
    assert_eq!(wrong_password.location(), "/login");

    let unknown_email = browser.login("nobody%40example.com", "hunter2").await;
    assert_eq!(unknown_email.location(), "/login");

    assert_eq!(wrong_password.flashes(), vec![BAD_LOGIN]);
    assert_eq!(wrong_password.flashes(), unknown_email.flashes());

    let response = browser.get("/dashboard/jobs").await;
    assert_eq!(location(&response), "/");
  }

  #[tokio::test]
  async fn login_then_logout() {
    let mut browser = Browser::new().await;
    browser.register("ada%40example.com", "hunter2").await;

    let landing = browser.login("ada%40example.com", "hunter2").await;
    assert_eq!(landing.location(), "/dashboard/jobs");
    assert_eq!(landing.flashes(), vec![WELCOME]);

    let response = browser.get("/dashboard").await;
    assert_eq!(location(&response), "/dashboard/jobs");

    let landing = browser.visit("/logout").await;
    assert_eq!(landing.location(), "/");
    assert_eq!(landing.flashes(), vec![LOGGED_OUT]);
    assert_eq!(landing.page()["view"]["logged_in"], false);

    let response = browser.get("/dashboard/jobs").await;
    assert_eq!(location(&response), "/");
  }

  #[tokio::test]
  async fn flashes_do_not_pile_up_across_requests() {
    let mut browser = Browser::signed_in().await;
    for _ in 0..3 {
      let landing = browser
        .submit("/dashboard/jobs/add", "job_title=SRE&job_status=1&company_name=Acme")
        .await;
      assert_eq!(landing.flashes(), vec!["SRE added to your jobs."]);
    }
  }

  // ── Jobs ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn added_job_moves_to_archive_on_rejection() {
    let mut browser = Browser::signed_in().await;

    let landing = browser
      .submit(
        "/dashboard/jobs/add",
        "job_title=Backend+Engineer&job_status=1&company_name=Acme",
      )
      .await;
    assert_eq!(landing.location(), "/dashboard/jobs");
    assert_eq!(landing.flashes(), vec!["Backend Engineer added to your jobs."]);
    let jobs = landing.page()["view"]["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["job"]["title"], "Backend Engineer");
    assert_eq!(jobs[0]["job"]["link"], "");
    assert_eq!(jobs[0]["job"]["active_status"], true);
    assert_eq!(jobs[0]["status_label"], "Interested");
    let job_id = jobs[0]["job"]["job_id"].as_i64().unwrap();

    let archived = browser.page("/dashboard/jobs/archived").await;
    assert!(archived["view"]["jobs"].as_array().unwrap().is_empty());

    let landing = browser
      .submit("/dashboard/job-status", &format!("job_id={job_id}&job_code=7"))
      .await;
    assert_eq!(landing.location(), "/dashboard/jobs");
    assert!(landing.page()["view"]["jobs"].as_array().unwrap().is_empty());

    let archived = browser.page("/dashboard/jobs/archived").await;
    let jobs = archived["view"]["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["status_label"], "Rejected");

    let detail = browser.page(&format!("/dashboard/jobs/{job_id}")).await;
    assert_eq!(detail["view"]["current"], 7);
    let history = detail["view"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["job_code"], 7);
    assert_eq!(history[1]["job_code"], 1);
  }

  #[tokio::test]
  async fn archived_job_is_not_reopened_by_a_later_code() {
    let mut browser = Browser::signed_in().await;
    let job_id = browser
      .add_job("job_title=SRE&job_status=1&company_name=Acme")
      .await;

    for code in [7, 2] {
      browser
        .submit("/dashboard/job-status", &format!("job_id={job_id}&job_code={code}"))
        .await;
    }

    let active = browser.page("/dashboard/jobs").await;
    assert!(active["view"]["jobs"].as_array().unwrap().is_empty());

    let archived = browser.page("/dashboard/jobs/archived").await;
    let jobs = archived["view"]["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["job"]["active_status"], false);
    assert_eq!(jobs[0]["status_label"], "Applied");

    let detail = browser.page(&format!("/dashboard/jobs/{job_id}")).await;
    assert_eq!(detail["view"]["current"], 2);
    assert_eq!(detail["view"]["history"].as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn job_added_with_a_terminal_code_starts_archived() {
    let mut browser = Browser::signed_in().await;
    let landing = browser
      .submit("/dashboard/jobs/add", "job_title=SRE&job_status=8&company_name=Acme")
      .await;
    assert!(landing.page()["view"]["jobs"].as_array().unwrap().is_empty());

    let archived = browser.page("/dashboard/jobs/archived").await;
    assert_eq!(archived["view"]["jobs"][0]["status_label"], "Declined");
  }

  #[tokio::test]
  async fn add_job_without_company_is_bad_request() {
    let mut browser = Browser::signed_in().await;
    let landing = browser
      .submit("/dashboard/jobs/add", "job_title=SRE&job_status=1")
      .await;
    assert_eq!(landing.status, StatusCode::BAD_REQUEST);
    assert!(landing.location.is_none());
  }

  #[tokio::test]
  async fn unknown_job_code_is_bad_request() {
    let mut browser = Browser::signed_in().await;
    let landing = browser
      .submit("/dashboard/jobs/add", "job_title=SRE&job_status=12&company_name=Acme")
      .await;
    assert_eq!(landing.status, StatusCode::BAD_REQUEST);

    let page = browser.page("/dashboard/jobs").await;
    assert!(page["view"]["jobs"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn missing_job_is_not_found() {
    let mut browser = Browser::signed_in().await;
    let response = browser.get("/dashboard/jobs/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    browser
      .store
      .add_salaries(vec![NewSalary {
        metro:      "Denver".into(),
        job_title:  "SRE".into(),
        avg_salary: 140_000,
      }])
      .await
      .unwrap();
    let landing = browser
      .submit("/dashboard/jobs/salary", "metro=Denver&job_title=SRE&job_id=999")
      .await;
    assert_eq!(landing.status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn edit_job_and_apply_reference_salary() {
    let mut browser = Browser::signed_in().await;
    browser
      .store
      .add_salaries(vec![NewSalary {
        metro:      "Denver".into(),
        job_title:  "SRE".into(),
        avg_salary: 140_000,
      }])
      .await
      .unwrap();
    let job_id = browser
      .add_job("job_title=SRE&job_status=2&company_name=Acme")
      .await;
    let url = format!("/dashboard/jobs/{job_id}");

    let detail = browser.page(&url).await;
    assert_eq!(detail["view"]["salary_options"]["metros"][0], "Denver");
    assert_eq!(detail["view"]["current"], 2);

    let landing = browser
      .submit(&url, "link=acme.io%2Fjobs&avg_salary=&notes=remote")
      .await;
    assert_eq!(landing.location(), url);
    assert_eq!(landing.page()["view"]["job"]["link"], "http://acme.io/jobs");
    assert_eq!(landing.page()["view"]["job"]["notes"], "remote");

    let landing = browser
      .submit("/dashboard/jobs/salary", &format!("metro=Boise&job_title=SRE&job_id={job_id}"))
      .await;
    assert_eq!(landing.status, StatusCode::NOT_FOUND);

    let landing = browser
      .submit("/dashboard/jobs/salary", &format!("metro=Denver&job_title=SRE&job_id={job_id}"))
      .await;
    assert_eq!(landing.location(), url);
    let detail = landing.page();
    assert_eq!(detail["view"]["job"]["avg_salary"], 140_000);
    assert_eq!(detail["view"]["job"]["link"], "http://acme.io/jobs");
    assert_eq!(detail["view"]["job"]["notes"], "remote");
    assert!(detail["view"]["salary_options"].is_null());
  }

  // ── Companies ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn company_edit_checks_state_code() {
    let mut browser = Browser::signed_in().await;
    browser
      .add_job("job_title=SRE&job_status=1&company_name=Acme")
      .await;
    let companies = browser.page("/dashboard/companies").await;
    let summary = &companies["view"]["companies"][0];
    assert_eq!(summary["job_count"], 1);
    let id = summary["company"]["company_id"].as_i64().unwrap();
    let url = format!("/dashboard/companies/{id}");

    let landing = browser.submit(&url, "state=ZZ").await;
    assert_eq!(landing.status, StatusCode::BAD_REQUEST);

    let landing = browser
      .submit(&url, "city=Denver&state=co&website=acme.io")
      .await;
    assert_eq!(landing.location(), url);
    assert_eq!(landing.flashes(), vec!["Change made for Acme"]);
    let page = landing.page();
    assert_eq!(page["view"]["company"]["state"], "CO");
    assert_eq!(page["view"]["company"]["website"], "http://acme.io");
    assert_eq!(page["view"]["jobs"].as_array().unwrap().len(), 1);
  }

  // ── Contacts ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn contact_lifecycle() {
    let mut browser = Browser::signed_in().await;
    let landing = browser
      .submit(
        "/dashboard/contacts/add",
        "fname=Grace&lname=Hopper&phone=555-867-5309&company_name=Navy&contact_event=1",
      )
      .await;
    assert_eq!(landing.location(), "/dashboard/contacts");
    assert_eq!(landing.flashes(), vec!["Grace Hopper added to your contacts"]);
    let card = &landing.page()["view"]["contacts"][0];
    assert_eq!(card["contact"]["phone"], "5558675309");
    assert_eq!(card["event_label"], "Reached Out");
    let id = card["contact"]["contact_id"].as_i64().unwrap();
    let company_id = card["company"]["company_id"].as_i64().unwrap();
    let url = format!("/dashboard/contacts/{id}");

    let landing = browser
      .submit("/dashboard/contact-status", &format!("contact_id={id}&contact_code=4"))
      .await;
    assert_eq!(landing.location(), url);
    assert!(landing.flashes().is_empty());
    assert_eq!(landing.page()["view"]["current"], 4);

    let landing = browser
      .submit(
        &url,
        &format!("fname=Grace&lname=Hopper&email=&phone=&company_id={company_id}"),
      )
      .await;
    assert_eq!(landing.location(), url);
    assert_eq!(landing.flashes(), vec!["Change made for Grace Hopper"]);
    let detail = landing.page();
    assert_eq!(detail["view"]["contact"]["phone"], "5558675309");
    let history = detail["view"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["contact_code"], 4);
  }

  // ── To-dos ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn todo_can_be_closed() {
    let mut browser = Browser::signed_in().await;
    let landing = browser
      .submit("/dashboard/todos/add", "description=Update+resume&todo_code=1")
      .await;
    assert_eq!(landing.location(), "/dashboard/todos");
    let todos = &landing.page()["view"]["todos"];
    let id = todos[0]["todo"]["todo_id"].as_i64().unwrap();
    assert_eq!(todos[0]["closed"], false);

    let landing = browser
      .submit("/dashboard/todo-status", &format!("todo_id={id}&todo_code=3"))
      .await;
    let todos = &landing.page()["view"]["todos"];
    assert_eq!(todos[0]["closed"], true);
    assert_eq!(todos[0]["status_label"], "Done");
  }

  // ── Profile ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn profile_hides_password_hash() {
    let mut browser = Browser::signed_in().await;
    let page = browser.page("/dashboard/profile").await;
    assert!(flash_messages(&page).is_empty());
    assert_eq!(page["view"]["user"]["email"], "ada@example.com");
    assert!(page["view"]["user"].get("password_hash").is_none());
  }
}

//! Handlers for `/dashboard/todos` and `/dashboard/todo-status`.

use axum::{
  Form,
  extract::State,
  response::Response,
};
use axum_extra::extract::SignedCookieJar;
use jobhunt_core::{
  codes::{CodeLabel, ToDoCode},
  model::NewToDo,
  store::TrackerStore,
  view::{self, ToDoCard},
};
use serde::Serialize;

use super::{redirect, render};
use crate::{
  AppState,
  auth::CurrentUser,
  error::{Error, store_err},
  forms::{AddToDoForm, ToDoStatusForm, optional_job},
};

#[derive(Debug, Serialize)]
pub struct ToDoList {
  pub todos: Vec<ToDoCard>,
  pub codes: Vec<CodeLabel>,
}

/// `GET /dashboard/todos`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let todos = view::todo_board(state.store.as_ref(), user)
    .await
    .map_err(store_err)?;
  Ok(render(jar, ToDoList {
    todos,
    codes: ToDoCode::all(),
  }))
}

/// `POST /dashboard/todos/add`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
  Form(form): Form<AddToDoForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let description = form.description.trim().to_string();
  if description.is_empty() {
    return Err(Error::BadRequest("a to-do needs a description".into()));
  }

  let input = NewToDo {
    description,
    job_id: optional_job(&form.job_id)?,
    code: ToDoCode::new(form.todo_code)?,
  };
  state.store.add_todo(user, input).await.map_err(store_err)?;

  Ok(redirect(jar, "/dashboard/todos"))
}

/// `POST /dashboard/todo-status`
pub async fn record_status<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  jar: SignedCookieJar,
  Form(form): Form<ToDoStatusForm>,
) -> Result<Response, Error>
where
  S: TrackerStore + 'static,
{
  let code = ToDoCode::new(form.todo_code)?;
  state
    .store
    .record_todo_event(user, form.todo_id, code)
    .await
    .map_err(store_err)?;

  Ok(redirect(jar, "/dashboard/todos"))
}

//! Reduction of append-only event logs to a current status.
//!
//! The current status of an entity is its most recent event. "Most recent"
//! is ordered by `date_created`, and among events with an identical timestamp
//! the one with the highest surrogate id wins, so the result never depends on
//! the order rows were loaded in.

use std::{collections::HashMap, hash::Hash};

use chrono::{DateTime, Utc};

use crate::{
  codes::{ContactCode, JobCode, ToDoCode},
  ids::{ContactEventId, ContactId, JobEventId, JobId, ToDoEventId, ToDoId},
  model::{
    ContactEvent, ContactEventRow, JobEvent, JobEventRow, ToDoEvent,
    ToDoEventRow,
  },
};

/// An event that records something about one target entity.
pub trait TrackedEvent {
  type Target: Copy + Eq + Hash;
  type Sequence: Copy + Ord;
  type Code: Copy;

  fn target(&self) -> Self::Target;
  fn code(&self) -> Self::Code;
  fn recorded_at(&self) -> DateTime<Utc>;
  /// The surrogate id; breaks timestamp ties.
  fn sequence(&self) -> Self::Sequence;

  fn recency(&self) -> (DateTime<Utc>, Self::Sequence) {
    (self.recorded_at(), self.sequence())
  }
}

/// Keep only the most recent event for each target.
///
/// The result is ordered newest first. Targets with no events simply do not
/// appear.
pub fn latest_per_target<E, I>(events: I) -> Vec<E>
where
  E: TrackedEvent,
  I: IntoIterator<Item = E>,
{
  let mut latest: HashMap<E::Target, E> = HashMap::new();
  for event in events {
    match latest.get(&event.target()) {
      Some(current) if current.recency() >= event.recency() => {}
      _ => {
        latest.insert(event.target(), event);
      }
    }
  }

  let mut out: Vec<E> = latest.into_values().collect();
  sort_newest_first(&mut out);
  out
}

/// The most recent event of a single history, if there is one.
pub fn latest<E: TrackedEvent>(history: &[E]) -> Option<&E> {
  history.iter().max_by_key(|e| e.recency())
}

/// The status code of the most recent event of a single history.
pub fn current_code<E: TrackedEvent>(history: &[E]) -> Option<E::Code> {
  latest(history).map(TrackedEvent::code)
}

/// Order a history newest first, using the same tie-break as
/// [`latest_per_target`].
pub fn sort_newest_first<E: TrackedEvent>(events: &mut [E]) {
  events.sort_by(|a, b| b.recency().cmp(&a.recency()));
}

// ─── Impls ───────────────────────────────────────────────────────────────────

impl TrackedEvent for JobEvent {
  type Target = JobId;
  type Sequence = JobEventId;
  type Code = JobCode;

  fn target(&self) -> JobId { self.job_id }
  fn code(&self) -> JobCode { self.job_code }
  fn recorded_at(&self) -> DateTime<Utc> { self.date_created }
  fn sequence(&self) -> JobEventId { self.job_event_id }
}

impl TrackedEvent for JobEventRow {
  type Target = JobId;
  type Sequence = JobEventId;
  type Code = JobCode;

  fn target(&self) -> JobId { self.event.target() }
  fn code(&self) -> JobCode { self.event.code() }
  fn recorded_at(&self) -> DateTime<Utc> { self.event.recorded_at() }
  fn sequence(&self) -> JobEventId { self.event.sequence() }
}

impl TrackedEvent for ContactEvent {
  type Target = ContactId;
  type Sequence = ContactEventId;
  type Code = ContactCode;

  fn target(&self) -> ContactId { self.contact_id }
  fn code(&self) -> ContactCode { self.contact_code }
  fn recorded_at(&self) -> DateTime<Utc> { self.date_created }
  fn sequence(&self) -> ContactEventId { self.contact_event_id }
}

impl TrackedEvent for ContactEventRow {
  type Target = ContactId;
  type Sequence = ContactEventId;
  type Code = ContactCode;

  fn target(&self) -> ContactId { self.event.target() }
  fn code(&self) -> ContactCode { self.event.code() }
  fn recorded_at(&self) -> DateTime<Utc> { self.event.recorded_at() }
  fn sequence(&self) -> ContactEventId { self.event.sequence() }
}

impl TrackedEvent for ToDoEvent {
  type Target = ToDoId;
  type Sequence = ToDoEventId;
  type Code = ToDoCode;

  fn target(&self) -> ToDoId { self.todo_id }
  fn code(&self) -> ToDoCode { self.todo_code }
  fn recorded_at(&self) -> DateTime<Utc> { self.date_created }
  fn sequence(&self) -> ToDoEventId { self.todo_event_id }
}

impl TrackedEvent for ToDoEventRow {
  type Target = ToDoId;
  type Sequence = ToDoEventId;
  type Code = ToDoCode;

  fn target(&self) -> ToDoId { self.event.target() }
  fn code(&self) -> ToDoCode { self.event.code() }
  fn recorded_at(&self) -> DateTime<Utc> { self.event.recorded_at() }
  fn sequence(&self) -> ToDoEventId { self.event.sequence() }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::ids::UserId;

  fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
  }

  fn event(id: i64, job: i64, code: u8, minutes: i64) -> JobEvent {
    JobEvent {
      job_event_id: JobEventId(id),
      user_id:      UserId(1),
      job_id:       JobId(job),
      job_code:     JobCode::new(code).unwrap(),
      date_created: at(minutes),
    }
  }

  #[test]
  fn picks_latest_timestamp_per_job() {
    let events = vec![
      event(1, 10, 1, 0),
      event(2, 10, 2, 5),
      event(3, 20, 1, 1),
      event(4, 10, 4, 3),
    ];

    let latest = latest_per_target(events);
    assert_eq!(latest.len(), 2);

    let job10 = latest.iter().find(|e| e.job_id == JobId(10)).unwrap();
    assert_eq!(job10.job_code.value(), 2);
    let job20 = latest.iter().find(|e| e.job_id == JobId(20)).unwrap();
    assert_eq!(job20.job_code.value(), 1);
  }

  #[test]
  fn result_is_newest_first() {
    let events = vec![event(1, 10, 1, 0), event(2, 20, 1, 9), event(3, 30, 1, 4)];
    let order: Vec<JobId> =
      latest_per_target(events).iter().map(|e| e.job_id).collect();
    assert_eq!(order, vec![JobId(20), JobId(30), JobId(10)]);
  }

  #[test]
  fn timestamp_tie_goes_to_highest_id() {
    // Same instant, inserted in both orders.
    let forward = vec![event(5, 10, 1, 0), event(6, 10, 7, 0)];
    let backward = vec![event(6, 10, 7, 0), event(5, 10, 1, 0)];

    assert_eq!(latest_per_target(forward)[0].job_event_id, JobEventId(6));
    assert_eq!(latest_per_target(backward)[0].job_event_id, JobEventId(6));
  }

  #[test]
  fn empty_history_yields_nothing() {
    assert!(latest_per_target(Vec::<JobEvent>::new()).is_empty());
    assert!(latest::<JobEvent>(&[]).is_none());
  }

  #[test]
  fn current_code_reads_latest_event() {
    assert_eq!(current_code::<JobEvent>(&[]), None);
    let history = vec![event(1, 10, 2, 0), event(2, 10, 4, 3), event(3, 10, 3, 1)];
    assert_eq!(current_code(&history), Some(JobCode::new(4).unwrap()));
  }

  #[test]
  fn sort_newest_first_orders_history() {
    let mut history = vec![event(1, 10, 1, 0), event(3, 10, 3, 2), event(2, 10, 2, 2)];
    sort_newest_first(&mut history);
    let ids: Vec<i64> = history.iter().map(|e| e.job_event_id.0).collect();
    assert_eq!(ids, vec![3, 2, 1]);
  }
}

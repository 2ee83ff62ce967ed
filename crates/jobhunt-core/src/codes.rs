//! Static status-code tables.
//!
//! Each event log stores a small integer code. The labels live here and are
//! seeded into the matching `*_codes` table when the store opens, so the
//! database can enforce them with foreign keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Job codes above this value are terminal: recording one archives the job.
pub const ARCHIVE_THRESHOLD: u8 = 5;

pub const JOB_CODES: &[(u8, &str)] = &[
  (1, "Interested"),
  (2, "Applied"),
  (3, "Phone Screen"),
  (4, "Interviewing"),
  (5, "Offer"),
  (6, "Accepted"),
  (7, "Rejected"),
  (8, "Declined"),
  (9, "No Longer Interested"),
];

pub const CONTACT_CODES: &[(u8, &str)] = &[
  (1, "Reached Out"),
  (2, "Email"),
  (3, "Phone Call"),
  (4, "Coffee"),
  (5, "Informational Interview"),
  (6, "Referral"),
  (7, "Thank-You Note"),
];

pub const TODO_CODES: &[(u8, &str)] = &[
  (1, "Open"),
  (2, "In Progress"),
  (3, "Done"),
  (4, "Dropped"),
];

/// One row of a code table, as shown in select boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeLabel {
  pub code:  u8,
  pub label: &'static str,
}

fn lookup(table: &'static [(u8, &'static str)], code: u8) -> Option<&'static str> {
  table.iter().find(|(c, _)| *c == code).map(|(_, label)| *label)
}

fn labels(table: &'static [(u8, &'static str)]) -> Vec<CodeLabel> {
  table.iter().map(|&(code, label)| CodeLabel { code, label }).collect()
}

macro_rules! code_type {
  ($(#[$meta:meta])* $name:ident, $table:ident, $table_name:literal) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(try_from = "u8", into = "u8")]
    pub struct $name(u8);

    impl $name {
      /// Name of the backing code table.
      pub const TABLE: &'static str = $table_name;

      pub fn new(code: u8) -> Result<Self> {
        match lookup($table, code) {
          Some(_) => Ok(Self(code)),
          None => Err(Error::UnknownCode { table: Self::TABLE, code }),
        }
      }

      pub fn value(self) -> u8 { self.0 }

      pub fn label(self) -> &'static str {
        lookup($table, self.0).unwrap_or("Unknown")
      }

      /// Every code in the table, in ascending order.
      pub fn all() -> Vec<CodeLabel> { labels($table) }
    }

    impl TryFrom<u8> for $name {
      type Error = Error;

      fn try_from(code: u8) -> Result<Self> { Self::new(code) }
    }

    impl From<$name> for u8 {
      fn from(code: $name) -> u8 { code.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
      }
    }
  };
}

code_type!(
  /// A job pipeline stage. Codes 1-5 are active stages, anything higher is
  /// terminal.
  JobCode,
  JOB_CODES,
  "job"
);
code_type!(
  /// The kind of interaction logged against a contact.
  ContactCode,
  CONTACT_CODES,
  "contact"
);
code_type!(ToDoCode, TODO_CODES, "todo");

impl JobCode {
  /// Whether recording this code takes the job out of the active pipeline.
  pub fn is_archived(self) -> bool { self.0 > ARCHIVE_THRESHOLD }
}

impl ToDoCode {
  pub fn is_closed(self) -> bool { matches!(self.0, 3 | 4) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn threshold_splits_active_from_archived() {
    assert!(!JobCode::new(1).unwrap().is_archived());
    assert!(!JobCode::new(5).unwrap().is_archived());
    assert!(JobCode::new(6).unwrap().is_archived());
    assert!(JobCode::new(7).unwrap().is_archived());
  }

  #[test]
  fn unknown_code_is_rejected() {
    let err = JobCode::new(0).unwrap_err();
    assert!(matches!(err, Error::UnknownCode { table: "job", code: 0 }));
    assert!(ContactCode::new(42).is_err());
  }

  #[test]
  fn labels_come_from_table() {
    assert_eq!(JobCode::new(2).unwrap().label(), "Applied");
    assert_eq!(ContactCode::new(4).unwrap().to_string(), "Coffee");
    assert!(ToDoCode::new(3).unwrap().is_closed());
  }

  #[test]
  fn deserialises_through_validation() {
    let code: JobCode = serde_json::from_str("7").unwrap();
    assert_eq!(code.value(), 7);
    assert!(serde_json::from_str::<JobCode>("12").is_err());
  }

  #[test]
  fn all_is_ordered_and_complete() {
    let all = JobCode::all();
    assert_eq!(all.len(), JOB_CODES.len());
    assert!(all.windows(2).all(|w| w[0].code < w[1].code));
  }
}

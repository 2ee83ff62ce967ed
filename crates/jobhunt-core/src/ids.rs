//! Surrogate identifiers.
//!
//! Every row is keyed by an SQLite `INTEGER PRIMARY KEY`. Each table gets its
//! own newtype so a job id can never be passed where a contact id is expected.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }

    impl FromStr for $name {
      type Err = std::num::ParseIntError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
      }
    }
  };
}

id_type!(UserId);
id_type!(CompanyId);
id_type!(JobId);
id_type!(
  /// Identifier of a single job event; doubles as the tie-breaker when two
  /// events share a timestamp.
  JobEventId
);
id_type!(ContactId);
id_type!(ContactEventId);
id_type!(ToDoId);
id_type!(ToDoEventId);
id_type!(SalaryId);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_with_surrounding_whitespace() {
    assert_eq!(" 42 ".parse::<JobId>().unwrap(), JobId(42));
  }

  #[test]
  fn rejects_non_numeric() {
    assert!("acme".parse::<CompanyId>().is_err());
  }

  #[test]
  fn serialises_as_bare_integer() {
    let json = serde_json::to_string(&ContactId(7)).unwrap();
    assert_eq!(json, "7");
  }
}

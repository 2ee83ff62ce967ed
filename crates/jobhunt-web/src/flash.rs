//! One-shot messages carried across a redirect.
//!
//! Messages queue up in the signed `jobhunt_flash` cookie and are consumed by
//! the next page render.

use axum_extra::extract::{
  SignedCookieJar,
  cookie::{Cookie, SameSite},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "jobhunt_flash";
/// Oldest messages are dropped once more than this many are queued.
pub const MAX_FLASHES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
  pub level:   FlashLevel,
  pub message: String,
}

fn decode(value: &str) -> Vec<Flash> {
  URL_SAFE_NO_PAD
    .decode(value)
    .ok()
    .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    .unwrap_or_default()
}

fn encode(flashes: &[Flash]) -> String {
  // Serializing a Vec of plain structs cannot fail.
  let json = serde_json::to_vec(flashes).unwrap_or_default();
  URL_SAFE_NO_PAD.encode(json)
}

/// Queue a message for the next rendered page.
pub fn push(
  jar: SignedCookieJar,
  level: FlashLevel,
  message: impl Into<String>,
) -> SignedCookieJar {
  let mut flashes = jar
    .get(FLASH_COOKIE)
    .map(|cookie| decode(cookie.value()))
    .unwrap_or_default();
  flashes.push(Flash {
    level,
    message: message.into(),
  });
  if flashes.len() > MAX_FLASHES {
    flashes.drain(..flashes.len() - MAX_FLASHES);
  }

  jar.add(
    Cookie::build((FLASH_COOKIE, encode(&flashes)))
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax),
  )
}

/// Drain every queued message. The returned jar clears the cookie.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
  match jar.get(FLASH_COOKIE) {
    Some(cookie) => {
      let flashes = decode(cookie.value());
      (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flashes)
    }
    None => (jar, Vec::new()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::auth::session_key;

  fn jar() -> SignedCookieJar { SignedCookieJar::new(session_key("flash test secret")) }

  #[test]
  fn messages_queue_in_order() {
    let jar = push(jar(), FlashLevel::Error, "first");
    let jar = push(jar, FlashLevel::Success, "second");

    let (jar, flashes) = take(jar);
    assert_eq!(flashes, vec![
      Flash {
        level:   FlashLevel::Error,
        message: "first".into(),
      },
      Flash {
        level:   FlashLevel::Success,
        message: "second".into(),
      },
    ]);
    assert!(jar.get(FLASH_COOKIE).is_none());
  }

  #[test]
  fn queue_keeps_only_the_newest_messages() {
    let jar = (0..MAX_FLASHES + 3).fold(jar(), |jar, n| {
      push(jar, FlashLevel::Success, format!("message {n}"))
    });

    let (_, flashes) = take(jar);
    let messages: Vec<_> = flashes.into_iter().map(|f| f.message).collect();
    let expected: Vec<_> = (3..MAX_FLASHES + 3).map(|n| format!("message {n}")).collect();
    assert_eq!(messages, expected);
  }

  #[test]
  fn take_without_cookie_is_empty() {
    let (_, flashes) = take(jar());
    assert!(flashes.is_empty());
  }

  #[test]
  fn garbage_value_decodes_to_nothing() {
    assert!(decode("%%not base64%%").is_empty());
    assert!(decode(&URL_SAFE_NO_PAD.encode(b"not json")).is_empty());
  }

  #[test]
  fn level_serializes_lowercase() {
    let json = serde_json::to_string(&FlashLevel::Success).unwrap();
    assert_eq!(json, "\"success\"");
  }
}

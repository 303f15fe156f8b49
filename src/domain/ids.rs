//! Synthetic identifiers: `<prefix>_<unix-millis>_<random-suffix>`.
//!
//! Uniqueness is practical, not cryptographic. No collision detection.

use crate::domain::types::TimestampUtc;
use rand::Rng;

const SUFFIX_LEN: usize = 7;
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Entity kind encoded in an id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    User,
    Agent,
    Process,
    Message,
    Event,
}

impl IdPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::User => "user",
            IdPrefix::Agent => "agent",
            IdPrefix::Process => "process",
            IdPrefix::Message => "msg",
            IdPrefix::Event => "ev",
        }
    }
}

/// Builds an id for `prefix` stamped with `at`.
pub fn generate_id(prefix: IdPrefix, at: &TimestampUtc) -> String {
    format!(
        "{}_{}_{}",
        prefix.as_str(),
        at.timestamp_millis(),
        random_suffix()
    )
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SUFFIX_ALPHABET.len());
            char::from(SUFFIX_ALPHABET[idx])
        })
        .collect()
}

/// Returns true if `id` has the `<prefix>_<millis>_<suffix>` shape.
pub fn has_prefix(id: &str, prefix: IdPrefix) -> bool {
    let mut parts = id.splitn(3, '_');
    let head = parts.next();
    let millis = parts.next();
    let suffix = parts.next();
    match (head, millis, suffix) {
        (Some(h), Some(m), Some(s)) => {
            h == prefix.as_str()
                && !m.is_empty()
                && m.chars().all(|c| c.is_ascii_digit())
                && s.len() == SUFFIX_LEN
        }
        _ => false,
    }
}

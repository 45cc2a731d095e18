//! Rule identifiers and collision-checked generation

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

use crate::error::RewriteError;

/// Opaque, stable identifier of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Source of candidate identifiers.
///
/// Implementations are not required to be collision free; callers go through
/// [`fresh_id`] which checks every candidate against the keys in use.
pub trait IdGenerator {
    fn generate(&mut self) -> RuleId;
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// Largest multiple of 36 that fits in a byte; bytes at or above it are
// rejected so every digit is equally likely.
const UNBIASED_LIMIT: u8 = 252;

// Bytes carrying the v4 version and variant bits
const UUID_FIXED_BYTES: [usize; 2] = [6, 8];

fn base36_digit(byte: u8) -> Option<char> {
    (byte < UNBIASED_LIMIT).then(|| BASE36[byte as usize % BASE36.len()] as char)
}

/// Short lowercase base-36 identifiers drawn from v4 UUID randomness
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(8)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&mut self) -> RuleId {
        let mut id = String::with_capacity(self.length);
        while id.len() < self.length {
            let uuid = Uuid::new_v4();
            let random = uuid
                .as_bytes()
                .iter()
                .enumerate()
                .filter(|(i, _)| !UUID_FIXED_BYTES.contains(i))
                .map(|(_, byte)| *byte);
            for byte in random {
                if id.len() == self.length {
                    break;
                }
                if let Some(c) = base36_digit(byte) {
                    id.push(c);
                }
            }
        }
        RuleId(id)
    }
}

/// Draw identifiers from `generator` until one is not taken.
pub fn fresh_id<G, F>(generator: &mut G, is_taken: F, max_attempts: u32) -> Result<RuleId, RewriteError>
where
    G: IdGenerator + ?Sized,
    F: Fn(&RuleId) -> bool,
{
    for attempt in 1..=max_attempts {
        let candidate = generator.generate();
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
        let collision = RewriteError::KeyCollision {
            id: candidate.to_string(),
        };
        warn!(attempt, max_attempts, "{}, regenerating", collision);
    }

    Err(RewriteError::IdSpaceExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashSet, VecDeque};

    struct Scripted(VecDeque<&'static str>);

    impl IdGenerator for Scripted {
        fn generate(&mut self) -> RuleId {
            RuleId::from(self.0.pop_front().unwrap_or("exhausted"))
        }
    }

    #[test]
    fn test_random_id_shape() {
        let mut gen = RandomIdGenerator::new(12);
        let id = gen.generate();
        assert_eq!(id.as_str().len(), 12);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_random_ids_longer_than_one_uuid() {
        let mut gen = RandomIdGenerator::new(40);
        assert_eq!(gen.generate().as_str().len(), 40);
    }

    #[test]
    fn test_base36_digits_are_uniform() {
        let mut counts = std::collections::HashMap::new();
        for byte in 0..=u8::MAX {
            if let Some(c) = base36_digit(byte) {
                *counts.entry(c).or_insert(0) += 1;
            }
        }
        assert_eq!(counts.len(), 36);
        assert!(counts.values().all(|&n| n == 7));
        assert_eq!(base36_digit(251), Some('z'));
        assert_eq!(base36_digit(252), None);
    }

    #[test]
    fn test_fresh_id_retries_on_collision() {
        let taken: HashSet<RuleId> = ["a", "b"].into_iter().map(RuleId::from).collect();
        let mut gen = Scripted(VecDeque::from(vec!["a", "b", "c"]));

        let id = fresh_id(&mut gen, |id| taken.contains(id), 5).unwrap();
        assert_eq!(id, RuleId::from("c"));
    }

    #[test]
    fn test_fresh_id_gives_up() {
        let mut gen = Scripted(VecDeque::from(vec!["a", "a", "a"]));
        let result = fresh_id(&mut gen, |id| id.as_str() == "a", 3);
        assert_eq!(result, Err(RewriteError::IdSpaceExhausted { attempts: 3 }));
    }

    #[test]
    fn test_rule_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RuleId::from("k1")).unwrap();
        assert_eq!(json, "\"k1\"");
    }
}

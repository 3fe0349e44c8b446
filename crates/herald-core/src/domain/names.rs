//! Event and queue names.
//!
//! Both are opaque keys. They only get meaning from the registry:
//! an `EventName` is unique as a handler key, a `QueueName` as a queue key.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of an event, e.g. `"log.error"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name of a registered queue, e.g. `"mem"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueName(String);

impl QueueName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_name_conversions {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&$ty> for $ty {
            fn from(name: &$ty) -> Self {
                name.clone()
            }
        }
    };
}

impl_name_conversions!(EventName);
impl_name_conversions!(QueueName);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn names_display_as_plain_strings() {
        assert_eq!(EventName::new("log.error").to_string(), "log.error");
        assert_eq!(QueueName::from("mem").to_string(), "mem");
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(EventName::new("user.created"), 1);
        assert_eq!(map.get("user.created"), Some(&1));
        assert_eq!(map.get("user.deleted"), None);
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&QueueName::new("mem")).unwrap();
        assert_eq!(json, "\"mem\"");
    }
}

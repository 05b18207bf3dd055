//! Shared test utilities for the notification workspace
//!
//! - `TestRedis`: Redis container with automatic cleanup (feature: "redis")
//! - `TestNames`: deterministic, per-test stream/group/recipient names
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["redis"] }
//! ```
//!
//! ```rust,ignore
//! use test_utils::{TestNames, TestRedis};
//!
//! #[tokio::test]
//! #[ignore] // Requires Docker
//! async fn my_stream_test() {
//!     let redis = TestRedis::new().await;
//!     let names = TestNames::from_test_name("my_stream_test");
//!     let stream = names.stream("user-events");
//! }
//! ```

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "redis")]
pub use redis::TestRedis;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Per-test naming so tests sharing a Redis instance never collide.
pub struct TestNames {
    seed: u64,
}

impl TestNames {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeds from the test name, so names are stable across runs.
    pub fn from_test_name(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Fresh, random names for tests that must not see earlier runs.
    pub fn random() -> Self {
        Self::new(Uuid::new_v4().as_u64_pair().0)
    }

    pub fn stream(&self, prefix: &str) -> String {
        format!("test:{}:{}", prefix, self.seed)
    }

    pub fn group(&self, prefix: &str) -> String {
        format!("test-{}-{}", prefix, self.seed)
    }

    pub fn consumer(&self, suffix: &str) -> String {
        format!("consumer-{}-{}", self.seed, suffix)
    }

    pub fn email(&self, local: &str) -> String {
        format!("{}+{}@example.com", local, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_deterministic() {
        let a = TestNames::from_test_name("my_test");
        let b = TestNames::from_test_name("my_test");

        assert_eq!(a.stream("events"), b.stream("events"));
        assert_eq!(a.email("ann"), b.email("ann"));
    }

    #[test]
    fn test_names_differ_between_tests() {
        let a = TestNames::from_test_name("test1");
        let b = TestNames::from_test_name("test2");

        assert_ne!(a.stream("events"), b.stream("events"));
        assert_ne!(a.group("workers"), b.group("workers"));
    }

    #[test]
    fn test_email_is_addressable() {
        let names = TestNames::new(7);
        assert_eq!(names.email("ann"), "ann+7@example.com");
    }
}

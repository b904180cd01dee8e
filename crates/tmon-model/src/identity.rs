use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Logical origin of a task (usually the declared type name of the task body).
pub type TaskKey = Arc<str>;

/// Identifies one in-flight task execution.
///
/// - `key`: groups tasks by logical origin;
/// - `instance`: tells apart tasks that are open at the same time under one key.
///
/// Two identities are equal only if both parts are equal.
/// Cloning is cheap: the key is reference counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskIdentity {
    key: TaskKey,
    instance: u64,
}

impl TaskIdentity {
    /// Create an identity from an explicit key and instance discriminator.
    ///
    /// The caller is responsible for keeping `(key, instance)` unique among concurrently open tasks.
    pub fn new(key: impl Into<TaskKey>, instance: u64) -> Self {
        Self {
            key: key.into(),
            instance,
        }
    }

    /// Returns the task key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns a clonable handle to the task key.
    #[inline]
    pub fn key_handle(&self) -> &TaskKey {
        &self.key
    }

    /// Returns the instance discriminator.
    #[inline]
    pub fn instance(&self) -> u64 {
        self.instance
    }
}

impl fmt::Display for TaskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:x}", self.key, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_needs_both_parts() {
        let a = TaskIdentity::new("io.Read", 1);
        let b = TaskIdentity::new("io.Read", 2);
        let c = TaskIdentity::new("io.Write", 1);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, TaskIdentity::new("io.Read", 1));
    }

    #[test]
    fn usable_as_hash_key() {
        let mut set = HashSet::new();
        set.insert(TaskIdentity::new("k", 1));
        set.insert(TaskIdentity::new("k", 1));
        set.insert(TaskIdentity::new("k", 2));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_uses_hex_instance() {
        let id = TaskIdentity::new("upload", 255);
        assert_eq!(id.to_string(), "upload#ff");
    }

    #[test]
    fn clones_share_the_key() {
        let id = TaskIdentity::new("shared", 7);
        let other = id.clone();
        assert!(Arc::ptr_eq(id.key_handle(), other.key_handle()));
    }
}

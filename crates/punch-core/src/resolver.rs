use std::sync::Arc;

use punch_store::TagStore;
use punch_types::EmployeeIdentity;
use tracing::debug;

use crate::error::{ClockError, ClockResult};

/// Maps a physical tag uid to the employee it is bound to.
#[derive(Clone)]
pub struct TagResolver {
    store: Arc<dyn TagStore>,
}

impl TagResolver {
    pub fn new(store: Arc<dyn TagStore>) -> Self {
        Self { store }
    }

    /// Resolve `tag_uid`, failing with [`ClockError::UnknownTag`] on a miss.
    pub async fn resolve(&self, tag_uid: &str) -> ClockResult<EmployeeIdentity> {
        let binding = self
            .store
            .lookup(tag_uid)
            .await
            .map_err(ClockError::Lookup)?
            .ok_or_else(|| ClockError::UnknownTag(tag_uid.to_string()))?;
        debug!(tag = tag_uid, employee = %binding.employee_id, "tag resolved");
        Ok(binding.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use punch_store::InMemoryTagStore;
    use punch_types::TagBinding;

    fn resolver() -> TagResolver {
        let store: InMemoryTagStore = vec![TagBinding::new("A1B2", "e1", "John Doe")]
            .into_iter()
            .collect();
        TagResolver::new(Arc::new(store))
    }

    #[tokio::test]
    async fn known_tag_resolves() {
        let identity = resolver().resolve("A1B2").await.unwrap();
        assert_eq!(identity, EmployeeIdentity::new("e1", "John Doe"));
    }

    #[tokio::test]
    async fn unknown_tag_fails() {
        let err = resolver().resolve("ZZZZ").await.unwrap_err();
        assert!(matches!(err, ClockError::UnknownTag(ref t) if t == "ZZZZ"));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn resolve_is_repeatable() {
        let r = resolver();
        let a = r.resolve("A1B2").await.unwrap();
        let b = r.resolve("A1B2").await.unwrap();
        assert_eq!(a, b);
    }
}

use crate::store::{DurableStore, StorageError};

pub const WELCOME_SEEN_KEY: &str = "hasSeenWelcome";

/// Any stored value counts as seen; the introductory screen is shown once.
pub fn has_seen_welcome<S: DurableStore>(store: &S) -> Result<bool, StorageError> {
    Ok(store.get(WELCOME_SEEN_KEY)?.is_some())
}

pub fn mark_welcome_seen<S: DurableStore>(store: &mut S) -> Result<(), StorageError> {
    store.set(WELCOME_SEEN_KEY, "true")
}

#[cfg(test)]
mod tests {
    use super::{has_seen_welcome, mark_welcome_seen};
    use crate::store::MemoryStore;

    #[test]
    fn flag_defaults_to_unseen() {
        let store = MemoryStore::new();
        assert!(!has_seen_welcome(&store).expect("check"));
    }

    #[test]
    fn marking_persists_the_flag() {
        let mut store = MemoryStore::new();
        mark_welcome_seen(&mut store).expect("mark");
        assert!(has_seen_welcome(&store).expect("check"));
    }
}

//! Request-scoped context.
//!
//! A [`Context`] is an immutable, persistent association list. Extending it
//! with [`Context::with_value`] returns a new context that shares the parent's
//! entries; the parent itself never changes. Entries are keyed by a Rust type
//! rather than a string, so a module that keeps its key type private is the
//! only code able to read or shadow its entry.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

type Value = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

struct Entry {
    key: TypeId,
    value: Value,
    parent: Option<Arc<Entry>>,
}

impl Context {
    /// An empty context, the root of every chain.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a child context where key `K` maps to `value`.
    ///
    /// An entry with the same key further up the chain is shadowed, not replaced.
    pub fn with_value<K, V>(&self, value: Arc<V>) -> Self
    where
        K: 'static,
        V: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Entry {
                key: TypeId::of::<K>(),
                value,
                parent: self.head.clone(),
            })),
        }
    }

    /// Looks up the nearest entry for key `K`.
    ///
    /// Returns `None` when the key is absent or the stored value is not a `V`.
    pub fn value<K, V>(&self) -> Option<Arc<V>>
    where
        K: 'static,
        V: Any + Send + Sync,
    {
        let key = TypeId::of::<K>();
        let entry = self.entries().find(|entry| entry.key == key)?;
        Arc::clone(&entry.value).downcast::<V>().ok()
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        std::iter::successors(self.head.as_deref(), |entry| entry.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("entries", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    struct KeyA;
    struct KeyB;

    #[test]
    fn test_background_is_empty() {
        let ctx = Context::background();
        assert!(ctx.is_empty());
        assert!(ctx.value::<KeyA, String>().is_none());
    }

    #[test]
    fn test_with_value_leaves_parent_untouched() {
        let parent = Context::background().with_value::<KeyA, _>(Arc::new(1u32));
        let child = parent.with_value::<KeyB, _>(Arc::new("b".to_string()));

        assert_eq!(parent.len(), 1);
        assert!(parent.value::<KeyB, String>().is_none());
        assert_eq!(*child.value::<KeyA, u32>().unwrap(), 1);
        assert_eq!(child.value::<KeyB, String>().unwrap().as_str(), "b");
    }

    #[test]
    fn test_nearest_entry_shadows() {
        let outer = Context::background().with_value::<KeyA, _>(Arc::new(1u32));
        let inner = outer.with_value::<KeyA, _>(Arc::new(2u32));

        assert_eq!(*outer.value::<KeyA, u32>().unwrap(), 1);
        assert_eq!(*inner.value::<KeyA, u32>().unwrap(), 2);
    }

    #[test]
    fn test_wrong_shape_is_absent() {
        let ctx = Context::background().with_value::<KeyA, _>(Arc::new(1u32));
        assert!(ctx.value::<KeyA, String>().is_none());
    }

    #[test]
    fn test_shared_across_threads() {
        let ctx = Context::background().with_value::<KeyA, _>(Arc::new(5u64));

        thread::scope(|scope| {
            for n in 0..4u64 {
                let ctx = ctx.clone();
                scope.spawn(move || {
                    let child = ctx.with_value::<KeyB, _>(Arc::new(n));
                    assert_eq!(*child.value::<KeyA, u64>().unwrap(), 5);
                    assert_eq!(*child.value::<KeyB, u64>().unwrap(), n);
                });
            }
        });

        assert!(ctx.value::<KeyB, u64>().is_none());
    }
}

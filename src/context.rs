use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A typed key for storing a value in a [`Context`].
///
/// The key is the implementing *type* itself; its `TypeId` identifies the
/// slot. A key type that is private to a module is therefore an unforgeable
/// token: no other code can read or shadow the binding, because no other code
/// can name the type. This is how the transaction handle stays invisible to
/// unrelated context users.
///
/// # Examples
///
/// ```rust
/// use sqlx_tx_context::{Context, ContextKey};
///
/// struct RequestId;
///
/// impl ContextKey for RequestId {
///     type Value = u64;
/// }
///
/// let ctx = Context::new().with_value::<RequestId>(42);
/// assert_eq!(ctx.value::<RequestId>(), Some(&42));
/// ```
pub trait ContextKey: 'static {
    /// The type of value stored under this key.
    type Value: Send + Sync + 'static;
}

/// An immutable, chainable key/value overlay used to carry request-scoped
/// state across call boundaries without explicit parameters.
///
/// Deriving a context with [`with_value`](Context::with_value) never mutates
/// the parent; the child holds an `Arc` link to the parent's chain, so any
/// number of derived contexts can share a parent safely. Lookups walk from
/// the most recent binding outward to the root, which means a re-bound key
/// shadows older bindings.
///
/// Cloning a `Context` is cheap (one `Arc` clone).
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

struct Node {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

impl Context {
    /// Creates an empty root context.
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Returns a new context derived from `self` with `value` bound under the
    /// key type `K`.
    ///
    /// `self` is left untouched; the returned context shares the existing
    /// chain structurally.
    #[must_use]
    pub fn with_value<K: ContextKey>(&self, value: K::Value) -> Self {
        Self {
            head: Some(Arc::new(Node {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Looks up the most recent binding for the key type `K`, walking from
    /// this context back to the root.
    pub fn value<K: ContextKey>(&self) -> Option<&K::Value> {
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            if n.key == TypeId::of::<K>() {
                return n.value.downcast_ref::<K::Value>();
            }
            node = n.parent.as_deref();
        }
        None
    }

    fn depth(&self) -> usize {
        let mut count = 0;
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            count += 1;
            node = n.parent.as_deref();
        }
        count
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("bindings", &self.depth())
            .finish()
    }
}

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Immutable, hierarchical key/value lookup passed along a call chain.
///
/// Keys are types: [`Context::with_value`] stores a value under its own
/// type, and [`Context::value`] finds the nearest entry of the requested
/// type, walking from the newest child back to the root. Deriving a
/// child never modifies the parent, so a `Context` can be shared freely
/// across threads and cloned for the price of an `Arc` bump.
///
/// ```
/// use context_attrs::context::Context;
///
/// #[derive(Debug, PartialEq)]
/// struct RequestId(&'static str);
///
/// let root = Context::background();
/// let ctx = root.with_value(RequestId("ID-xxxxx"));
///
/// assert_eq!(ctx.value::<RequestId>(), Some(&RequestId("ID-xxxxx")));
/// assert_eq!(root.value::<RequestId>(), None);
/// ```
#[derive(Clone, Default)]
pub struct Context {
    node: Option<Arc<Node>>,
}

struct Node {
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self { node: None }
    }

    /// Returns a child context holding `value`; an entry of the same type
    /// further up the chain is shadowed, not replaced.
    pub fn with_value<T>(&self, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            node: Some(Arc::new(Node {
                key: TypeId::of::<T>(),
                value: Box::new(value),
                parent: self.node.clone(),
            })),
        }
    }

    pub fn value<T>(&self) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        let key = TypeId::of::<T>();
        let mut cursor = self.node.as_deref();
        while let Some(node) = cursor {
            if node.key == key {
                return node.value.downcast_ref::<T>();
            }
            cursor = node.parent.as_deref();
        }
        None
    }

    /// Number of entries along the chain, shadowed ones included.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.node.as_deref();
        while let Some(node) = cursor {
            depth += 1;
            cursor = node.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("depth", &self.depth()).finish()
    }
}

use std::fmt::Debug;

use futures::stream::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A value that can be read at any time and watched for changes.
///
/// Writers replace the value; readers either take a snapshot with [`get`]
/// or follow it with [`watch`]. Watchers see the latest value, not every
/// intermediate one.
///
/// [`get`]: Property::get
/// [`watch`]: Property::watch
#[derive(Clone)]
pub struct Property<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the value and notify watchers.
    ///
    /// Returns whether the value changed; an equal value is not re-announced.
    pub(crate) fn set(&self, new_value: T) -> bool
    where
        T: PartialEq,
    {
        self.tx.send_if_modified(|current| {
            if *current == new_value {
                return false;
            }
            *current = new_value;
            true
        })
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Follow the value.
    ///
    /// The stream yields the current value first, then the latest value after
    /// each change. It ends when every writer is gone.
    pub fn watch(&self) -> impl Stream<Item = T> + Send + use<T> {
        WatchStream::new(self.tx.subscribe())
    }
}

impl<T: Clone + Send + Sync + Debug + 'static> Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

//! Tool-approval policy and its change-notifying store.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::logging;

/// How tool calls are approved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Every tool call is approved without asking.
    Auto,
    /// Calls that are not pre-approved need a human decision.
    #[default]
    Interactive,
}

impl PermissionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Auto => Self::Interactive,
            Self::Interactive => Self::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Interactive => "interactive",
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a mode name other than `auto` or `interactive`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission mode '{0}'")]
pub struct UnknownMode(pub String);

impl FromStr for PermissionMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "interactive" => Ok(Self::Interactive),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Callback invoked with the new mode after every actual change.
pub type ModeSubscriber = Arc<dyn Fn(PermissionMode) + Send + Sync>;

/// Holds the current [`PermissionMode`] and notifies subscribers on change.
///
/// Subscribers run synchronously, in registration order, on the thread that
/// changed the mode. A panicking subscriber is not caught here.
pub struct PermissionModeStore {
    mode: RwLock<PermissionMode>,
    subscribers: Mutex<Vec<ModeSubscriber>>,
}

impl Default for PermissionModeStore {
    fn default() -> Self {
        Self::new(PermissionMode::default())
    }
}

impl PermissionModeStore {
    pub fn new(mode: PermissionMode) -> Self {
        Self {
            mode: RwLock::new(mode),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self) -> PermissionMode {
        *self.mode.read()
    }

    /// Set the mode. Subscribers are only called if the value changed.
    pub fn set(&self, mode: PermissionMode) {
        let previous = {
            let mut current = self.mode.write();
            if *current == mode {
                return;
            }
            std::mem::replace(&mut *current, mode)
        };
        self.notify(previous, mode);
    }

    /// Flip between `auto` and `interactive`; returns the new mode.
    pub fn toggle(&self) -> PermissionMode {
        let (previous, next) = {
            let mut current = self.mode.write();
            let previous = *current;
            *current = previous.toggled();
            (previous, *current)
        };
        self.notify(previous, next);
        next
    }

    /// Register a subscriber. Keep the returned handle to unsubscribe later.
    pub fn subscribe<F>(&self, subscriber: F) -> ModeSubscriber
    where
        F: Fn(PermissionMode) + Send + Sync + 'static,
    {
        let handle: ModeSubscriber = Arc::new(subscriber);
        self.subscribers.lock().push(handle.clone());
        handle
    }

    /// Remove a subscriber by identity. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, handle: &ModeSubscriber) -> bool {
        let mut subscribers = self.subscribers.lock();
        match subscribers.iter().position(|s| same_subscriber(s, handle)) {
            Some(index) => {
                subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn notify(&self, previous: PermissionMode, next: PermissionMode) {
        logging::log_mode_change(previous, next);
        // Snapshot so subscribers may (un)subscribe or read the mode.
        let subscribers = self.subscribers.lock().clone();
        for subscriber in subscribers {
            subscriber(next);
        }
    }
}

fn same_subscriber(a: &ModeSubscriber, b: &ModeSubscriber) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn default_mode_is_interactive() {
        assert_eq!(PermissionModeStore::default().get(), PermissionMode::Interactive);
    }

    #[test]
    fn set_notifies_only_on_change() {
        let store = PermissionModeStore::new(PermissionMode::Interactive);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |mode| sink.lock().push(mode));

        store.set(PermissionMode::Interactive);
        store.set(PermissionMode::Auto);
        store.set(PermissionMode::Auto);

        assert_eq!(*seen.lock(), vec![PermissionMode::Auto]);
        assert_eq!(store.get(), PermissionMode::Auto);
    }

    #[test]
    fn toggle_flips_and_notifies() {
        let store = PermissionModeStore::new(PermissionMode::Auto);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(store.toggle(), PermissionMode::Interactive);
        assert_eq!(store.toggle(), PermissionMode::Auto);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let store = PermissionModeStore::default();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order = order.clone();
            store.subscribe(move |_| order.lock().push(label));
        }

        store.toggle();
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_by_identity() {
        let store = PermissionModeStore::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let other = store.subscribe(|_| {});

        assert!(store.unsubscribe(&handle));
        assert!(!store.unsubscribe(&handle));
        assert_eq!(store.subscriber_count(), 1);

        store.toggle();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(store.unsubscribe(&other));
    }

    #[test]
    fn subscriber_can_read_store_during_notification() {
        let store = Arc::new(PermissionModeStore::default());
        let observed = Arc::new(Mutex::new(None));
        let (weak, sink) = (Arc::downgrade(&store), observed.clone());
        store.subscribe(move |_| {
            if let Some(store) = weak.upgrade() {
                *sink.lock() = Some(store.get());
            }
        });

        store.set(PermissionMode::Auto);
        assert_eq!(*observed.lock(), Some(PermissionMode::Auto));
    }

    #[test]
    fn mode_parses_and_displays() {
        assert_eq!("AUTO".parse::<PermissionMode>(), Ok(PermissionMode::Auto));
        assert!("yolo".parse::<PermissionMode>().is_err());
        assert_eq!(PermissionMode::Interactive.to_string(), "interactive");
        assert_eq!(
            serde_json::from_str::<PermissionMode>("\"auto\"").unwrap(),
            PermissionMode::Auto
        );
    }
}

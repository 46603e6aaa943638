use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::value::{ObserverRegistry, ValueModel, ValueObserver};

/// The value kinds a preference store can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// A flat key/value settings backend. Implementations decide durability;
/// the adapter layer only needs get and put.
pub trait PreferenceStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, key: &str) -> Result<Option<PrefValue>, Self::Error>;
    fn put(&self, key: &str, value: PrefValue) -> Result<(), Self::Error>;
}

/// Presents one key of a [`PreferenceStore`] as an observable value.
///
/// Reads substitute the default when the key is missing or holds a value
/// of a different kind than the default, so a settings file edited by hand
/// cannot surface a type surprise to the UI. Writes notify observers only
/// when the stored value actually changed.
///
/// For infallible stores the adapter also implements
/// [`ValueModel<PrefValue>`], so a preference key can sit directly behind
/// any widget adapter.
pub struct PreferencesAdapter<S: PreferenceStore> {
    store: Arc<S>,
    key: String,
    default: PrefValue,
    observers: ObserverRegistry<PrefValue>,
}

impl<S: PreferenceStore> PreferencesAdapter<S> {
    pub fn new(store: Arc<S>, key: impl Into<String>, default: PrefValue) -> Self {
        Self {
            store,
            key: key.into(),
            default,
            observers: ObserverRegistry::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored value, or the default when the key is missing or holds a
    /// different kind.
    pub fn get(&self) -> Result<PrefValue, S::Error> {
        let stored = self.store.get(&self.key)?;
        Ok(match stored {
            Some(value) if same_kind(&value, &self.default) => value,
            Some(other) => {
                debug!(key = %self.key, ?other, "kind mismatch, using default");
                self.default.clone()
            }
            None => self.default.clone(),
        })
    }

    /// Writes the value and notifies observers if it differs from what the
    /// adapter read before.
    pub fn put(&self, value: PrefValue) -> Result<(), S::Error> {
        let old = self.get()?;
        if old == value {
            return Ok(());
        }
        self.store.put(&self.key, value.clone())?;
        self.observers.notify(Some(&old), Some(&value));
        Ok(())
    }

    pub fn get_bool(&self) -> Result<bool, S::Error> {
        Ok(match self.get()? {
            PrefValue::Bool(b) => b,
            _ => false,
        })
    }

    pub fn set_bool(&self, value: bool) -> Result<(), S::Error> {
        self.put(PrefValue::Bool(value))
    }

    pub fn get_int(&self) -> Result<i64, S::Error> {
        Ok(match self.get()? {
            PrefValue::Int(i) => i,
            _ => 0,
        })
    }

    pub fn set_int(&self, value: i64) -> Result<(), S::Error> {
        self.put(PrefValue::Int(value))
    }

    pub fn get_float(&self) -> Result<f64, S::Error> {
        Ok(match self.get()? {
            PrefValue::Float(f) => f,
            _ => 0.0,
        })
    }

    pub fn set_float(&self, value: f64) -> Result<(), S::Error> {
        self.put(PrefValue::Float(value))
    }

    pub fn get_str(&self) -> Result<String, S::Error> {
        Ok(match self.get()? {
            PrefValue::Str(s) => s,
            _ => String::new(),
        })
    }

    pub fn set_str(&self, value: impl Into<String>) -> Result<(), S::Error> {
        self.put(PrefValue::Str(value.into()))
    }
}

fn same_kind(a: &PrefValue, b: &PrefValue) -> bool {
    matches!(
        (a, b),
        (PrefValue::Bool(_), PrefValue::Bool(_))
            | (PrefValue::Int(_), PrefValue::Int(_))
            | (PrefValue::Float(_), PrefValue::Float(_))
            | (PrefValue::Str(_), PrefValue::Str(_))
    )
}

/// Observable-value view over an infallible store. The value is never
/// absent; a missing key reads as the default, and clearing is not part of
/// the store contract, so `set_value(None)` is a no-op.
impl<S> ValueModel<PrefValue> for PreferencesAdapter<S>
where
    S: PreferenceStore<Error = Infallible>,
{
    fn value(&self) -> Option<PrefValue> {
        let value = self.get().unwrap_or_else(|never| match never {});
        Some(value)
    }

    fn set_value(&self, new_value: Option<PrefValue>) {
        match new_value {
            Some(value) => {
                self.put(value).unwrap_or_else(|never| match never {});
            }
            None => {
                debug!(key = %self.key, "ignoring request to clear a preference");
            }
        }
    }

    fn add_observer(&self, observer: &Arc<ValueObserver<PrefValue>>) {
        self.observers.add(observer);
    }

    fn add_observer_strongly(&self, observer: Arc<ValueObserver<PrefValue>>) {
        self.observers.add_strongly(observer);
    }

    fn remove_observer(&self, observer: &Arc<ValueObserver<PrefValue>>) {
        self.observers.remove(observer);
    }
}

/// In-memory [`PreferenceStore`] used in tests and as a session-scoped
/// backend.
pub struct MemoryStore {
    values: RwLock<HashMap<String, PrefValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<PrefValue>, Infallible> {
        Ok(self.values.read().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: PrefValue) -> Result<(), Infallible> {
        self.values.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

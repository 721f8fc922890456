//! # Parameter keys, clearing categories, and init-time writes.
//!
//! Every known key is tagged with a [`ParamKeyType`]; `clear_all(category)`
//! removes exactly the keys tagged with that category. Keys absent from the
//! registry are treated as [`ParamKeyType::Persistent`].
//!
//! The loop clears categories on specific transitions:
//! - `ClearOnManagerStart` — once, at supervisor init, before any start
//! - `ClearOnOnroadTransition` — on every off-road → on-road edge
//! - `ClearOnOffroadTransition` — on every on-road → off-road edge
//! - `DevelopmentOnly` — at init, release builds only

/// Clearing category of a parameter key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKeyType {
    /// Never cleared by the supervisor.
    Persistent,
    /// Cleared once at supervisor initialization.
    ClearOnManagerStart,
    /// Cleared on every off-road → on-road transition.
    ClearOnOnroadTransition,
    /// Cleared on every on-road → off-road transition.
    ClearOnOffroadTransition,
    /// Cleared at initialization on release builds only.
    DevelopmentOnly,
}

/// Key → category registry. Keys not listed are `Persistent`.
static KEY_TYPES: &[(&str, ParamKeyType)] = &[
    ("DoShutdown", ParamKeyType::ClearOnManagerStart),
    ("DoReboot", ParamKeyType::ClearOnManagerStart),
    ("DoUninstall", ParamKeyType::ClearOnManagerStart),
    ("ResetConfig", ParamKeyType::ClearOnManagerStart),
    ("LastManagerExitReason", ParamKeyType::ClearOnManagerStart),
    ("IsOnroad", ParamKeyType::ClearOnManagerStart),
    ("IsOffroad", ParamKeyType::ClearOnManagerStart),
    ("CurrentRoute", ParamKeyType::ClearOnOnroadTransition),
    ("OnroadAlerts", ParamKeyType::ClearOnOnroadTransition),
    ("OffroadAlerts", ParamKeyType::ClearOnOffroadTransition),
    ("LastDriveStats", ParamKeyType::ClearOnOffroadTransition),
    ("JoystickDebugMode", ParamKeyType::DevelopmentOnly),
    ("LongitudinalManeuverMode", ParamKeyType::DevelopmentOnly),
];

/// Global shutdown triggers polled once per tick, in check order.
pub const SHUTDOWN_FLAGS: &[&str] = &["DoUninstall", "DoShutdown", "DoReboot", "ResetConfig"];

/// Key/default-value pairs written once at init for any key not already set.
static DEFAULT_PARAMS: &[(&str, &str)] = &[
    ("CompletedTrainingVersion", "0"),
    ("DisengageOnAccelerator", "0"),
    ("GsmMetered", "1"),
    ("HasAcceptedTerms", "0"),
    ("LanguageSetting", "main_en"),
    ("OpenpilotEnabledToggle", "1"),
    ("LongitudinalPersonality", "1"),
];

/// Returns the clearing category for a key.
pub fn key_type(key: &str) -> ParamKeyType {
    KEY_TYPES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, t)| *t)
        .unwrap_or(ParamKeyType::Persistent)
}

/// Transactional key/value store consumed by the supervisor.
///
/// Each clear/write is an independent, idempotent operation; the loop never
/// holds a cross-operation transaction.
pub trait ParamStore: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a value, replacing any existing one.
    fn put(&self, key: &str, value: &str);

    /// Removes a single key.
    fn remove(&self, key: &str);

    /// Lists all present keys.
    fn keys(&self) -> Vec<String>;

    /// Reads a boolean ("1" is true, anything else false).
    fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v == "1")
    }

    /// Writes a boolean as "1"/"0".
    fn put_bool(&self, key: &str, value: bool) {
        self.put(key, if value { "1" } else { "0" });
    }

    /// Removes every present key tagged with `category`.
    fn clear_all(&self, category: ParamKeyType) {
        for key in self.keys() {
            if key_type(&key) == category {
                self.remove(&key);
            }
        }
    }
}

/// Writes the default key/value pairs, never overwriting a present value.
pub fn write_default_params(store: &dyn ParamStore) {
    for (key, value) in DEFAULT_PARAMS {
        if store.get(key).is_none() {
            store.put(key, value);
        }
    }
}

/// Persists the on-road flag pair consumed by the safety-parameter setter.
pub fn write_onroad_params(started: bool, store: &dyn ParamStore) {
    store.put_bool("IsOnroad", started);
    store.put_bool("IsOffroad", !started);
}

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use gloo_storage::Storage as GlooStorage;
use ::log::warn;
use serde::{Serialize, de::DeserializeOwned};
use workitout_web_app::{
    ActiveWorkout, ActiveWorkoutRepository, Settings, SettingsRepository, log,
};

pub const KEY_TOKEN: &str = "token";
pub const KEY_SESSION: &str = "session";
pub const KEY_WORKOUT_TEMPLATES: &str = "workout templates";
pub const KEY_COMPLETED_WORKOUTS: &str = "completed workouts";
pub const KEY_ACTIVE_WORKOUT: &str = "active workout";
pub const KEY_SETTINGS: &str = "settings";
pub const KEY_LOG: &str = "log";

/// Keys holding data of the logged in user.
pub const USER_KEYS: [&str; 5] = [
    KEY_TOKEN,
    KEY_SESSION,
    KEY_WORKOUT_TEMPLATES,
    KEY_COMPLETED_WORKOUTS,
    KEY_ACTIVE_WORKOUT,
];

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str);
}

/// The local storage of the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        gloo_storage::LocalStorage::raw()
            .get_item(key)
            .ok()
            .flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        gloo_storage::LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| format!("failed to write \"{key}\": {err:?}"))
    }

    fn remove(&self, key: &str) {
        gloo_storage::LocalStorage::delete(key);
    }
}

/// In-memory store whose clones share their content.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage(Arc<Mutex<HashMap<String, String>>>);

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.0
            .lock()
            .map_err(|err| err.to_string())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.0.lock() {
            entries.remove(key);
        }
    }
}

/// JSON values stored under fixed keys. Entries that cannot be deserialized are removed.
#[derive(Debug, Clone, Default)]
pub struct LocalCache<K> {
    pub store: K,
}

impl<K: KeyValueStore> LocalCache<K> {
    pub const fn new(store: K) -> Self {
        Self { store }
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.get(key)?;
        match serde_json::from_str(&value) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("removing corrupt entry \"{key}\": {err}");
                self.store.remove(key);
                None
            }
        }
    }

    pub fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read(key).unwrap_or_default()
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), String> {
        let value = serde_json::to_string(value)
            .map_err(|err| format!("failed to serialize \"{key}\": {err}"))?;
        self.store.set(key, &value)
    }

    pub fn remove(&self, key: &str) {
        self.store.remove(key);
    }

    pub fn clear_user_data(&self) {
        for key in USER_KEYS {
            self.store.remove(key);
        }
    }
}

impl<K: KeyValueStore> SettingsRepository for LocalCache<K> {
    async fn read_settings(&self) -> Result<Settings, String> {
        Ok(self.read_or_default(KEY_SETTINGS))
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.write(KEY_SETTINGS, &settings)
    }
}

impl<K: KeyValueStore> ActiveWorkoutRepository for LocalCache<K> {
    async fn read_active_workout(&self) -> Result<Option<ActiveWorkout>, String> {
        Ok(self.read(KEY_ACTIVE_WORKOUT))
    }

    async fn write_active_workout(
        &self,
        active_workout: Option<ActiveWorkout>,
    ) -> Result<(), String> {
        match active_workout {
            Some(active_workout) => self.write(KEY_ACTIVE_WORKOUT, &active_workout),
            None => {
                self.remove(KEY_ACTIVE_WORKOUT);
                Ok(())
            }
        }
    }
}

// Called from within the logger, so nothing in here may log.
impl<K: KeyValueStore + Send + Sync + 'static> log::Repository for LocalCache<K> {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        Ok(self
            .store
            .get(KEY_LOG)
            .and_then(|value| serde_json::from_str(&value).ok())
            .unwrap_or_default())
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::prepend(&mut entries, entry);
        self.write(KEY_LOG, &entries).map_err(log::Error::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use workitout_web_app::{Theme, log::Repository};

    use super::*;

    fn cache() -> LocalCache<MemoryStorage> {
        LocalCache::new(MemoryStorage::default())
    }

    #[test]
    fn test_read_write() {
        let cache = cache();
        assert_eq!(cache.read::<Vec<u32>>("numbers"), None);
        cache.write("numbers", &[1, 2, 3]).unwrap();
        assert_eq!(cache.read::<Vec<u32>>("numbers"), Some(vec![1, 2, 3]));
        cache.remove("numbers");
        assert_eq!(cache.read::<Vec<u32>>("numbers"), None);
    }

    #[test]
    fn test_read_corrupt_entry() {
        let cache = cache();
        cache.store.set("numbers", "[1, 2,").unwrap();
        assert_eq!(cache.read_or_default::<Vec<u32>>("numbers"), Vec::<u32>::new());
        assert_eq!(cache.store.get("numbers"), None);
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::default();
        let cache = LocalCache::new(storage.clone());
        cache.write(KEY_SESSION, "Alice").unwrap();
        assert_eq!(storage.get(KEY_SESSION), Some("\"Alice\"".to_string()));
    }

    #[test]
    fn test_clear_user_data() {
        let cache = cache();
        for key in USER_KEYS {
            cache.write(key, &1).unwrap();
        }
        cache.write(KEY_SETTINGS, &Settings::default()).unwrap();
        cache.write(KEY_LOG, &Vec::<log::Entry>::new()).unwrap();

        cache.clear_user_data();

        for key in USER_KEYS {
            assert_eq!(cache.store.get(key), None);
        }
        assert!(cache.store.get(KEY_SETTINGS).is_some());
        assert!(cache.store.get(KEY_LOG).is_some());
    }

    #[test]
    fn test_settings() {
        let cache = cache();
        assert_eq!(block_on(cache.read_settings()).unwrap(), Settings::default());

        let settings = Settings {
            theme: Theme::Dark,
            prefill_weights: false,
            ..Settings::default()
        };
        block_on(cache.write_settings(settings)).unwrap();
        assert_eq!(block_on(cache.read_settings()).unwrap(), settings);

        cache.store.set(KEY_SETTINGS, "{").unwrap();
        assert_eq!(block_on(cache.read_settings()).unwrap(), Settings::default());
    }

    #[test]
    fn test_active_workout() {
        let cache = cache();
        assert_eq!(block_on(cache.read_active_workout()).unwrap(), None);

        let active_workout =
            ActiveWorkout::empty(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        block_on(cache.write_active_workout(Some(active_workout.clone()))).unwrap();
        assert_eq!(
            block_on(cache.read_active_workout()).unwrap(),
            Some(active_workout)
        );

        block_on(cache.write_active_workout(None)).unwrap();
        assert_eq!(block_on(cache.read_active_workout()).unwrap(), None);
        assert_eq!(cache.store.get(KEY_ACTIVE_WORKOUT), None);
    }

    #[test]
    fn test_log() {
        let cache = cache();
        assert_eq!(cache.read_entries().unwrap(), VecDeque::new());

        for i in 0..=log::MAX_ENTRIES {
            cache
                .write_entry(log::Entry {
                    time: String::new(),
                    level: ::log::Level::Info,
                    message: i.to_string(),
                })
                .unwrap();
        }

        let entries = cache.read_entries().unwrap();
        assert_eq!(entries.len(), log::MAX_ENTRIES);
        assert_eq!(entries[0].message, log::MAX_ENTRIES.to_string());
        assert_eq!(entries[log::MAX_ENTRIES - 1].message, "1");

        cache.store.set(KEY_LOG, "[{").unwrap();
        assert_eq!(cache.read_entries().unwrap(), VecDeque::new());
    }

    #[cfg(target_arch = "wasm32")]
    mod wasm {
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::super::*;

        #[wasm_bindgen_test]
        fn test_browser_storage() {
            let cache = LocalCache::new(BrowserStorage);
            cache.write("test", &[1, 2]).unwrap();
            assert_eq!(cache.read::<Vec<u32>>("test"), Some(vec![1, 2]));
            BrowserStorage.set("test", "[").unwrap();
            assert_eq!(cache.read::<Vec<u32>>("test"), None);
            assert_eq!(BrowserStorage.get("test"), None);
        }
    }
}

// ============================================================================
// CACHE STORE - Snapshots de recursos derivados del servidor
// ============================================================================
// Lecturas puntuales y sobrescrituras completas (sin merge): quien escribe
// construye el valor siguiente. snapshot/restore dan el rollback de las
// mutaciones optimistas. Se persiste como JSON versionado.
// ============================================================================

use std::collections::HashMap;
use std::rc::Rc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::cache::{CacheEntry, CacheKey, CacheOrigin};
use crate::utils::constants::{CACHE_STORAGE_KEY, CACHE_VERSION};
use crate::utils::storage::{load_json, save_json, StorageBackend};

#[derive(Serialize, Deserialize)]
struct PersistedCache {
    version: u32,
    entries: Vec<CacheEntry>,
}

pub struct CacheStore {
    entries: HashMap<CacheKey, CacheEntry>,
    storage: Rc<dyn StorageBackend>,
}

impl CacheStore {
    /// Carga la caché persistida; una versión de formato antigua se descarta
    pub fn load(storage: Rc<dyn StorageBackend>) -> Self {
        let entries = match load_json::<PersistedCache>(&*storage, CACHE_STORAGE_KEY) {
            Ok(Some(persisted)) if persisted.version >= CACHE_VERSION => {
                log::info!("✅ Caché cargada: {} recursos", persisted.entries.len());
                persisted
                    .entries
                    .into_iter()
                    .map(|e| (e.key, e))
                    .collect()
            }
            Ok(Some(persisted)) => {
                log::info!(
                    "❌ Caché inválida: versión antigua {} < {}, se descarta",
                    persisted.version,
                    CACHE_VERSION
                );
                HashMap::new()
            }
            Ok(None) => HashMap::new(),
            Err(e) => {
                log::error!("❌ Error cargando caché: {}", e);
                HashMap::new()
            }
        };
        Self { entries, storage }
    }

    fn persist(&self) {
        let persisted = PersistedCache {
            version: CACHE_VERSION,
            entries: self.entries.values().cloned().collect(),
        };
        if let Err(e) = save_json(&*self.storage, CACHE_STORAGE_KEY, &persisted) {
            log::error!("❌ Error persistiendo caché: {}", e);
        }
    }

    pub fn read(&self, key: CacheKey) -> Option<CacheEntry> {
        self.entries.get(&key).cloned()
    }

    /// Lectura tipada del recurso cacheado
    pub fn read_as<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        let entry = self.entries.get(&key)?;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("❌ Caché '{}' corrupta, se ignora: {}", key, e);
                None
            }
        }
    }

    pub fn origin(&self, key: CacheKey) -> Option<CacheOrigin> {
        self.entries.get(&key).map(|e| e.origin)
    }

    /// Sobrescritura completa de la entrada (sin merge)
    pub fn write<T: Serialize>(
        &mut self,
        key: CacheKey,
        value: &T,
        origin: CacheOrigin,
    ) -> Result<(), String> {
        let value = serde_json::to_value(value)
            .map_err(|e| format!("Error serializando caché '{}': {}", key, e))?;
        self.entries.insert(
            key,
            CacheEntry {
                key,
                value,
                origin,
                updated_at: chrono::Utc::now().timestamp(),
            },
        );
        log::info!("💾 Caché '{}' actualizada (origen {:?})", key, origin);
        self.persist();
        Ok(())
    }

    /// Captura el valor actual para un rollback posterior.
    /// None significa que la entrada aún no existe.
    pub fn snapshot(&self, key: CacheKey) -> Option<CacheEntry> {
        self.read(key)
    }

    /// Restaura el snapshot previo a una mutación fallida. Un snapshot None
    /// elimina la entrada (la mutación fue la primera escritura de la clave).
    pub fn restore(&mut self, key: CacheKey, snapshot: Option<CacheEntry>) {
        match snapshot {
            Some(entry) => {
                self.entries.insert(key, entry);
            }
            None => {
                self.entries.remove(&key);
            }
        }
        log::info!("↩️ Rollback de caché '{}'", key);
        self.persist();
    }
}

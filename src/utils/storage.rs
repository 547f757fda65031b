use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{de::DeserializeOwned, Serialize};

/// Backend de almacenamiento clave/valor para la cola y la caché.
/// Se inyecta como `Rc<dyn StorageBackend>` para que los tests sean
/// deterministas (sin tocar localStorage real).
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
}

/// Serializa y guarda un valor como JSON
pub fn save_json<T: Serialize>(
    storage: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let json = serde_json::to_string(value)
        .map_err(|e| format!("Error serializando datos: {}", e))?;
    storage.set(key, &json)
}

/// Carga y deserializa un valor JSON
pub fn load_json<T: DeserializeOwned>(
    storage: &dyn StorageBackend,
    key: &str,
) -> Result<Option<T>, String> {
    match storage.get(key)? {
        Some(json) => {
            let value = serde_json::from_str(&json)
                .map_err(|e| format!("Error deserializando datos: {}", e))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Storage en memoria (tests y builds nativas)
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Storage sobre localStorage del navegador
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn backing(&self) -> Result<web_sys::Storage, String> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| "No se pudo acceder a localStorage".to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.backing()?
            .get_item(key)
            .map_err(|_| "Error leyendo localStorage".to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.backing()?
            .set_item(key, value)
            .map_err(|_| "Error guardando en localStorage".to_string())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.backing()?
            .remove_item(key)
            .map_err(|_| "Error eliminando de localStorage".to_string())
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Clave lógica de recurso en la caché
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKey {
    Cart,
    Favorites,
    Orders,
}

impl CacheKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Cart => "cart",
            CacheKey::Favorites => "favorites",
            CacheKey::Orders => "orders",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origen del valor cacheado: confirmado por el servidor o especulación
/// local a la espera de resolución. Campo de primera clase para que la UI
/// y los tests no tengan que inferirlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOrigin {
    Server,
    Optimistic,
}

/// Snapshot de un recurso derivado del servidor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: serde_json::Value,
    pub origin: CacheOrigin,
    pub updated_at: i64,
}

impl CacheEntry {
    pub fn is_confirmed(&self) -> bool {
        self.origin == CacheOrigin::Server
    }
}

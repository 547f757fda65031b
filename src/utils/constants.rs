// ============================================================================
// CONSTANTES DE SINCRONIZACIÓN Y STORAGE
// ============================================================================

/// Clave de storage para la cola de acciones pendientes
pub const QUEUE_STORAGE_KEY: &str = "pending_actions_queue";

/// Clave de storage para la caché de recursos (carrito, favoritos, pedidos)
pub const CACHE_STORAGE_KEY: &str = "resource_cache";

/// Versión del formato de caché persistida; un cambio de formato la invalida
pub const CACHE_VERSION: u32 = 1;

/// Debounce de los eventos online/offline del navegador (señales inestables)
pub const NETWORK_DEBOUNCE_MS: u32 = 300;

/// Backoff exponencial del drenado: 60s, 120s, 240s... con tope de 5 minutos
pub const BACKOFF_BASE_SECONDS: i64 = 30;
pub const BACKOFF_MAX_SECONDS: i64 = 300;

/// Reintentos por tipo de acción: perder un pedido cuesta más que perder
/// una edición de carrito
pub const MAX_RETRIES_CART: u32 = 3;
pub const MAX_RETRIES_FAVORITE: u32 = 3;
pub const MAX_RETRIES_ORDER: u32 = 5;

/// Re-drenado periódico (ventanas de backoff vencidas) en wasm
pub const AUTO_SYNC_INTERVAL_MS: u32 = 2 * 60 * 1000;

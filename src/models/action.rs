use serde::{Deserialize, Serialize};

use crate::models::cache::CacheKey;
use crate::models::order::OrderDraft;
use crate::utils::constants::{
    BACKOFF_BASE_SECONDS, BACKOFF_MAX_SECONDS, MAX_RETRIES_CART, MAX_RETRIES_FAVORITE,
    MAX_RETRIES_ORDER,
};

/// Tipo de acción encolable (conjunto cerrado)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CartAdd,
    CartUpdateQuantity,
    CartClear,
    FavoriteToggle,
    OrderCreate,
}

impl ActionKind {
    /// Presupuesto de reintentos por tipo
    pub fn max_retries(&self) -> u32 {
        match self {
            ActionKind::CartAdd | ActionKind::CartUpdateQuantity | ActionKind::CartClear => {
                MAX_RETRIES_CART
            }
            ActionKind::FavoriteToggle => MAX_RETRIES_FAVORITE,
            ActionKind::OrderCreate => MAX_RETRIES_ORDER,
        }
    }

    /// Reproducir N veces converge al mismo estado final. Los toggles de
    /// favoritos se encolan con estado objetivo absoluto, así que también
    /// son seguros; crear pedido no lo es (ver clave de idempotencia).
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, ActionKind::OrderCreate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CartAdd => "cart_add",
            ActionKind::CartUpdateQuantity => "cart_update_quantity",
            ActionKind::CartClear => "cart_clear",
            ActionKind::FavoriteToggle => "favorite_toggle",
            ActionKind::OrderCreate => "order_create",
        }
    }
}

/// Datos de reproducción de una acción pendiente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayload {
    CartAdd {
        product_id: String,
        quantity: u32,
    },
    CartUpdateQuantity {
        product_id: String,
        quantity: u32,
    },
    CartClear,
    /// Estado objetivo absoluto, nunca un flip relativo: reproducirlo dos
    /// veces no des-hace el favorito
    FavoriteToggle {
        product_id: String,
        favorited: bool,
    },
    OrderCreate {
        draft: OrderDraft,
        idempotency_key: String,
    },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::CartAdd { .. } => ActionKind::CartAdd,
            ActionPayload::CartUpdateQuantity { .. } => ActionKind::CartUpdateQuantity,
            ActionPayload::CartClear => ActionKind::CartClear,
            ActionPayload::FavoriteToggle { .. } => ActionKind::FavoriteToggle,
            ActionPayload::OrderCreate { .. } => ActionKind::OrderCreate,
        }
    }

    /// Entrada de caché que toca esta acción
    pub fn cache_key(&self) -> CacheKey {
        match self {
            ActionPayload::CartAdd { .. }
            | ActionPayload::CartUpdateQuantity { .. }
            | ActionPayload::CartClear => CacheKey::Cart,
            ActionPayload::FavoriteToggle { .. } => CacheKey::Favorites,
            ActionPayload::OrderCreate { .. } => CacheKey::Orders,
        }
    }

    /// Descripción corta para logs y para la lista de cambios pendientes
    pub fn describe(&self) -> String {
        match self {
            ActionPayload::CartAdd {
                product_id,
                quantity,
            } => format!("agregar {} x{} al carrito", product_id, quantity),
            ActionPayload::CartUpdateQuantity {
                product_id,
                quantity,
            } => format!("fijar cantidad de {} en {}", product_id, quantity),
            ActionPayload::CartClear => "vaciar carrito".to_string(),
            ActionPayload::FavoriteToggle {
                product_id,
                favorited,
            } => {
                if *favorited {
                    format!("marcar favorito {}", product_id)
                } else {
                    format!("quitar favorito {}", product_id)
                }
            }
            ActionPayload::OrderCreate { .. } => "crear pedido".to_string(),
        }
    }
}

/// Estado de una acción en la cola. Las completadas se eliminan del store,
/// así que no hay variante "done".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    InFlight,
    Failed,
}

/// Registro durable de mutación pendiente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub id: String,
    pub payload: ActionPayload,
    pub status: ActionStatus,
    pub retry_count: u32,
    pub max_retries: u32,
    pub created_at: i64,
    #[serde(default)]
    pub last_attempt: Option<i64>,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl QueuedAction {
    pub fn new(payload: ActionPayload) -> Self {
        let max_retries = payload.kind().max_retries();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
            status: ActionStatus::Pending,
            retry_count: 0,
            max_retries,
            created_at: chrono::Utc::now().timestamp(),
            last_attempt: None,
            last_error: None,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    /// Ventana de backoff exponencial: 60s, 120s, 240s, tope 300s, más un
    /// jitter determinista derivado del id para desincronizar clientes
    pub fn backoff_seconds(&self) -> i64 {
        if self.retry_count == 0 {
            return 0;
        }
        let exponent = self.retry_count.min(8);
        let base = i64::min(
            BACKOFF_BASE_SECONDS * (1_i64 << exponent),
            BACKOFF_MAX_SECONDS,
        );
        base + self.jitter_seconds(base)
    }

    fn jitter_seconds(&self, base: i64) -> i64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.id.hash(&mut hasher);
        self.retry_count.hash(&mut hasher);
        (hasher.finish() % (base as u64 / 4 + 1)) as i64
    }

    /// Puerta de backoff: ¿toca ya el siguiente intento? No duerme; el
    /// procesador la consulta y corta la pasada si la cabeza no está lista.
    pub fn should_retry(&self, now: i64) -> bool {
        if self.retry_count == 0 {
            return true;
        }
        match self.last_attempt {
            Some(ts) => now - ts >= self.backoff_seconds(),
            None => true,
        }
    }

    pub fn register_attempt(&mut self, now: i64) {
        self.last_attempt = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(kind_payload: ActionPayload) -> QueuedAction {
        QueuedAction::new(kind_payload)
    }

    #[test]
    fn retry_budget_depends_on_kind() {
        let cart = action(ActionPayload::CartClear);
        let order = action(ActionPayload::OrderCreate {
            draft: OrderDraft::default(),
            idempotency_key: "k".to_string(),
        });
        assert_eq!(cart.max_retries, MAX_RETRIES_CART);
        assert_eq!(order.max_retries, MAX_RETRIES_ORDER);
        assert!(order.max_retries > cart.max_retries);
    }

    #[test]
    fn backoff_grows_exponentially_up_to_cap() {
        let mut a = action(ActionPayload::CartClear);

        a.retry_count = 1;
        let first = a.backoff_seconds();
        assert!((60..=75).contains(&first), "backoff inicial: {}", first);

        a.retry_count = 2;
        let second = a.backoff_seconds();
        assert!((120..=150).contains(&second), "segundo backoff: {}", second);

        a.retry_count = 6;
        let capped = a.backoff_seconds();
        assert!((300..=375).contains(&capped), "backoff con tope: {}", capped);
    }

    #[test]
    fn backoff_gate_blocks_until_window_elapses() {
        let mut a = action(ActionPayload::CartClear);
        assert!(a.should_retry(1_000));

        a.retry_count = 1;
        a.register_attempt(1_000);
        assert!(!a.should_retry(1_010));
        assert!(a.should_retry(1_000 + a.backoff_seconds()));
    }

    #[test]
    fn payload_serializes_with_stable_type_tag() {
        let payload = ActionPayload::FavoriteToggle {
            product_id: "P2".to_string(),
            favorited: true,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "favorite_toggle");
        assert_eq!(json["favorited"], true);
    }
}

// ============================================================================
// API CLIENT - SOLO COMUNICACIÓN HTTP (Stateless)
// ============================================================================
// NO tiene lógica de negocio; expone una operación async por mutación y
// devuelve el recurso autoritativo o un error categorizado
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::models::cart::Cart;
use crate::models::favorites::Favorites;
use crate::models::order::{Order, OrderDraft, Orders};

/// Error categorizado del API remoto. La categoría decide la política de
/// reintentos del procesador de cola.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Fallo de transporte (transitorio, reintentabile con backoff)
    #[error("error de red: {0}")]
    Network(String),
    /// 5xx del servidor (reintentabile con backoff)
    #[error("error del servidor (HTTP {status}): {message}")]
    Server { status: u16, message: String },
    /// Rechazo de negocio 4xx: reintentar no puede funcionar
    #[error("rechazo de validación: {0}")]
    Validation(String),
    /// Sesión inválida: la cola entera se pausa hasta re-autenticar
    #[error("sesión inválida, se requiere autenticación")]
    Auth,
}

impl ApiError {
    /// ¿Consume presupuesto de reintentos? Validación y auth fallan rápido.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server { .. })
    }

    /// Mapea un status HTTP a su categoría
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ApiError::Auth,
            500..=599 => ApiError::Server { status, message },
            _ => ApiError::Validation(message),
        }
    }
}

/// API remota de la tienda: una función async por tipo de mutación, más los
/// reads que alimentan la caché. Inyectada como `Rc<dyn CommerceApi>`.
#[async_trait(?Send)]
pub trait CommerceApi {
    async fn fetch_cart(&self) -> Result<Cart, ApiError>;
    async fn add_cart_item(&self, product_id: &str, quantity: u32) -> Result<Cart, ApiError>;
    async fn update_cart_item_quantity(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<Cart, ApiError>;
    async fn clear_cart(&self) -> Result<Cart, ApiError>;

    async fn fetch_favorites(&self) -> Result<Favorites, ApiError>;
    /// Fija el estado objetivo absoluto del favorito (no un flip relativo)
    async fn toggle_favorite(&self, product_id: &str, favorited: bool)
        -> Result<Favorites, ApiError>;

    async fn fetch_orders(&self) -> Result<Orders, ApiError>;
    async fn create_order(
        &self,
        draft: &OrderDraft,
        idempotency_key: &str,
    ) -> Result<Order, ApiError>;
}

#[cfg(target_arch = "wasm32")]
pub use http::HttpApiClient;

#[cfg(target_arch = "wasm32")]
mod http {
    use gloo_net::http::{Request, Response};
    use serde::{de::DeserializeOwned, Deserialize, Serialize};

    use super::{ApiError, CommerceApi};
    use crate::config::BACKEND_URL;
    use crate::models::cart::Cart;
    use crate::models::favorites::Favorites;
    use crate::models::order::{Order, OrderDraft, Orders};

    /// Cliente HTTP contra el backend /api/v1
    #[derive(Clone)]
    pub struct HttpApiClient {
        base_url: String,
    }

    impl HttpApiClient {
        pub fn new() -> Self {
            Self {
                base_url: BACKEND_URL.to_string(),
            }
        }

        pub fn with_base_url(base_url: &str) -> Self {
            Self {
                base_url: base_url.to_string(),
            }
        }

        fn url(&self, path: &str) -> String {
            format!("{}/api/v1{}", self.base_url, path)
        }

        async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
            if response.ok() {
                response
                    .json::<T>()
                    .await
                    .map_err(|e| ApiError::Network(format!("Parse error: {}", e)))
            } else {
                let status = response.status();
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(ApiError::from_status(status, message))
            }
        }

        async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
            let response = Request::get(&self.url(path))
                .send()
                .await
                .map_err(|e| ApiError::Network(format!("Network error: {}", e)))?;
            Self::parse(response).await
        }

        async fn post_json<B: Serialize, T: DeserializeOwned>(
            &self,
            path: &str,
            body: &B,
        ) -> Result<T, ApiError> {
            let response = Request::post(&self.url(path))
                .json(body)
                .map_err(|e| ApiError::Network(format!("Request build error: {}", e)))?
                .send()
                .await
                .map_err(|e| ApiError::Network(format!("Network error: {}", e)))?;
            Self::parse(response).await
        }

        async fn put_json<B: Serialize, T: DeserializeOwned>(
            &self,
            path: &str,
            body: &B,
        ) -> Result<T, ApiError> {
            let response = Request::put(&self.url(path))
                .json(body)
                .map_err(|e| ApiError::Network(format!("Request build error: {}", e)))?
                .send()
                .await
                .map_err(|e| ApiError::Network(format!("Network error: {}", e)))?;
            Self::parse(response).await
        }

        async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
            let response = Request::delete(&self.url(path))
                .send()
                .await
                .map_err(|e| ApiError::Network(format!("Network error: {}", e)))?;
            Self::parse(response).await
        }
    }

    impl Default for HttpApiClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[derive(Serialize)]
    struct CartItemRequest<'a> {
        product_id: &'a str,
        quantity: u32,
    }

    #[derive(Deserialize)]
    struct AckResponse {
        #[allow(dead_code)]
        message: String,
    }

    #[derive(Deserialize)]
    struct FavoriteCheckResponse {
        is_favorite: bool,
    }

    #[derive(Serialize)]
    struct FavoriteToggleRequest<'a> {
        product_id: &'a str,
    }

    #[derive(Serialize)]
    struct OrderCreateRequest<'a> {
        #[serde(flatten)]
        draft: &'a OrderDraft,
        idempotency_key: &'a str,
    }

    #[async_trait::async_trait(?Send)]
    impl CommerceApi for HttpApiClient {
        async fn fetch_cart(&self) -> Result<Cart, ApiError> {
            self.get("/cart").await
        }

        async fn add_cart_item(&self, product_id: &str, quantity: u32) -> Result<Cart, ApiError> {
            // el endpoint de add devuelve sólo la línea; el carrito completo
            // con totales se relee como estado autoritativo
            let _: AckResponse = self
                .post_json(
                    "/cart/add",
                    &CartItemRequest {
                        product_id,
                        quantity,
                    },
                )
                .await?;
            self.fetch_cart().await
        }

        async fn update_cart_item_quantity(
            &self,
            product_id: &str,
            quantity: u32,
        ) -> Result<Cart, ApiError> {
            let _: AckResponse = self
                .put_json(
                    "/cart/update",
                    &CartItemRequest {
                        product_id,
                        quantity,
                    },
                )
                .await?;
            self.fetch_cart().await
        }

        async fn clear_cart(&self) -> Result<Cart, ApiError> {
            let _: AckResponse = self.delete("/cart/clear").await?;
            self.fetch_cart().await
        }

        async fn fetch_favorites(&self) -> Result<Favorites, ApiError> {
            self.get("/favorites").await
        }

        async fn toggle_favorite(
            &self,
            product_id: &str,
            favorited: bool,
        ) -> Result<Favorites, ApiError> {
            // el backend expone un flip relativo; aquí se fuerza el estado
            // objetivo consultando el estado actual antes de conmutar
            let check: FavoriteCheckResponse = self
                .get(&format!("/favorites/check/{}", product_id))
                .await?;
            if check.is_favorite != favorited {
                let _: serde_json::Value = self
                    .post_json("/favorites/toggle", &FavoriteToggleRequest { product_id })
                    .await?;
            }
            self.fetch_favorites().await
        }

        async fn fetch_orders(&self) -> Result<Orders, ApiError> {
            self.get("/delta-sync/orders").await
        }

        async fn create_order(
            &self,
            draft: &OrderDraft,
            idempotency_key: &str,
        ) -> Result<Order, ApiError> {
            self.post_json(
                "/orders",
                &OrderCreateRequest {
                    draft,
                    idempotency_key,
                },
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(ApiError::from_status(401, String::new()), ApiError::Auth);
        assert_eq!(ApiError::from_status(403, String::new()), ApiError::Auth);
        assert!(matches!(
            ApiError::from_status(503, "down".to_string()),
            ApiError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ApiError::from_status(422, "sin stock".to_string()),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn only_network_and_server_errors_are_retryable() {
        assert!(ApiError::Network("timeout".to_string()).is_retryable());
        assert!(ApiError::Server {
            status: 500,
            message: String::new()
        }
        .is_retryable());
        assert!(!ApiError::Validation("sin stock".to_string()).is_retryable());
        assert!(!ApiError::Auth.is_retryable());
    }
}

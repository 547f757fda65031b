use serde::{Deserialize, Serialize};

use crate::models::cart::CartItem;

/// Datos de checkout que introduce el usuario (espejo del formulario)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(default)]
    pub delivery_instructions: Option<String>,
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            street_address: String::new(),
            city: String::new(),
            state: String::new(),
            country: "Egypt".to_string(),
            delivery_instructions: None,
            payment_method: "cash_on_delivery".to_string(),
            notes: None,
        }
    }
}

/// Pedido tal como lo devuelve el servidor (o especulativo, antes de confirmar)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Clave de idempotencia generada por el cliente; permite casar el
    /// pedido especulativo con la respuesta del servidor
    #[serde(default)]
    pub client_ref: Option<String>,
}

/// Historial de pedidos del usuario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Orders {
    pub orders: Vec<Order>,
}

impl Orders {
    /// Inserta un pedido nuevo al frente (orden cronológico inverso)
    pub fn apply_create(&mut self, order: Order) {
        self.orders.insert(0, order);
    }

    /// Sustituye el pedido especulativo con `client_ref` por la versión
    /// autoritativa del servidor; si no existe, la inserta al frente
    pub fn replace_by_client_ref(&mut self, server_order: Order, client_ref: &str) {
        match self
            .orders
            .iter()
            .position(|o| o.client_ref.as_deref() == Some(client_ref))
        {
            Some(idx) => self.orders[idx] = server_order,
            None => self.orders.insert(0, server_order),
        }
    }
}

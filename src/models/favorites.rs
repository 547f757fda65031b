use serde::{Deserialize, Serialize};

use crate::models::product::Product;

/// Entrada de favoritos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub product_id: String,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Lista de favoritos del usuario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Favorites {
    pub favorites: Vec<FavoriteEntry>,
    #[serde(default)]
    pub total: usize,
}

impl Favorites {
    pub fn is_favorite(&self, product_id: &str) -> bool {
        self.favorites.iter().any(|f| f.product_id == product_id)
    }

    /// Fija el estado objetivo absoluto de un favorito. Reaplicar el mismo
    /// objetivo cualquier número de veces converge al mismo estado.
    pub fn apply_toggle(&mut self, product_id: &str, favorited: bool) {
        if favorited {
            if !self.is_favorite(product_id) {
                self.favorites.push(FavoriteEntry {
                    product_id: product_id.to_string(),
                    product: None,
                    created_at: None,
                });
            }
        } else {
            self.favorites.retain(|f| f.product_id != product_id);
        }
        self.total = self.favorites.len();
    }
}

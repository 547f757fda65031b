use serde::{Deserialize, Serialize};

use crate::models::product::Product;

/// Detalle de descuento aplicado a una línea del carrito
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountDetails {
    pub discount_type: String,
    pub discount_value: f64,
    #[serde(default)]
    pub discount_source_id: Option<String>,
}

impl Default for DiscountDetails {
    fn default() -> Self {
        Self {
            discount_type: "none".to_string(),
            discount_value: 0.0,
            discount_source_id: None,
        }
    }
}

/// Línea del carrito, con precios unitarios tal como los guarda el backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    pub original_unit_price: f64,
    pub final_unit_price: f64,
    #[serde(default)]
    pub discount_details: DiscountDetails,
    #[serde(default)]
    pub bundle_group_id: Option<String>,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            quantity,
            original_unit_price: product.price,
            final_unit_price: product.price,
            discount_details: DiscountDetails::default(),
            bundle_group_id: None,
        }
    }
}

/// Carrito con totales calculados
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub total_discount: f64,
    pub total: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .sum()
    }

    /// Recalcula subtotal, descuento y total a partir de los precios
    /// unitarios, con el mismo redondeo a 2 decimales que el backend
    pub fn recompute_totals(&mut self) {
        let mut subtotal = 0.0;
        let mut total_discount = 0.0;
        for item in &self.items {
            let qty = item.quantity as f64;
            subtotal += item.original_unit_price * qty;
            total_discount += (item.original_unit_price - item.final_unit_price) * qty;
        }
        self.subtotal = round2(subtotal);
        self.total_discount = round2(total_discount);
        self.total = round2(subtotal - total_discount);
    }

    /// Agregar al carrito: incrementa la línea existente o crea una nueva,
    /// igual que el endpoint de add del backend
    pub fn apply_add(&mut self, product: &Product, quantity: u32) {
        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id && i.bundle_group_id.is_none())
        {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem::from_product(product, quantity)),
        }
        self.recompute_totals();
    }

    /// Fija la cantidad de una línea (absoluta); cantidad 0 la elimina,
    /// igual que el endpoint de update del backend
    pub fn apply_set_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
        } else if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
        self.recompute_totals();
    }

    /// Vacía el carrito (idempotente)
    pub fn apply_clear(&mut self) {
        self.items.clear();
        self.recompute_totals();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: f64) -> Product {
        Product::new(id, id, price)
    }

    #[test]
    fn add_increments_existing_line() {
        let mut cart = Cart::default();
        cart.apply_add(&product("P1", 10.0), 2);
        cart.apply_add(&product("P1", 10.0), 3);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.quantity_of("P1"), 5);
        assert_eq!(cart.total, 50.0);
    }

    #[test]
    fn set_quantity_is_absolute_and_zero_removes() {
        let mut cart = Cart::default();
        cart.apply_add(&product("P1", 10.0), 2);
        cart.apply_set_quantity("P1", 5);
        assert_eq!(cart.quantity_of("P1"), 5);

        // reaplicar la misma cantidad converge al mismo estado
        cart.apply_set_quantity("P1", 5);
        assert_eq!(cart.quantity_of("P1"), 5);

        cart.apply_set_quantity("P1", 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn totals_track_discounts_with_rounding() {
        let mut cart = Cart::default();
        cart.apply_add(&product("P1", 12.5), 2);
        cart.items[0].final_unit_price = 10.0;
        cart.recompute_totals();
        assert_eq!(cart.subtotal, 25.0);
        assert_eq!(cart.total_discount, 5.0);
        assert_eq!(cart.total, 20.0);
    }

    #[test]
    fn clear_on_empty_cart_is_noop() {
        let mut cart = Cart::default();
        cart.apply_clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total, 0.0);
    }
}

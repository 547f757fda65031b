use serde::{Deserialize, Serialize};

/// Producto del catálogo (sólo los campos que consume este núcleo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    pub fn new(id: &str, name: &str, price: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            name_ar: None,
            price,
            sku: String::new(),
            stock_quantity: 0,
            image_url: None,
        }
    }
}

pub mod mutation_viewmodel;
pub mod sync_viewmodel;

pub use mutation_viewmodel::MutationViewModel;
pub use sync_viewmodel::SyncViewModel;

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    use async_trait::async_trait;

    use crate::models::cart::{Cart, CartItem};
    use crate::models::favorites::Favorites;
    use crate::models::order::{Order, OrderDraft, Orders};
    use crate::models::product::Product;
    use crate::services::api_client::{ApiError, CommerceApi};
    use crate::services::network_monitor::NetworkStatus;
    use crate::utils::storage::MemoryStorage;
    use crate::CommerceCore;

    /// API simulada con estado de servidor propio, fallos programables y
    /// registro de llamadas para asertar el orden de reproducción
    pub(crate) struct MockApi {
        server_cart: RefCell<Cart>,
        server_favorites: RefCell<Favorites>,
        server_orders: RefCell<Orders>,
        calls: RefCell<Vec<String>>,
        fail_queue: RefCell<VecDeque<ApiError>>,
        fail_on: RefCell<HashMap<String, ApiError>>,
        after_call: RefCell<Option<Box<dyn Fn()>>>,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self {
                server_cart: RefCell::new(Cart::default()),
                server_favorites: RefCell::new(Favorites::default()),
                server_orders: RefCell::new(Orders::default()),
                calls: RefCell::new(Vec::new()),
                fail_queue: RefCell::new(VecDeque::new()),
                fail_on: RefCell::new(HashMap::new()),
                after_call: RefCell::new(None),
            }
        }

        /// Falla la siguiente llamada, sea cual sea
        pub fn fail_next(&self, error: ApiError) {
            self.fail_queue.borrow_mut().push_back(error);
        }

        /// Falla (una vez) la próxima llamada de la operación dada
        pub fn fail_on_call(&self, op: &str, error: ApiError) {
            self.fail_on.borrow_mut().insert(op.to_string(), error);
        }

        /// Hook tras cada llamada exitosa (p. ej. tirar la red a mitad de drenado)
        pub fn on_call<F: Fn() + 'static>(&self, hook: F) {
            *self.after_call.borrow_mut() = Some(Box::new(hook));
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        pub fn clear_calls(&self) {
            self.calls.borrow_mut().clear();
        }

        pub fn server_cart(&self) -> Cart {
            self.server_cart.borrow().clone()
        }

        pub fn server_favorites(&self) -> Favorites {
            self.server_favorites.borrow().clone()
        }

        pub fn server_set_cart_quantity(&self, product_id: &str, quantity: u32) {
            let mut cart = self.server_cart.borrow_mut();
            cart.apply_add(&Product::new(product_id, product_id, 1.0), quantity);
        }

        fn begin(&self, op: &str, line: String) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(line);
            if let Some(error) = self.fail_queue.borrow_mut().pop_front() {
                return Err(error);
            }
            if let Some(error) = self.fail_on.borrow_mut().remove(op) {
                return Err(error);
            }
            Ok(())
        }

        fn finish(&self) {
            if let Some(hook) = self.after_call.borrow().as_ref() {
                hook();
            }
        }
    }

    #[async_trait(?Send)]
    impl CommerceApi for MockApi {
        async fn fetch_cart(&self) -> Result<Cart, ApiError> {
            self.begin("fetch_cart", "fetch_cart".to_string())?;
            let cart = self.server_cart.borrow().clone();
            self.finish();
            Ok(cart)
        }

        async fn add_cart_item(&self, product_id: &str, quantity: u32) -> Result<Cart, ApiError> {
            self.begin("cart_add", format!("cart_add {} {}", product_id, quantity))?;
            {
                let mut cart = self.server_cart.borrow_mut();
                // incremento sobre la línea existente, como el backend real
                match cart.items.iter_mut().find(|i| i.product_id == product_id) {
                    Some(item) => item.quantity += quantity,
                    None => cart
                        .items
                        .push(CartItem::from_product(&Product::new(product_id, product_id, 10.0), quantity)),
                }
                cart.recompute_totals();
            }
            let cart = self.server_cart.borrow().clone();
            self.finish();
            Ok(cart)
        }

        async fn update_cart_item_quantity(
            &self,
            product_id: &str,
            quantity: u32,
        ) -> Result<Cart, ApiError> {
            self.begin(
                "cart_update",
                format!("cart_update {} {}", product_id, quantity),
            )?;
            self.server_cart
                .borrow_mut()
                .apply_set_quantity(product_id, quantity);
            let cart = self.server_cart.borrow().clone();
            self.finish();
            Ok(cart)
        }

        async fn clear_cart(&self) -> Result<Cart, ApiError> {
            self.begin("cart_clear", "cart_clear".to_string())?;
            self.server_cart.borrow_mut().apply_clear();
            let cart = self.server_cart.borrow().clone();
            self.finish();
            Ok(cart)
        }

        async fn fetch_favorites(&self) -> Result<Favorites, ApiError> {
            self.begin("fetch_favorites", "fetch_favorites".to_string())?;
            let favorites = self.server_favorites.borrow().clone();
            self.finish();
            Ok(favorites)
        }

        async fn toggle_favorite(
            &self,
            product_id: &str,
            favorited: bool,
        ) -> Result<Favorites, ApiError> {
            self.begin(
                "favorite_set",
                format!("favorite_set {} {}", product_id, favorited),
            )?;
            self.server_favorites
                .borrow_mut()
                .apply_toggle(product_id, favorited);
            let favorites = self.server_favorites.borrow().clone();
            self.finish();
            Ok(favorites)
        }

        async fn fetch_orders(&self) -> Result<Orders, ApiError> {
            self.begin("fetch_orders", "fetch_orders".to_string())?;
            let orders = self.server_orders.borrow().clone();
            self.finish();
            Ok(orders)
        }

        async fn create_order(
            &self,
            _draft: &OrderDraft,
            idempotency_key: &str,
        ) -> Result<Order, ApiError> {
            self.begin("order_create", format!("order_create {}", idempotency_key))?;
            let order = Order {
                id: format!("srv-{}", self.server_orders.borrow().orders.len() + 1),
                status: "confirmed".to_string(),
                items: self.server_cart.borrow().items.clone(),
                total: self.server_cart.borrow().total,
                created_at: None,
                client_ref: Some(idempotency_key.to_string()),
            };
            self.server_orders.borrow_mut().apply_create(order.clone());
            self.finish();
            Ok(order)
        }
    }

    pub(crate) struct Fixture {
        pub core: CommerceCore,
        pub api: Rc<MockApi>,
    }

    /// Núcleo completo cableado sobre la API simulada y storage en memoria
    pub(crate) fn fixture(status: NetworkStatus) -> Fixture {
        let api = Rc::new(MockApi::new());
        let storage = Rc::new(MemoryStorage::new());
        let core = CommerceCore::new(api.clone(), storage);
        core.monitor.set_status(status);
        Fixture { core, api }
    }
}

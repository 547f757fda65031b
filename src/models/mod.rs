pub mod action;
pub mod cache;
pub mod cart;
pub mod favorites;
pub mod order;
pub mod product;
pub mod sync;

pub use action::{ActionKind, ActionPayload, ActionStatus, QueuedAction};
pub use cache::{CacheEntry, CacheKey, CacheOrigin};
pub use cart::{Cart, CartItem, DiscountDetails};
pub use favorites::{FavoriteEntry, Favorites};
pub use order::{Order, OrderDraft, Orders};
pub use product::Product;
pub use sync::{DrainSummary, MutationOutcome, MutationPhase, SyncState};

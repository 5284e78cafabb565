use std::sync::Arc;

use async_trait::async_trait;
use domain::{Order, OrderId, Product, ProductId, ShoppingCart, User, UserId};

use crate::Result;

/// Storage for catalog products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Loads a product by id.
    async fn get(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists every product ordered by name.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Inserts or replaces a product.
    async fn save(&self, product: &Product) -> Result<()>;
}

/// Storage for shopping carts. A user owns at most one cart.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Loads the cart owned by a user.
    async fn get_for_user(&self, user_id: UserId) -> Result<Option<ShoppingCart>>;

    /// Inserts or replaces a cart together with all of its lines.
    async fn save(&self, cart: &ShoppingCart) -> Result<()>;
}

/// Storage for placed orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Loads an order by id.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists a user's orders, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Inserts or replaces an order.
    async fn save(&self, order: &Order) -> Result<()>;
}

/// Storage for registered users.
///
/// Usernames and emails are unique, compared case-insensitively. `save`
/// fails with [`StoreError::Conflict`](crate::StoreError::Conflict) when
/// another user already holds either.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Lists every user ordered by username.
    async fn list(&self) -> Result<Vec<User>>;

    async fn save(&self, user: &User) -> Result<()>;
}

/// Liveness probe for the backing store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// The full set of repositories the application layer works against.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    /// Builds the set from one store that implements every repository.
    pub fn from_store<S>(store: S) -> Self
    where
        S: ProductRepository
            + CartRepository
            + OrderRepository
            + UserRepository
            + StoreHealth
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            products: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            users: store.clone(),
            health: store,
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

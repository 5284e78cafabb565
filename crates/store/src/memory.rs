use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{Order, OrderId, Product, ProductId, ShoppingCart, User, UserId};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    repository::{CartRepository, OrderRepository, ProductRepository, StoreHealth, UserRepository},
};

/// In-memory store implementing every repository.
///
/// Cloning is cheap and clones share the same data, which lets tests keep a
/// handle for inspection while the application owns another.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    carts: Arc<RwLock<HashMap<UserId, ShoppingCart>>>,
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all data.
    pub async fn clear(&self) {
        self.products.write().await.clear();
        self.carts.write().await.clear();
        self.orders.write().await.clear();
        self.users.write().await.clear();
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let store = self.products.read().await;
        let mut products: Vec<_> = store.values().cloned().collect();
        products.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        Ok(products)
    }

    async fn save(&self, product: &Product) -> Result<()> {
        self.products
            .write()
            .await
            .insert(product.id(), product.clone());
        Ok(())
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn get_for_user(&self, user_id: UserId) -> Result<Option<ShoppingCart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn save(&self, cart: &ShoppingCart) -> Result<()> {
        self.carts
            .write()
            .await
            .insert(cart.user_id(), cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let store = self.orders.read().await;
        let mut orders: Vec<_> = store
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at()));
        Ok(orders)
    }

    async fn save(&self, order: &Order) -> Result<()> {
        self.orders.write().await.insert(order.id(), order.clone());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let store = self.users.read().await;
        Ok(store
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let store = self.users.read().await;
        Ok(store
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let store = self.users.read().await;
        let mut users: Vec<_> = store.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn save(&self, user: &User) -> Result<()> {
        let mut store = self.users.write().await;

        // Check under the write lock so two registrations cannot both pass
        for other in store.values().filter(|u| u.id != user.id) {
            if other.username.eq_ignore_ascii_case(&user.username) {
                return Err(StoreError::Conflict(format!(
                    "username '{}' is already taken",
                    user.username
                )));
            }
            if other.email.eq_ignore_ascii_case(&user.email) {
                return Err(StoreError::Conflict(format!(
                    "email '{}' is already registered",
                    user.email
                )));
            }
        }

        store.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, Role, TaxRate};

    fn widget(name: &str) -> Product {
        Product::new(name, Money::from_cents(1000), 5).unwrap()
    }

    #[tokio::test]
    async fn product_save_and_get() {
        let store = InMemoryStore::new();
        let product = widget("Widget");

        ProductRepository::save(&store, &product).await.unwrap();

        let loaded = ProductRepository::get(&store, product.id()).await.unwrap();
        assert_eq!(loaded, Some(product));
    }

    #[tokio::test]
    async fn product_save_replaces_existing() {
        let store = InMemoryStore::new();
        let mut product = widget("Widget");
        ProductRepository::save(&store, &product).await.unwrap();

        product.set_stock(42).unwrap();
        ProductRepository::save(&store, &product).await.unwrap();

        let loaded = ProductRepository::get(&store, product.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.stock(), 42);
        assert_eq!(ProductRepository::list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn product_list_is_sorted_by_name() {
        let store = InMemoryStore::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            ProductRepository::save(&store, &widget(name)).await.unwrap();
        }

        let names: Vec<_> = ProductRepository::list(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, ["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn cart_is_keyed_by_user() {
        let store = InMemoryStore::new();
        let user_id = UserId::new();
        let mut cart = ShoppingCart::new(user_id);
        cart.add_item(ProductId::new(), "Widget", Money::from_cents(100), 2)
            .unwrap();

        CartRepository::save(&store, &cart).await.unwrap();

        assert_eq!(store.get_for_user(user_id).await.unwrap(), Some(cart));
        assert!(store.get_for_user(UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn orders_listed_newest_first() {
        let store = InMemoryStore::new();
        let user_id = UserId::new();
        let mut cart = ShoppingCart::new(user_id);
        cart.add_item(ProductId::new(), "Widget", Money::from_cents(100), 1)
            .unwrap();

        let first = Order::place(user_id, &cart, TaxRate::STANDARD).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = Order::place(user_id, &cart, TaxRate::STANDARD).unwrap();
        OrderRepository::save(&store, &first).await.unwrap();
        OrderRepository::save(&store, &second).await.unwrap();

        let other = Order::place(UserId::new(), &cart, TaxRate::STANDARD).unwrap();
        OrderRepository::save(&store, &other).await.unwrap();

        let orders = store.list_for_user(user_id).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id(), second.id());
        assert_eq!(orders[1].id(), first.id());
        assert_eq!(store.order_count().await, 3);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = InMemoryStore::new();
        let alice = User::new("alice", "alice@example.com", vec![Role::Customer]);
        UserRepository::save(&store, &alice).await.unwrap();

        let impostor = User::new("ALICE", "other@example.com", vec![Role::Customer]);
        let result = UserRepository::save(&store, &impostor).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = InMemoryStore::new();
        let alice = User::new("alice", "alice@example.com", vec![Role::Customer]);
        UserRepository::save(&store, &alice).await.unwrap();

        let other = User::new("bob", "Alice@Example.com", vec![Role::Customer]);
        let result = UserRepository::save(&store, &other).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn resaving_a_user_is_not_a_conflict() {
        let store = InMemoryStore::new();
        let mut alice = User::new("alice", "alice@example.com", vec![Role::Customer]);
        UserRepository::save(&store, &alice).await.unwrap();

        alice.roles.push(Role::CustomerService);
        UserRepository::save(&store, &alice).await.unwrap();

        let loaded = store.get_by_username("alice").await.unwrap().unwrap();
        assert!(loaded.has_role(Role::CustomerService));
        assert_eq!(
            store.get_by_email("ALICE@example.com").await.unwrap(),
            Some(loaded)
        );
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryStore::new();
        ProductRepository::save(&store, &widget("Widget")).await.unwrap();
        store.clear().await;
        assert!(ProductRepository::list(&store).await.unwrap().is_empty());
    }
}

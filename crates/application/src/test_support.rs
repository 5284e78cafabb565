//! Shared fixture for handler tests.

use std::sync::Arc;

use domain::{Money, Product, Role, User};
use store::{InMemoryStore, ProductRepository, Repositories, UserRepository};

use crate::mediator::Mediator;
use crate::payment::InMemoryPaymentGateway;

pub(crate) struct Fixture {
    pub store: InMemoryStore,
    pub payments: InMemoryPaymentGateway,
    pub mediator: Mediator,
}

impl Fixture {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let payments = InMemoryPaymentGateway::new();
        let mediator = Mediator::new(
            Repositories::from_store(store.clone()),
            Arc::new(payments.clone()),
        );
        Self {
            store,
            payments,
            mediator,
        }
    }

    pub async fn user(&self, username: &str, role: Role) -> User {
        let user = User::new(username, format!("{username}@example.com"), vec![role]);
        UserRepository::save(&self.store, &user).await.unwrap();
        user
    }

    pub async fn customer(&self, username: &str) -> User {
        self.user(username, Role::Customer).await
    }

    pub async fn admin(&self, username: &str) -> User {
        self.user(username, Role::Administrator).await
    }

    pub async fn agent(&self, username: &str) -> User {
        self.user(username, Role::CustomerService).await
    }

    pub async fn product(&self, name: &str, cents: i64, stock: i64) -> Product {
        let product = Product::new(name, Money::from_cents(cents), stock).unwrap();
        ProductRepository::save(&self.store, &product).await.unwrap();
        product
    }

    pub async fn stock_of(&self, product: &Product) -> i64 {
        ProductRepository::get(&self.store, product.id())
            .await
            .unwrap()
            .unwrap()
            .stock()
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    CartId, Money, Order, OrderId, OrderItem, OrderParts, Product, ProductId, Role, ShoppingCart,
    ShoppingCartItem, User, UserId,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    repository::{CartRepository, OrderRepository, ProductRepository, StoreHealth, UserRepository},
};

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed store implementing every repository.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with a default pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        let id = ProductId::from_uuid(row.try_get::<Uuid, _>("id")?);
        Product::with_id(
            id,
            row.try_get::<String, _>("name")?,
            Money::from_cents(row.try_get("price_cents")?),
            row.try_get("stock")?,
        )
        .map_err(|e| corrupt("products", e))
    }

    fn row_to_cart_item(row: &PgRow) -> Result<ShoppingCartItem> {
        Ok(ShoppingCartItem {
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            product_name: row.try_get("product_name")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            quantity: quantity_from_row(row, "shopping_cart_items")?,
        })
    }

    fn row_to_order_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity: quantity_from_row(row, "order_items")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        })
    }

    fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(Order::restore(OrderParts {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            items,
            subtotal: Money::from_cents(row.try_get("subtotal_cents")?),
            tax: Money::from_cents(row.try_get("tax_cents")?),
            total_amount: Money::from_cents(row.try_get("total_cents")?),
            status: status.parse().map_err(|e| corrupt("orders", e))?,
            payment_id: row.try_get("payment_id")?,
            created_at,
        }))
    }

    async fn user_from_row(&self, row: PgRow) -> Result<User> {
        let id: Uuid = row.try_get("id")?;
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|role| role.parse::<Role>().map_err(|e| corrupt("user_roles", e)))
        .collect::<Result<Vec<_>>>()?;

        Ok(User {
            id: UserId::from_uuid(id),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            roles,
        })
    }

    async fn order_items_by_order(
        &self,
        order_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<OrderItem>>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, product_id, product_name, unit_price_cents, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in &rows {
            let order_id: Uuid = row.try_get("order_id")?;
            grouped
                .entry(order_id)
                .or_default()
                .push(Self::row_to_order_item(row)?);
        }
        Ok(grouped)
    }
}

fn corrupt(table: &'static str, reason: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt {
        table,
        reason: reason.to_string(),
    }
}

fn quantity_from_row(row: &PgRow, table: &'static str) -> Result<u32> {
    let quantity: i64 = row.try_get("quantity")?;
    u32::try_from(quantity).map_err(|e| corrupt(table, e))
}

/// Turns unique violations into [`StoreError::Conflict`].
fn map_unique_violation(error: sqlx::Error, message: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = error
        && db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        return StoreError::Conflict(message());
    }
    StoreError::Database(error)
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, price_cents, stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, price_cents, stock FROM products ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn save(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, stock)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, price_cents = EXCLUDED.price_cents, stock = EXCLUDED.stock
            "#,
        )
        .bind(product.id().as_uuid())
        .bind(product.name())
        .bind(product.price().cents())
        .bind(product.stock())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CartRepository for PostgresStore {
    async fn get_for_user(&self, user_id: UserId) -> Result<Option<ShoppingCart>> {
        let Some(cart_id) =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM shopping_carts WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT product_id, product_name, unit_price_cents, quantity
            FROM shopping_cart_items
            WHERE cart_id = $1
            ORDER BY position
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(Self::row_to_cart_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(ShoppingCart::restore(
            CartId::from_uuid(cart_id),
            user_id,
            items,
        )))
    }

    async fn save(&self, cart: &ShoppingCart) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO shopping_carts (id, user_id) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(cart.id().as_uuid())
        .bind(cart.user_id().as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || format!("user {} already has a cart", cart.user_id()))
        })?;

        sqlx::query("DELETE FROM shopping_cart_items WHERE cart_id = $1")
            .bind(cart.id().as_uuid())
            .execute(&mut *tx)
            .await?;

        for (position, item) in cart.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO shopping_cart_items
                    (cart_id, position, product_id, product_name, unit_price_cents, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(cart.id().as_uuid())
            .bind(position as i32)
            .bind(item.product_id.as_uuid())
            .bind(&item.product_name)
            .bind(item.unit_price.cents())
            .bind(i64::from(item.quantity))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(cart_id = %cart.id(), lines = cart.items().len(), "cart saved");

        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let Some(row) = sqlx::query(
            r#"
            SELECT id, user_id, subtotal_cents, tax_cents, total_cents, status, payment_id, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let mut items = self.order_items_by_order(&[id.as_uuid()]).await?;
        let items = items.remove(&id.as_uuid()).unwrap_or_default();

        Self::row_to_order(&row, items).map(Some)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, subtotal_cents, tax_cents, total_cents, status, payment_id, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut items = self.order_items_by_order(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| Self::row_to_order(row, items.remove(&id).unwrap_or_default()))
            .collect()
    }

    async fn save(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, subtotal_cents, tax_cents, total_cents, status, payment_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET status = EXCLUDED.status, payment_id = EXCLUDED.payment_id
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.user_id().as_uuid())
        .bind(order.subtotal().cents())
        .bind(order.tax().cents())
        .bind(order.total_amount().cents())
        .bind(order.status().as_str())
        .bind(order.payment_id())
        .bind(order.created_at())
        .fetch_one(&mut *tx)
        .await?
        .try_get::<bool, _>("inserted")?;

        // Items are immutable once placed
        if inserted {
            for (position, item) in order.items().iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO order_items
                        (order_id, position, product_id, product_name, unit_price_cents, quantity)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(order.id().as_uuid())
                .bind(position as i32)
                .bind(item.product_id.as_uuid())
                .bind(&item.product_name)
                .bind(item.unit_price.cents())
                .bind(i64::from(item.quantity))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        tracing::debug!(order_id = %order.id(), status = %order.status(), inserted, "order saved");

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn get(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, email FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.user_from_row(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row =
            sqlx::query("SELECT id, username, email FROM users WHERE LOWER(username) = LOWER($1)")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.user_from_row(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, email FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.user_from_row(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT id, username, email FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(self.user_from_row(row).await?);
        }
        Ok(users)
    }

    async fn save(&self, user: &User) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username, email = EXCLUDED.email
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                format!(
                    "username '{}' or email '{}' is already registered",
                    user.username, user.email
                )
            })
        })?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for role in &user.roles {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user.id.as_uuid())
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl StoreHealth for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

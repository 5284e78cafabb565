use async_trait::async_trait;
use domain::Product;

use crate::authorization::require_administrator;
use crate::commands::{CreateProduct, UpdateStock};
use crate::error::{ApplicationError, Result};
use crate::mediator::{Handler, Mediator};
use crate::queries::{GetProduct, ListProducts};

#[async_trait]
impl Handler<CreateProduct> for Mediator {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, command: CreateProduct) -> Result<Product> {
        let actor = self.actor(command.actor).await?;
        require_administrator(&actor, "create product")?;

        let product = Product::new(command.name.trim(), command.price, command.stock)?;
        self.repositories.products.save(&product).await?;

        tracing::info!(product_id = %product.id(), name = product.name(), "Product created");
        Ok(product)
    }
}

#[async_trait]
impl Handler<UpdateStock> for Mediator {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, command: UpdateStock) -> Result<Product> {
        let actor = self.actor(command.actor).await?;
        require_administrator(&actor, "manage product inventory")?;

        let mut product = self
            .repositories
            .products
            .get(command.product_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Product", command.product_id))?;

        let previous = product.stock();
        product.set_stock(command.stock)?;
        self.repositories.products.save(&product).await?;

        metrics::counter!("inventory_updates_total").increment(1);
        tracing::info!(
            product_id = %product.id(),
            previous,
            stock = product.stock(),
            "Stock level updated"
        );
        Ok(product)
    }
}

#[async_trait]
impl Handler<GetProduct> for Mediator {
    async fn handle(&self, query: GetProduct) -> Result<Product> {
        self.repositories
            .products
            .get(query.product_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Product", query.product_id))
    }
}

#[async_trait]
impl Handler<ListProducts> for Mediator {
    async fn handle(&self, _query: ListProducts) -> Result<Vec<Product>> {
        Ok(self.repositories.products.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use domain::{Money, ProductId};

    use crate::test_support::Fixture;

    use super::*;

    #[tokio::test]
    async fn test_admin_updates_stock() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;
        let widget = fx.product("Widget", 1000, 10).await;

        let updated = fx
            .mediator
            .send(UpdateStock {
                actor: admin.id,
                product_id: widget.id(),
                stock: 0,
            })
            .await
            .unwrap();

        assert_eq!(updated.stock(), 0);
        assert_eq!(fx.stock_of(&widget).await, 0);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_update_stock() {
        let fx = Fixture::new();
        let agent = fx.agent("agent").await;
        let widget = fx.product("Widget", 1000, 10).await;

        let result = fx
            .mediator
            .send(UpdateStock {
                actor: agent.id,
                product_id: widget.id(),
                stock: 50,
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Unauthorized { .. })));
        assert_eq!(fx.stock_of(&widget).await, 10);
    }

    #[tokio::test]
    async fn test_negative_stock_is_rejected() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;
        let widget = fx.product("Widget", 1000, 10).await;

        let result = fx
            .mediator
            .send(UpdateStock {
                actor: admin.id,
                product_id: widget.id(),
                stock: -1,
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Validation(_))));
        assert_eq!(fx.stock_of(&widget).await, 10);
    }

    #[tokio::test]
    async fn test_stock_update_for_missing_product() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;

        let result = fx
            .mediator
            .send(UpdateStock {
                actor: admin.id,
                product_id: ProductId::new(),
                stock: 1,
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_and_list_products() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;

        for name in ["Zebra mug", "Apron"] {
            fx.mediator
                .send(CreateProduct {
                    actor: admin.id,
                    name: name.to_string(),
                    price: Money::from_cents(1250),
                    stock: 4,
                })
                .await
                .unwrap();
        }

        let products = fx.mediator.send(ListProducts).await.unwrap();
        let names: Vec<_> = products.iter().map(Product::name).collect();
        assert_eq!(names, ["Apron", "Zebra mug"]);

        let loaded = fx
            .mediator
            .send(GetProduct {
                product_id: products[0].id(),
            })
            .await
            .unwrap();
        assert_eq!(loaded, products[0]);
    }

    #[tokio::test]
    async fn test_customer_cannot_create_product() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;

        let result = fx
            .mediator
            .send(CreateProduct {
                actor: shopper.id,
                name: "Widget".to_string(),
                price: Money::from_cents(100),
                stock: 1,
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Unauthorized { .. })));
    }
}

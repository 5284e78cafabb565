use async_trait::async_trait;
use domain::{CartTotal, DomainError, ShoppingCart};

use crate::commands::{AddItemToCart, RemoveItemFromCart};
use crate::error::{ApplicationError, Result};
use crate::mediator::{Handler, Mediator};
use crate::queries::{CalculateCartTotal, GetCart};

#[async_trait]
impl Handler<AddItemToCart> for Mediator {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, command: AddItemToCart) -> Result<ShoppingCart> {
        let actor = self.actor(command.user_id).await?;
        let product = self
            .repositories
            .products
            .get(command.product_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Product", command.product_id))?;

        let mut cart = self
            .repositories
            .carts
            .get_for_user(actor.id)
            .await?
            .unwrap_or_else(|| ShoppingCart::new(actor.id));

        // Stock must cover what is already in the cart plus the new units
        let requested = cart
            .quantity_of(product.id())
            .checked_add(command.quantity)
            .ok_or(DomainError::QuantityOverflow {
                product_id: product.id(),
            })?;
        product.ensure_available(requested)?;

        cart.add_item(product.id(), product.name(), product.price(), command.quantity)?;
        self.repositories.carts.save(&cart).await?;

        tracing::info!(
            user_id = %actor.id,
            product_id = %product.id(),
            quantity = command.quantity,
            "Item added to cart"
        );
        Ok(cart)
    }
}

#[async_trait]
impl Handler<RemoveItemFromCart> for Mediator {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, command: RemoveItemFromCart) -> Result<ShoppingCart> {
        let actor = self.actor(command.user_id).await?;
        let mut cart = self
            .repositories
            .carts
            .get_for_user(actor.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Cart", actor.id))?;

        cart.remove_item(command.product_id, command.quantity)?;
        self.repositories.carts.save(&cart).await?;

        tracing::info!(
            user_id = %actor.id,
            product_id = %command.product_id,
            quantity = command.quantity,
            "Item removed from cart"
        );
        Ok(cart)
    }
}

#[async_trait]
impl Handler<GetCart> for Mediator {
    async fn handle(&self, query: GetCart) -> Result<ShoppingCart> {
        let actor = self.actor(query.user_id).await?;
        let cart = self.repositories.carts.get_for_user(actor.id).await?;
        Ok(cart.unwrap_or_else(|| ShoppingCart::new(actor.id)))
    }
}

#[async_trait]
impl Handler<CalculateCartTotal> for Mediator {
    async fn handle(&self, query: CalculateCartTotal) -> Result<CartTotal> {
        let get_cart = GetCart {
            user_id: query.user_id,
        };
        let cart = Handler::<GetCart>::handle(self, get_cart).await?;
        Ok(self.tax_rate.totals(cart.subtotal()?)?)
    }
}

#[cfg(test)]
mod tests {
    use domain::{MAX_PRICE_CENTS, Money};

    use crate::test_support::Fixture;

    use super::*;

    #[tokio::test]
    async fn test_adding_same_product_twice_merges_lines() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1000, 10).await;

        for _ in 0..2 {
            fx.mediator
                .send(AddItemToCart {
                    user_id: shopper.id,
                    product_id: widget.id(),
                    quantity: 1,
                })
                .await
                .unwrap();
        }

        let cart = fx.mediator.send(GetCart { user_id: shopper.id }).await.unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_adding_beyond_stock_is_rejected() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1000, 3).await;

        fx.mediator
            .send(AddItemToCart {
                user_id: shopper.id,
                product_id: widget.id(),
                quantity: 2,
            })
            .await
            .unwrap();
        let result = fx
            .mediator
            .send(AddItemToCart {
                user_id: shopper.id,
                product_id: widget.id(),
                quantity: 2,
            })
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn test_quantity_overflow_is_rejected_without_panicking() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1, 10_000_000_000).await;
        let add = |quantity| AddItemToCart {
            user_id: shopper.id,
            product_id: widget.id(),
            quantity,
        };

        fx.mediator.send(add(u32::MAX)).await.unwrap();
        let result = fx.mediator.send(add(1)).await;

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::QuantityOverflow { .. }))
        ));
        let cart = fx.mediator.send(GetCart { user_id: shopper.id }).await.unwrap();
        assert_eq!(cart.quantity_of(widget.id()), u32::MAX);
    }

    #[tokio::test]
    async fn test_amount_overflow_is_rejected_and_cart_stays_totalable() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let yacht = fx.product("Yacht", MAX_PRICE_CENTS, 100_000_000).await;

        fx.mediator
            .send(AddItemToCart {
                user_id: shopper.id,
                product_id: yacht.id(),
                quantity: 2,
            })
            .await
            .unwrap();
        let result = fx
            .mediator
            .send(AddItemToCart {
                user_id: shopper.id,
                product_id: yacht.id(),
                quantity: 10_000_000,
            })
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::AmountOverflow))
        ));
        let total = fx
            .mediator
            .send(CalculateCartTotal {
                user_id: shopper.id,
            })
            .await
            .unwrap();
        assert_eq!(total.subtotal, Money::from_cents(2 * MAX_PRICE_CENTS));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;

        let result = fx
            .mediator
            .send(AddItemToCart {
                user_id: shopper.id,
                product_id: domain::ProductId::new(),
                quantity: 1,
            })
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::NotFound {
                entity: "Product",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_zero_quantity_fails_validation() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1000, 3).await;

        let result = fx
            .mediator
            .send(AddItemToCart {
                user_id: shopper.id,
                product_id: widget.id(),
                quantity: 0,
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Validation(_))));
    }

    #[tokio::test]
    async fn test_removing_more_than_held_drops_the_line() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1000, 10).await;
        fx.mediator
            .send(AddItemToCart {
                user_id: shopper.id,
                product_id: widget.id(),
                quantity: 2,
            })
            .await
            .unwrap();

        let cart = fx
            .mediator
            .send(RemoveItemFromCart {
                user_id: shopper.id,
                product_id: widget.id(),
                quantity: 5,
            })
            .await
            .unwrap();

        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_removing_from_missing_cart_is_not_found() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;

        let result = fx
            .mediator
            .send(RemoveItemFromCart {
                user_id: shopper.id,
                product_id: domain::ProductId::new(),
                quantity: 1,
            })
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::NotFound { entity: "Cart", .. })
        ));
    }

    #[tokio::test]
    async fn test_cart_total_includes_tax() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1999, 10).await;
        let gadget = fx.product("Gadget", 550, 10).await;

        for (product, quantity) in [(&widget, 2), (&gadget, 3)] {
            fx.mediator
                .send(AddItemToCart {
                    user_id: shopper.id,
                    product_id: product.id(),
                    quantity,
                })
                .await
                .unwrap();
        }

        let total = fx
            .mediator
            .send(CalculateCartTotal {
                user_id: shopper.id,
            })
            .await
            .unwrap();

        // 2 * 19.99 + 3 * 5.50 = 56.48; 8% tax = 4.5184, rounded to 4.52
        assert_eq!(total.subtotal, Money::from_cents(5648));
        assert_eq!(total.tax, Money::from_cents(452));
        assert_eq!(total.total, Money::from_cents(6100));
    }

    #[tokio::test]
    async fn test_empty_cart_total_is_zero() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;

        let total = fx
            .mediator
            .send(CalculateCartTotal {
                user_id: shopper.id,
            })
            .await
            .unwrap();

        assert_eq!(total.total, Money::zero());
    }

    #[tokio::test]
    async fn test_unknown_user_is_unauthenticated() {
        let fx = Fixture::new();

        let result = fx
            .mediator
            .send(GetCart {
                user_id: domain::UserId::new(),
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Unauthenticated(_))));
    }
}

use async_trait::async_trait;
use domain::{DomainError, Order};

use crate::commands::ProcessPayment;
use crate::error::{ApplicationError, Result};
use crate::mediator::{Handler, Mediator};
use crate::payment::{PaymentOutcome, PaymentRequest};

#[async_trait]
impl Handler<ProcessPayment> for Mediator {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, command: ProcessPayment) -> Result<Order> {
        let actor = self.actor(command.user_id).await?;
        let mut cart = self
            .repositories
            .carts
            .get_for_user(actor.id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(DomainError::EmptyCart)?;

        // Stock may have moved since the items were added
        let mut products = Vec::with_capacity(cart.items().len());
        for line in cart.items() {
            let product = self
                .repositories
                .products
                .get(line.product_id)
                .await?
                .ok_or_else(|| ApplicationError::not_found("Product", line.product_id))?;
            product.ensure_available(line.quantity)?;
            products.push((product, line.quantity));
        }

        let mut order = Order::place(actor.id, &cart, self.tax_rate)?;
        self.repositories.orders.save(&order).await?;
        tracing::info!(
            order_id = %order.id(),
            total = %order.total_amount(),
            "Order placed, charging payment"
        );

        let request = PaymentRequest::new(order.id(), actor.id, order.total_amount());
        let outcome = match self.payments.charge(&request).await {
            Ok(outcome) => outcome,
            Err(error) => {
                order.mark_payment_failed()?;
                self.repositories.orders.save(&order).await?;
                metrics::counter!("checkout_total", "outcome" => "error").increment(1);
                tracing::error!(order_id = %order.id(), %error, "Payment gateway failed");
                return Err(error.into());
            }
        };

        match outcome {
            PaymentOutcome::Approved { payment_id } => {
                for (mut product, quantity) in products {
                    product.remove_stock(quantity)?;
                    self.repositories.products.save(&product).await?;
                }
                order.mark_paid(payment_id)?;
                self.repositories.orders.save(&order).await?;
                cart.clear();
                self.repositories.carts.save(&cart).await?;

                metrics::counter!("checkout_total", "outcome" => "paid").increment(1);
                tracing::info!(
                    order_id = %order.id(),
                    payment_id = order.payment_id(),
                    "Checkout completed"
                );
            }
            PaymentOutcome::Declined { reason } => {
                order.mark_payment_failed()?;
                self.repositories.orders.save(&order).await?;

                metrics::counter!("checkout_total", "outcome" => "declined").increment(1);
                tracing::warn!(order_id = %order.id(), %reason, "Payment declined");
            }
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use domain::{Money, OrderStatus};
    use store::CartRepository;

    use crate::commands::{AddItemToCart, UpdateStock};
    use crate::queries::GetCart;
    use crate::test_support::Fixture;

    use super::*;

    async fn add(fx: &Fixture, user: &domain::User, product: &domain::Product, quantity: u32) {
        fx.mediator
            .send(AddItemToCart {
                user_id: user.id,
                product_id: product.id(),
                quantity,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_approved_checkout_pays_and_empties_cart() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1000, 10).await;
        add(&fx, &shopper, &widget, 3).await;

        let order = fx
            .mediator
            .send(ProcessPayment {
                user_id: shopper.id,
            })
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Paid);
        assert_eq!(order.payment_id(), Some("PAY-0001"));
        assert_eq!(order.total_amount(), Money::from_cents(3240));
        assert_eq!(fx.stock_of(&widget).await, 7);
        assert_eq!(fx.store.order_count().await, 1);

        let cart = fx.mediator.send(GetCart { user_id: shopper.id }).await.unwrap();
        assert!(cart.is_empty());

        let charged = fx.payments.payment("PAY-0001").unwrap();
        assert_eq!(charged.order_id, order.id());
        assert_eq!(charged.amount, Money::from_cents(3240));
    }

    #[tokio::test]
    async fn test_declined_checkout_leaves_cart_and_stock() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1000, 10).await;
        add(&fx, &shopper, &widget, 3).await;
        fx.payments.set_decline(Some("card expired"));

        let order = fx
            .mediator
            .send(ProcessPayment {
                user_id: shopper.id,
            })
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::PaymentFailed);
        assert!(order.payment_id().is_none());
        assert_eq!(fx.stock_of(&widget).await, 10);
        assert_eq!(fx.store.order_count().await, 1);

        let cart = fx.store.get_for_user(shopper.id).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(widget.id()), 3);
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_check_out() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;

        let result = fx
            .mediator
            .send(ProcessPayment {
                user_id: shopper.id,
            })
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::EmptyCart))
        ));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_stock_is_rechecked_at_checkout() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;
        let shopper = fx.customer("shopper").await;
        let widget = fx.product("Widget", 1000, 10).await;
        add(&fx, &shopper, &widget, 5).await;

        fx.mediator
            .send(UpdateStock {
                actor: admin.id,
                product_id: widget.id(),
                stock: 2,
            })
            .await
            .unwrap();

        let result = fx
            .mediator
            .send(ProcessPayment {
                user_id: shopper.id,
            })
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(
                DomainError::InsufficientStock { .. }
            ))
        ));
        assert_eq!(fx.store.order_count().await, 0);
        assert_eq!(fx.payments.payment_count(), 0);
    }
}

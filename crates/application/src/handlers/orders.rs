use async_trait::async_trait;
use domain::Order;

use crate::authorization::{require_customer_access, require_staff};
use crate::commands::UpdateOrderStatus;
use crate::error::{ApplicationError, Result};
use crate::mediator::{Handler, Mediator};
use crate::queries::{GetOrder, ListOrders};

impl Mediator {
    async fn load_order(&self, order_id: domain::OrderId) -> Result<Order> {
        self.repositories
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Order", order_id))
    }
}

#[async_trait]
impl Handler<GetOrder> for Mediator {
    async fn handle(&self, query: GetOrder) -> Result<Order> {
        let actor = self.actor(query.actor).await?;
        let order = self.load_order(query.order_id).await?;
        require_customer_access(&actor, order.user_id(), "view order")?;
        Ok(order)
    }
}

#[async_trait]
impl Handler<ListOrders> for Mediator {
    async fn handle(&self, query: ListOrders) -> Result<Vec<Order>> {
        let actor = self.actor(query.actor).await?;
        Ok(self.repositories.orders.list_for_user(actor.id).await?)
    }
}

#[async_trait]
impl Handler<UpdateOrderStatus> for Mediator {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, command: UpdateOrderStatus) -> Result<Order> {
        let actor = self.actor(command.actor).await?;
        require_staff(&actor, "update order status")?;

        let mut order = self.load_order(command.order_id).await?;
        let previous = order.status();
        order.transition_to(command.status)?;
        self.repositories.orders.save(&order).await?;

        tracing::info!(
            order_id = %order.id(),
            from = %previous,
            to = %order.status(),
            "Order status updated"
        );
        Ok(order)
    }
}

//! Queries: requests that only read state.

use domain::{CartTotal, Order, OrderId, Product, ProductId, ShoppingCart, User, UserId};
use serde::Serialize;

use crate::mediator::Request;
use crate::validation::Validate;

/// Returns the user's cart, empty if they never added anything.
#[derive(Debug, Clone)]
pub struct GetCart {
    pub user_id: UserId,
}

impl Request for GetCart {
    type Response = ShoppingCart;
    const NAME: &'static str = "get_cart";
}

impl Validate for GetCart {}

/// Computes the tax-inclusive total of the user's cart.
#[derive(Debug, Clone)]
pub struct CalculateCartTotal {
    pub user_id: UserId,
}

impl Request for CalculateCartTotal {
    type Response = CartTotal;
    const NAME: &'static str = "calculate_cart_total";
}

impl Validate for CalculateCartTotal {}

#[derive(Debug, Clone)]
pub struct GetProduct {
    pub product_id: ProductId,
}

impl Request for GetProduct {
    type Response = Product;
    const NAME: &'static str = "get_product";
}

impl Validate for GetProduct {}

#[derive(Debug, Clone)]
pub struct ListProducts;

impl Request for ListProducts {
    type Response = Vec<Product>;
    const NAME: &'static str = "list_products";
}

impl Validate for ListProducts {}

/// Reads a customer's profile and order history.
///
/// Allowed for the customer themselves and for staff.
#[derive(Debug, Clone)]
pub struct AccessCustomerData {
    pub actor: UserId,
    pub customer_id: UserId,
}

/// Profile and orders of one customer.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerData {
    pub user: User,
    pub orders: Vec<Order>,
}

impl Request for AccessCustomerData {
    type Response = CustomerData;
    const NAME: &'static str = "access_customer_data";
}

impl Validate for AccessCustomerData {}

/// Loads one order. Allowed for its owner and for staff.
#[derive(Debug, Clone)]
pub struct GetOrder {
    pub actor: UserId,
    pub order_id: OrderId,
}

impl Request for GetOrder {
    type Response = Order;
    const NAME: &'static str = "get_order";
}

impl Validate for GetOrder {}

/// Lists the acting user's own orders, newest first.
#[derive(Debug, Clone)]
pub struct ListOrders {
    pub actor: UserId,
}

impl Request for ListOrders {
    type Response = Vec<Order>;
    const NAME: &'static str = "list_orders";
}

impl Validate for ListOrders {}

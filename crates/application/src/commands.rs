//! Commands: requests that change state.

use domain::{
    MAX_PRICE_CENTS, Money, Order, OrderId, OrderStatus, Product, ProductId, Role, ShoppingCart,
    User, UserId,
};

use crate::mediator::Request;
use crate::validation::{self, Validate, ValidationErrors};

/// Puts `quantity` units of a product into the user's cart.
#[derive(Debug, Clone)]
pub struct AddItemToCart {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl Request for AddItemToCart {
    type Response = ShoppingCart;
    const NAME: &'static str = "add_item_to_cart";
}

impl Validate for AddItemToCart {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.quantity > 0, "quantity", "must be greater than 0");
        errors.into_result()
    }
}

/// Takes `quantity` units of a product out of the user's cart, dropping the
/// line once nothing is left.
#[derive(Debug, Clone)]
pub struct RemoveItemFromCart {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl Request for RemoveItemFromCart {
    type Response = ShoppingCart;
    const NAME: &'static str = "remove_item_from_cart";
}

impl Validate for RemoveItemFromCart {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.quantity > 0, "quantity", "must be greater than 0");
        errors.into_result()
    }
}

/// Checks out the user's cart: places an order and charges for it.
///
/// A declined charge is not an error. The returned order is then in
/// [`OrderStatus::PaymentFailed`] and the cart is left as it was.
#[derive(Debug, Clone)]
pub struct ProcessPayment {
    pub user_id: UserId,
}

impl Request for ProcessPayment {
    type Response = Order;
    const NAME: &'static str = "process_payment";
}

impl Validate for ProcessPayment {}

/// Sets a product's stock level. Administrators only.
#[derive(Debug, Clone)]
pub struct UpdateStock {
    pub actor: UserId,
    pub product_id: ProductId,
    pub stock: i64,
}

impl Request for UpdateStock {
    type Response = Product;
    const NAME: &'static str = "update_stock";
}

impl Validate for UpdateStock {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.stock >= 0, "stock", "must not be negative");
        errors.into_result()
    }
}

/// Adds a product to the catalog. Administrators only.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub actor: UserId,
    pub name: String,
    pub price: Money,
    pub stock: i64,
}

impl Request for CreateProduct {
    type Response = Product;
    const NAME: &'static str = "create_product";
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(
                validation::is_valid_product_name(&self.name),
                "name",
                format!(
                    "must be between 1 and {} characters",
                    validation::MAX_PRODUCT_NAME_LEN
                ),
            )
            .check(
                self.price.is_positive() && self.price.cents() <= MAX_PRICE_CENTS,
                "price",
                format!("must be between 1 and {MAX_PRICE_CENTS} cents"),
            )
            .check(self.stock >= 0, "stock", "must not be negative");
        errors.into_result()
    }
}

/// Registers a new user.
///
/// Anyone may register as a customer. Granting any other role takes an
/// administrator, except for the very first user, who bootstraps the store.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub actor: Option<UserId>,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl RegisterUser {
    /// A self-service customer registration.
    pub fn customer(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            actor: None,
            username: username.into(),
            email: email.into(),
            roles: vec![Role::Customer],
        }
    }

    pub(crate) fn grants_privileges(&self) -> bool {
        self.roles.iter().any(|role| *role != Role::Customer)
    }
}

impl Request for RegisterUser {
    type Response = User;
    const NAME: &'static str = "register_user";
}

impl Validate for RegisterUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(
                validation::is_valid_username(&self.username),
                "username",
                "must be 3-50 letters, digits, '_' or '-'",
            )
            .check(
                validation::is_valid_email(&self.email),
                "email",
                "must be a valid email address",
            );
        errors.into_result()
    }
}

/// Moves an order through its lifecycle. Staff only.
///
/// `Paid` is reached only through checkout, which records the payment.
#[derive(Debug, Clone)]
pub struct UpdateOrderStatus {
    pub actor: UserId,
    pub order_id: OrderId,
    pub status: OrderStatus,
}

impl Request for UpdateOrderStatus {
    type Response = Order;
    const NAME: &'static str = "update_order_status";
}

impl Validate for UpdateOrderStatus {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            self.status != OrderStatus::Paid,
            "status",
            "orders become Paid only through checkout",
        );
        errors.into_result()
    }
}

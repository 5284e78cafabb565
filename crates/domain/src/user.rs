//! Users and roles.

use common::UserId;
use serde::{Deserialize, Serialize};

/// A role granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access, including inventory management.
    Administrator,

    /// May read any customer's data and move orders through fulfilment.
    CustomerService,

    /// Regular shopper.
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::CustomerService => "CustomerService",
            Role::Customer => "Customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Administrator" => Ok(Role::Administrator),
            "CustomerService" => Ok(Role::CustomerService),
            "Customer" => Ok(Role::Customer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A registered user of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl User {
    /// Creates a new user with a generated identifier.
    pub fn new(username: impl Into<String>, email: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_administrator(&self) -> bool {
        self.has_role(Role::Administrator)
    }

    /// Staff are administrators and customer service agents.
    pub fn is_staff(&self) -> bool {
        self.is_administrator() || self.has_role(Role::CustomerService)
    }

    /// Returns true if this user may read the data of `customer`.
    pub fn can_access_customer(&self, customer: UserId) -> bool {
        self.id == customer || self.is_staff()
    }
}

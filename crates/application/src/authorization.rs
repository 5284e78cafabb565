//! Role checks shared by the handlers.

use domain::{User, UserId};

use crate::error::{ApplicationError, Result};

pub(crate) fn require_administrator(actor: &User, action: &'static str) -> Result<()> {
    if actor.is_administrator() {
        Ok(())
    } else {
        tracing::warn!(user_id = %actor.id, action, "Administrator role required");
        Err(ApplicationError::Unauthorized { action })
    }
}

pub(crate) fn require_staff(actor: &User, action: &'static str) -> Result<()> {
    if actor.is_staff() {
        Ok(())
    } else {
        tracing::warn!(user_id = %actor.id, action, "Staff role required");
        Err(ApplicationError::Unauthorized { action })
    }
}

/// Customers may act on their own data; staff may act on anyone's.
pub(crate) fn require_customer_access(
    actor: &User,
    customer: UserId,
    action: &'static str,
) -> Result<()> {
    if actor.can_access_customer(customer) {
        Ok(())
    } else {
        tracing::warn!(user_id = %actor.id, %customer, action, "Customer data access denied");
        Err(ApplicationError::Unauthorized { action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Role;

    fn user(roles: Vec<Role>) -> User {
        User::new("someone", "someone@example.com", roles)
    }

    #[test]
    fn test_administrator_check() {
        assert!(require_administrator(&user(vec![Role::Administrator]), "x").is_ok());
        assert!(require_administrator(&user(vec![Role::CustomerService]), "x").is_err());
        assert!(require_administrator(&user(vec![Role::Customer]), "x").is_err());
    }

    #[test]
    fn test_staff_check() {
        assert!(require_staff(&user(vec![Role::CustomerService]), "x").is_ok());
        assert!(require_staff(&user(vec![Role::Customer]), "x").is_err());
    }

    #[test]
    fn test_customer_access() {
        let customer = user(vec![Role::Customer]);
        let other = user(vec![Role::Customer]);

        assert!(require_customer_access(&customer, customer.id, "x").is_ok());
        assert!(matches!(
            require_customer_access(&other, customer.id, "read"),
            Err(ApplicationError::Unauthorized { action: "read" })
        ));
    }
}

use async_trait::async_trait;
use domain::{Role, User};

use crate::authorization::{require_administrator, require_customer_access};
use crate::commands::RegisterUser;
use crate::error::{ApplicationError, Result};
use crate::mediator::{Handler, Mediator};
use crate::queries::{AccessCustomerData, CustomerData};

#[async_trait]
impl Handler<RegisterUser> for Mediator {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, command: RegisterUser) -> Result<User> {
        if command.grants_privileges() {
            // The first user may grant themselves any role
            let bootstrap = self.repositories.users.list().await?.is_empty();
            if !bootstrap {
                let actor_id = command.actor.ok_or(ApplicationError::Unauthorized {
                    action: "grant roles",
                })?;
                let actor = self.actor(actor_id).await?;
                require_administrator(&actor, "grant roles")?;
            }
        }

        let mut roles: Vec<Role> = Vec::with_capacity(command.roles.len());
        for role in command.roles {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        if roles.is_empty() {
            roles.push(Role::Customer);
        }

        let user = User::new(command.username, command.email, roles);
        self.repositories.users.save(&user).await?;

        tracing::info!(user_id = %user.id, roles = ?user.roles, "User registered");
        Ok(user)
    }
}

#[async_trait]
impl Handler<AccessCustomerData> for Mediator {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, query: AccessCustomerData) -> Result<CustomerData> {
        let actor = self.actor(query.actor).await?;
        require_customer_access(&actor, query.customer_id, "access customer data")?;

        let user = if actor.id == query.customer_id {
            actor
        } else {
            self.repositories
                .users
                .get(query.customer_id)
                .await?
                .ok_or_else(|| ApplicationError::not_found("User", query.customer_id))?
        };
        let orders = self.repositories.orders.list_for_user(user.id).await?;

        Ok(CustomerData { user, orders })
    }
}

#[cfg(test)]
mod tests {
    use domain::UserId;
    use store::StoreError;

    use crate::test_support::Fixture;

    use super::*;

    #[tokio::test]
    async fn test_register_customer() {
        let fx = Fixture::new();
        fx.customer("existing").await;

        let user = fx
            .mediator
            .send(RegisterUser::customer("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(user.roles, [Role::Customer]);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict() {
        let fx = Fixture::new();
        fx.mediator
            .send(RegisterUser::customer("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = fx
            .mediator
            .send(RegisterUser::customer("Alice", "other@example.com"))
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Store(StoreError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn test_first_user_may_bootstrap_an_administrator() {
        let fx = Fixture::new();

        let mut command = RegisterUser::customer("root", "root@example.com");
        command.roles = vec![Role::Administrator];
        let user = fx.mediator.send(command).await.unwrap();

        assert!(user.is_administrator());
    }

    #[tokio::test]
    async fn test_granting_roles_requires_an_administrator() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let admin = fx.admin("admin").await;

        let mut command = RegisterUser::customer("agent", "agent@example.com");
        command.roles = vec![Role::CustomerService];

        let anonymous = fx.mediator.send(command.clone()).await;
        assert!(matches!(
            anonymous,
            Err(ApplicationError::Unauthorized { .. })
        ));

        command.actor = Some(shopper.id);
        let by_customer = fx.mediator.send(command.clone()).await;
        assert!(matches!(
            by_customer,
            Err(ApplicationError::Unauthorized { .. })
        ));

        command.actor = Some(admin.id);
        let agent = fx.mediator.send(command).await.unwrap();
        assert!(agent.is_staff());
    }

    #[tokio::test]
    async fn test_customer_reads_own_data() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;

        let data = fx
            .mediator
            .send(AccessCustomerData {
                actor: shopper.id,
                customer_id: shopper.id,
            })
            .await
            .unwrap();

        assert_eq!(data.user, shopper);
        assert!(data.orders.is_empty());
    }

    #[tokio::test]
    async fn test_customer_cannot_read_another_customer() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let other = fx.customer("other").await;

        let result = fx
            .mediator
            .send(AccessCustomerData {
                actor: other.id,
                customer_id: shopper.id,
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_staff_read_any_customer() {
        let fx = Fixture::new();
        let shopper = fx.customer("shopper").await;
        let agent = fx.agent("agent").await;

        let data = fx
            .mediator
            .send(AccessCustomerData {
                actor: agent.id,
                customer_id: shopper.id,
            })
            .await
            .unwrap();
        assert_eq!(data.user.id, shopper.id);

        let missing = fx
            .mediator
            .send(AccessCustomerData {
                actor: agent.id,
                customer_id: UserId::new(),
            })
            .await;
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));
    }
}

//! Persistence for the storefront service.
//!
//! Repository traits are defined in [`repository`]; [`InMemoryStore`] backs
//! tests and the default server configuration, [`PostgresStore`] backs
//! production deployments.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use repository::{
    CartRepository, OrderRepository, ProductRepository, Repositories, StoreHealth, UserRepository,
};

use std::sync::Arc;

use crate::entity::Customer;
use crate::store::CustomerStore;
use northwind::db::Handle;

/// Facade over the customer collection, consumed by [`crate::manager`] and
/// by test harnesses. Errors from the store propagate unchanged; there are
/// no retries at this layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CustomerService: Sync + Send {
    async fn create_customer(
        &self,
        customer: Customer,
    ) -> northwind::Result<()>;

    async fn get_customer_by_id(
        &self,
        customer_id: &str,
    ) -> northwind::Result<Option<Customer>>;

    async fn get_customer_list(&self) -> northwind::Result<Vec<Customer>>;

    async fn remove_customer(
        &self,
        customer: &Customer,
    ) -> northwind::Result<()>;

    /// Persists a mutated instance previously returned by a lookup.
    async fn save_customer_changes(
        &self,
        customer: &Customer,
    ) -> northwind::Result<()>;
}

pub struct DefaultCustomerService<S> {
    pool: sqlx::PgPool,
    store: Arc<S>,
}

impl<S: CustomerStore> DefaultCustomerService<S> {
    pub fn new(pool: sqlx::PgPool, store: Arc<S>) -> Self {
        Self { pool, store }
    }

    fn handle(&self) -> Handle<'static> {
        Handle::Pool(self.pool.clone())
    }
}

#[async_trait::async_trait]
impl<S: CustomerStore> CustomerService for DefaultCustomerService<S> {
    async fn create_customer(
        &self,
        customer: Customer,
    ) -> northwind::Result<()> {
        let mut h = self.handle();
        self.store.insert(&mut h, &customer).await
    }

    async fn get_customer_by_id(
        &self,
        customer_id: &str,
    ) -> northwind::Result<Option<Customer>> {
        let mut h = self.handle();
        self.store.find_by_id(&mut h, customer_id).await
    }

    async fn get_customer_list(&self) -> northwind::Result<Vec<Customer>> {
        let mut h = self.handle();
        self.store.find_all(&mut h).await
    }

    async fn remove_customer(
        &self,
        customer: &Customer,
    ) -> northwind::Result<()> {
        let mut h = self.handle();
        self.store.delete(&mut h, &customer.customer_id).await
    }

    async fn save_customer_changes(
        &self,
        customer: &Customer,
    ) -> northwind::Result<()> {
        let mut h = self.handle();
        self.store.update(&mut h, customer).await
    }
}

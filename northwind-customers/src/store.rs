use crate::entity::Customer;
use northwind::db::AppDbHandle;

/// Persistence capability for the customers collection. `insert` and
/// `delete` persist immediately; `update` writes the full row of an already
/// fetched, possibly mutated instance and reports a concurrent
/// modify-vs-delete as [`northwind::Error::Conflict`].
#[async_trait::async_trait]
pub trait CustomerStore: Sync + Send {
    async fn insert(
        &self,
        h: &mut AppDbHandle<'_>,
        customer: &Customer,
    ) -> northwind::Result<()>;

    async fn find_by_id(
        &self,
        h: &mut AppDbHandle<'_>,
        customer_id: &str,
    ) -> northwind::Result<Option<Customer>>;

    async fn find_all(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> northwind::Result<Vec<Customer>>;

    async fn update(
        &self,
        h: &mut AppDbHandle<'_>,
        customer: &Customer,
    ) -> northwind::Result<()>;

    async fn delete(
        &self,
        h: &mut AppDbHandle<'_>,
        customer_id: &str,
    ) -> northwind::Result<()>;
}

use crate::entity::{Product, Supplier};
use northwind::db::AppDbHandle;

/// Persistence capability for the supplier aggregate. `update_supplier`
/// surfaces a write that matched no row as [`northwind::Error::Conflict`],
/// the signal the update flow uses to detect a racing delete. Supplier
/// deletion takes the owned products with it.
#[async_trait::async_trait]
pub trait SupplierStore: Sync + Send {
    /// Inserts with a store-assigned id and returns the stored row.
    async fn insert_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier: &Supplier,
    ) -> northwind::Result<Supplier>;

    async fn find_supplier_by_id(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<Option<Supplier>>;

    async fn find_all_suppliers(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> northwind::Result<Vec<Supplier>>;

    async fn update_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier: &Supplier,
    ) -> northwind::Result<()>;

    async fn delete_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<()>;

    async fn supplier_exists(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<bool>;

    /// Inserts with store-assigned product ids, returning the stored rows in
    /// input order.
    async fn insert_products(
        &self,
        h: &mut AppDbHandle<'_>,
        products: &[Product],
    ) -> northwind::Result<Vec<Product>>;

    async fn find_products_by_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<Vec<Product>>;

    async fn find_all_products(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> northwind::Result<Vec<Product>>;

    async fn delete_products_by_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<()>;
}

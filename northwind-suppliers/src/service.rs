use std::sync::Arc;

use crate::dto::{self, ProductDto, SupplierDto};
use crate::entity::Product;
use crate::store::SupplierStore;
use northwind::db::Handle;

/// Supplier operations as the HTTP layer consumes them. Lookup misses come
/// back as `None`/`false`; a persist that loses against a concurrent delete
/// comes back as [`northwind::Error::Conflict`] for the caller to resolve.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SupplierService: Sync + Send {
    async fn retrieve_suppliers(&self) -> northwind::Result<Vec<SupplierDto>>;

    async fn retrieve_supplier_with_id(
        &self,
        supplier_id: i32,
    ) -> northwind::Result<Option<SupplierDto>>;

    async fn retrieve_products_with_id(
        &self,
        supplier_id: i32,
    ) -> northwind::Result<Vec<ProductDto>>;

    /// Inserts the supplier and its product list, then re-reads the stored
    /// aggregate.
    async fn create_supplier(
        &self,
        supplier: SupplierDto,
    ) -> northwind::Result<SupplierDto>;

    /// Full-row supplier update; the dto's product list replaces whatever
    /// was attached before.
    async fn update_supplier(
        &self,
        supplier: SupplierDto,
    ) -> northwind::Result<()>;

    async fn remove_supplier(
        &self,
        supplier_id: i32,
    ) -> northwind::Result<bool>;

    async fn supplier_exists(&self, supplier_id: i32)
        -> northwind::Result<bool>;
}

pub struct DefaultSupplierService<S> {
    pool: sqlx::PgPool,
    store: Arc<S>,
}

impl<S: SupplierStore> DefaultSupplierService<S> {
    pub fn new(pool: sqlx::PgPool, store: Arc<S>) -> Self {
        Self { pool, store }
    }

    fn handle(&self) -> Handle<'static> {
        Handle::Pool(self.pool.clone())
    }
}

#[async_trait::async_trait]
impl<S: SupplierStore> SupplierService for DefaultSupplierService<S> {
    async fn retrieve_suppliers(&self) -> northwind::Result<Vec<SupplierDto>> {
        let mut h = self.handle();
        let suppliers = self.store.find_all_suppliers(&mut h).await?;
        let products = self.store.find_all_products(&mut h).await?;

        Ok(suppliers
            .iter()
            .map(|supplier| {
                let owned: Vec<Product> = products
                    .iter()
                    .filter(|p| p.supplier_id == Some(supplier.supplier_id))
                    .cloned()
                    .collect();
                dto::supplier_to_dto(supplier, &owned)
            })
            .collect())
    }

    async fn retrieve_supplier_with_id(
        &self,
        supplier_id: i32,
    ) -> northwind::Result<Option<SupplierDto>> {
        let mut h = self.handle();
        let Some(supplier) =
            self.store.find_supplier_by_id(&mut h, supplier_id).await?
        else {
            return Ok(None);
        };
        let products =
            self.store.find_products_by_supplier(&mut h, supplier_id).await?;
        Ok(Some(dto::supplier_to_dto(&supplier, &products)))
    }

    async fn retrieve_products_with_id(
        &self,
        supplier_id: i32,
    ) -> northwind::Result<Vec<ProductDto>> {
        let mut h = self.handle();
        let products =
            self.store.find_products_by_supplier(&mut h, supplier_id).await?;
        Ok(products.iter().map(dto::product_to_dto).collect())
    }

    async fn create_supplier(
        &self,
        supplier: SupplierDto,
    ) -> northwind::Result<SupplierDto> {
        let mut pool_handle = self.handle();
        let mut tx = pool_handle.begin().await?;

        let stored = self
            .store
            .insert_supplier(&mut tx, &dto::supplier_from_dto(&supplier))
            .await?;
        let products: Vec<Product> = supplier
            .products
            .iter()
            .map(|p| dto::product_from_dto(p, stored.supplier_id))
            .collect();
        self.store.insert_products(&mut tx, &products).await?;
        tx.commit().await?;

        self.retrieve_supplier_with_id(stored.supplier_id).await?.ok_or_else(
            || {
                northwind::Error::NotFound(format!(
                    "supplier {} vanished right after create",
                    stored.supplier_id
                ))
            },
        )
    }

    async fn update_supplier(
        &self,
        supplier: SupplierDto,
    ) -> northwind::Result<()> {
        let supplier_id = supplier.supplier_id;
        let mut pool_handle = self.handle();
        let mut tx = pool_handle.begin().await?;

        // A zero-row update aborts the whole thing as a Conflict; the
        // dropped transaction rolls back.
        self.store
            .update_supplier(&mut tx, &dto::supplier_from_dto(&supplier))
            .await?;

        // The incoming list replaces the attached products outright.
        self.store.delete_products_by_supplier(&mut tx, supplier_id).await?;
        let products: Vec<Product> = supplier
            .products
            .iter()
            .map(|p| dto::product_from_dto(p, supplier_id))
            .collect();
        self.store.insert_products(&mut tx, &products).await?;

        tx.commit().await
    }

    async fn remove_supplier(
        &self,
        supplier_id: i32,
    ) -> northwind::Result<bool> {
        let mut h = self.handle();
        if self
            .store
            .find_supplier_by_id(&mut h, supplier_id)
            .await?
            .is_none()
        {
            return Ok(false);
        }
        self.store.delete_supplier(&mut h, supplier_id).await?;
        Ok(true)
    }

    async fn supplier_exists(
        &self,
        supplier_id: i32,
    ) -> northwind::Result<bool> {
        let mut h = self.handle();
        self.store.supplier_exists(&mut h, supplier_id).await
    }
}

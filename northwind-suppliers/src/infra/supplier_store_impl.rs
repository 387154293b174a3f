use crate::entity::{Product, Supplier};
use crate::store::SupplierStore;
use northwind::db::AppDbHandle;

pub struct PostgresSupplierStore;

#[async_trait::async_trait]
impl SupplierStore for PostgresSupplierStore {
    async fn insert_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier: &Supplier,
    ) -> northwind::Result<Supplier> {
        sqlx::query_as(
            "INSERT INTO suppliers \
             (company_name, contact_name, contact_title, country) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&supplier.company_name)
        .bind(&supplier.contact_name)
        .bind(&supplier.contact_title)
        .bind(&supplier.country)
        .fetch_one(h.as_executor())
        .await
        .map_err(northwind::db::map_err)
    }

    async fn find_supplier_by_id(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<Option<Supplier>> {
        sqlx::query_as("SELECT * FROM suppliers WHERE supplier_id = $1")
            .bind(supplier_id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(northwind::db::map_err)
    }

    async fn find_all_suppliers(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> northwind::Result<Vec<Supplier>> {
        sqlx::query_as("SELECT * FROM suppliers ORDER BY supplier_id")
            .fetch_all(h.as_executor())
            .await
            .map_err(northwind::db::map_err)
    }

    async fn update_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier: &Supplier,
    ) -> northwind::Result<()> {
        let result = sqlx::query(
            "UPDATE suppliers \
             SET company_name = $2, contact_name = $3, \
                 contact_title = $4, country = $5 \
             WHERE supplier_id = $1",
        )
        .bind(supplier.supplier_id)
        .bind(&supplier.company_name)
        .bind(&supplier.contact_name)
        .bind(&supplier.contact_title)
        .bind(&supplier.country)
        .execute(h.as_executor())
        .await
        .map_err(northwind::db::map_err)?;

        if result.rows_affected() == 0 {
            return Err(northwind::Error::Conflict(format!(
                "supplier {} was removed concurrently",
                supplier.supplier_id
            )));
        }
        Ok(())
    }

    async fn delete_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<()> {
        // Owned products go with it, per the schema's cascade.
        sqlx::query("DELETE FROM suppliers WHERE supplier_id = $1")
            .bind(supplier_id)
            .execute(h.as_executor())
            .await
            .map_err(northwind::db::map_err)?;
        Ok(())
    }

    async fn supplier_exists(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM suppliers WHERE supplier_id = $1)",
        )
        .bind(supplier_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(northwind::db::map_err)
    }

    async fn insert_products(
        &self,
        h: &mut AppDbHandle<'_>,
        products: &[Product],
    ) -> northwind::Result<Vec<Product>> {
        let mut stored = Vec::with_capacity(products.len());
        for product in products {
            let row: Product = sqlx::query_as(
                "INSERT INTO products \
                 (product_name, unit_price, supplier_id, category_id) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
            )
            .bind(&product.product_name)
            .bind(product.unit_price)
            .bind(product.supplier_id)
            .bind(product.category_id)
            .fetch_one(h.as_executor())
            .await
            .map_err(northwind::db::map_err)?;
            stored.push(row);
        }
        Ok(stored)
    }

    async fn find_products_by_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<Vec<Product>> {
        sqlx::query_as(
            "SELECT * FROM products WHERE supplier_id = $1 ORDER BY product_id",
        )
        .bind(supplier_id)
        .fetch_all(h.as_executor())
        .await
        .map_err(northwind::db::map_err)
    }

    async fn find_all_products(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> northwind::Result<Vec<Product>> {
        sqlx::query_as("SELECT * FROM products ORDER BY product_id")
            .fetch_all(h.as_executor())
            .await
            .map_err(northwind::db::map_err)
    }

    async fn delete_products_by_supplier(
        &self,
        h: &mut AppDbHandle<'_>,
        supplier_id: i32,
    ) -> northwind::Result<()> {
        sqlx::query("DELETE FROM products WHERE supplier_id = $1")
            .bind(supplier_id)
            .execute(h.as_executor())
            .await
            .map_err(northwind::db::map_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use northwind::db::Handle;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    async fn setup_db() -> PgPool {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for postgres test");
        PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to Postgres")
    }

    fn chai(supplier_id: i32) -> Product {
        Product {
            product_id: 0,
            product_name: "Chai".to_string(),
            unit_price: Some(Decimal::new(1800, 2)),
            supplier_id: Some(supplier_id),
            category_id: Some(1),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_supplier_store_crud() -> northwind::Result<()> {
        let pool = setup_db().await;
        let mut handle = Handle::Pool(pool);
        let store = PostgresSupplierStore;

        // 1. Insert supplier, id assigned by the database
        let supplier = store
            .insert_supplier(
                &mut handle,
                &Supplier {
                    supplier_id: 0,
                    company_name: "Exotic Liquids".to_string(),
                    contact_name: Some("Charlotte Cooper".to_string()),
                    contact_title: None,
                    country: Some("UK".to_string()),
                },
            )
            .await?;
        assert!(supplier.supplier_id > 0);
        assert!(store.supplier_exists(&mut handle, supplier.supplier_id).await?);

        // 2. Products attach to it
        let stored = store
            .insert_products(&mut handle, &[chai(supplier.supplier_id)])
            .await?;
        assert_eq!(stored.len(), 1);
        let owned = store
            .find_products_by_supplier(&mut handle, supplier.supplier_id)
            .await?;
        assert_eq!(owned, stored);

        // 3. Update
        let mut to_update = supplier.clone();
        to_update.country = Some("Australia".to_string());
        store.update_supplier(&mut handle, &to_update).await?;
        let found = store
            .find_supplier_by_id(&mut handle, supplier.supplier_id)
            .await?
            .expect("still present");
        assert_eq!(found.country.as_deref(), Some("Australia"));

        // 4. Delete cascades over the products
        store.delete_supplier(&mut handle, supplier.supplier_id).await?;
        assert!(!store.supplier_exists(&mut handle, supplier.supplier_id).await?);
        let orphans = store
            .find_products_by_supplier(&mut handle, supplier.supplier_id)
            .await?;
        assert!(orphans.is_empty());

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_update_missing_supplier_is_a_conflict() {
        let pool = setup_db().await;
        let mut handle = Handle::Pool(pool);
        let store = PostgresSupplierStore;

        let ghost = Supplier {
            supplier_id: -1,
            company_name: "Nobody".to_string(),
            contact_name: None,
            contact_title: None,
            country: None,
        };

        let result = store.update_supplier(&mut handle, &ghost).await;
        assert!(matches!(result, Err(northwind::Error::Conflict(_))));
    }
}

use crate::entity::Customer;
use crate::store::CustomerStore;
use northwind::db::AppDbHandle;

pub struct PostgresCustomerStore;

#[async_trait::async_trait]
impl CustomerStore for PostgresCustomerStore {
    async fn insert(
        &self,
        h: &mut AppDbHandle<'_>,
        customer: &Customer,
    ) -> northwind::Result<()> {
        sqlx::query(
            "INSERT INTO customers \
             (customer_id, contact_name, company_name, city, country) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&customer.customer_id)
        .bind(&customer.contact_name)
        .bind(&customer.company_name)
        .bind(&customer.city)
        .bind(&customer.country)
        .execute(h.as_executor())
        .await
        .map_err(northwind::db::map_err)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        h: &mut AppDbHandle<'_>,
        customer_id: &str,
    ) -> northwind::Result<Option<Customer>> {
        sqlx::query_as("SELECT * FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(northwind::db::map_err)
    }

    async fn find_all(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> northwind::Result<Vec<Customer>> {
        sqlx::query_as("SELECT * FROM customers")
            .fetch_all(h.as_executor())
            .await
            .map_err(northwind::db::map_err)
    }

    async fn update(
        &self,
        h: &mut AppDbHandle<'_>,
        customer: &Customer,
    ) -> northwind::Result<()> {
        let result = sqlx::query(
            "UPDATE customers \
             SET contact_name = $2, company_name = $3, city = $4, country = $5 \
             WHERE customer_id = $1",
        )
        .bind(&customer.customer_id)
        .bind(&customer.contact_name)
        .bind(&customer.company_name)
        .bind(&customer.city)
        .bind(&customer.country)
        .execute(h.as_executor())
        .await
        .map_err(northwind::db::map_err)?;

        if result.rows_affected() == 0 {
            return Err(northwind::Error::Conflict(format!(
                "customer {} was removed concurrently",
                customer.customer_id
            )));
        }
        Ok(())
    }

    async fn delete(
        &self,
        h: &mut AppDbHandle<'_>,
        customer_id: &str,
    ) -> northwind::Result<()> {
        sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .execute(h.as_executor())
            .await
            .map_err(northwind::db::map_err)?;
        Ok(())
    }
}

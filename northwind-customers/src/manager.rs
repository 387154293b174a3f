use std::sync::Arc;

use crate::entity::Customer;
use crate::service::CustomerService;
use northwind::Error;

/// Mediates between a caller (a UI layer or a test harness) and the customer
/// collection, tracking the most recently selected customer. The selection
/// is owned by this instance; mutation goes through `&mut self`, so sharing
/// a manager across tasks is ruled out at the type level.
pub struct CustomerManager {
    service: Arc<dyn CustomerService>,
    selected_customer: Option<Customer>,
}

impl CustomerManager {
    pub fn new(service: Arc<dyn CustomerService>) -> Self {
        Self {
            service,
            selected_customer: None,
        }
    }

    /// Inserts a new customer record. Duplicate ids are rejected by the
    /// store, not here.
    pub async fn create(
        &self,
        customer_id: &str,
        contact_name: &str,
        company_name: &str,
    ) -> northwind::Result<()> {
        let customer = Customer {
            customer_id: customer_id.to_owned(),
            contact_name: Some(contact_name.to_owned()),
            company_name: Some(company_name.to_owned()),
            city: None,
            country: None,
        };
        self.service.create_customer(customer).await
    }

    /// Looks the customer up, rewrites contact name, country and city, makes
    /// it the selected customer and persists. Returns `false` when the id is
    /// unknown (selection untouched) or when the persist loses against a
    /// concurrent delete (selection already rewritten by then; it is not
    /// rolled back).
    ///
    /// The company name argument is accepted and not applied.
    pub async fn update(
        &mut self,
        customer_id: &str,
        contact_name: Option<String>,
        country: Option<String>,
        city: Option<String>,
        _company_name: Option<String>,
    ) -> northwind::Result<bool> {
        let Some(mut customer) =
            self.service.get_customer_by_id(customer_id).await?
        else {
            tracing::warn!(customer_id, "update skipped, no such customer");
            return Ok(false);
        };

        customer.contact_name = contact_name;
        customer.country = country;
        customer.city = city;

        self.selected_customer = Some(customer.clone());

        match self.service.save_customer_changes(&customer).await {
            Ok(()) => Ok(true),
            Err(Error::Conflict(reason)) => {
                tracing::warn!(customer_id, %reason, "update lost the race");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes the customer with the given id. Does not clear the selection,
    /// even when the selected customer is the one removed.
    pub async fn delete(&mut self, customer_id: &str) -> northwind::Result<bool> {
        let Some(customer) =
            self.service.get_customer_by_id(customer_id).await?
        else {
            tracing::warn!(customer_id, "delete skipped, no such customer");
            return Ok(false);
        };

        self.service.remove_customer(&customer).await?;
        Ok(true)
    }

    pub async fn retrieve_all(&self) -> northwind::Result<Vec<Customer>> {
        self.service.get_customer_list().await
    }

    pub fn set_selected_customer(&mut self, customer: Customer) {
        self.selected_customer = Some(customer);
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        self.selected_customer.as_ref()
    }
}

//! Wire-facing projections of the supplier aggregate and the pure mapping
//! functions between them and the row types. Mapping is stateless and
//! order-preserving; `total_products` is derived from the product list at
//! mapping time and never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::{Product, Supplier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDto {
    #[serde(default)]
    pub supplier_id: i32,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub contact_title: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub total_products: usize,
    #[serde(default)]
    pub products: Vec<ProductDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(default)]
    pub product_id: i32,
    pub product_name: String,
    pub supplier_id: Option<i32>,
    pub category_id: Option<i32>,
    pub unit_price: Option<Decimal>,
}

pub fn supplier_to_dto(supplier: &Supplier, products: &[Product]) -> SupplierDto {
    SupplierDto {
        supplier_id: supplier.supplier_id,
        company_name: supplier.company_name.clone(),
        contact_name: supplier.contact_name.clone(),
        contact_title: supplier.contact_title.clone(),
        country: supplier.country.clone(),
        total_products: products.len(),
        products: products.iter().map(product_to_dto).collect(),
    }
}

pub fn product_to_dto(product: &Product) -> ProductDto {
    ProductDto {
        product_id: product.product_id,
        product_name: product.product_name.clone(),
        supplier_id: product.supplier_id,
        category_id: product.category_id,
        unit_price: product.unit_price,
    }
}

/// Rebuilds a supplier row from an incoming dto. The id is carried over
/// as-is; flows that let the database assign one ignore it.
pub fn supplier_from_dto(dto: &SupplierDto) -> Supplier {
    Supplier {
        supplier_id: dto.supplier_id,
        company_name: dto.company_name.clone(),
        contact_name: dto.contact_name.clone(),
        contact_title: dto.contact_title.clone(),
        country: dto.country.clone(),
    }
}

/// Rebuilds a product row attached to `supplier_id`, dropping whatever id
/// and owner the dto claimed.
pub fn product_from_dto(dto: &ProductDto, supplier_id: i32) -> Product {
    Product {
        product_id: 0,
        product_name: dto.product_name.clone(),
        unit_price: dto.unit_price,
        supplier_id: Some(supplier_id),
        category_id: dto.category_id,
    }
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use crate::dto::{ProductDto, SupplierDto};
use crate::service::SupplierService;
use northwind::Error;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn SupplierService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/suppliers", get(get_suppliers).post(post_supplier))
        .route(
            "/api/suppliers/{id}",
            get(get_supplier).put(put_supplier).delete(delete_supplier),
        )
        .route("/api/suppliers/{id}/products", get(get_supplier_products))
        .with_state(state)
}

fn internal_error(e: Error) -> (StatusCode, String) {
    tracing::error!(error = ?e, "supplier request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
}

fn not_found(supplier_id: i32) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("no supplier with id {supplier_id}"),
    )
}

#[tracing::instrument(skip(state))]
async fn get_suppliers(
    State(state): State<AppState>,
) -> Result<Json<Vec<SupplierDto>>, (StatusCode, String)> {
    state
        .service
        .retrieve_suppliers()
        .await
        .map(Json)
        .map_err(internal_error)
}

#[tracing::instrument(skip(state))]
async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SupplierDto>, (StatusCode, String)> {
    match state
        .service
        .retrieve_supplier_with_id(id)
        .await
        .map_err(internal_error)?
    {
        Some(supplier) => Ok(Json(supplier)),
        None => Err(not_found(id)),
    }
}

#[tracing::instrument(skip(state))]
async fn get_supplier_products(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProductDto>>, (StatusCode, String)> {
    if !state.service.supplier_exists(id).await.map_err(internal_error)? {
        tracing::warn!(id, "no supplier found");
        return Err(not_found(id));
    }
    let products = state
        .service
        .retrieve_products_with_id(id)
        .await
        .map_err(internal_error)?;
    Ok(Json(products))
}

#[tracing::instrument(skip(state, supplier))]
async fn put_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(supplier): Json<SupplierDto>,
) -> Result<StatusCode, (StatusCode, String)> {
    if id != supplier.supplier_id {
        return Err((
            StatusCode::BAD_REQUEST,
            "path id and body id differ".to_string(),
        ));
    }

    match state.service.update_supplier(supplier).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(Error::Conflict(reason)) => {
            // Racing delete? Gone means 404; still there means the conflict
            // stands and surfaces as-is.
            if state.service.supplier_exists(id).await.map_err(internal_error)?
            {
                tracing::error!(id, %reason, "supplier update conflicted");
                Err((StatusCode::INTERNAL_SERVER_ERROR, reason))
            } else {
                Err(not_found(id))
            }
        }
        Err(e) => Err(internal_error(e)),
    }
}

#[tracing::instrument(skip(state, supplier))]
async fn post_supplier(
    State(state): State<AppState>,
    Json(supplier): Json<SupplierDto>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let created = state
        .service
        .create_supplier(supplier)
        .await
        .map_err(internal_error)?;

    let location = format!("/api/suppliers/{}", created.supplier_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

#[tracing::instrument(skip(state))]
async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.service.remove_supplier(id).await.map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockSupplierService;
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn app(service: MockSupplierService) -> Router {
        router(AppState {
            service: Arc::new(service),
        })
    }

    fn sample_dto(supplier_id: i32) -> SupplierDto {
        SupplierDto {
            supplier_id,
            company_name: "Exotic Liquids".to_string(),
            contact_name: Some("Charlotte Cooper".to_string()),
            contact_title: None,
            country: Some("UK".to_string()),
            total_products: 1,
            products: vec![ProductDto {
                product_id: 1,
                product_name: "Chai".to_string(),
                supplier_id: Some(supplier_id),
                category_id: Some(1),
                unit_price: Some(Decimal::new(1800, 2)),
            }],
        }
    }

    fn json_request(method: &str, uri: &str, dto: &SupplierDto) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(dto).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn get_suppliers_returns_the_mapped_listing() {
        let mut service = MockSupplierService::new();
        service
            .expect_retrieve_suppliers()
            .returning(|| Ok(vec![sample_dto(1)]));

        let response = app(service)
            .oneshot(
                Request::builder()
                    .uri("/api/suppliers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["supplierId"], 1);
        assert_eq!(body[0]["companyName"], "Exotic Liquids");
        assert_eq!(body[0]["totalProducts"], 1);
        assert_eq!(body[0]["products"][0]["productName"], "Chai");
    }

    #[tokio::test]
    async fn get_supplier_returns_the_dto() {
        let mut service = MockSupplierService::new();
        service
            .expect_retrieve_supplier_with_id()
            .withf(|id| *id == 3)
            .returning(|_| Ok(Some(sample_dto(3))));

        let response = app(service)
            .oneshot(
                Request::builder()
                    .uri("/api/suppliers/3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["supplierId"], 3);
    }

    #[tokio::test]
    async fn get_supplier_misses_with_404() {
        let mut service = MockSupplierService::new();
        service
            .expect_retrieve_supplier_with_id()
            .returning(|_| Ok(None));

        let response = app(service)
            .oneshot(
                Request::builder()
                    .uri("/api/suppliers/99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_supplier_products_checks_existence_first() {
        let mut service = MockSupplierService::new();
        service
            .expect_supplier_exists()
            .withf(|id| *id == 42)
            .returning(|_| Ok(false));
        // No retrieve expectation: the products query must not run.

        let response = app(service)
            .oneshot(
                Request::builder()
                    .uri("/api/suppliers/42/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_supplier_products_returns_the_list() {
        let mut service = MockSupplierService::new();
        service.expect_supplier_exists().returning(|_| Ok(true));
        service
            .expect_retrieve_products_with_id()
            .withf(|id| *id == 1)
            .returning(|_| Ok(sample_dto(1).products));

        let response = app(service)
            .oneshot(
                Request::builder()
                    .uri("/api/suppliers/1/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["productId"], 1);
        assert_eq!(body[0]["supplierId"], 1);
    }

    #[tokio::test]
    async fn put_with_mismatched_ids_is_a_bad_request_and_persists_nothing() {
        // No expectations at all: any service call would fail the test.
        let service = MockSupplierService::new();

        let response = app(service)
            .oneshot(json_request("PUT", "/api/suppliers/2", &sample_dto(3)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn put_returns_no_content_on_success() {
        let mut service = MockSupplierService::new();
        service
            .expect_update_supplier()
            .withf(|dto| dto.supplier_id == 3)
            .times(1)
            .returning(|_| Ok(()));

        let response = app(service)
            .oneshot(json_request("PUT", "/api/suppliers/3", &sample_dto(3)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn put_conflict_on_a_vanished_supplier_is_404() {
        let mut service = MockSupplierService::new();
        service.expect_update_supplier().returning(|_| {
            Err(Error::Conflict("supplier 3 was removed concurrently".into()))
        });
        service
            .expect_supplier_exists()
            .withf(|id| *id == 3)
            .returning(|_| Ok(false));

        let response = app(service)
            .oneshot(json_request("PUT", "/api/suppliers/3", &sample_dto(3)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_conflict_on_a_surviving_supplier_propagates() {
        let mut service = MockSupplierService::new();
        service.expect_update_supplier().returning(|_| {
            Err(Error::Conflict("supplier 3 lost a concurrent write".into()))
        });
        service.expect_supplier_exists().returning(|_| Ok(true));

        let response = app(service)
            .oneshot(json_request("PUT", "/api/suppliers/3", &sample_dto(3)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn post_returns_created_with_a_location_header() {
        let mut service = MockSupplierService::new();
        service
            .expect_create_supplier()
            .withf(|dto| dto.company_name == "Exotic Liquids")
            .returning(|mut dto| {
                dto.supplier_id = 7;
                Ok(dto)
            });

        let response = app(service)
            .oneshot(json_request("POST", "/api/suppliers", &sample_dto(0)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/suppliers/7"
        );
        let body = body_json(response).await;
        assert_eq!(body["supplierId"], 7);
    }

    #[tokio::test]
    async fn delete_returns_no_content_when_removed() {
        let mut service = MockSupplierService::new();
        service
            .expect_remove_supplier()
            .withf(|id| *id == 3)
            .times(1)
            .returning(|_| Ok(true));

        let response = app(service)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/suppliers/3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn delete_misses_with_404() {
        let mut service = MockSupplierService::new();
        service.expect_remove_supplier().returning(|_| Ok(false));

        let response = app(service)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/suppliers/99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

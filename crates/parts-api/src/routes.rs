//! # Routes
//!
//! Axum router for the parts store. Every route maps to exactly one handler
//! and one collection; guards run as extractors inside the handlers.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Products:
///   - POST   /product            - Create product (admin)
///   - GET    /products           - List products, newest first
///   - GET    /product/{id}       - Get product (user)
///   - DELETE /product/{id}       - Delete product (admin)
///
/// - Orders:
///   - GET    /orders             - List orders (admin)
///   - PATCH  /order/shipped/{id} - Mark shipped (admin)
///   - POST   /order              - Create order (user)
///   - GET    /order/{email}      - Orders of a customer, newest first
///   - DELETE /order/{id}         - Delete order
///   - PATCH  /order/{id}         - Record payment and mark paid
///
/// - Payments:
///   - GET    /payment/{id}           - Order lookup for checkout (user)
///   - POST   /create-payment-intent  - Provider client secret
///
/// - Reviews and users:
///   - GET /reviews, POST /review
///   - GET /users (admin), PUT /user/admin/{email} (admin)
///   - GET /admin/{email} (user)
///   - GET /user/{email}, PUT /user/{email}
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let product_routes = Router::new()
        .route("/product", post(handlers::create_product))
        .route("/products", get(handlers::list_products))
        .route(
            "/product/{id}",
            get(handlers::get_product).delete(handlers::delete_product),
        );

    // GET /order/{id} takes a customer email; the segment name is shared with
    // DELETE and PATCH because a path can only bind one parameter name.
    let order_routes = Router::new()
        .route("/orders", get(handlers::list_orders))
        .route("/order/shipped/{id}", patch(handlers::mark_order_shipped))
        .route("/order", post(handlers::create_order))
        .route(
            "/order/{id}",
            get(handlers::list_orders_by_email)
                .delete(handlers::delete_order)
                .patch(handlers::finalize_payment),
        );

    let payment_routes = Router::new()
        .route("/payment/{id}", get(handlers::get_order_for_payment))
        .route("/create-payment-intent", post(handlers::create_payment_intent));

    let review_routes = Router::new()
        .route("/reviews", get(handlers::list_reviews))
        .route("/review", post(handlers::create_review));

    let user_routes = Router::new()
        .route("/users", get(handlers::list_users))
        .route("/user/admin/{email}", put(handlers::grant_admin))
        .route("/admin/{email}", get(handlers::check_admin))
        .route(
            "/user/{email}",
            get(handlers::get_user).put(handlers::upsert_user),
        );

    Router::new()
        .route("/", get(handlers::root))
        .merge(product_routes)
        .merge(order_routes)
        .merge(payment_routes)
        .merge(review_routes)
        .merge(user_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! # Request Handlers
//!
//! One handler per route. Each runs its guard extractor (if any), performs a
//! single store operation and returns the raw result. Lookups that find
//! nothing answer `200 null`, not 404.

use crate::auth::{is_admin, RequireAdmin, RequireUser, ADMIN_ROLE};
use crate::error::{error_to_response, ApiError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use parts_core::{
    Collection, DeleteResult, Document, Filter, InsertOneResult, PartsError, PaymentIntentRequest,
    UpdateResult, WriteOp, ID_FIELD,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Fields a profile update may never write
const PRIVILEGED_FIELDS: [&str; 2] = ["role", ID_FIELD];

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create payment intent request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Order total in decimal currency units
    pub total_price: f64,
}

/// Create payment intent response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

/// Payment completion reported by the storefront
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePaymentRequest {
    /// Order reference stored on the payment record (defaults to the path id)
    #[serde(default)]
    pub order_id: Option<String>,
    /// Provider transaction identifier
    pub transaction_id: String,
}

/// Admin status of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminStatus {
    pub admin: bool,
}

/// Profile upsert response
#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertUserResponse {
    pub result: UpdateResult,
    pub token: String,
}

fn newest_first(mut documents: Vec<Document>) -> Vec<Document> {
    documents.reverse();
    documents
}

fn set_fields(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Document {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Strip privileged fields and pin the email to the path value
fn profile_update(email: &str, mut profile: Document) -> Document {
    for field in PRIVILEGED_FIELDS {
        if profile.remove(field).is_some() {
            warn!(email = %email, field = field, "Ignoring privileged field in profile update");
        }
    }
    profile.insert("email".to_string(), Value::String(email.to_string()));
    profile
}

// =============================================================================
// Handlers
// =============================================================================

/// Root greeting
pub async fn root() -> &'static str {
    "Hello, from parts store server"
}

// --- Products ---------------------------------------------------------------

#[instrument(skip(state, admin, product), fields(caller = %admin.email))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(product): Json<Document>,
) -> ApiResult<InsertOneResult> {
    let result = state
        .store
        .insert_one(Collection::Products, product)
        .await
        .map_err(error_to_response)?;

    info!("Created product {}", result.inserted_id);
    Ok(Json(result))
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Document>> {
    let products = state
        .store
        .find(Collection::Products, &Filter::All)
        .await
        .map_err(error_to_response)?;

    Ok(Json(newest_first(products)))
}

pub async fn get_product(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(id): Path<String>,
) -> ApiResult<Option<Document>> {
    let product = state
        .store
        .find_one(Collection::Products, &Filter::by_id(id))
        .await
        .map_err(error_to_response)?;

    Ok(Json(product))
}

#[instrument(skip(state, admin), fields(caller = %admin.email))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<DeleteResult> {
    let result = state
        .store
        .delete_one(Collection::Products, &Filter::by_id(id))
        .await
        .map_err(error_to_response)?;

    Ok(Json(result))
}

// --- Orders -----------------------------------------------------------------

pub async fn list_orders(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<Vec<Document>> {
    let orders = state
        .store
        .find(Collection::Orders, &Filter::All)
        .await
        .map_err(error_to_response)?;

    Ok(Json(orders))
}

#[instrument(skip(state, admin), fields(caller = %admin.email))]
pub async fn mark_order_shipped(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<UpdateResult> {
    let result = state
        .store
        .update_one(
            Collection::Orders,
            &Filter::by_id(id),
            set_fields([("shipped", Value::Bool(true))]),
            false,
        )
        .await
        .map_err(error_to_response)?;

    Ok(Json(result))
}

#[instrument(skip(state, user, order), fields(caller = %user.email))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(order): Json<Document>,
) -> ApiResult<InsertOneResult> {
    let result = state
        .store
        .insert_one(Collection::Orders, order)
        .await
        .map_err(error_to_response)?;

    info!("Created order {}", result.inserted_id);
    Ok(Json(result))
}

pub async fn list_orders_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Vec<Document>> {
    let orders = state
        .store
        .find(Collection::Orders, &Filter::eq("customerEmail", email))
        .await
        .map_err(error_to_response)?;

    Ok(Json(newest_first(orders)))
}

#[instrument(skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResult> {
    let result = state
        .store
        .delete_one(Collection::Orders, &Filter::by_id(id))
        .await
        .map_err(error_to_response)?;

    Ok(Json(result))
}

// --- Payments ---------------------------------------------------------------

pub async fn get_order_for_payment(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(id): Path<String>,
) -> ApiResult<Option<Document>> {
    let order = state
        .store
        .find_one(Collection::Orders, &Filter::by_id(id))
        .await
        .map_err(error_to_response)?;

    Ok(Json(order))
}

/// Ask the payment provider for an intent and relay its client secret
#[instrument(skip(state, request), fields(total_price = request.total_price))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> ApiResult<CreatePaymentIntentResponse> {
    let intent_request = PaymentIntentRequest::from_total(request.total_price, state.currency)
        .map_err(error_to_response)?;

    let intent = state
        .payments
        .create_payment_intent(&intent_request)
        .await
        .map_err(error_to_response)?;

    info!(
        "Created payment intent {} via {} for {} minor units",
        intent.id,
        state.payments.provider_name(),
        intent.amount
    );

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Record a completed payment and mark the order paid, as one atomic batch
#[instrument(skip(state, request), fields(transaction_id = %request.transaction_id))]
pub async fn finalize_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FinalizePaymentRequest>,
) -> ApiResult<UpdateResult> {
    let order_ref = request.order_id.unwrap_or_else(|| id.clone());
    let transaction_id = Value::String(request.transaction_id);

    let ops = vec![
        WriteOp::InsertOne {
            collection: Collection::Payments,
            document: set_fields([
                ("orderId", Value::String(order_ref)),
                ("transactionId", transaction_id.clone()),
            ]),
        },
        WriteOp::UpdateOne {
            collection: Collection::Orders,
            filter: Filter::by_id(id.as_str()),
            set: set_fields([
                ("paid", Value::Bool(true)),
                ("transactionId", transaction_id),
            ]),
            upsert: false,
        },
    ];

    let outcomes = state.store.write_batch(ops).await.map_err(error_to_response)?;
    let result = outcomes
        .into_iter()
        .find_map(|outcome| outcome.into_update())
        .ok_or_else(|| {
            error_to_response(PartsError::Internal("Batch returned no order update".to_string()))
        })?;

    if result.matched_count == 0 {
        warn!(order_id = %id, "Payment recorded for unknown order");
    } else {
        info!(order_id = %id, "Order marked paid");
    }

    Ok(Json(result))
}

// --- Reviews ----------------------------------------------------------------

pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Vec<Document>> {
    let reviews = state
        .store
        .find(Collection::Reviews, &Filter::All)
        .await
        .map_err(error_to_response)?;

    Ok(Json(newest_first(reviews)))
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(review): Json<Document>,
) -> ApiResult<InsertOneResult> {
    let result = state
        .store
        .insert_one(Collection::Reviews, review)
        .await
        .map_err(error_to_response)?;

    Ok(Json(result))
}

// --- Users ------------------------------------------------------------------

pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<Vec<Document>> {
    let users = state
        .store
        .find(Collection::Users, &Filter::All)
        .await
        .map_err(error_to_response)?;

    Ok(Json(users))
}

/// The only path that writes `role`
#[instrument(skip(state, admin), fields(caller = %admin.email))]
pub async fn grant_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(email): Path<String>,
) -> ApiResult<UpdateResult> {
    let result = state
        .store
        .update_one(
            Collection::Users,
            &Filter::eq("email", email.as_str()),
            set_fields([("role", Value::String(ADMIN_ROLE.to_string()))]),
            false,
        )
        .await
        .map_err(error_to_response)?;

    info!(email = %email, matched = result.matched_count, "Granted admin role");
    Ok(Json(result))
}

pub async fn check_admin(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(email): Path<String>,
) -> ApiResult<AdminStatus> {
    let user = state
        .store
        .find_one(Collection::Users, &Filter::eq("email", email))
        .await
        .map_err(error_to_response)?;

    Ok(Json(AdminStatus {
        admin: user.as_ref().is_some_and(is_admin),
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Option<Document>> {
    let user = state
        .store
        .find_one(Collection::Users, &Filter::eq("email", email))
        .await
        .map_err(error_to_response)?;

    Ok(Json(user))
}

/// Merge the profile into the user document (creating it if absent) and
/// issue a fresh token for that email
#[instrument(skip(state, profile))]
pub async fn upsert_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(profile): Json<Document>,
) -> ApiResult<UpsertUserResponse> {
    let result = state
        .store
        .update_one(
            Collection::Users,
            &Filter::eq("email", email.as_str()),
            profile_update(&email, profile),
            true,
        )
        .await
        .map_err(error_to_response)?;

    let token = state.tokens.issue(&email).map_err(error_to_response)?;

    Ok(Json(UpsertUserResponse { result, token }))
}

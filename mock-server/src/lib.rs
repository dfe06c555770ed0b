//! In-memory backend following the conventions `xhr-core` targets.
//!
//! Serves an HTML page carrying the CSRF token in a meta tag, rejects
//! state-changing requests without that token, and answers invalid writes
//! with `422 {"errors": {...}}`.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const CSRF_HEADER: &str = "x-csrf-token";
pub const DEFAULT_CSRF_TOKEN: &str = "dev-csrf-token";
pub const CSRF_FAILURE: &str = "Can't verify CSRF token authenticity.";

/// How long `GET /slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, Default)]
pub struct CreateUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub type Errors = BTreeMap<String, Vec<String>>;

pub struct AppState {
    users: RwLock<HashMap<Uuid, User>>,
    csrf_token: String,
}

type SharedState = Arc<AppState>;

pub fn app(csrf_token: &str) -> Router {
    let state: SharedState = Arc::new(AppState {
        users: RwLock::new(HashMap::new()),
        csrf_token: csrf_token.to_string(),
    });
    Router::new()
        .route("/", get(page))
        .route("/headers", get(echo_headers).post(echo_headers))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/slow", get(slow))
        .layer(middleware::from_fn_with_state(state.clone(), verify_csrf))
        .with_state(state)
}

pub async fn run(listener: TcpListener, csrf_token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(csrf_token)).await
}

/// Reject non-GET/HEAD requests whose `X-CSRF-Token` does not match.
async fn verify_csrf(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    if *request.method() == Method::GET || *request.method() == Method::HEAD {
        return next.run(request).await;
    }
    let presented = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented != Some(state.csrf_token.as_str()) {
        tracing::warn!(method = %request.method(), uri = %request.uri(), "rejected request without valid CSRF token");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": CSRF_FAILURE })),
        )
            .into_response();
    }
    next.run(request).await
}

async fn page(State(state): State<SharedState>) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta name=\"csrf-param\" content=\"authenticity_token\" />\n  <meta name=\"csrf-token\" content=\"{}\" />\n</head>\n<body></body>\n</html>\n",
        state.csrf_token
    ))
}

/// Every received header as a `[name, value]` pair, duplicates included.
async fn echo_headers(headers: HeaderMap) -> Json<Vec<(String, String)>> {
    Json(
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
    )
}

async fn slow() -> Json<serde_json::Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({ "slow": true }))
}

fn validate(name: &str, email: &str) -> Errors {
    let mut errors = Errors::new();
    if name.trim().is_empty() {
        errors
            .entry("name".to_string())
            .or_default()
            .push("can't be blank".to_string());
    }
    if email.trim().is_empty() {
        errors
            .entry("email".to_string())
            .or_default()
            .push("can't be blank".to_string());
    } else if !email.contains('@') {
        errors
            .entry("email".to_string())
            .or_default()
            .push("is invalid".to_string());
    }
    errors
}

fn unprocessable(errors: Errors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "errors": errors })),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}

async fn list_users(State(state): State<SharedState>) -> Json<Vec<User>> {
    let users = state.users.read().await;
    let mut list: Vec<User> = users.values().cloned().collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    Json(list)
}

async fn create_user(State(state): State<SharedState>, Json(input): Json<CreateUser>) -> Response {
    let errors = validate(&input.name, &input.email);
    if !errors.is_empty() {
        return unprocessable(errors);
    }
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        email: input.email,
    };
    state.users.write().await.insert(user.id, user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn get_user(State(state): State<SharedState>, Path(id): Path<Uuid>) -> Response {
    let users = state.users.read().await;
    match users.get(&id) {
        Some(user) => Json(user.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> Response {
    let mut users = state.users.write().await;
    let Some(user) = users.get_mut(&id) else {
        return not_found();
    };
    let name = input.name.unwrap_or_else(|| user.name.clone());
    let email = input.email.unwrap_or_else(|| user.email.clone());
    let errors = validate(&name, &email);
    if !errors.is_empty() {
        return unprocessable(errors);
    }
    user.name = name;
    user.email = email;
    Json(user.clone()).into_response()
}

async fn delete_user(State(state): State<SharedState>, Path(id): Path<Uuid>) -> Response {
    let mut users = state.users.write().await;
    match users.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_to_json() {
        let user = User {
            id: Uuid::nil(),
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["email"], "ada@example.test");
    }

    #[test]
    fn create_user_fields_default_to_empty() {
        let input: CreateUser = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_empty());
        assert!(input.email.is_empty());
    }

    #[test]
    fn validate_accepts_valid_input() {
        assert!(validate("Ada", "ada@example.test").is_empty());
    }

    #[test]
    fn validate_reports_blank_fields() {
        let errors = validate("  ", "");
        assert_eq!(errors["name"], vec!["can't be blank".to_string()]);
        assert_eq!(errors["email"], vec!["can't be blank".to_string()]);
    }

    #[test]
    fn validate_reports_malformed_email() {
        let errors = validate("Ada", "ada.example.test");
        assert!(!errors.contains_key("name"));
        assert_eq!(errors["email"], vec!["is invalid".to_string()]);
    }

    #[test]
    fn update_user_all_fields_optional() {
        let input: UpdateUser = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
        assert!(input.email.is_none());
    }
}

//! HTTP surface: the protected `/query` and `/set_password` routes.
//!
//! Each handler parses credentials up front, then does all database work in
//! one blocking-pool closure: open the request's connection, run the
//! credential gate, execute, shape the envelope. The connection drops when
//! the closure returns, on every path.

use std::path::PathBuf;

use actix_web::{post, web, Either, HttpRequest, HttpResponse};
use log::debug;
use serde::Deserialize;

use crate::auth;
use crate::db;
use crate::error::{AuthError, GatewayError};
use crate::executor::{self, Envelope};

/// Shared application state: the path every request opens its connection to.
#[derive(Debug, Clone)]
pub struct AppState {
    pub database: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub user: UserCredentials,
}

#[derive(Debug, Deserialize)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

/// Register the API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(query).service(set_password);
}

fn open_for_request(state: &AppState) -> Result<rusqlite::Connection, AuthError> {
    // The gate is the first consumer of the connection, so an unopenable
    // database rejects the request fail-closed.
    db::open(&state.database).map_err(|e| AuthError::Lookup(e.to_string()))
}

/// POST /query — execute one SQL statement and answer with the envelope.
///
/// Accepts either a JSON body `{"query": "..."}` or a form-encoded `query`
/// field. Statement failures are reported inside the payload with HTTP 200;
/// only authentication produces a transport-level error.
#[post("/query")]
pub async fn query(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Either<web::Json<QueryRequest>, web::Form<QueryRequest>>,
) -> Result<HttpResponse, GatewayError> {
    let credentials = auth::credentials_from_request(&req)?;
    let sql = match body {
        Either::Left(json) => json.into_inner().query,
        Either::Right(form) => form.into_inner().query,
    };
    debug!("query from {}: {}", credentials.username, sql);

    let state = state.into_inner();
    let envelope = web::block(move || -> Result<Envelope, AuthError> {
        let conn = open_for_request(&state)?;
        auth::authenticate(&conn, &credentials)?;
        Ok(executor::execute_statement(&conn, &sql).into())
    })
    .await??;

    Ok(HttpResponse::Ok().json(envelope))
}

/// POST /set_password — store a new bcrypt hash for a user.
///
/// Body: `{"user": {"username": ..., "password": ...}}` with the new password
/// in plaintext. The update runs through the mutating executor, so its result
/// (or failure) comes back in the same envelope shape.
#[post("/set_password")]
pub async fn set_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<SetPasswordRequest>,
) -> Result<HttpResponse, GatewayError> {
    let credentials = auth::credentials_from_request(&req)?;
    let target = body.into_inner().user;

    let state = state.into_inner();
    let envelope = web::block(move || -> Result<Envelope, AuthError> {
        let conn = open_for_request(&state)?;
        auth::authenticate(&conn, &credentials)?;
        let hash = auth::hash_password(&target.password, None)?;
        let sql = auth::password_update_sql(&target.username, &hash);
        Ok(executor::run_mutation(&conn, &sql).into())
    })
    .await??;

    Ok(HttpResponse::Ok().json(envelope))
}

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::{generate_access_token, generate_refresh_token, verify_token};
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{ChangePasswordDto, LoginReqDto, TokenType};
use crate::store;

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: LoginUser,
}

#[derive(Serialize, ToSchema)]
pub struct LoginUser {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub designation: String,
    pub profile_image: String,
}

/// Login with email + password, answering an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, payload), fields(email = %payload.email))]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Email and password are required.".into()));
    }

    debug!("Fetching account");
    let account = store::employee::auth_by_email(pool.get_ref(), payload.email.trim()).await?;

    let Some(account) = account else {
        info!("Invalid credentials: account not found");
        return Ok(unauthorized());
    };

    if !verify_password(&payload.password, &account.password) {
        info!("Invalid credentials: password mismatch");
        return Ok(unauthorized());
    }

    let access_token = generate_access_token(
        account.id,
        account.email.clone(),
        account.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        account.id,
        account.email.clone(),
        account.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(user_id = account.id, jti = %refresh_claims.jti, "Storing refresh token");
    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, FROM_UNIXTIME(?))",
    )
    .bind(account.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await?;

    // Non-fatal bookkeeping.
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(account.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        user: LoginUser {
            id: account.id,
            name: account.name,
            role: account.role.to_string(),
            designation: account.designation.to_string(),
            profile_image: account.profile_image,
        },
    }))
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "success": false,
        "message": "Invalid email or password"
    }))
}

/// Rotates the refresh token and issues a fresh access token.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair"),
        (status = 401, description = "Invalid, revoked or non-refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let Some(token) = bearer_token(&req) else {
        return Ok(HttpResponse::Unauthorized().body("No token"));
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return Ok(HttpResponse::Unauthorized().finish()),
    };

    if claims.token_type != TokenType::Refresh {
        return Ok(HttpResponse::Unauthorized().finish());
    }

    let record = sqlx::query_as::<_, (u64, u64, bool)>(
        "SELECT id, user_id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await?;

    let (record_id, user_id) = match record {
        Some((id, user_id, revoked)) if !revoked => (id, user_id),
        _ => return Ok(HttpResponse::Unauthorized().finish()),
    };

    // Rotation: the presented refresh token is spent either way.
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await?;

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, FROM_UNIXTIME(?))",
    )
    .bind(user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await?;

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub,
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    Ok(HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    })))
}

/// Revokes the presented refresh token. Always answers 204, even for tokens
/// that never existed.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Refresh token revoked")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> HttpResponse {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::NoContent().finish();
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}

/// Change password for the logged-in account.
#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Wrong current password or weak new password"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ChangePasswordDto>,
) -> Result<HttpResponse, AppError> {
    validate_new_password(&payload.new_password)?;

    let hash = store::employee::password_hash_of(pool.get_ref(), auth.user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if !verify_password(&payload.current_password, &hash) {
        return Err(AppError::Validation("Current password is incorrect.".into()));
    }

    let new_hash = hash_password(&payload.new_password);
    store::employee::set_password(pool.get_ref(), auth.user_id, &new_hash).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password updated successfully."
    })))
}

fn validate_new_password(password: &str) -> AppResult<()> {
    if password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long.".into(),
        ));
    }
    Ok(())
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

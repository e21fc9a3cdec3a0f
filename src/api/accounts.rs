//! Session login and logout

use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::user::{LoginRequest, UserInfo},
    session::{self, Session},
    AppState,
};

use super::{AuthenticatedUser, JsonForm};

#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginQuery {
    /// Path the visitor was sent away from
    pub next: Option<String>,
}

/// Login form description
#[derive(Serialize, ToSchema)]
pub struct LoginForm {
    pub fields: Vec<String>,
    pub next: Option<String>,
}

/// Login form; anonymous visitors on protected views land here
#[utoipa::path(
    get,
    path = "/accounts/login",
    tag = "accounts",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login form", body = LoginForm)
    )
)]
pub async fn login_form(Query(query): Query<LoginQuery>) -> Json<LoginForm> {
    Json(LoginForm {
        fields: vec!["username".to_string(), "password".to_string()],
        next: query.next,
    })
}

/// Authenticate and attach the user to the session
#[utoipa::path(
    post,
    path = "/accounts/login",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserInfo),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonForm(request): JsonForm<LoginRequest>,
) -> AppResult<Json<UserInfo>> {
    let claims = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;

    session::persist_user(&session, claims.user_id).await?;
    Ok(Json(UserInfo::from(claims)))
}

/// End the session
#[utoipa::path(
    post,
    path = "/accounts/logout",
    tag = "accounts",
    responses(
        (status = 303, description = "Logged out, redirect to home")
    )
)]
pub async fn logout(session: Session) -> AppResult<Redirect> {
    session::flush(&session).await?;
    Ok(Redirect::to("/"))
}

/// Current user
#[utoipa::path(
    get,
    path = "/accounts/me",
    tag = "accounts",
    responses(
        (status = 200, description = "Logged-in user", body = UserInfo),
        (status = 303, description = "Not logged in, redirect to login")
    )
)]
pub async fn me(AuthenticatedUser(claims): AuthenticatedUser) -> Json<UserInfo> {
    Json(UserInfo::from(claims))
}

//! Account endpoints: signup, login, logout, token refresh and profile.

use api_types::{
    MessageResponse, ScalarInput,
    user::{
        LoginRequest, LoginResponse, LogoutRequest, ProfileUpdate, SignupRequest, SignupResponse,
        TokenRefreshRequest, TokenRefreshResponse, UserProfile,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{EngineError, Identity, LoginCmd, ProfileChanges, SignupCmd, User, WriteMode};

use crate::{Payload, Scalars, ServerError, server::ServerState};

fn profile_view(user: User) -> UserProfile {
    UserProfile {
        id: user.id,
        email: user.email,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    }
}

fn profile_changes(payload: ProfileUpdate) -> Result<ProfileChanges, ServerError> {
    let mut scalars = Scalars::default();
    let changes = ProfileChanges {
        email: scalars.text("email", payload.email),
        username: scalars.text("username", payload.username),
        first_name: scalars.text("first_name", payload.first_name),
        last_name: scalars.text("last_name", payload.last_name),
    };
    scalars.finish(changes)
}

fn signup_cmd(payload: SignupRequest) -> Result<SignupCmd, ServerError> {
    let mut scalars = Scalars::default();
    let cmd = SignupCmd {
        email: scalars.text("email", payload.email),
        username: scalars.text("username", payload.username),
        first_name: scalars.text("first_name", payload.first_name),
        last_name: scalars.text("last_name", payload.last_name),
        password: scalars.text("password", payload.password),
        confirm_password: scalars.text("confirm_password", payload.confirm_password),
    };
    scalars.finish(cmd)
}

pub async fn signup(
    State(state): State<ServerState>,
    Payload(payload): Payload<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ServerError> {
    let user = state.engine.signup(signup_cmd(payload)?).await?;
    tracing::info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            email: user.email,
            message: "User created successfully".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    Payload(payload): Payload<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let mut scalars = Scalars::default();
    let cmd = LoginCmd {
        email: scalars.text("email", payload.email),
        password: scalars.text("password", payload.password),
    };
    let cmd = scalars.finish(cmd)?;
    let outcome = state
        .engine
        .login(cmd)
        .await
        .inspect_err(|err| {
            if matches!(err, EngineError::AuthenticationFailed) {
                tracing::warn!("failed login attempt");
            }
        })?;
    tracing::info!(user_id = %outcome.user.id, "user logged in");

    Ok(Json(LoginResponse {
        access: outcome.tokens.access,
        refresh: outcome.tokens.refresh,
        id: outcome.user.id,
        email: outcome.user.email,
        message: "User logged in successfully".to_string(),
    }))
}

/// An unreadable body counts as a missing refresh token.
pub async fn logout(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServerError> {
    let refresh = payload
        .ok()
        .and_then(|Json(body)| body.refresh)
        .and_then(ScalarInput::into_text);
    state.engine.logout(refresh.as_deref(), &identity).await?;
    tracing::info!(user_id = %identity.id, "refresh token revoked");

    Ok(Json(MessageResponse {
        message: "User logged out successfully".to_string(),
    }))
}

pub async fn refresh(
    State(state): State<ServerState>,
    Payload(payload): Payload<TokenRefreshRequest>,
) -> Result<Json<TokenRefreshResponse>, ServerError> {
    let mut scalars = Scalars::default();
    let refresh = scalars.text("refresh", payload.refresh);
    scalars.finish(())?;
    let access = state.engine.refresh_access(refresh.as_deref()).await?;
    Ok(Json(TokenRefreshResponse { access }))
}

pub async fn profile(
    Extension(_identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ServerError> {
    let user = state.engine.profile(&user_id).await?;
    Ok(Json(profile_view(user)))
}

pub async fn profile_replace(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Payload(payload): Payload<ProfileUpdate>,
) -> Result<Json<UserProfile>, ServerError> {
    update_profile(&state, &identity, &user_id, payload, WriteMode::Full).await
}

pub async fn profile_patch(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Payload(payload): Payload<ProfileUpdate>,
) -> Result<Json<UserProfile>, ServerError> {
    update_profile(&state, &identity, &user_id, payload, WriteMode::Partial).await
}

async fn update_profile(
    state: &ServerState,
    identity: &Identity,
    user_id: &str,
    payload: ProfileUpdate,
    mode: WriteMode,
) -> Result<Json<UserProfile>, ServerError> {
    let user = state
        .engine
        .update_profile(user_id, profile_changes(payload)?, mode, identity)
        .await?;
    Ok(Json(profile_view(user)))
}

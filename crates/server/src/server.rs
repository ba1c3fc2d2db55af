use std::{any::Any, sync::Arc};

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{ServerError, expenditure, income, internal_error_response, user};
use engine::{Engine, EngineError};

const NO_CREDENTIALS: &str = "Authentication credentials were not provided.";
const BAD_HEADER: &str = "Invalid Authorization header.";

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolve the bearer access token into an `engine::Identity` request
/// extension.
async fn auth(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|rejection| {
        let message = if rejection.is_missing() {
            NO_CREDENTIALS
        } else {
            BAD_HEADER
        };
        ServerError::Engine(EngineError::Unauthenticated(message.to_string()))
    })?;

    let identity = state.engine.authenticate(bearer.token()).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("handler panicked: {message}");
    internal_error_response()
}

/// Full application router: public account routes, bearer-protected routes,
/// request tracing and panic recovery.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    let protected = Router::new()
        .route("/logout", post(user::logout))
        .route(
            "/user/{id}/profile",
            get(user::profile)
                .put(user::profile_replace)
                .patch(user::profile_patch),
        )
        .route("/income", get(income::list).post(income::create))
        .route(
            "/income/{id}",
            get(income::retrieve)
                .put(income::replace)
                .patch(income::patch)
                .delete(income::delete),
        )
        .route("/expenditure/categories", get(expenditure::categories))
        .route(
            "/expenditure",
            get(expenditure::list).post(expenditure::create),
        )
        .route(
            "/expenditure/{id}",
            get(expenditure::retrieve)
                .put(expenditure::replace)
                .patch(expenditure::patch)
                .delete(expenditure::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/signup", post(user::signup))
        .route("/login", post(user::login))
        .route("/token/refresh", post(user::refresh))
        .merge(protected)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(engine: Engine, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}

pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::file_service::FileService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::get_profile,
        api::handlers::auth::update_profile,
        api::handlers::auth::change_password,
        api::handlers::files::upload::upload_files,
        api::handlers::files::list::list_files,
        api::handlers::files::manage::update_share_settings,
        api::handlers::files::manage::regenerate_share_link,
        api::handlers::files::manage::delete_file,
        api::handlers::files::manage::get_stats,
        api::handlers::files::share::get_shared_file,
        api::handlers::files::share::download_shared_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::auth::RegisterRequest,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::AuthResponse,
            api::handlers::auth::UserResponse,
            api::handlers::auth::ProfileResponse,
            api::handlers::auth::UpdateProfileRequest,
            api::handlers::auth::ChangePasswordRequest,
            api::handlers::auth::MessageResponse,
            api::handlers::files::types::FileResponse,
            api::handlers::files::types::UploadResponse,
            api::handlers::files::types::ListResponse,
            api::handlers::files::types::Pagination,
            api::handlers::files::types::ShareSettingsRequest,
            api::handlers::files::types::FileActionResponse,
            api::handlers::files::types::DeleteResponse,
            api::handlers::files::types::SharedFileView,
            api::handlers::files::types::SharedFileResponse,
            services::file_service::FileStats,
            services::file_service::FileTypeStat,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and account endpoints"),
        (name = "files", description = "File upload, management and sharing endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub file_service: Arc<FileService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_file_size * state.config.max_files_per_upload
        + 10 * 1024 * 1024; // multipart overhead

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        .route(
            "/auth/profile",
            get(api::handlers::auth::get_profile)
                .put(api::handlers::auth::update_profile)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/auth/change-password",
            put(api::handlers::auth::change_password).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/files/upload",
            post(api::handlers::files::upload::upload_files)
                .layer(axum::extract::DefaultBodyLimit::max(body_limit))
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/files",
            get(api::handlers::files::list::list_files).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/files/stats",
            get(api::handlers::files::manage::get_stats).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/files/:id",
            axum::routing::delete(api::handlers::files::manage::delete_file).layer(
                from_fn_with_state(state.clone(), api::middleware::auth::auth_middleware),
            ),
        )
        .route(
            "/files/:id/share",
            put(api::handlers::files::manage::update_share_settings).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/files/:id/new-link",
            post(api::handlers::files::manage::regenerate_share_link).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        // Share-link endpoints are public; the access policy gates them
        .route(
            "/files/share/:share_link",
            get(api::handlers::files::share::get_shared_file),
        )
        .route(
            "/files/download/:share_link",
            get(api::handlers::files::share::download_shared_file),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

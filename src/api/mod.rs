// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{optional_auth, require_auth, Role},
    config::Config,
    middleware::{cors_layer, log_requests, rate_limit},
    models::{
        AuthSession, CreateCommentRequest, CreateEventRequest, CreateProjectRequest,
        CreateReviewRequest, CreateSongRequest, CreateStemRequest, CreateTipRequest,
        InviteRequest, LoginRequest, MessageResponse, ModerationResponse, PublishSongRequest,
        Record, RoleUpdatedResponse, SignupRequest, SongActionResponse, UpdateRoleRequest,
        UpdateSongRequest,
    },
    state::AppState,
};

pub mod admin;
pub mod engagement;
pub mod extract;
pub mod health;
pub mod projects;
pub mod songs;
pub mod users;

/// Build the full application router.
///
/// Middleware runs outermost first: CORS, request id, access log, rate
/// limit. Authentication is attached per route group.
pub fn router(state: AppState, config: &Config) -> Router {
    let required = || from_fn_with_state(state.clone(), require_auth);
    let optional = || from_fn_with_state(state.clone(), optional_auth);

    let auth_routes = Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .merge(
            Router::new()
                .route("/me", get(users::me))
                .route("/profile", get(users::profile))
                .route("/logout", post(users::logout))
                .route_layer(required()),
        );

    let public_routes = Router::new()
        .route("/songs", get(songs::list_songs))
        .route("/songs/{id}", get(songs::get_song))
        .route("/songs/{id}/comments", get(engagement::list_comments))
        .route("/songs/{id}/reviews", get(engagement::list_reviews))
        .route("/events", post(engagement::create_event))
        .route("/analytics/artist/{id}", get(engagement::artist_analytics))
        .route_layer(optional());

    let member_routes = Router::new()
        .route("/songs", post(songs::create_song))
        .route(
            "/songs/{id}",
            patch(songs::update_song).delete(songs::delete_song),
        )
        .route("/songs/{id}/publish", post(songs::publish_song))
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/projects/{id}", get(projects::get_project))
        .route("/projects/{id}/invite", post(projects::invite_to_project))
        .route(
            "/projects/{id}/stems",
            get(projects::list_stems).post(projects::create_stem),
        )
        .route("/comments", post(engagement::create_comment))
        .route("/reviews", post(engagement::create_review))
        .route("/tips", post(engagement::create_tip))
        .route_layer(required());

    let admin_routes = Router::new()
        .route("/songs/{id}/takedown", post(admin::takedown_song))
        .route("/comments/{id}", delete(admin::delete_comment))
        .route("/reviews/{id}", delete(admin::delete_review))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", patch(admin::update_user_role))
        .route_layer(required());

    let v1_routes = Router::new()
        .route("/status", get(health::status))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .merge(public_routes)
        .merge(member_routes)
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/ping", get(health::ping))
        .nest("/api/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(config.cors_allowed_origin.as_ref()))
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(from_fn(log_requests))
                .layer(from_fn_with_state(state, rate_limit)),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::ping,
        health::status,
        users::signup,
        users::login,
        users::me,
        users::logout,
        users::profile,
        songs::list_songs,
        songs::get_song,
        songs::create_song,
        songs::update_song,
        songs::delete_song,
        songs::publish_song,
        projects::list_projects,
        projects::create_project,
        projects::get_project,
        projects::invite_to_project,
        projects::create_stem,
        projects::list_stems,
        engagement::create_comment,
        engagement::list_comments,
        engagement::create_review,
        engagement::list_reviews,
        engagement::create_tip,
        engagement::create_event,
        engagement::artist_analytics,
        admin::takedown_song,
        admin::delete_comment,
        admin::delete_review,
        admin::list_users,
        admin::update_user_role
    ),
    components(
        schemas(
            Record,
            MessageResponse,
            SignupRequest,
            LoginRequest,
            AuthSession,
            CreateSongRequest,
            UpdateSongRequest,
            PublishSongRequest,
            SongActionResponse,
            CreateProjectRequest,
            InviteRequest,
            CreateStemRequest,
            CreateCommentRequest,
            CreateReviewRequest,
            CreateTipRequest,
            CreateEventRequest,
            UpdateRoleRequest,
            ModerationResponse,
            RoleUpdatedResponse,
            Role,
            health::HealthResponse,
            health::StatusResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and version"),
        (name = "Auth", description = "Signup, login and session management"),
        (name = "Songs", description = "Song catalogue and publishing"),
        (name = "Projects", description = "Collaborative projects and stems"),
        (name = "Engagement", description = "Comments, reviews, tips and analytics"),
        (name = "Admin", description = "Moderation and user management")
    )
)]
struct ApiDoc;

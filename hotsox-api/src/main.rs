use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod config;
mod domain;
mod events;
mod middleware;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use hotsox_shared::clients::db::{self, DbPool};
use hotsox_shared::clients::email::EmailClient;
use hotsox_shared::clients::media::MediaClient;
use hotsox_shared::clients::rabbitmq::RabbitMQClient;
use hotsox_shared::clients::redis::RedisClient;
use hotsox_shared::middleware::{metrics_middleware, JwtSecret};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
    pub media: MediaClient,
    pub email: EmailClient,
    pub metrics_handle: PrometheusHandle,
    pub trusted_proxies: Vec<IpAddr>,
}

impl JwtSecret for AppState {
    fn jwt_secret(&self) -> &str {
        &self.config.jwt_secret
    }
}

fn api_routes() -> Router<Arc<AppState>> {
    use routes::*;

    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/user", post(users::register).get(users::list_users))
        .route(
            "/user/me",
            get(users::get_me).put(users::update_me).delete(users::delete_me),
        )
        .route(
            "/user/profilepic",
            get(user_pictures::list_pictures).post(user_pictures::upload_picture),
        )
        .route("/user/profilepic/:id", delete(user_pictures::delete_picture))
        .route("/user/mail", get(mail::list_mails))
        .route("/user/mail/:id", get(mail::read_mail).delete(mail::delete_mail))
        .route("/user/chat", get(chat::list_messages))
        .route(
            "/user/chat/:username",
            get(chat::conversation).post(chat::send_message),
        )
        .route("/sock", get(socks::list_socks).post(socks::create_sock))
        .route(
            "/sock/selection",
            get(socks::get_selection).put(socks::set_selection),
        )
        .route(
            "/sock/:id",
            get(socks::get_sock).put(socks::update_sock).delete(socks::delete_sock),
        )
        .route(
            "/sock/:id/profilepic",
            get(sock_pictures::list_pictures).post(sock_pictures::upload_picture),
        )
        .route(
            "/sock/:id/profilepic/:pic_id",
            delete(sock_pictures::delete_picture),
        )
        .route("/swipe", get(swipe::next_candidate).post(swipe::swipe))
        .route("/match", get(matches::list_matches))
        .route(
            "/match/:username",
            get(matches::match_details).delete(matches::unmatch),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hotsox_shared::middleware::init_tracing("hotsox-api");

    let config = AppConfig::load()?;
    let port = config.port;
    let api_prefix = config.api_prefix.clone();

    let metrics_handle = hotsox_shared::middleware::init_metrics()?;

    let db = db::create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;
    let media = MediaClient::new(
        &config.minio_endpoint,
        &config.minio_access_key,
        &config.minio_secret_key,
        &config.minio_bucket,
        &config.minio_public_url,
    )
    .await;
    let email = EmailClient::new(
        &config.resend_api_url,
        &config.resend_api_key,
        &config.from_email,
        &config.from_name,
    );

    let trusted_proxies = config.trusted_proxy_ips();

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
        media,
        email,
        metrics_handle,
        trusted_proxies,
    });

    // Mail worker: consumes hotsox.mail.message.requested
    let worker_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_mail_requests(worker_state).await {
            tracing::error!(error = %e, "mail subscriber failed");
        }
    });

    let api = api_routes()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .layer(DefaultBodyLimit::max(services::picture_service::MAX_PICTURE_BYTES + 64 * 1024))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .route_layer(axum::middleware::from_fn(metrics_middleware));

    let app = Router::new()
        .nest(&api_prefix, api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(AllowMethods::list([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ]))
                        .allow_headers(AllowHeaders::list([
                            header::AUTHORIZATION,
                            header::CONTENT_TYPE,
                            header::ACCEPT,
                        ])),
                ),
        )
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, prefix = %api_prefix, "hotsox-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpServer, web};
use reqwest::Client;

use application::auth_service::AuthService;
use application::referral_code_service::ReferralCodeService;
use application::user_service::UserService;
use data::referral_code_repository::PostgresReferralCodeRepository;
use data::user_repository::PostgresUserRepository;
use infrastructure::cache::ResponseCache;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::email::{HttpMailer, ReferralMailer};
use infrastructure::email_verify::{EmailVerifier, HunterClient};
use infrastructure::logging::init_logging;
use infrastructure::security::JwtKeys;
use presentation::handlers;
use presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = AppConfig::from_env().expect("invalid configuration");
    let pool = create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");
    run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let code_repo = Arc::new(PostgresReferralCodeRepository::new(pool.clone()));

    let http = Client::new();
    let mailer: Arc<dyn ReferralMailer> = Arc::new(HttpMailer::new(
        http.clone(),
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
    ));
    let verifier: Arc<dyn EmailVerifier> = Arc::new(HunterClient::new(
        http,
        config.hunter_api_url.clone(),
        config.hunter_api_key.clone(),
    ));

    let auth_service = AuthService::new(
        Arc::clone(&user_repo),
        JwtKeys::new(config.jwt_secret.clone()),
    );
    let code_service = ReferralCodeService::new(Arc::clone(&code_repo));
    let user_service = UserService::new(
        Arc::clone(&user_repo),
        Arc::clone(&code_repo),
        mailer,
        verifier,
        config.registration_url.clone(),
    );
    let cache = web::Data::new(ResponseCache::default());

    let config_data = config.clone();

    HttpServer::new(move || {
        let cors = build_cors(&config_data);
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TimingMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(code_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(cache.clone())
            .service(
                web::scope("/api")
                    .service(handlers::auth::scope())
                    .service(handlers::user::register)
                    .service(handlers::user::get_rc_by_email)
                    .service(handlers::user::end_registration)
                    .service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware::new(auth_service.keys().clone()))
                            .service(handlers::user::user_info)
                            .service(handlers::user::referrals_info)
                            .service(handlers::user::update_user_info)
                            .service(handlers::user::email_exists)
                            .service(handlers::referral_code::create_code)
                            .service(handlers::referral_code::activate_code)
                            .service(handlers::referral_code::delete_code),
                    ),
            )
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use portfolio_review::auth::identity::IdentityCache;
use portfolio_review::auth::middleware::JwtSecret;
use portfolio_review::cache::RedisCache;
use portfolio_review::config::AppConfig;
use portfolio_review::create_pool;
use portfolio_review::db::SeaOrmStore;
use portfolio_review::handlers;
use portfolio_review::review::{ReviewGateway, TransitionEngine};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db = create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        tracing::info!("Migrations applied");
    }

    // The review engine owns every status change; the gateway splits it into
    // the advisor and super-admin desks.
    let store = Arc::new(SeaOrmStore::new(db.clone()));
    let engine = Arc::new(TransitionEngine::with_store(store, config.review.clone()));
    let gateway = web::Data::new(ReviewGateway::new(engine.clone()));
    let engine_data = web::Data::from(engine);
    let db_data = web::Data::new(db);

    // Initialize Redis cache
    let redis_cache = RedisCache::new(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");
    let redis_data = web::Data::new(Arc::new(redis_cache));
    tracing::info!("Connected to Redis");

    let cache_config = web::Data::new(config.cache.clone());
    let identities = web::Data::new(IdentityCache::new(config.cache.identity_ttl));
    let jwt_secret = web::Data::new(JwtSecret(config.jwt_secret.clone()));

    let bind_addr = config.bind_addr();
    tracing::info!(
        super_reject = config.review.allow_super_reject,
        "Server running at http://{bind_addr}"
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(redis_data.clone())
            .app_data(cache_config.clone())
            .app_data(identities.clone())
            .app_data(jwt_secret.clone())
            .app_data(engine_data.clone())
            .app_data(gateway.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[macro_use]
extern crate diesel;

mod auth;
mod errors;
mod handlers;
mod models;
mod schema;
mod storage;
mod utils;

pub struct AppState {
    pub secret: String,
    pub jwt_validation: jsonwebtoken::Validation,
}

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let port = std::env::var("PORT").expect("env PORT");
    let database_url = std::env::var("DATABASE_URL").expect("env DATABASE_URL");
    let secret = std::env::var("SECRET_KEY").expect("env SECRET_KEY");
    let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or("uploads".to_string());

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .expect("failed to create a pg pool");

    let mut connection = pool.get().expect("pg connection from the pool");
    connection
        .run_pending_migrations(MIGRATIONS)
        .expect("failed to run pending migrations");
    drop(connection);

    let store = storage::FileStore::new(&upload_dir).expect("writable upload directory");
    let state = web::Data::new(AppState {
        secret,
        jwt_validation: jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256),
    });

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(60)
        .finish()
        .unwrap();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(state.clone())
            .route("/", web::get().to(handlers::index))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Governor::new(&governor_conf))
            .wrap(Logger::default())
            .service(
                web::scope("/notes")
                    .route("", web::get().to(handlers::note::query::list))
                    .route("", web::post().to(handlers::note::post::new))
                    .route("/{id}", web::get().to(handlers::note::query::get))
                    .route("/{id}", web::patch().to(handlers::note::mutate::update))
                    .route("/{id}", web::delete().to(handlers::note::mutate::del))
                    .route("/{id}/share", web::post().to(handlers::note::share::grant))
                    .route("/{id}/share", web::delete().to(handlers::note::share::revoke))
                    .route(
                        "/{id}/categories",
                        web::post().to(handlers::note::category::add),
                    )
                    .route(
                        "/{id}/categories/{category_id}",
                        web::delete().to(handlers::note::category::remove),
                    )
                    .route(
                        "/{id}/attachments",
                        web::post().to(handlers::note::attachment::add),
                    )
                    .route(
                        "/{id}/attachments/{attachment_id}",
                        web::delete().to(handlers::note::attachment::remove),
                    ),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(handlers::category::list))
                    .route("", web::post().to(handlers::category::new))
                    .route("/{id}", web::delete().to(handlers::category::del)),
            )
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}

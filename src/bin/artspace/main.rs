use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use artspace::app_config::AppConfig;
use artspace::auth::{Authenticator, SessionAuthenticator};
use artspace::middleware::ClientCtx;
use artspace::moderation::ModerationEngine;
use env_logger::Env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = artspace::db::connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    artspace::db::create_schema(&db)
        .await
        .context("Failed to create database schema")?;

    let secret_key = match Key::try_from(config.server.secret_key.as_bytes()) {
        Ok(key) => key,
        Err(err) => {
            log::warn!("server.secret_key was invalid. Reason: {:?}\r\nThis means the key used for signing session cookies will invalidate every time the application is restarted. A secret key must be at least 64 bytes to be accepted.", err);
            Key::generate()
        }
    };

    let engine = Data::new(ModerationEngine::new(db.clone(), &config.moderation));
    let authenticator: Arc<dyn Authenticator> = Arc::new(SessionAuthenticator::new(db));
    let bind = (config.server.host.clone(), config.server.port);

    log::info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(engine.clone())
            .app_data(Data::new(authenticator.clone()))
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff")),
            )
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %Dms"))
            .configure(artspace::web::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    // A missing .env is normal outside development.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

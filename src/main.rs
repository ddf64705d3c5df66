use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use congress_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let event_service = EventService::new(pool.clone());
    let preference_service = PreferenceService::new(pool.clone());
    let player_service = PlayerService::new(pool.clone(), preference_service.clone());
    let prize_service = PrizeService::new(pool.clone());
    let award_service = AwardService::new(pool.clone());
    let result_service = ResultService::new(pool.clone());
    let allocation_service = AllocationService::new(pool.clone(), award_service.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(preference_service.clone()))
            .app_data(web::Data::new(player_service.clone()))
            .app_data(web::Data::new(prize_service.clone()))
            .app_data(web::Data::new(award_service.clone()))
            .app_data(web::Data::new(result_service.clone()))
            .app_data(web::Data::new(allocation_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::event_config)
                    .configure(handlers::player_config)
                    .configure(handlers::prize_config)
                    .configure(handlers::award_config)
                    .configure(handlers::result_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use fluenta_server::{
    app_state::AppState,
    auth::{AuthMiddleware, JwtService},
    config::Config,
    handlers,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        config.validate_for_production();
    }

    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .expect("failed to initialize application state");
    let state = web::Data::new(state);
    let jwt_data = web::Data::new(jwt_service);

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(state.clone())
            .app_data(jwt_data.clone())
            .wrap(Logger::default())
            .wrap(cors)
            .service(handlers::health_check)
            .service(handlers::health_check_live)
            .service(handlers::health_check_ready)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .service(handlers::start_exam)
                    .service(handlers::get_exam_attempt)
                    .service(handlers::get_section_questions)
                    .service(handlers::submit_section)
                    .service(handlers::complete_exam)
                    .service(handlers::start_quiz)
                    .service(handlers::start_block_quiz)
                    .service(handlers::retry_block_quiz)
                    .service(handlers::submit_quiz_attempt)
                    .service(handlers::list_quiz_attempts)
                    .service(handlers::get_quiz_attempt),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

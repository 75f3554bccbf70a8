//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ProviderSettings, ServerConfig};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::events::{
    create_event, delete_event, get_event, list_events, update_event,
};
use crate::inbound::http::generation::{generate_banner, generate_event};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::preferences::{delete_preferences, get_preferences, put_preferences};
use crate::inbound::http::registrations::{
    attendees, cancel, my_registrations, register, registration_status,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::uploads::{serve_upload, upload_image};
use crate::middleware::Trace;

use state_builders::build_http_state;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(create_event)
        .service(list_events)
        .service(upload_image)
        .service(get_event)
        .service(update_event)
        .service(delete_event)
        .service(register)
        .service(cancel)
        .service(attendees)
        .service(registration_status)
        .service(my_registrations)
        .service(get_preferences)
        .service(put_preferences)
        .service(delete_preferences)
        .service(generate_event)
        .service(generate_banner);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(serve_upload)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from the configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when an outbound client cannot be built or
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || build_app(health_state.clone(), http_state.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}

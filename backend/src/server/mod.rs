//! Server construction and middleware wiring.

mod config;
pub(crate) mod settings;
mod state_builders;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use campus_trade::Trace;
#[cfg(debug_assertions)]
use campus_trade::doc::ApiDoc;
use campus_trade::inbound::http::health::{HealthState, live, ready};
use campus_trade::inbound::http::products::{configure_api, get_upload};
use campus_trade::inbound::http::upload::UploadLimits;
use campus_trade::inbound::ws;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use state_builders::{AppStates, build_states};

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    states: AppStates,
    limits: web::Data<UploadLimits>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        states,
        limits,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(states.http)
        .app_data(states.ws)
        .app_data(limits)
        .wrap(Trace)
        .service(web::scope("/api").configure(configure_api))
        .service(get_upload)
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Wire adapters and build the Actix server.
///
/// The returned [`Server`] must be awaited to drive the listener. Readiness
/// is flagged once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when adapters cannot be opened or the socket
/// cannot be bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let states = build_states(&config).await?;
    let limits = web::Data::new(config.limits);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            states: states.clone(),
            limits: limits.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

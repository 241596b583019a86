//! WebSocket transport for the tournament room.
//!
//! One actix-web server exposes `/ws` for bots and `/spectate` for
//! spectators and operators; both upgrade into dumb bridges that shuttle
//! frames between the socket and the room's intent channel. The server
//! stops itself once the room reports match completion.
mod gate;
mod handlers;

pub use gate::Gate;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use arena_gameroom::HostConfig;
use arena_gameroom::Room;

pub async fn run(config: HostConfig) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let (room, handle) = Room::new(config);
    tokio::spawn(room.run());
    let gate = web::Data::new(Gate::new(handle.intents));
    let done = handle.done;

    log::info!("[server] listening on {}", bind_addr);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(gate.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/ws", web::get().to(handlers::bots))
            .route("/spectate", web::get().to(handlers::spectators))
    })
    .bind(&bind_addr)?
    .run();
    let stopper = server.handle();

    tokio::select! {
        served = server => {
            served?;
        }
        _ = done => {
            log::info!("[server] match complete, draining connections");
            stopper.stop(true).await;
        }
    }
    Ok(())
}

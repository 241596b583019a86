use crate::gate::Gate;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use arena_gameroom::Endpoint;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// `GET /ws` — seat-bound bot connections.
pub async fn bots(
    gate: web::Data<Gate>,
    req: HttpRequest,
    body: web::Payload,
) -> actix_web::Result<HttpResponse> {
    upgrade(gate, req, body, Endpoint::Bots)
}

/// `GET /spectate` — spectators and operators.
pub async fn spectators(
    gate: web::Data<Gate>,
    req: HttpRequest,
    body: web::Payload,
) -> actix_web::Result<HttpResponse> {
    upgrade(gate, req, body, Endpoint::Spectators)
}

fn upgrade(
    gate: web::Data<Gate>,
    req: HttpRequest,
    body: web::Payload,
    endpoint: Endpoint,
) -> actix_web::Result<HttpResponse> {
    let (response, session, frames) = actix_ws::handle(&req, body)?;
    gate.bridge(endpoint, session, frames);
    Ok(response)
}

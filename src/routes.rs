use std::sync::Arc;

use actix_web::{
    HttpRequest, HttpResponse, HttpResponseBuilder, Responder, guard, http::Method, web,
};
use serde_json::json;

use crate::dispatch::{Command, Controller};
use crate::error::AppError;
use crate::gpio::GpioBackend;

pub const BODY_TRAILER: &str = "\r\n\r\n";
pub const FAILURE_BODY: &str = "?\r\n\r\n";

pub struct AppState<B: GpioBackend> {
    pub controller: Arc<Controller<B>>,
}

impl<B: GpioBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
        }
    }
}

pub fn standard_response() -> HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder.insert_header(("Access-Control-Allow-Origin", "*"));
    builder
}

impl<B: GpioBackend + 'static> AppState<B> {
    pub fn api_scope(&self, base_path: &str) -> actix_web::Scope {
        let mut scope = web::scope(base_path).service(
            web::resource("/status")
                .route(web::get().to(status::<B>))
                .route(
                    web::route()
                        .guard(guard_not_methods(&[Method::GET]))
                        .to(method_not_allowed),
                ),
        );

        for command in Command::ALL {
            // the bare prefix is routed too so a missing operand still answers `?`
            let paths = [
                command.path().to_string(),
                format!("{}/{{operand:.*}}", command.path()),
            ];
            for path in paths {
                scope = scope.service(
                    web::resource(path)
                        .route(web::get().to(
                            move |req: HttpRequest, state: web::Data<AppState<B>>| async move {
                                run_command(command, req, state)
                            },
                        ))
                        .route(
                            web::route()
                                .guard(guard_not_methods(&[Method::GET]))
                                .to(method_not_allowed),
                        ),
                );
            }
        }

        scope
    }
}

fn run_command<B: GpioBackend + 'static>(
    command: Command,
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<HttpResponse, AppError> {
    let operand = req.match_info().get("operand").unwrap_or("");
    let reply = state.controller.execute(command, operand)?;

    Ok(standard_response().body(format!("{}{BODY_TRAILER}", reply.token())))
}

async fn status<B: GpioBackend + 'static>(
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, AppError> {
    let outputs = state.controller.snapshot();

    Ok(HttpResponse::Ok().json(json!({ "outputs": outputs })))
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().finish()
}

fn guard_not_methods(methods: &[Method]) -> impl guard::Guard {
    let allowed: Vec<Method> = methods.to_vec();
    guard::fn_guard(move |ctx| !allowed.iter().any(|m| m == ctx.head().method))
}

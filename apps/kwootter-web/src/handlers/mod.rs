//! HTTP handlers and route configuration.

mod health;
mod pages;
mod rpc;
mod session;


use actix_web::http::StatusCode;
use actix_web::{HttpResponse, http::header::ContentType, web};

use kwootter_shared::dto::{RPC_PREFIX, ops};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(RPC_PREFIX)
            .route(&op(ops::POSTS_GET_ALL), web::get().to(rpc::get_all))
            .route(
                &op(ops::POSTS_GET_BY_USER_ID),
                web::get().to(rpc::get_posts_by_user_id),
            )
            .route(&op(ops::POSTS_CREATE), web::post().to(rpc::create))
            .route(
                &op(ops::PROFILE_GET_BY_USERNAME),
                web::get().to(rpc::get_user_by_username),
            )
            .route(&op(ops::PROFILE_GET_BY_ID), web::get().to(rpc::get_user_by_id)),
    )
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/revalidate", web::post().to(pages::revalidate)),
    )
    .route("/sign-in", web::get().to(session::sign_in))
    .route("/sign-out", web::get().to(session::sign_out))
    .route("/post/{id}", web::get().to(pages::post_page))
    .route("/", web::get().to(pages::home))
    .route("/", web::post().to(pages::submit_post))
    .route("/{slug}", web::get().to(pages::profile));
}

fn op(name: &str) -> String {
    format!("/{name}")
}

/// HTML response with `status`.
fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

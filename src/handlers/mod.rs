pub mod auth;
pub mod portfolio;
pub mod public;
pub mod review;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Student portfolio routes (owner actions) ──
    cfg.service(
        web::scope("/portfolios")
            .route("", web::post().to(portfolio::create_portfolio))
            .route("/mine", web::get().to(portfolio::get_my_portfolios))
            .route("/{id}", web::get().to(portfolio::get_portfolio))
            .route("/{id}", web::put().to(portfolio::edit_portfolio))
            .route("/{id}/submit", web::post().to(portfolio::submit_portfolio))
            .route("/{id}/resubmit", web::post().to(portfolio::resubmit_portfolio))
            .route("/{id}/visibility", web::put().to(portfolio::update_visibility))
            .route("/{id}/comments", web::post().to(portfolio::add_comment)),
    );

    // ── Reviewer routes, one scope per review tier ──
    cfg.service(
        web::scope("/review/advisor")
            .route("/queue", web::get().to(review::advisor_queue))
            .route("/{id}/approve", web::put().to(review::advisor_approve))
            .route("/{id}/reject", web::put().to(review::advisor_reject)),
    );
    cfg.service(
        web::scope("/review/super")
            .route("/queue", web::get().to(review::super_queue))
            .route("/{id}/approve", web::put().to(review::super_approve))
            .route("/{id}/reject", web::put().to(review::super_reject)),
    );

    // ── Public routes (no authentication) ──
    cfg.service(
        web::scope("/public/portfolios")
            .route("", web::get().to(public::get_gallery))
            .route("/{id}", web::get().to(public::get_public_portfolio))
            .route("/{id}/comments", web::get().to(public::get_comments)),
    );
}

//! HTTP handlers and route configuration.

mod feed;
mod groups;
mod health;
mod posts;
mod profile;
mod views;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
///
/// Fixed paths are registered before the `/{username}/...` patterns so that a
/// user named e.g. `search` cannot shadow them. Link-style mutations answer
/// both GET and POST.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health::health_check))
        .route("/", web::get().to(feed::index))
        .route("/search/", web::get().to(feed::search))
        .route("/allgroups/", web::get().to(feed::all_groups))
        .route("/allauthors/", web::get().to(feed::all_authors))
        .route("/group/{slug}/", web::get().to(feed::group_posts))
        .service(
            web::resource("/newgroup/")
                .route(web::get().to(groups::new_group_form))
                .route(web::post().to(groups::new_group)),
        )
        .service(
            web::resource("/profile-settings/")
                .route(web::get().to(profile::settings))
                .route(web::post().to(profile::update_settings)),
        )
        .service(
            web::resource("/new/")
                .route(web::get().to(posts::new_post_form))
                .route(web::post().to(posts::new_post)),
        )
        .route("/follow/", web::get().to(feed::follow_index))
        .route("/following/{username}/", web::get().to(profile::following))
        .route("/followers/{username}/", web::get().to(profile::followers))
        // Authors
        .route("/{username}/", web::get().to(profile::profile))
        .route("/{username}/groups/", web::get().to(profile::author_groups))
        .service(link("/{username}/follow/", profile::follow))
        .service(link("/{username}/unfollow/", profile::unfollow))
        .service(link("/{username}/delete/", profile::delete_user));

    configure_post_routes(cfg);

    // Groups by creator; after the numeric post routes.
    cfg.service(
        web::resource("/{username}/{slug}/edit/")
            .route(web::get().to(groups::edit_form))
            .route(web::post().to(groups::edit_group)),
    )
    .service(link("/{username}/{slug}/delete/", groups::delete_group));
}

fn configure_post_routes(cfg: &mut web::ServiceConfig) {
    const POST: &str = r"/{username}/{post_id:\d+}";

    cfg.route(&format!("{POST}/"), web::get().to(posts::post_view))
        .service(
            web::resource(format!("{POST}/edit/"))
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_post)),
        )
        .service(link(&format!("{POST}/delete/"), posts::delete_post))
        .service(link(&format!("{POST}/like/"), posts::like))
        .route(&format!("{POST}/comment/"), web::post().to(posts::add_comment))
        .route(
            &format!(r"{POST}/comment/{{comment_id:\d+}}/edit/"),
            web::post().to(posts::edit_comment),
        )
        .service(link(
            &format!(r"{POST}/comment/{{comment_id:\d+}}/delete/"),
            posts::delete_comment,
        ));
}

/// A resource answering GET and POST with the same handler.
fn link<F, Args>(path: &str, handler: F) -> actix_web::Resource
where
    F: actix_web::Handler<Args> + Clone,
    Args: actix_web::FromRequest + 'static,
    F::Output: actix_web::Responder + 'static,
{
    web::resource(path)
        .route(web::get().to(handler.clone()))
        .route(web::post().to(handler))
}

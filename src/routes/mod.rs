pub mod auth;
pub mod health;
pub mod lists;
pub mod tasks;

use crate::auth::CurrentUser;
use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(auth::show_login)
        .service(auth::login)
        .service(auth::show_register)
        .service(auth::register)
        .service(auth::logout)
        .service(lists::show_lists)
        .service(lists::show_add_list)
        .service(lists::add_list)
        .service(lists::delete_list)
        .service(tasks::show_tasks)
        .service(tasks::show_add_task)
        .service(tasks::add_task)
        .service(tasks::delete_task)
        .service(tasks::complete_task);
}

/// Lists and tasks are reachable by id from any logged-in account; nothing
/// stops one user from viewing or changing another user's records. This
/// records every such access so it can be audited.
pub(crate) fn flag_foreign_owner(user: &CurrentUser, owner_id: i64, kind: &str, id: i64) {
    if owner_id != user.id {
        log::warn!(
            "User {} accessed {} {} owned by user {}",
            user.id,
            kind,
            id,
            owner_id
        );
    }
}

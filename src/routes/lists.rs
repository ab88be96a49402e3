use crate::{
    auth::CurrentUser,
    csrf::CsrfToken,
    error::AppError,
    flash::{redirect, IncomingFlash},
    forms::{self, AddListForm, FormErrors},
    models::List,
    routes::flag_foreign_owner,
    state::AppState,
    views,
};
use actix_web::{get, post, web, HttpResponse};
use tera::Context;

fn add_list_page(
    flash: &IncomingFlash,
    csrf: &CsrfToken,
    user: &CurrentUser,
    form: &AddListForm,
    errors: &FormErrors,
) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("current_user", user);
    context.insert("form", form);
    context.insert("errors", errors);
    views::form_page(flash, csrf, "add_list.html", context)
}

/// All lists of the logged-in user.
#[get("/user")]
pub async fn show_lists(
    state: web::Data<AppState>,
    user: CurrentUser,
    flash: IncomingFlash,
) -> Result<HttpResponse, AppError> {
    let lists = List::for_owner(&state.pool, user.id).await?;

    let mut context = Context::new();
    context.insert("current_user", &user);
    context.insert("lists", &lists);
    views::page(&flash, "lists.html", context)
}

#[get("/add_list")]
pub async fn show_add_list(
    user: CurrentUser,
    flash: IncomingFlash,
    csrf: CsrfToken,
) -> Result<HttpResponse, AppError> {
    add_list_page(&flash, &csrf, &user, &AddListForm::default(), &FormErrors::default())
}

#[post("/add_list")]
pub async fn add_list(
    state: web::Data<AppState>,
    user: CurrentUser,
    flash: IncomingFlash,
    csrf: CsrfToken,
    form: web::Form<AddListForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    if let Err(errors) = forms::check(&form, &csrf) {
        return add_list_page(&flash, &csrf, &user, &form, &errors);
    }

    let list = List::create(&state.pool, user.id, &form.list).await?;
    log::info!("User {} created list {}", user.id, list.id);
    Ok(redirect("/user"))
}

/// Deletes a list together with its tasks.
#[get("/delete_list/{list_id}")]
pub async fn delete_list(
    state: web::Data<AppState>,
    user: CurrentUser,
    list_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let list_id = list_id.into_inner();

    let list = List::find(&state.pool, list_id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".into()))?;
    flag_foreign_owner(&user, list.user_id, "list", list.id);

    if !List::delete(&state.pool, list_id).await? {
        return Err(AppError::NotFound("List not found".into()));
    }

    log::info!("User {} deleted list {}", user.id, list_id);
    Ok(redirect("/user"))
}

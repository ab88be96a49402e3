use crate::{
    auth::CurrentUser,
    csrf::CsrfToken,
    error::AppError,
    flash::{redirect, IncomingFlash},
    forms::{self, AddTaskForm, FormErrors},
    models::{List, NewTask, Task},
    routes::flag_foreign_owner,
    state::AppState,
    views,
};
use actix_web::{get, post, route, web, HttpResponse};
use sqlx::AnyPool;
use tera::Context;

fn list_page_url(list_id: i64) -> String {
    format!("/list/{}", list_id)
}

async fn find_list(pool: &AnyPool, list_id: i64) -> Result<List, AppError> {
    List::find(pool, list_id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".into()))
}

fn add_task_page(
    flash: &IncomingFlash,
    csrf: &CsrfToken,
    user: &CurrentUser,
    list_id: i64,
    form: &AddTaskForm,
    errors: &FormErrors,
) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("current_user", user);
    context.insert("list_id", &list_id);
    context.insert("form", form);
    context.insert("errors", errors);
    views::form_page(flash, csrf, "add_task.html", context)
}

/// Tasks of one list, under the list's name.
#[route("/list/{list_id}", method = "GET", method = "POST")]
pub async fn show_tasks(
    state: web::Data<AppState>,
    user: CurrentUser,
    flash: IncomingFlash,
    list_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let parent_list = find_list(&state.pool, list_id.into_inner()).await?;
    flag_foreign_owner(&user, parent_list.user_id, "list", parent_list.id);

    let tasks = Task::for_list(&state.pool, parent_list.id).await?;

    let mut context = Context::new();
    context.insert("current_user", &user);
    context.insert("parent_list", &parent_list);
    context.insert("tasks", &tasks);
    views::page(&flash, "tasks.html", context)
}

#[get(r"/{list_id:\d+}/add_task")]
pub async fn show_add_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    flash: IncomingFlash,
    csrf: CsrfToken,
    list_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let list = find_list(&state.pool, list_id.into_inner()).await?;
    add_task_page(&flash, &csrf, &user, list.id, &AddTaskForm::default(), &FormErrors::default())
}

/// Adds a not-yet-complete task, stamped with today's date, to the list.
#[post(r"/{list_id:\d+}/add_task")]
pub async fn add_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    flash: IncomingFlash,
    csrf: CsrfToken,
    list_id: web::Path<i64>,
    form: web::Form<AddTaskForm>,
) -> Result<HttpResponse, AppError> {
    let list = find_list(&state.pool, list_id.into_inner()).await?;

    let form = form.into_inner();
    if let Err(errors) = forms::check(&form, &csrf) {
        return add_task_page(&flash, &csrf, &user, list.id, &form, &errors);
    }
    flag_foreign_owner(&user, list.user_id, "list", list.id);

    let task = Task::create(&state.pool, NewTask::stamped_today(list.id, user.id, form.task)).await?;
    log::info!("User {} added task {} to list {}", user.id, task.id, list.id);
    Ok(redirect(&list_page_url(list.id)))
}

#[get("/delete_task/{task_id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let task = Task::delete(&state.pool, task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    flag_foreign_owner(&user, task.user_id, "task", task.id);

    log::info!("User {} deleted task {}", user.id, task.id);
    Ok(redirect(&list_page_url(task.list_id)))
}

/// Flips the task between complete and not complete.
#[route("/complete/{task_id}", method = "GET", method = "POST")]
pub async fn complete_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let task = Task::toggle_status(&state.pool, task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    flag_foreign_owner(&user, task.user_id, "task", task.id);

    log::info!("User {} set task {} to {:?}", user.id, task.id, task.status);
    Ok(redirect(&list_page_url(task.list_id)))
}

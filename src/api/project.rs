use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::project::{Project, ProjectStatus};
use crate::store;
use crate::store::project::MemberRow;

#[derive(Deserialize, ToSchema)]
pub struct CreateProject {
    #[schema(example = "Billing revamp")]
    pub name: String,
    pub description: String,
    /// Defaults to Running.
    pub status: Option<ProjectStatus>,
    pub employee_ids: Vec<u64>,
    #[schema(format = "date", value_type = Option<String>)]
    pub due_date: Option<NaiveDate>,
}

#[utoipa::path(
    post,
    path = "/api/admin/projects",
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created and employees assigned"),
        (status = 400, description = "Missing fields or duplicate project name"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn create_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateProject>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    if payload.name.trim().is_empty() || payload.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Missing required project fields or employee IDs.".into(),
        ));
    }

    let project_id = match store::project::insert(
        pool.get_ref(),
        payload.name.trim(),
        payload.description.trim(),
        payload.status.unwrap_or(ProjectStatus::Running),
        payload.due_date,
    )
    .await
    {
        Ok(id) => id,
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(AppError::Validation(
                        "Project with this name already exists.".into(),
                    ));
                }
            }
            return Err(e.into());
        }
    };

    store::project::replace_members(pool.get_ref(), project_id, &payload.employee_ids).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Project created and employees assigned.",
        "project_id": project_id,
    })))
}

#[derive(Serialize, ToSchema)]
pub struct ProjectWithMembers {
    #[serde(flatten)]
    pub project: Project,
    pub employees: Vec<ProjectMember>,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectMember {
    pub employee_id: u64,
    pub name: String,
    pub employee_code: String,
    pub designation: String,
    pub email: String,
}

impl From<MemberRow> for ProjectMember {
    fn from(row: MemberRow) -> Self {
        Self {
            employee_id: row.employee_id,
            name: row.name,
            employee_code: row.employee_code,
            designation: row.designation.to_string(),
            email: row.email,
        }
    }
}

/// Every project with its assigned employees (admin).
#[utoipa::path(
    get,
    path = "/api/admin/projects",
    responses(
        (status = 200, description = "Projects with assignments", body = [ProjectWithMembers]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn list_projects(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let projects = store::project::list(pool.get_ref()).await?;
    let members = store::project::members(pool.get_ref()).await?;

    let projects: Vec<ProjectWithMembers> = projects
        .into_iter()
        .map(|project| {
            let employees = members
                .iter()
                .filter(|m| m.project_id == project.id)
                .cloned()
                .map(ProjectMember::from)
                .collect();
            ProjectWithMembers { project, employees }
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "projects": projects,
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProjectEmployees {
    pub employee_ids: Vec<u64>,
}

/// Replace a project's member set (admin).
#[utoipa::path(
    put,
    path = "/api/admin/projects/{project_id}/employees",
    params(("project_id" = u64, Path, description = "Project ID")),
    request_body = UpdateProjectEmployees,
    responses(
        (status = 200, description = "Assignments replaced"),
        (status = 404, description = "Project not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn update_project_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateProjectEmployees>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let project_id = path.into_inner();

    store::project::find(pool.get_ref(), project_id)
        .await?
        .ok_or(AppError::NotFound("Project"))?;

    store::project::replace_members(pool.get_ref(), project_id, &payload.employee_ids).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Project employees updated successfully.",
    })))
}

/// Projects assigned to the calling employee.
#[utoipa::path(
    get,
    path = "/api/employee/projects",
    responses(
        (status = 200, description = "Assigned projects", body = [Project]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn my_projects(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let projects = store::project::for_employee(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "projects": projects,
    })))
}

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::model::employee::Designation;
use crate::model::project::{Project, ProjectStatus};

const PROJECT_COLUMNS: &str = "id, name, description, status, start_date, due_date";

pub async fn find(pool: &MySqlPool, id: u64) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(
    pool: &MySqlPool,
    name: &str,
    description: &str,
    status: ProjectStatus,
    due_date: Option<NaiveDate>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO projects (name, description, status, start_date, due_date)
        VALUES (?, ?, ?, CURDATE(), ?)
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(status)
    .bind(due_date)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

pub async fn list(pool: &MySqlPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id"
    ))
    .fetch_all(pool)
    .await
}

/// Projects the employee is assigned to.
pub async fn for_employee(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT p.id, p.name, p.description, p.status, p.start_date, p.due_date
        FROM projects p
        JOIN project_employees pe ON pe.project_id = p.id
        WHERE pe.employee_id = ?
        ORDER BY p.id
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct MemberRow {
    pub project_id: u64,
    pub employee_id: u64,
    pub name: String,
    pub employee_code: String,
    pub designation: Designation,
    pub email: String,
}

/// Assigned members for every listed project in one query.
pub async fn members(pool: &MySqlPool) -> Result<Vec<MemberRow>, sqlx::Error> {
    sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT pe.project_id, pe.employee_id, u.name, u.employee_code, u.designation, u.email
        FROM project_employees pe
        JOIN users u ON u.id = pe.employee_id
        ORDER BY pe.project_id, u.name
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Replaces the project's member set with the given ids. Unknown employee
/// ids fail the FK constraint and surface as a storage error.
pub async fn replace_members(
    pool: &MySqlPool,
    project_id: u64,
    employee_ids: &[u64],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM project_employees WHERE project_id = ?")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    if !employee_ids.is_empty() {
        let values = vec!["(?, ?)"; employee_ids.len()].join(", ");
        let sql =
            format!("INSERT IGNORE INTO project_employees (project_id, employee_id) VALUES {values}");
        let mut query = sqlx::query(&sql);
        for id in employee_ids {
            query = query.bind(project_id).bind(id);
        }
        query.execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}

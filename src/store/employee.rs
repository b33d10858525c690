use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::employee::{Designation, Employee, Gender};
use crate::model::role::Role;
use crate::models::AuthRow;

const EMPLOYEE_COLUMNS: &str = "id, name, email, employee_code, role, designation, salary, dob, \
                                gender, profile_image, paid_leaves_available, last_paid_leave_reset, \
                                created_at";

pub async fn find(pool: &MySqlPool, id: u64) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!("SELECT {EMPLOYEE_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Every Employee-role account, directory order.
pub async fn list(pool: &MySqlPool) -> Result<Vec<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM users WHERE role = 'Employee' ORDER BY id"
    ))
    .fetch_all(pool)
    .await
}

pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub employee_code: String,
    pub role: Role,
    pub designation: Designation,
    pub salary: f64,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub profile_image: Option<String>,
}

/// New accounts start with one paid leave, stamped as their first reset.
pub async fn insert(pool: &MySqlPool, new: &NewEmployee) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO users
            (name, email, password, employee_code, role, designation, salary, dob, gender,
             profile_image, paid_leaves_available, last_paid_leave_reset)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(?, 'default_profile.png'), 1, NOW())
        "#,
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(&new.employee_code)
    .bind(new.role)
    .bind(new.designation)
    .bind(new.salary)
    .bind(new.dob)
    .bind(new.gender)
    .bind(&new.profile_image)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

pub struct EmployeeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub employee_code: Option<String>,
    pub designation: Option<Designation>,
    pub salary: Option<f64>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub profile_image: Option<String>,
}

/// Partial admin-side update; absent fields keep their value.
pub async fn update(
    pool: &MySqlPool,
    id: u64,
    changes: &EmployeeChanges,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = COALESCE(?, name),
            email = COALESCE(?, email),
            employee_code = COALESCE(?, employee_code),
            designation = COALESCE(?, designation),
            salary = COALESCE(?, salary),
            dob = COALESCE(?, dob),
            gender = COALESCE(?, gender),
            profile_image = COALESCE(?, profile_image)
        WHERE id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.email)
    .bind(&changes.employee_code)
    .bind(changes.designation)
    .bind(changes.salary)
    .bind(changes.dob)
    .bind(changes.gender)
    .bind(&changes.profile_image)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub profile_image: Option<String>,
}

/// Self-service update, restricted to non-sensitive columns.
pub async fn update_profile(
    pool: &MySqlPool,
    id: u64,
    changes: &ProfileChanges,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = COALESCE(?, name),
            email = COALESCE(?, email),
            dob = COALESCE(?, dob),
            gender = COALESCE(?, gender),
            profile_image = COALESCE(?, profile_image)
        WHERE id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.email)
    .bind(changes.dob)
    .bind(changes.gender)
    .bind(&changes.profile_image)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Attendance rows, leave requests and project memberships go with the
/// account through the schema's ON DELETE CASCADE constraints, so the whole
/// cascade is one atomic statement.
pub async fn delete(pool: &MySqlPool, id: u64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Deducts approved paid-leave days, never below zero.
pub async fn deduct_paid_leaves(
    pool: &MySqlPool,
    employee_id: u64,
    days: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET paid_leaves_available = GREATEST(0, paid_leaves_available - ?) WHERE id = ?",
    )
    .bind(days)
    .bind(employee_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Monthly entitlement: +1 paid leave for every Employee-role account,
/// uncapped carryover. Returns how many accounts were credited.
pub async fn grant_monthly_paid_leave(pool: &MySqlPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET paid_leaves_available = paid_leaves_available + 1,
            last_paid_leave_reset = NOW()
        WHERE role = 'Employee'
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn admin_emails(pool: &MySqlPool) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String,)>("SELECT email FROM users WHERE role = 'Admin'")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(email,)| email).collect())
}

/// (name, email) for notification delivery.
pub async fn contact(pool: &MySqlPool, id: u64) -> Result<Option<(String, String)>, sqlx::Error> {
    sqlx::query_as::<_, (String, String)>("SELECT name, email FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn auth_by_email(
    pool: &MySqlPool,
    email: &str,
) -> Result<Option<AuthRow>, sqlx::Error> {
    sqlx::query_as::<_, AuthRow>(
        r#"
        SELECT id, name, email, password, role, designation, profile_image
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn password_hash_of(pool: &MySqlPool, id: u64) -> Result<Option<String>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String,)>("SELECT password FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(hash,)| hash))
}

pub async fn set_password(pool: &MySqlPool, id: u64, hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(hash)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::employee::{Designation, Employee};
use crate::model::role::Role;
use crate::salary::{SalarySlip, compute_monthly_salary, month_range, paid_leave_dates};
use crate::store;

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    /// 1-12, defaults to the current month.
    pub month: Option<u32>,
    /// Defaults to the current year.
    pub year: Option<i32>,
}

impl MonthQuery {
    pub fn resolve(&self) -> (i32, u32) {
        let today = Local::now().date_naive();
        (
            self.year.unwrap_or_else(|| today.year()),
            self.month.unwrap_or_else(|| today.month()),
        )
    }
}

/// One month of an employee through the salary engine: attendance rows plus
/// the approved paid requests overlapping the month.
async fn slip_for(
    pool: &MySqlPool,
    employee: &Employee,
    year: i32,
    month: u32,
) -> Result<SalarySlip, AppError> {
    let (start, end) = month_range(year, month)?;
    let records = store::attendance::between(pool, employee.id, start, end).await?;
    let paid_requests =
        store::leave::approved_paid_overlapping(pool, employee.id, start, end).await?;

    Ok(compute_monthly_salary(
        employee.salary,
        &records,
        &paid_leave_dates(&paid_requests),
    ))
}

/// Employee's own monthly salary slip.
#[utoipa::path(
    get,
    path = "/api/employee/salary",
    params(MonthQuery),
    responses(
        (status = 200, description = "Salary breakdown for the month", body = SalarySlip),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn my_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let (year, month) = query.resolve();

    let employee = store::employee::find(pool.get_ref(), employee_id)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    let slip = slip_for(pool.get_ref(), &employee, year, month).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "salary": slip,
    })))
}

/// One employee's monthly salary (admin).
#[utoipa::path(
    get,
    path = "/api/admin/employees/{employee_id}/salary",
    params(
        ("employee_id" = u64, Path, description = "Employee to compute"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Salary breakdown for the month", body = SalarySlip),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn employee_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let (year, month) = query.resolve();

    let employee = store::employee::find(pool.get_ref(), path.into_inner())
        .await?
        .filter(|e| e.role == Role::Employee)
        .ok_or(AppError::NotFound("Employee"))?;

    let slip = slip_for(pool.get_ref(), &employee, year, month).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "salary": slip,
    })))
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeSalaryEntry {
    pub employee_id: u64,
    pub name: String,
    pub employee_code: String,
    pub designation: Designation,
    pub email: String,
    pub paid_leaves_available: i64,
    pub salary: SalarySlip,
}

/// Monthly salaries for the whole directory (admin). Runs every employee
/// through the same engine as the single-employee path.
#[utoipa::path(
    get,
    path = "/api/admin/salaries/monthly",
    params(MonthQuery),
    responses(
        (status = 200, description = "Salary slips for every employee", body = [EmployeeSalaryEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn monthly_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let (year, month) = query.resolve();

    let employees = store::employee::list(pool.get_ref()).await?;

    let mut salaries = Vec::with_capacity(employees.len());
    for employee in &employees {
        let slip = slip_for(pool.get_ref(), employee, year, month).await?;
        salaries.push(EmployeeSalaryEntry {
            employee_id: employee.id,
            name: employee.name.clone(),
            employee_code: employee.employee_code.clone(),
            designation: employee.designation,
            email: employee.email.clone(),
            paid_leaves_available: employee.paid_leaves_available,
            salary: slip,
        });
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "month": month,
        "year": year,
        "salaries": salaries,
    })))
}

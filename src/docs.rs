use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::api::leave::{CreateLeaveRequest, LeaveAction, RespondToLeave};
use crate::api::profile::UpdateProfile;
use crate::api::project::{CreateProject, ProjectMember, ProjectWithMembers, UpdateProjectEmployees};
use crate::api::salary::EmployeeSalaryEntry;
use crate::auth::handlers::{LoginResponse, LoginUser};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::{Designation, Employee, Gender};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::project::{Project, ProjectStatus};
use crate::model::role::Role;
use crate::models::{ChangePasswordDto, LoginReqDto};
use crate::reports::{
    DailySummary, DailyTrendPoint, EmployeeMonthlyStats, StatusRollup, WeeklyTrendPoint,
};
use crate::salary::{SalaryBreakdown, SalarySlip};
use crate::store::attendance::DayPunchRow;
use crate::store::leave::PendingLeaveRow;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Management System API",
        version = "1.0.0",
        description = r#"
## Employee Management System (EMS)

Backend for an internal HR tool covering:

- **Attendance** - punch in/out and lunch tracking with derived daily status
- **Leave** - requests, notice-period rules, paid-leave balances, admin responses
- **Salary** - deterministic monthly computation from attendance and approved leave
- **Reports** - daily summary, 30-day trends, range reports
- **Projects** - assignments per employee

Most endpoints require **JWT Bearer authentication**; admin endpoints are
role-gated.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::change_password,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile,

        crate::api::attendance::punch_in,
        crate::api::attendance::lunch_start,
        crate::api::attendance::lunch_end,
        crate::api::attendance::punch_out,
        crate::api::attendance::today,
        crate::api::attendance::history,

        crate::api::leave::request_leave,
        crate::api::leave::my_requests,
        crate::api::leave::my_paid_leaves,
        crate::api::leave::pending_requests,
        crate::api::leave::respond_to_request,

        crate::api::salary::my_salary,
        crate::api::salary::employee_salary,
        crate::api::salary::monthly_salaries,

        crate::api::reports::daily_summary,
        crate::api::reports::present_today,
        crate::api::reports::on_leave_today,
        crate::api::reports::analytics,
        crate::api::reports::range_report,
        crate::api::reports::employee_stats,

        crate::api::employee::add_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::reset_paid_leaves,

        crate::api::project::create_project,
        crate::api::project::list_projects,
        crate::api::project::update_project_employees,
        crate::api::project::my_projects,
    ),
    components(
        schemas(
            LoginReqDto,
            ChangePasswordDto,
            LoginResponse,
            LoginUser,
            Role,
            Designation,
            Gender,
            Employee,
            CreateEmployee,
            UpdateEmployee,
            UpdateProfile,
            AttendanceRecord,
            AttendanceStatus,
            LeaveType,
            LeaveStatus,
            LeaveRequest,
            CreateLeaveRequest,
            LeaveAction,
            RespondToLeave,
            PendingLeaveRow,
            DayPunchRow,
            SalarySlip,
            SalaryBreakdown,
            EmployeeSalaryEntry,
            DailySummary,
            DailyTrendPoint,
            WeeklyTrendPoint,
            StatusRollup,
            EmployeeMonthlyStats,
            Project,
            ProjectStatus,
            CreateProject,
            ProjectWithMembers,
            ProjectMember,
            UpdateProjectEmployees
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and token lifecycle"),
        (name = "Profile", description = "Employee self-service profile"),
        (name = "Attendance", description = "Punch tracking APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Salary", description = "Salary computation APIs"),
        (name = "Reports", description = "Attendance reporting APIs"),
        (name = "Employee", description = "Employee administration APIs"),
        (name = "Projects", description = "Project assignment APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

use crate::{
    api::{attendance, employee, leave, profile, project, reports, salary},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/auth").service(
                    web::resource("/change-password")
                        .route(web::put().to(handlers::change_password)),
                ),
            )
            // Employee self-service
            .service(
                web::scope("/employee")
                    .service(
                        web::resource("/profile")
                            .route(web::get().to(profile::get_profile))
                            .route(web::put().to(profile::update_profile)),
                    )
                    .service(
                        web::scope("/attendance")
                            .service(
                                web::resource("/check-in")
                                    .route(web::post().to(attendance::punch_in)),
                            )
                            .service(
                                web::resource("/lunch-start")
                                    .route(web::post().to(attendance::lunch_start)),
                            )
                            .service(
                                web::resource("/lunch-end")
                                    .route(web::post().to(attendance::lunch_end)),
                            )
                            .service(
                                web::resource("/check-out")
                                    .route(web::post().to(attendance::punch_out)),
                            )
                            .service(
                                web::resource("/today").route(web::get().to(attendance::today)),
                            )
                            .service(
                                web::resource("/history")
                                    .route(web::get().to(attendance::history)),
                            ),
                    )
                    .service(
                        web::scope("/leave")
                            .service(
                                web::resource("/request")
                                    .route(web::post().to(leave::request_leave)),
                            )
                            .service(
                                web::resource("/requests")
                                    .route(web::get().to(leave::my_requests)),
                            ),
                    )
                    .service(
                        web::resource("/paid-leaves").route(web::get().to(leave::my_paid_leaves)),
                    )
                    .service(web::resource("/salary").route(web::get().to(salary::my_salary)))
                    .service(
                        web::resource("/projects").route(web::get().to(project::my_projects)),
                    ),
            )
            // Admin
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/employees")
                            .route(web::post().to(employee::add_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/employees/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/employees/{id}/stats")
                            .route(web::get().to(reports::employee_stats)),
                    )
                    .service(
                        web::resource("/employees/{id}/salary")
                            .route(web::get().to(salary::employee_salary)),
                    )
                    .service(
                        web::resource("/salaries/monthly")
                            .route(web::get().to(salary::monthly_salaries)),
                    )
                    .service(
                        web::scope("/attendance")
                            .service(
                                web::resource("/summary")
                                    .route(web::get().to(reports::daily_summary)),
                            )
                            .service(
                                web::resource("/present")
                                    .route(web::get().to(reports::present_today)),
                            )
                            .service(
                                web::resource("/leave")
                                    .route(web::get().to(reports::on_leave_today)),
                            )
                            .service(
                                web::resource("/analytics")
                                    .route(web::get().to(reports::analytics)),
                            )
                            .service(
                                web::resource("/report")
                                    .route(web::get().to(reports::range_report)),
                            ),
                    )
                    .service(
                        web::scope("/leave")
                            .service(
                                web::resource("/requests")
                                    .route(web::get().to(leave::pending_requests)),
                            )
                            .service(
                                web::resource("/requests/{id}")
                                    .route(web::put().to(leave::respond_to_request)),
                            ),
                    )
                    .service(
                        web::resource("/paid-leaves/reset")
                            .route(web::post().to(employee::reset_paid_leaves)),
                    )
                    .service(
                        web::resource("/projects")
                            .route(web::post().to(project::create_project))
                            .route(web::get().to(project::list_projects)),
                    )
                    .service(
                        web::resource("/projects/{id}/employees")
                            .route(web::put().to(project::update_project_employees)),
                    ),
            ),
    );
}

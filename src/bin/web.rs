//! Single binary web server: public pages from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Admin endpoints need a session opened with POST /api/auth/login and ADMIN_TOKEN.

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use league_calendar_web::{
    calendar_standings, calendar_to_json, schedule_to_csv, AllocationOptions, AppConfig, Calendar,
    CalendarId, CalendarMatch, League, LeagueError, LeagueMatch, MatchId, MatchResult,
    MatchStatus, ScheduleId, ScheduledFixture,
};
use serde::Deserialize;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory league shared by all workers.
type AppState = Data<RwLock<League>>;

const ADMIN_SESSION_KEY: &str = "admin";

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct LoginBody {
    token: String,
}

#[derive(Deserialize)]
struct CategoryBody {
    name: String,
    #[serde(default)]
    pools: Vec<String>,
}

#[derive(Deserialize)]
struct TeamBody {
    name: String,
    category: String,
    #[serde(default)]
    pool: Option<String>,
}

#[derive(Deserialize)]
struct GenerateCalendarsBody {
    /// Category names; all categories when absent.
    #[serde(default)]
    categories: Option<Vec<String>>,
    /// Shuffle rosters reproducibly before generating.
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct ReplaceCalendarBody {
    calendar: Calendar,
    #[serde(default)]
    expected_version: Option<u32>,
}

#[derive(Deserialize)]
struct ExemptBody {
    pool_index: usize,
    round_index: usize,
    team: String,
    #[serde(default)]
    expected_version: Option<u32>,
}

#[derive(Deserialize)]
struct ResultBody {
    pool_index: usize,
    round_index: usize,
    match_index: usize,
    result: MatchResult,
    #[serde(default)]
    expected_version: Option<u32>,
}

#[derive(Deserialize)]
struct PlayoffBody {
    name: String,
    matches: Vec<CalendarMatch>,
    #[serde(default)]
    expected_version: Option<u32>,
}

#[derive(Deserialize)]
struct PlanScheduleBody {
    calendar_ids: Vec<CalendarId>,
    #[serde(default)]
    journee: Option<u32>,
    options: AllocationOptions,
}

#[derive(Deserialize)]
struct CreateScheduleBody {
    name: String,
    #[serde(flatten)]
    plan: PlanScheduleBody,
}

#[derive(Deserialize)]
struct ScheduleFixturesBody {
    fixtures: Vec<ScheduledFixture>,
}

#[derive(Deserialize)]
struct MatchStatusBody {
    status: MatchStatus,
}

/// Path segment: resource id (e.g. /api/calendars/{id})
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

/// Map a league error to its HTTP status with a JSON body.
fn error_response(e: &LeagueError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else if matches!(
        e,
        LeagueError::VersionConflict { .. } | LeagueError::ScheduleConflict(_)
    ) {
        HttpResponse::Conflict().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Reject the request unless the session belongs to a logged-in admin.
fn require_admin(session: &Session) -> Result<(), HttpResponse> {
    match session.get::<bool>(ADMIN_SESSION_KEY) {
        Ok(Some(true)) => Ok(()),
        _ => Err(HttpResponse::Unauthorized()
            .json(serde_json::json!({ "error": "Admin login required" }))),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "league-calendar-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Open an admin session when the token matches ADMIN_TOKEN.
#[post("/api/auth/login")]
async fn api_login(config: Data<AppConfig>, session: Session, body: Json<LoginBody>) -> HttpResponse {
    let Some(expected) = config.admin_token.as_deref() else {
        return HttpResponse::Unauthorized()
            .json(serde_json::json!({ "error": "Admin login is disabled" }));
    };
    if body.token != expected {
        log::warn!("Rejected admin login attempt");
        return HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Invalid token" }));
    }
    session.renew();
    match session.insert(ADMIN_SESSION_KEY, true) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "admin": true })),
        Err(_) => HttpResponse::InternalServerError().body("session error"),
    }
}

#[get("/api/auth/verify")]
async fn api_verify(session: Session) -> HttpResponse {
    let admin = require_admin(&session).is_ok();
    HttpResponse::Ok().json(serde_json::json!({ "admin": admin }))
}

#[post("/api/auth/logout")]
async fn api_logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(serde_json::json!({ "admin": false }))
}

#[get("/api/categories")]
async fn api_list_categories(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(&g.categories)
}

#[post("/api/categories")]
async fn api_add_category(state: AppState, session: Session, body: Json<CategoryBody>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    match g.add_category(&body.name, body.pools) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/categories/{id}")]
async fn api_remove_category(state: AppState, session: Session, path: Path<IdPath>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.remove_category(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

#[get("/api/teams")]
async fn api_list_teams(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(&g.teams)
}

#[post("/api/teams")]
async fn api_add_team(state: AppState, session: Session, body: Json<TeamBody>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_team(&body.name, &body.category, body.pool.as_deref()) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

#[put("/api/teams/{id}")]
async fn api_update_team(
    state: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<TeamBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.update_team(path.id, &body.name, &body.category, body.pool.as_deref()) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/teams/{id}")]
async fn api_remove_team(state: AppState, session: Session, path: Path<IdPath>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.remove_team(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Import teams from a CSV body with a `name,category,pool` header.
#[post("/api/teams/import")]
async fn api_import_teams(state: AppState, session: Session, body: String) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.import_teams_csv(body.as_bytes()) {
        Ok(imported) => HttpResponse::Ok().json(serde_json::json!({ "imported": imported })),
        Err(e) => error_response(&e),
    }
}

/// Generate calendars for review; nothing is saved.
#[post("/api/calendars/generate")]
async fn api_generate_calendars(
    state: AppState,
    session: Session,
    body: Json<GenerateCalendarsBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.generate_calendars(body.categories.as_deref(), body.seed) {
        Ok(generation) => HttpResponse::Ok().json(generation),
        Err(e) => error_response(&e),
    }
}

#[get("/api/calendars")]
async fn api_list_calendars(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(&g.calendars)
}

/// Save an approved generated calendar.
#[post("/api/calendars")]
async fn api_save_calendar(state: AppState, session: Session, body: Json<Calendar>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.save_calendar(body.into_inner()) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[get("/api/calendars/{id}")]
async fn api_get_calendar(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.calendar(path.id) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[put("/api/calendars/{id}")]
async fn api_replace_calendar(
    state: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ReplaceCalendarBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    match g.replace_calendar(path.id, body.calendar, body.expected_version) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/calendars/{id}")]
async fn api_delete_calendar(state: AppState, session: Session, path: Path<IdPath>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete_calendar(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Change the exempt team of one round.
#[put("/api/calendars/{id}/exempt")]
async fn api_reassign_exempt(
    state: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ExemptBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.reassign_exempt(
        path.id,
        body.expected_version,
        body.pool_index,
        body.round_index,
        &body.team,
    ) {
        Ok((calendar, warnings)) => HttpResponse::Ok().json(serde_json::json!({
            "calendar": calendar,
            "warnings": warnings,
        })),
        Err(e) => error_response(&e),
    }
}

/// Record a score or forfeit on a calendar match.
#[put("/api/calendars/{id}/results")]
async fn api_record_result(
    state: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.record_calendar_result(
        path.id,
        body.expected_version,
        body.pool_index,
        body.round_index,
        body.match_index,
        body.result,
    ) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[post("/api/calendars/{id}/playoffs")]
async fn api_add_playoff_round(
    state: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<PlayoffBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    match g.add_playoff_round(path.id, body.expected_version, &body.name, body.matches) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[get("/api/calendars/{id}/standings")]
async fn api_standings(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.calendar(path.id) {
        Ok(c) => HttpResponse::Ok().json(calendar_standings(c)),
        Err(e) => error_response(&e),
    }
}

/// Calendar as a downloadable JSON file.
#[get("/api/calendars/{id}/export")]
async fn api_export_calendar(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let calendar = match g.calendar(path.id) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    match calendar_to_json(calendar) {
        Ok(json) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"calendrier-{}.json\"", calendar.category),
            ))
            .body(json),
        Err(e) => error_response(&e),
    }
}

/// Allocate fixtures without saving, so the admin can review the proposal.
#[post("/api/schedules/plan")]
async fn api_plan_schedule(state: AppState, session: Session, body: Json<PlanScheduleBody>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.plan_weekly_schedule(&body.calendar_ids, body.journee, &body.options) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&e),
    }
}

/// Allocate fixtures and save the result as a weekly schedule.
#[post("/api/schedules")]
async fn api_create_schedule(
    state: AppState,
    session: Session,
    body: Json<CreateScheduleBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let plan = &body.plan;
    let outcome = match g.plan_weekly_schedule(&plan.calendar_ids, plan.journee, &plan.options) {
        Ok(outcome) => outcome,
        Err(e) => return error_response(&e),
    };
    match g.create_schedule(&body.name, &plan.options, outcome) {
        Ok(s) => HttpResponse::Ok().json(s),
        Err(e) => error_response(&e),
    }
}

#[get("/api/schedules")]
async fn api_list_schedules(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(&g.schedules)
}

#[get("/api/schedules/{id}")]
async fn api_get_schedule(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.schedule(path.id) {
        Ok(s) => HttpResponse::Ok().json(s),
        Err(e) => error_response(&e),
    }
}

#[put("/api/schedules/{id}")]
async fn api_update_schedule(
    state: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ScheduleFixturesBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let id: ScheduleId = path.id;
    match g.update_schedule_fixtures(id, body.into_inner().fixtures) {
        Ok(s) => HttpResponse::Ok().json(s),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/schedules/{id}")]
async fn api_delete_schedule(state: AppState, session: Session, path: Path<IdPath>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete_schedule(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Create standalone match records from a weekly schedule.
#[post("/api/schedules/{id}/materialize")]
async fn api_materialize_schedule(state: AppState, session: Session, path: Path<IdPath>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.materialize_schedule(path.id) {
        Ok(ids) => HttpResponse::Ok().json(serde_json::json!({ "match_ids": ids })),
        Err(e) => error_response(&e),
    }
}

/// Printable CSV of a weekly schedule.
#[get("/api/schedules/{id}/export.csv")]
async fn api_export_schedule(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let schedule = match g.schedule(path.id) {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };
    match schedule_to_csv(schedule) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"planning-{}.csv\"", schedule.start_date),
            ))
            .body(csv),
        Err(e) => error_response(&e),
    }
}

#[get("/api/matches")]
async fn api_list_matches(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(&g.matches)
}

#[post("/api/matches")]
async fn api_add_match(state: AppState, session: Session, body: Json<LeagueMatch>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_match(body.into_inner()) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(&e),
    }
}

#[put("/api/matches/{id}")]
async fn api_update_match(
    state: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<LeagueMatch>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let id: MatchId = path.id;
    match g.update_match(id, body.into_inner()) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/matches/{id}")]
async fn api_delete_match(state: AppState, session: Session, path: Path<IdPath>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete_match(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

#[put("/api/matches/{id}/status")]
async fn api_set_match_status(
    state: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<MatchStatusBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.set_match_status(path.id, body.status) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(&e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    if config.admin_token.is_none() {
        log::warn!("ADMIN_TOKEN is not set: admin login is disabled");
    }
    let session_key = match &config.session_key {
        Some(bytes) => Key::from(bytes.as_slice()),
        None => Key::generate(),
    };

    let cookie_secure = config.cookie_secure;
    if !cookie_secure {
        log::info!("Session cookie sent without the Secure flag (COOKIE_SECURE unset)");
    }

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(RwLock::new(League::new()));
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(cookie_secure)
                    .build(),
            )
            .app_data(state.clone())
            .app_data(config.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_login)
            .service(api_verify)
            .service(api_logout)
            .service(api_list_categories)
            .service(api_add_category)
            .service(api_remove_category)
            .service(api_list_teams)
            .service(api_import_teams)
            .service(api_add_team)
            .service(api_update_team)
            .service(api_remove_team)
            .service(api_generate_calendars)
            .service(api_list_calendars)
            .service(api_save_calendar)
            .service(api_get_calendar)
            .service(api_replace_calendar)
            .service(api_delete_calendar)
            .service(api_reassign_exempt)
            .service(api_record_result)
            .service(api_add_playoff_round)
            .service(api_standings)
            .service(api_export_calendar)
            .service(api_plan_schedule)
            .service(api_create_schedule)
            .service(api_list_schedules)
            .service(api_get_schedule)
            .service(api_update_schedule)
            .service(api_delete_schedule)
            .service(api_materialize_schedule)
            .service(api_export_schedule)
            .service(api_list_matches)
            .service(api_add_match)
            .service(api_update_match)
            .service(api_delete_match)
            .service(api_set_match_status)
            .service(Files::new("/static", config.static_dir.clone()))
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

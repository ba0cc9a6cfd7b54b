use std::collections::HashMap;

use actix_files::Files;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::display::type_label;
use crate::error::ScheduleError;
use crate::export::items_to_csv;
use crate::requests::{
    build_item, build_pattern, ConflictCheckRequest, CreateItemRequest, CreateRecurringRequest,
    SlotSearchRequest, validate_slot_search,
};
use crate::schedule::time_utils::{parse_date, parse_timestamp};
use crate::schedule::types::{ScheduleItemUpdate, UpdateScope};
use crate::schedule::{find_conflicts, find_optimal_slot, generate_instances, resolve_targets};
use crate::store::ScheduleStore;

pub struct AppState {
    pub store: ScheduleStore,
}

#[derive(Deserialize)]
pub struct OrgQuery {
    org_id: String,
}

#[derive(Deserialize)]
pub struct ScopeQuery {
    org_id: String,
    scope: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    org_id: String,
    technician_id: Option<String>,
    from: String,
    to: String,
}

#[derive(Serialize)]
pub struct StatsResponse {
    technician_counts: HashMap<String, TechnicianStats>,
    type_counts: HashMap<String, u32>,
}

#[derive(Serialize, Default)]
pub struct TechnicianStats {
    total: u32,
    recurring_parents: u32,
    recurring_instances: u32,
}

/// Range bounds accept `yyyy-MM-dd HH:mm` or bare `yyyy-MM-dd`;
/// a bare date means start-of-day for `from` and end-of-day for `to`.
fn parse_range_bound(value: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    if let Ok(ts) = parse_timestamp(value) {
        return Some(ts);
    }
    let date = parse_date(value).ok()?;
    if end_of_day {
        date.and_hms_opt(23, 59, 0)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
}

fn bad_request(message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": message.to_string(),
    }))
}

// Create a single (non-recurring) schedule item
async fn create_item(
    req: web::Json<CreateItemRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let item = match build_item(&req) {
        Ok(item) => item,
        Err(e) => return Ok(bad_request(e)),
    };

    state.store.insert(item.clone());
    log::info!("created item {} for {}", item.id, item.technician_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "item": item,
    })))
}

// Create a recurring parent plus its generated instances in one batch write
async fn create_recurring(
    req: web::Json<CreateRecurringRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut parent = match build_item(&req.item) {
        Ok(item) => item,
        Err(e) => return Ok(bad_request(e)),
    };
    let pattern = match build_pattern(&req.pattern) {
        Ok(pattern) => pattern,
        Err(e) => return Ok(bad_request(e)),
    };

    parent.is_recurring = true;
    parent.recurrence_pattern = Some(pattern.clone());

    let instances = generate_instances(&parent, &pattern);
    let instance_count = instances.len();
    let parent_out = parent.clone();
    state.store.insert_series(parent, instances);
    log::info!(
        "created recurring series {} with {} instances",
        parent_out.id,
        instance_count
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "parent": parent_out,
        "instances_created": instance_count,
    })))
}

// List items in a date range, optionally narrowed to one technician
async fn list_items(
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let from = match parse_range_bound(&query.from, false) {
        Some(ts) => ts,
        None => return Ok(bad_request(format!("Invalid 'from' bound: {}", query.from))),
    };
    let to = match parse_range_bound(&query.to, true) {
        Some(ts) => ts,
        None => return Ok(bad_request(format!("Invalid 'to' bound: {}", query.to))),
    };

    let items = state.store.in_range(
        &query.org_id,
        query.technician_id.as_deref(),
        from,
        to,
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({ "items": items })))
}

// Conflict check for a candidate interval against a technician's calendar
async fn check_conflicts(
    req: web::Json<ConflictCheckRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let start = match parse_timestamp(&req.start) {
        Ok(ts) => ts,
        Err(e) => return Ok(bad_request(e)),
    };
    let end = match parse_timestamp(&req.end) {
        Ok(ts) => ts,
        Err(e) => return Ok(bad_request(e)),
    };

    let items = state.store.for_technician(&req.org_id, &req.technician_id);
    let conflicts: Vec<_> = find_conflicts(&items, start, end, req.exclude_id.as_deref())
        .into_iter()
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "has_conflicts": !conflicts.is_empty(),
        "conflicts": conflicts,
    })))
}

// First-fit open-slot search over the 7-day window
async fn find_slot(
    req: web::Json<SlotSearchRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if let Err(e) = validate_slot_search(&req) {
        return Ok(bad_request(e));
    }
    // validate_slot_search already proved the date parses
    let preferred = parse_date(&req.preferred_date).unwrap();

    let org_id = req.org_id.clone();
    let technician_id = req.technician_id.clone();
    let slot = find_optimal_slot(
        |date| state.store.for_technician_on(&org_id, &technician_id, date),
        req.duration_minutes,
        preferred,
        req.time_preference,
    );

    match slot {
        Some(slot) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "found": true,
            "slot": slot,
        }))),
        None => Ok(HttpResponse::Ok().json(serde_json::json!({
            "found": false,
        }))),
    }
}

fn scope_from_query(query: &ScopeQuery) -> Option<UpdateScope> {
    match &query.scope {
        Some(raw) => UpdateScope::from_param(raw),
        None => Some(UpdateScope::ThisOnly),
    }
}

// Series-scoped update: this-only / this-and-future / all-instances
async fn update_item(
    path: web::Path<String>,
    query: web::Query<ScopeQuery>,
    update: web::Json<ScheduleItemUpdate>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let scope = match scope_from_query(&query) {
        Some(scope) => scope,
        None => {
            return Ok(bad_request(ScheduleError::InvalidInput(
                "Invalid scope selector".to_string(),
            )))
        }
    };

    let addressed = match state.store.get(&query.org_id, &id) {
        Some(item) => item,
        None => {
            return Ok(HttpResponse::NotFound()
                .json(serde_json::json!({"error": ScheduleError::NotFound(id).to_string()})))
        }
    };

    let instances = state.store.instances_of(&query.org_id, &addressed.id);
    let now = Local::now().naive_local();
    let targets = resolve_targets(&addressed, &instances, scope, now);
    let affected = match state.store.update_many(&query.org_id, &targets, &update) {
        Ok(affected) => affected,
        Err(e) => return Ok(bad_request(e)),
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "affected": affected,
    })))
}

// Series-scoped delete, same scope selectors as update
async fn delete_item(
    path: web::Path<String>,
    query: web::Query<ScopeQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let scope = match scope_from_query(&query) {
        Some(scope) => scope,
        None => {
            return Ok(bad_request(ScheduleError::InvalidInput(
                "Invalid scope selector".to_string(),
            )))
        }
    };

    let addressed = match state.store.get(&query.org_id, &id) {
        Some(item) => item,
        None => {
            return Ok(HttpResponse::NotFound()
                .json(serde_json::json!({"error": ScheduleError::NotFound(id).to_string()})))
        }
    };

    let instances = state.store.instances_of(&query.org_id, &addressed.id);
    let now = Local::now().naive_local();
    let targets = resolve_targets(&addressed, &instances, scope, now);
    let affected = state.store.delete_many(&query.org_id, &targets);
    log::info!("deleted {} record(s) from series {}", affected, id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "affected": affected,
    })))
}

// One technician's day schedule
async fn day_schedule(
    path: web::Path<(String, String)>,
    query: web::Query<OrgQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (technician_id, date_str) = path.into_inner();
    let date = match parse_date(&date_str) {
        Ok(date) => date,
        Err(e) => return Ok(bad_request(e)),
    };

    let items = state
        .store
        .for_technician_on(&query.org_id, &technician_id, date);
    let booked_minutes: i64 = items.iter().map(|i| i.duration_minutes()).sum();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "technician_id": technician_id,
        "date": date_str,
        "booked_minutes": booked_minutes,
        "appointments": items,
    })))
}

// Organization summary: counts per technician and per item type
async fn get_stats(
    query: web::Query<OrgQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let items = state.store.all_for_org(&query.org_id);

    let mut technician_counts: HashMap<String, TechnicianStats> = HashMap::new();
    let mut type_counts: HashMap<String, u32> = HashMap::new();

    for item in &items {
        let stats = technician_counts
            .entry(item.technician_id.clone())
            .or_default();
        stats.total += 1;
        if item.is_recurring {
            stats.recurring_parents += 1;
        }
        if item.parent_recurrence_id.is_some() {
            stats.recurring_instances += 1;
        }

        *type_counts
            .entry(type_label(item.schedule_type).to_string())
            .or_insert(0) += 1;
    }

    Ok(HttpResponse::Ok().json(StatsResponse {
        technician_counts,
        type_counts,
    }))
}

// CSV export of one technician's day
async fn export_day(
    path: web::Path<(String, String)>,
    query: web::Query<OrgQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (technician_id, date_str) = path.into_inner();
    let date = match parse_date(&date_str) {
        Ok(date) => date,
        Err(e) => return Ok(bad_request(e)),
    };

    let items = state
        .store
        .for_technician_on(&query.org_id, &technician_id, date);
    let csv = items_to_csv(&items)
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    Ok(HttpResponse::Ok().content_type("text/csv").body(csv))
}

// Landing page
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        store: ScheduleStore::new(),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/api/items", web::post().to(create_item))
            .route("/api/items", web::get().to(list_items))
            .route("/api/items/recurring", web::post().to(create_recurring))
            .route("/api/items/{id}", web::put().to(update_item))
            .route("/api/items/{id}", web::delete().to(delete_item))
            .route("/api/conflicts", web::post().to(check_conflicts))
            .route("/api/slots/find", web::post().to(find_slot))
            .route("/api/stats", web::get().to(get_stats))
            .service(
                web::resource("/api/schedule/{technician_id}/{date}")
                    .route(web::get().to(day_schedule)),
            )
            .service(
                web::resource("/api/export/{technician_id}/{date}")
                    .route(web::get().to(export_day)),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

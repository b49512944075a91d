//! Integration tests for geohash route matching:
//! - First match creates a numbered route and stamps the drive
//! - Rematches fold aggregates and track best/worst economy
//! - Distinct endpoint pairs get their own routes

use driveline_core::aggregates::DriveMetrics;
use driveline_core::docs::{DriveDoc, GpsEndpoints, VehicleDoc};
use driveline_db::models::route::RouteMatch;
use driveline_db::repositories::{DriveRepo, RouteRepo, VehicleRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn match_input(drive_id: &str, start_hash: &str, end_hash: &str, mpg: Option<f64>) -> RouteMatch {
    RouteMatch {
        user_id: "u1".to_string(),
        vehicle_id: "v1".to_string(),
        drive_id: drive_id.to_string(),
        start_geohash: start_hash.to_string(),
        end_geohash: end_hash.to_string(),
        endpoints: GpsEndpoints {
            start_lat: 39.7392,
            start_lng: -104.9903,
            end_lat: 39.5501,
            end_lng: -105.7821,
        },
        metrics: DriveMetrics {
            mpg,
            duration_secs: Some(1800.0),
            peak_egt: Some(1100.0),
            peak_boost: Some(22.0),
            peak_trans_temp: None,
        },
        started_at: None,
    }
}

async fn seed(pool: &PgPool, drive_ids: &[&str]) {
    VehicleRepo::upsert(pool, "u1", "v1", &VehicleDoc::default())
        .await
        .unwrap();
    for id in drive_ids {
        DriveRepo::upsert(pool, "u1", "v1", id, &DriveDoc::default())
            .await
            .unwrap();
    }
}

// ---------------------------------------------------------------------------
// Test: Route creation and rematching
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_match_creates_numbered_route(pool: PgPool) {
    seed(&pool, &["d1"]).await;

    let route = RouteRepo::match_drive(&pool, &match_input("d1", "9xj64", "9xj3e", Some(20.0)))
        .await
        .unwrap();
    assert_eq!(route.name, "Route #1");
    assert_eq!(route.drive_count, 1);
    assert_eq!(route.avg_mpg, Some(20.0));
    assert_eq!(route.best_mpg, Some(20.0));
    assert_eq!(route.best_mpg_drive_id.as_deref(), Some("d1"));
    assert_eq!(route.worst_mpg_drive_id.as_deref(), Some("d1"));
    assert!(route.last_drive_at.is_some());

    let drive = DriveRepo::find(&pool, "u1", "v1", "d1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(drive.route_id.as_deref(), Some(route.id.as_str()));
    assert_eq!(drive.route_name.as_deref(), Some("Route #1"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rematch_folds_aggregates(pool: PgPool) {
    seed(&pool, &["d1", "d2"]).await;

    let first = RouteRepo::match_drive(&pool, &match_input("d1", "9xj64", "9xj3e", Some(20.0)))
        .await
        .unwrap();
    let second = RouteRepo::match_drive(&pool, &match_input("d2", "9xj64", "9xj3e", Some(10.0)))
        .await
        .unwrap();

    assert_eq!(second.id, first.id, "same endpoints reuse the route");
    assert_eq!(second.drive_count, 2);
    assert_eq!(second.avg_mpg, Some(15.0));
    assert_eq!(second.best_mpg, Some(20.0));
    assert_eq!(second.best_mpg_drive_id.as_deref(), Some("d1"));
    assert_eq!(second.worst_mpg, Some(10.0));
    assert_eq!(second.worst_mpg_drive_id.as_deref(), Some("d2"));

    let drive = DriveRepo::find(&pool, "u1", "v1", "d2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(drive.route_id.as_deref(), Some(first.id.as_str()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_distinct_endpoints_get_their_own_route(pool: PgPool) {
    seed(&pool, &["d1", "d2"]).await;

    let first = RouteRepo::match_drive(&pool, &match_input("d1", "9xj64", "9xj3e", Some(18.0)))
        .await
        .unwrap();
    let second = RouteRepo::match_drive(&pool, &match_input("d2", "9xj64", "9xj70", Some(18.0)))
        .await
        .unwrap();

    assert_ne!(second.id, first.id);
    assert_eq!(second.name, "Route #2");

    let routes = RouteRepo::list_for_vehicle(&pool, "u1", "v1").await.unwrap();
    assert_eq!(routes.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_metricless_drive_still_counts(pool: PgPool) {
    seed(&pool, &["d1"]).await;

    let input = RouteMatch {
        metrics: DriveMetrics::default(),
        ..match_input("d1", "9xj64", "9xj3e", None)
    };
    let route = RouteRepo::match_drive(&pool, &input).await.unwrap();
    assert_eq!(route.drive_count, 1);
    assert_eq!(route.avg_mpg, None);
    assert_eq!(route.best_mpg, None);
    assert_eq!(route.best_mpg_drive_id, None);
}

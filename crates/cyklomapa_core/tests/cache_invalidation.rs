use cyklomapa_core::db::open_db_in_memory;
use cyklomapa_core::{
    CorrectionService, CorrectionSubmission, GeoPoint, Layer, MapService, Marker,
    MemoryResponseCache, Poi, RepoError, ResponseCache, SqliteCorrectionRepository,
    SqliteMapRepository, Status,
};
use std::cell::Cell;
use std::sync::Arc;

/// Counts clears without storing anything.
#[derive(Default)]
struct CountingCache {
    clears: Cell<u32>,
}

impl ResponseCache for CountingCache {
    fn clear(&self) {
        self.clears.set(self.clears.get() + 1);
    }
}

#[test]
fn every_successful_map_write_clears_cache_exactly_once() {
    let conn = open_db_in_memory().unwrap();
    let cache = CountingCache::default();
    let service = MapService::new(SqliteMapRepository::try_new(&conn).unwrap(), &cache);

    let mut status = Status::new("aktivni", true, true);
    service.create_status(&status).unwrap();
    assert_eq!(cache.clears.get(), 1);

    status.description = Some("Zobrazené objekty".to_string());
    service.update_status(&status).unwrap();
    assert_eq!(cache.clears.get(), 2);

    let mut layer = Layer::new("Restaurace", "restaurace", status.id, 1);
    service.create_layer(&layer).unwrap();
    layer.order = 5;
    service.update_layer(&layer).unwrap();
    assert_eq!(cache.clears.get(), 4);

    let mut marker = Marker::new("Kavárna", "kavarna", layer.id, status.id);
    service.create_marker(&marker).unwrap();
    marker.max_zoom = 18;
    service.update_marker(&marker).unwrap();
    assert_eq!(cache.clears.get(), 6);

    let mut poi = Poi::new(marker.id, status.id, GeoPoint::new(14.42, 50.09).unwrap());
    service.create_poi(&poi).unwrap();
    poi.importance = 20;
    service.update_poi(&poi).unwrap();
    assert_eq!(cache.clears.get(), 8);

    service.delete_poi(poi.id).unwrap();
    assert_eq!(cache.clears.get(), 9);
}

#[test]
fn failed_writes_do_not_clear_cache() {
    let conn = open_db_in_memory().unwrap();
    let cache = CountingCache::default();
    let service = MapService::new(SqliteMapRepository::try_new(&conn).unwrap(), &cache);

    let status = Status::new("aktivni", true, true);
    service.create_status(&status).unwrap();
    let layer = Layer::new("Restaurace", "restaurace", status.id, 1);
    service.create_layer(&layer).unwrap();
    assert_eq!(cache.clears.get(), 2);

    let duplicate = service
        .create_status(&Status::new("aktivni", false, false))
        .unwrap_err();
    assert!(duplicate.is_integrity_failure());

    let invalid = service
        .create_layer(&Layer::new("Bez slugu", "", status.id, 2))
        .unwrap_err();
    assert!(matches!(invalid, RepoError::Validation(_)));

    let restricted = service.delete_status(status.id).unwrap_err();
    assert!(restricted.is_integrity_failure());

    let missing = service
        .update_status(&Status::new("neexistuje", true, true))
        .unwrap_err();
    assert!(matches!(missing, RepoError::NotFound { .. }));

    assert_eq!(cache.clears.get(), 2);
}

#[test]
fn stale_responses_do_not_survive_an_edit() {
    let conn = open_db_in_memory().unwrap();
    let cache = Arc::new(MemoryResponseCache::new());
    let service = MapService::new(SqliteMapRepository::try_new(&conn).unwrap(), cache.clone());

    let mut status = Status::new("aktivni", true, true);
    service.create_status(&status).unwrap();

    cache.put("/", "<html>map</html>");
    cache.put("/kml/restaurace/", "<kml/>");
    assert_eq!(cache.len(), 2);

    status.show = false;
    service.update_status(&status).unwrap();

    assert!(cache.is_empty());
    assert_eq!(cache.get("/"), None);
    assert_eq!(cache.clear_count(), 2);
}

#[test]
fn corrections_do_not_touch_map_cache() {
    let conn = open_db_in_memory().unwrap();
    let cache = Arc::new(MemoryResponseCache::new());
    let _map = MapService::new(SqliteMapRepository::try_new(&conn).unwrap(), cache.clone());
    cache.put("/", "<html>map</html>");

    let corrections = CorrectionService::new(SqliteCorrectionRepository::try_new(&conn).unwrap());
    corrections
        .submit(CorrectionSubmission {
            email: "jan@example.cz".to_string(),
            description: "Nové místo: stojany u nádraží".to_string(),
            ..CorrectionSubmission::default()
        })
        .unwrap();

    assert_eq!(cache.get("/").as_deref(), Some("<html>map</html>"));
    assert_eq!(cache.clear_count(), 0);
}

use cyklomapa_core::db::open_db_in_memory;
use cyklomapa_core::{
    GeoPoint, Layer, LayerRepository, MapService, Marker, MarkerRepository, MemoryResponseCache,
    Poi, PoiListQuery, PoiRepository, PoiVisibility, SqliteMapRepository, Status,
    StatusRepository,
};
use std::collections::HashSet;

fn status(repo: &SqliteMapRepository<'_>, name: &str, show: bool, show_internal: bool) -> Status {
    let status = Status::new(name, show, show_internal);
    repo.create_status(&status).unwrap();
    status
}

fn u_kotvy(marker: &Marker, status: &Status) -> Poi {
    let mut poi = Poi::new(marker.id, status.id, GeoPoint::new(14.42, 50.09).unwrap());
    poi.name = Some("U Kotvy".to_string());
    poi.importance = 0;
    poi
}

#[test]
fn shown_poi_with_shown_marker_is_visible() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMapRepository::try_new(&conn).unwrap();

    let aktivni = status(&repo, "aktivni", true, true);
    let layer = Layer::new("Restaurace", "restaurace", aktivni.id, 1);
    repo.create_layer(&layer).unwrap();
    let marker = Marker::new("Kavárna", "kavarna", layer.id, aktivni.id);
    repo.create_marker(&marker).unwrap();
    let poi = u_kotvy(&marker, &aktivni);
    repo.create_poi(&poi).unwrap();

    let visible = repo.list_visible_pois().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name.as_deref(), Some("U Kotvy"));
}

#[test]
fn hidden_poi_status_excludes_poi_even_with_shown_marker() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMapRepository::try_new(&conn).unwrap();

    let aktivni = status(&repo, "aktivni", true, true);
    let skryty = status(&repo, "skryty", false, true);
    let layer = Layer::new("Restaurace", "restaurace", aktivni.id, 1);
    repo.create_layer(&layer).unwrap();
    let marker = Marker::new("Kavárna", "kavarna", layer.id, aktivni.id);
    repo.create_marker(&marker).unwrap();
    repo.create_poi(&u_kotvy(&marker, &skryty)).unwrap();

    assert!(repo.list_visible_pois().unwrap().is_empty());
}

#[test]
fn visibility_requires_both_statuses_shown() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMapRepository::try_new(&conn).unwrap();

    let shown = status(&repo, "aktivni", true, false);
    let hidden = status(&repo, "zruseny", false, false);
    let layer = Layer::new("Restaurace", "restaurace", shown.id, 1);
    repo.create_layer(&layer).unwrap();

    let mut expected = HashSet::new();
    for (idx, (poi_shown, marker_shown)) in [(true, true), (true, false), (false, true), (false, false)]
        .into_iter()
        .enumerate()
    {
        let marker_status = if marker_shown { &shown } else { &hidden };
        let poi_status = if poi_shown { &shown } else { &hidden };
        let marker = Marker::new(
            format!("Značka {idx}"),
            format!("znacka-{idx}"),
            layer.id,
            marker_status.id,
        );
        repo.create_marker(&marker).unwrap();
        let poi = Poi::new(marker.id, poi_status.id, GeoPoint::new(14.0, 50.0).unwrap());
        repo.create_poi(&poi).unwrap();
        if poi_shown && marker_shown {
            expected.insert(poi.id);
        }
    }

    let visible: HashSet<_> = repo
        .list_visible_pois()
        .unwrap()
        .into_iter()
        .map(|poi| poi.id)
        .collect();
    assert_eq!(visible, expected);
    assert_eq!(visible.len(), 1);

    let everything = repo.list_pois(&PoiListQuery::default()).unwrap();
    assert_eq!(everything.len(), 4);
}

#[test]
fn layer_status_does_not_gate_point_visibility() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMapRepository::try_new(&conn).unwrap();

    let shown = status(&repo, "aktivni", true, true);
    let hidden = status(&repo, "zruseny", false, false);
    let layer = Layer::new("Restaurace", "restaurace", hidden.id, 1);
    repo.create_layer(&layer).unwrap();
    let marker = Marker::new("Kavárna", "kavarna", layer.id, shown.id);
    repo.create_marker(&marker).unwrap();
    repo.create_poi(&u_kotvy(&marker, &shown)).unwrap();

    assert_eq!(repo.list_visible_pois().unwrap().len(), 1);
}

#[test]
fn editor_view_includes_internally_shown_statuses() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMapRepository::try_new(&conn).unwrap();

    let shown = status(&repo, "aktivni", true, true);
    let draft = status(&repo, "navrzeny", false, true);
    let removed = status(&repo, "zruseny", false, false);
    let layer = Layer::new("Restaurace", "restaurace", shown.id, 1);
    repo.create_layer(&layer).unwrap();
    let marker = Marker::new("Kavárna", "kavarna", layer.id, shown.id);
    repo.create_marker(&marker).unwrap();

    let public = Poi::new(marker.id, shown.id, GeoPoint::new(14.4, 50.1).unwrap());
    let proposed = Poi::new(marker.id, draft.id, GeoPoint::new(14.5, 50.1).unwrap());
    let cancelled = Poi::new(marker.id, removed.id, GeoPoint::new(14.6, 50.1).unwrap());
    for poi in [&public, &proposed, &cancelled] {
        repo.create_poi(poi).unwrap();
    }

    let editor: HashSet<_> = repo
        .list_pois(&PoiListQuery {
            visibility: PoiVisibility::Internal,
            ..PoiListQuery::default()
        })
        .unwrap()
        .into_iter()
        .map(|poi| poi.id)
        .collect();
    assert_eq!(editor, HashSet::from([public.id, proposed.id]));

    let visible = repo.list_visible_pois().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, public.id);
}

#[test]
fn visible_listing_filters_by_layer_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMapRepository::try_new(&conn).unwrap();

    let shown = status(&repo, "aktivni", true, true);
    let food = Layer::new("Restaurace", "restaurace", shown.id, 1);
    let repair = Layer::new("Servisy", "servisy", shown.id, 2);
    repo.create_layer(&food).unwrap();
    repo.create_layer(&repair).unwrap();
    let cafe = Marker::new("Kavárna", "kavarna", food.id, shown.id);
    let shop = Marker::new("Cykloservis", "cykloservis", repair.id, shown.id);
    repo.create_marker(&cafe).unwrap();
    repo.create_marker(&shop).unwrap();

    for idx in 0..5 {
        let lon = 14.0 + f64::from(idx) / 10.0;
        repo.create_poi(&Poi::new(cafe.id, shown.id, GeoPoint::new(lon, 50.0).unwrap()))
            .unwrap();
    }
    repo.create_poi(&Poi::new(shop.id, shown.id, GeoPoint::new(16.6, 49.2).unwrap()))
        .unwrap();

    let food_only = repo
        .list_pois(&PoiListQuery {
            layer_id: Some(food.id),
            ..PoiListQuery::visible()
        })
        .unwrap();
    assert_eq!(food_only.len(), 5);
    assert!(food_only.iter().all(|poi| poi.marker_id == cafe.id));

    let page = repo
        .list_pois(&PoiListQuery {
            layer_id: Some(food.id),
            limit: Some(2),
            offset: 4,
            ..PoiListQuery::visible()
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, food_only[4].id);

    let by_marker = repo
        .list_pois(&PoiListQuery {
            marker_id: Some(shop.id),
            ..PoiListQuery::visible()
        })
        .unwrap();
    assert_eq!(by_marker.len(), 1);
}

#[test]
fn service_exposes_public_and_editor_listings() {
    let conn = open_db_in_memory().unwrap();
    let service = MapService::new(
        SqliteMapRepository::try_new(&conn).unwrap(),
        MemoryResponseCache::new(),
    );

    let shown = Status::new("aktivni", true, true);
    let draft = Status::new("navrzeny", false, true);
    service.create_status(&shown).unwrap();
    service.create_status(&draft).unwrap();
    let layer = Layer::new("Restaurace", "restaurace", shown.id, 1);
    service.create_layer(&layer).unwrap();
    let marker = Marker::new("Kavárna", "kavarna", layer.id, shown.id);
    service.create_marker(&marker).unwrap();
    service.create_poi(&u_kotvy(&marker, &shown)).unwrap();
    service
        .create_poi(&Poi::new(marker.id, draft.id, GeoPoint::new(14.5, 50.0).unwrap()))
        .unwrap();

    assert_eq!(service.visible_pois().unwrap().len(), 1);
    assert_eq!(service.editor_pois().unwrap().len(), 2);
    assert_eq!(service.markers_in_layer(layer.id).unwrap(), vec![marker]);
}

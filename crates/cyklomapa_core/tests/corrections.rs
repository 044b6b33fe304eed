use cyklomapa_core::db::open_db_in_memory;
use cyklomapa_core::{
    Correction, CorrectionListQuery, CorrectionRepository, CorrectionService, CorrectionStatus,
    CorrectionSubmission, GeoPoint, IntegrityError, Layer, LayerRepository, Marker,
    MarkerRepository, Poi, PoiRepository, RepoError, SqliteCorrectionRepository,
    SqliteMapRepository, Status, StatusRepository, ValidationError,
};
use rusqlite::Connection;

fn seed_poi(conn: &Connection) -> Poi {
    let repo = SqliteMapRepository::try_new(conn).unwrap();
    let status = Status::new("aktivni", true, true);
    repo.create_status(&status).unwrap();
    let layer = Layer::new("Restaurace", "restaurace", status.id, 1);
    repo.create_layer(&layer).unwrap();
    let marker = Marker::new("Kavárna", "kavarna", layer.id, status.id);
    repo.create_marker(&marker).unwrap();
    let poi = Poi::new(marker.id, status.id, GeoPoint::new(14.42, 50.09).unwrap());
    repo.create_poi(&poi).unwrap();
    poi
}

fn submission(email: &str, description: &str) -> CorrectionSubmission {
    CorrectionSubmission {
        email: email.to_string(),
        description: description.to_string(),
        ..CorrectionSubmission::default()
    }
}

#[test]
fn submission_starts_as_new_and_lands_in_inbox() {
    let conn = open_db_in_memory().unwrap();
    let poi = seed_poi(&conn);
    let service = CorrectionService::new(SqliteCorrectionRepository::try_new(&conn).unwrap());

    let created = service
        .submit(CorrectionSubmission {
            poi_id: Some(poi.id),
            url: Some("https://ukotvy.cz".to_string()),
            address: Some("Malostranské nám. 1".to_string()),
            ..submission("jan@example.cz", "Otevírací doba se změnila")
        })
        .unwrap();
    assert_eq!(created.status, CorrectionStatus::New);

    let inbox = service.inbox().unwrap();
    assert_eq!(inbox, vec![created]);
}

#[test]
fn blank_optional_fields_are_dropped() {
    let conn = open_db_in_memory().unwrap();
    let service = CorrectionService::new(SqliteCorrectionRepository::try_new(&conn).unwrap());

    let created = service
        .submit(CorrectionSubmission {
            url: Some(" ".to_string()),
            address: Some(String::new()),
            ..submission("jan@example.cz", "Nové místo")
        })
        .unwrap();
    let stored = service.get(created.id).unwrap().unwrap();
    assert_eq!(stored.url, None);
    assert_eq!(stored.address, None);
}

#[test]
fn missing_email_or_description_fails_validation() {
    let conn = open_db_in_memory().unwrap();
    let service = CorrectionService::new(SqliteCorrectionRepository::try_new(&conn).unwrap());

    let no_email = service.submit(submission("", "Popis")).unwrap_err();
    assert!(matches!(
        no_email,
        RepoError::Validation(ValidationError::MissingField("email"))
    ));

    let no_description = service.submit(submission("jan@example.cz", "")).unwrap_err();
    assert!(matches!(
        no_description,
        RepoError::Validation(ValidationError::MissingField("description"))
    ));

    assert!(service.list(&CorrectionListQuery::default()).unwrap().is_empty());
}

#[test]
fn status_changes_are_manual_and_filterable() {
    let conn = open_db_in_memory().unwrap();
    let service = CorrectionService::new(SqliteCorrectionRepository::try_new(&conn).unwrap());

    let first = service.submit(submission("a@example.cz", "První")).unwrap();
    let second = service.submit(submission("b@example.cz", "Druhá")).unwrap();

    let updated = service
        .set_status(first.id, CorrectionStatus::InProgress)
        .unwrap();
    assert_eq!(updated.status, CorrectionStatus::InProgress);
    let resolved = service.set_status_code(first.id, "vyreseno").unwrap();
    assert_eq!(resolved.status, CorrectionStatus::Resolved);

    let inbox = service.inbox().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, second.id);

    let resolved_list = service
        .list(&CorrectionListQuery {
            status: Some(CorrectionStatus::Resolved),
            ..CorrectionListQuery::default()
        })
        .unwrap();
    assert_eq!(resolved_list.len(), 1);
    assert_eq!(resolved_list[0].id, first.id);
}

#[test]
fn unknown_status_code_fails_validation() {
    let conn = open_db_in_memory().unwrap();
    let service = CorrectionService::new(SqliteCorrectionRepository::try_new(&conn).unwrap());
    let created = service.submit(submission("jan@example.cz", "Popis")).unwrap();

    let err = service.set_status_code(created.id, "smazano").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::UnknownCorrectionStatus(_))
    ));
    let stored = service.get(created.id).unwrap().unwrap();
    assert_eq!(stored.status, CorrectionStatus::New);
}

#[test]
fn storage_rejects_status_outside_workflow_set() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO corrections (uuid, email, status, description)
             VALUES ('00000000-0000-4000-8000-000000000001', 'jan@example.cz', 'hotovo', 'Popis');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("CHECK constraint failed"));
}

#[test]
fn correction_for_unknown_poi_is_a_missing_reference() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCorrectionRepository::try_new(&conn).unwrap();

    let mut correction = Correction::new("jan@example.cz", "Popis");
    correction.poi_id = Some(uuid::Uuid::new_v4());
    let err = repo.create_correction(&correction).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Integrity(IntegrityError::MissingReference {
            table: "corrections"
        })
    ));
}

#[test]
fn deleting_poi_keeps_correction_without_link() {
    let conn = open_db_in_memory().unwrap();
    let poi = seed_poi(&conn);
    let corrections = SqliteCorrectionRepository::try_new(&conn).unwrap();

    let mut correction = Correction::new("jan@example.cz", "Podnik zavřel");
    correction.poi_id = Some(poi.id);
    corrections.create_correction(&correction).unwrap();

    SqliteMapRepository::try_new(&conn)
        .unwrap()
        .delete_poi(poi.id)
        .unwrap();

    let stored = corrections.get_correction(correction.id).unwrap().unwrap();
    assert_eq!(stored.poi_id, None);
    assert_eq!(stored.description, "Podnik zavřel");
}

#[test]
fn stored_correction_with_invalid_email_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCorrectionRepository::try_new(&conn).unwrap();
    let id = uuid::Uuid::new_v4();
    conn.execute(
        "INSERT INTO corrections (uuid, email, status, description)
         VALUES (?1, 'not-an-email', 'novy', 'Popis');",
        [id.to_string()],
    )
    .unwrap();

    let err = repo.get_correction(id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidEmail(value)) if value == "not-an-email"
    ));
}

#[test]
fn caller_supplied_correction_id_is_kept() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCorrectionRepository::try_new(&conn).unwrap();

    let id = uuid::Uuid::new_v4();
    let correction = Correction::with_id(id, "jan@example.cz", "Chybí parkování kol");
    repo.create_correction(&correction).unwrap();
    assert_eq!(repo.get_correction(id).unwrap().unwrap(), correction);
}

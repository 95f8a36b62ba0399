use quotedesk_core::db::open_db_in_memory;
use quotedesk_core::{
    RepoError, SqliteSuperSubjectRepository, SuperSubject, SuperSubjectRepository,
    SuperSubjectService,
};
use uuid::Uuid;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn create_keeps_member_order_and_normalizes_subjects() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = SuperSubjectService::new(SqliteSuperSubjectRepository::try_new(&mut conn).unwrap());

    let group = service
        .create_super_subject(
            " Stoicism ",
            &strings(&["Virtue", "control", "virtue"]),
            &strings(&["Seneca", " Epictetus ", "Seneca"]),
        )
        .unwrap();

    assert_eq!(group.name, "Stoicism");
    assert_eq!(group.subjects, strings(&["control", "virtue"]));
    assert_eq!(group.authors, strings(&["Seneca", "Epictetus"]));
    assert!(group.updated_at > 0);
}

#[test]
fn save_replaces_members() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = SuperSubjectService::new(SqliteSuperSubjectRepository::try_new(&mut conn).unwrap());

    let mut group = service
        .create_super_subject("Focus", &strings(&["focus", "habit"]), &[])
        .unwrap();
    group.subjects = strings(&["priority"]);
    group.authors = strings(&["Cal Newport"]);
    group.image = Some("https://img.example/focus.png".to_string());
    let saved = service.save_super_subject(group.clone()).unwrap();

    assert_eq!(saved.id, group.id);
    assert_eq!(saved.subjects, strings(&["priority"]));
    assert_eq!(saved.authors, strings(&["Cal Newport"]));
    assert_eq!(saved.image.as_deref(), Some("https://img.example/focus.png"));
    assert_eq!(service.list_super_subjects().unwrap().len(), 1);
}

#[test]
fn duplicate_name_is_a_conflict() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSuperSubjectRepository::try_new(&mut conn).unwrap();

    repo.upsert_super_subject(&SuperSubject::new("Grit", &[], &[]))
        .unwrap();
    let err = repo
        .upsert_super_subject(&SuperSubject::new("grit", &[], &[]))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[test]
fn blank_name_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSuperSubjectRepository::try_new(&mut conn).unwrap();

    let err = repo
        .upsert_super_subject(&SuperSubject::new("  ", &[], &[]))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn delete_removes_group() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = SuperSubjectService::new(SqliteSuperSubjectRepository::try_new(&mut conn).unwrap());

    let group = service
        .create_super_subject("Temporary", &strings(&["x"]), &[])
        .unwrap();
    service.delete_super_subject(group.id).unwrap();

    assert!(service.get_super_subject(group.id).unwrap().is_none());
    assert!(matches!(
        service.delete_super_subject(Uuid::new_v4()),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn seed_defaults_only_fills_empty_store() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = SuperSubjectService::new(SqliteSuperSubjectRepository::try_new(&mut conn).unwrap());

    assert_eq!(service.seed_defaults().unwrap(), 6);
    assert_eq!(service.seed_defaults().unwrap(), 0);

    let groups = service.list_super_subjects().unwrap();
    assert_eq!(groups.len(), 6);
    let names: Vec<&str> = groups.iter().map(|group| group.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_by_key(|name| name.to_lowercase());
    assert_eq!(names, sorted);
    assert!(groups.iter().all(|group| group.subjects.len() == 5));
}

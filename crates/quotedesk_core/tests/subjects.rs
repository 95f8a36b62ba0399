use quotedesk_core::db::open_db_in_memory;
use quotedesk_core::{
    DuplicatePolicy, NewQuote, Quote, QuoteListQuery, QuoteRepository, QuoteService,
    SqliteQuoteRepository, SubjectCount,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn count(subject: &str, count: u32) -> SubjectCount {
    SubjectCount {
        subject: subject.to_string(),
        count,
    }
}

#[test]
fn subjects_are_normalized_on_add() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteQuoteRepository::try_new(&mut conn).unwrap();
    let mut service = QuoteService::new(repo, DuplicatePolicy::default());

    let mut input = NewQuote::new("Ada", "Imagination is the discovering faculty.");
    input.subjects = strings(&["Science", " science", "IMAGINATION", ""]);
    let outcome = service.add_quote(input).unwrap();

    assert_eq!(outcome.quote.subjects, strings(&["imagination", "science"]));
}

#[test]
fn subject_counts_group_by_name() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuoteRepository::try_new(&mut conn).unwrap();

    let mut first = Quote::new("A", "one");
    first.subjects = strings(&["grit", "focus"]);
    let mut second = Quote::new("B", "two");
    second.subjects = strings(&["grit"]);
    repo.create_quotes(&[first, second]).unwrap();

    assert_eq!(
        repo.subject_counts().unwrap(),
        vec![count("focus", 1), count("grit", 2)]
    );
}

#[test]
fn rename_merges_into_existing_subject() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuoteRepository::try_new(&mut conn).unwrap();

    let mut both = Quote::new("A", "tagged twice");
    both.subjects = strings(&["grit", "perseverance"]);
    let mut single = Quote::new("B", "tagged once");
    single.subjects = strings(&["grit"]);
    repo.create_quotes(&[both.clone(), single.clone()]).unwrap();

    let affected = repo.rename_subject("Grit", "Perseverance").unwrap();
    assert_eq!(affected, 2);

    assert_eq!(
        repo.get_quote(both.id).unwrap().unwrap().subjects,
        strings(&["perseverance"])
    );
    assert_eq!(
        repo.get_quote(single.id).unwrap().unwrap().subjects,
        strings(&["perseverance"])
    );
    assert_eq!(repo.subject_counts().unwrap(), vec![count("perseverance", 2)]);
}

#[test]
fn rename_of_unknown_or_blank_subject_is_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuoteRepository::try_new(&mut conn).unwrap();

    assert_eq!(repo.rename_subject("missing", "other").unwrap(), 0);
    assert_eq!(repo.rename_subject("  ", "other").unwrap(), 0);
    assert_eq!(repo.rename_subject("same", "SAME").unwrap(), 0);
}

#[test]
fn remove_subject_drops_it_everywhere() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuoteRepository::try_new(&mut conn).unwrap();

    let mut quote = Quote::new("A", "text");
    quote.subjects = strings(&["obsolete", "keep"]);
    repo.create_quote(&quote).unwrap();

    assert_eq!(repo.remove_subject("OBSOLETE").unwrap(), 1);
    assert_eq!(
        repo.get_quote(quote.id).unwrap().unwrap().subjects,
        strings(&["keep"])
    );
    assert_eq!(repo.remove_subject("obsolete").unwrap(), 0);
}

#[test]
fn cleanup_splits_legacy_joined_subjects() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuoteRepository::try_new(&mut conn).unwrap();

    let mut legacy = Quote::new("A", "legacy row");
    legacy.subjects = strings(&["Leadership, 12,\nTeamwork"]);
    let mut clean = Quote::new("B", "clean row");
    clean.subjects = strings(&["focus"]);
    repo.create_quotes(&[legacy.clone(), clean.clone()]).unwrap();

    let mut service = QuoteService::new(repo, DuplicatePolicy::default());
    assert_eq!(service.cleanup_legacy_subjects().unwrap(), 1);
    assert_eq!(service.cleanup_legacy_subjects().unwrap(), 0);

    let legacy_after = service.get_quote(legacy.id).unwrap().unwrap();
    assert_eq!(legacy_after.subjects, strings(&["leadership", "teamwork"]));
    let clean_after = service.get_quote(clean.id).unwrap().unwrap();
    assert_eq!(clean_after.subjects, strings(&["focus"]));
}

#[test]
fn list_by_subject_after_rename() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteQuoteRepository::try_new(&mut conn).unwrap();
    let mut service = QuoteService::new(repo, DuplicatePolicy::default());

    let mut input = NewQuote::new("A", "Some text about building things");
    input.subjects = strings(&["startup"]);
    let added = service.add_quote(input).unwrap();
    service.rename_subject("startup", "startups").unwrap();

    let page = service
        .list_quotes(QuoteListQuery {
            subject: Some("startups".to_string()),
            ..QuoteListQuery::default()
        })
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, added.quote.id);
}

use libregister_core::db::open_db_in_memory;
use libregister_core::{
    backup_file_name, export_all, restore, BackupError, BookListQuery, BookRecord,
    BookRepository, RepoError, RestoreMode, SqliteBookRepository,
};

fn seeded_record(key: &str, title: &str) -> BookRecord {
    let mut book = BookRecord::new(key, title);
    book.entry_date = "2024-03-15".to_string();
    book.pages = "320".to_string();
    book.price = "1200.00".to_string();
    book
}

#[test]
fn export_is_deterministic_for_same_store_state() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&mut conn).unwrap();

    repo.create_book(&seeded_record("ACC-200", "Biology")).unwrap();
    repo.create_book(&seeded_record("ACC-100", "Physics")).unwrap();

    let first = export_all(&repo).unwrap();
    let second = export_all(&repo).unwrap();
    assert_eq!(first, second);

    // Key order, not insertion order.
    let index_100 = first.find("ACC-100").unwrap();
    let index_200 = first.find("ACC-200").unwrap();
    assert!(index_100 < index_200);
}

#[test]
fn export_of_empty_store_is_empty_array() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&mut conn).unwrap();

    assert_eq!(export_all(&repo).unwrap(), "[]");
}

#[test]
fn restore_of_exported_document_reproduces_store() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&mut conn).unwrap();

    let mut borrowed = seeded_record("ACC-100", "Physics");
    borrowed.student_name = Some("Nimal".to_string());
    borrowed.student_class = Some("10B".to_string());
    borrowed.borrow_date = Some("2024-05-02".to_string());
    repo.create_book(&borrowed).unwrap();
    repo.create_book(&seeded_record("ACC-200", "Biology")).unwrap();

    let document = export_all(&repo).unwrap();

    let mut target_conn = open_db_in_memory().unwrap();
    let mut target_repo = SqliteBookRepository::try_new(&mut target_conn).unwrap();
    let report = restore(&mut target_repo, &document, RestoreMode::Atomic).unwrap();

    assert_eq!(report.inserted, 2);
    assert!(report.is_complete());
    assert_eq!(export_all(&target_repo).unwrap(), document);
}

#[test]
fn restore_accepts_documents_in_any_record_order() {
    let document = r#"[
        {"accessionNo":"ACC-300","entryDate":"","classNo":"","bookName":"Zoology",
         "publisher":"","publishDate":"","pages":"","price":"","medium":"",
         "withdrawDate":"","notes":""},
        {"accessionNo":"ACC-100","entryDate":"","classNo":"","bookName":"Algebra",
         "publisher":"","publishDate":"","pages":"","price":"","medium":"",
         "withdrawDate":"","notes":""}
    ]"#;

    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBookRepository::try_new(&mut conn).unwrap();
    restore(&mut repo, document, RestoreMode::Atomic).unwrap();

    let keys: Vec<String> = repo
        .list_books(&BookListQuery::default())
        .unwrap()
        .into_iter()
        .map(|book| book.accession_no)
        .collect();
    assert_eq!(keys, ["ACC-100", "ACC-300"]);
}

#[test]
fn restore_accepts_legacy_documents_with_numeric_fields() {
    let document = r#"[
        {"accessionNo":"ACC-100","entryDate":"2024-01-10","classNo":"530",
         "bookName":"Physics","publisher":"Acme","publishDate":"2020-01-01",
         "pages":320,"price":45.5,"medium":"Sinhala","withdrawDate":"",
         "notes":"","studentName":"Nimal","studentClass":"10B",
         "borrowDate":"2024-05-02","returnDate":"2024-05-16"}
    ]"#;

    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBookRepository::try_new(&mut conn).unwrap();
    restore(&mut repo, document, RestoreMode::Atomic).unwrap();

    let book = repo.get_book("ACC-100").unwrap().unwrap();
    assert_eq!(book.pages, "320");
    assert_eq!(book.price, "45.5");
    assert_eq!(book.student_name.as_deref(), Some("Nimal"));
}

#[test]
fn malformed_document_is_rejected_before_any_mutation() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBookRepository::try_new(&mut conn).unwrap();
    repo.create_book(&seeded_record("ACC-100", "Physics")).unwrap();

    for document in [
        "not json at all",
        r#"{"accessionNo":"ACC-200"}"#,
        "[1, 2, 3]",
    ] {
        let err = restore(&mut repo, document, RestoreMode::Atomic).unwrap_err();
        assert!(matches!(err, BackupError::Malformed { .. }), "{document}");
    }

    // The pre-existing record survived every rejected attempt.
    assert!(repo.get_book("ACC-100").unwrap().is_some());
    assert_eq!(repo.list_books(&BookListQuery::default()).unwrap().len(), 1);
}

#[test]
fn atomic_restore_rolls_back_on_duplicate_candidate_keys() {
    let document = r#"[
        {"accessionNo":"ACC-100","entryDate":"","classNo":"","bookName":"First",
         "publisher":"","publishDate":"","pages":"","price":"","medium":"",
         "withdrawDate":"","notes":""},
        {"accessionNo":"ACC-100","entryDate":"","classNo":"","bookName":"Second",
         "publisher":"","publishDate":"","pages":"","price":"","medium":"",
         "withdrawDate":"","notes":""}
    ]"#;

    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBookRepository::try_new(&mut conn).unwrap();
    repo.create_book(&seeded_record("ACC-900", "Survivor")).unwrap();

    let err = restore(&mut repo, document, RestoreMode::Atomic).unwrap_err();
    assert!(matches!(
        err,
        BackupError::Repo(RepoError::DuplicateKey(key)) if key == "ACC-100"
    ));

    // Whole replacement rolled back, including the clear step.
    let keys: Vec<String> = repo
        .list_books(&BookListQuery::default())
        .unwrap()
        .into_iter()
        .map(|book| book.accession_no)
        .collect();
    assert_eq!(keys, ["ACC-900"]);
}

#[test]
fn best_effort_restore_keeps_good_records_and_reports_failures() {
    let document = r#"[
        {"accessionNo":"ACC-100","entryDate":"","classNo":"","bookName":"First",
         "publisher":"","publishDate":"","pages":"","price":"","medium":"",
         "withdrawDate":"","notes":""},
        {"accessionNo":"ACC-100","entryDate":"","classNo":"","bookName":"Second",
         "publisher":"","publishDate":"","pages":"","price":"","medium":"",
         "withdrawDate":"","notes":""},
        {"accessionNo":"ACC-200","entryDate":"","classNo":"","bookName":"Third",
         "publisher":"","publishDate":"","pages":"","price":"","medium":"",
         "withdrawDate":"","notes":""}
    ]"#;

    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBookRepository::try_new(&mut conn).unwrap();
    repo.create_book(&seeded_record("ACC-900", "Replaced")).unwrap();

    let report = restore(&mut repo, document, RestoreMode::BestEffort).unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].accession_no, "ACC-100");
    assert!(!report.is_complete());

    // The clear step committed, so the pre-restore record is gone and the
    // first occurrence of the duplicated key won.
    let books = repo.list_books(&BookListQuery::default()).unwrap();
    let keys: Vec<&str> = books.iter().map(|book| book.accession_no.as_str()).collect();
    assert_eq!(keys, ["ACC-100", "ACC-200"]);
    assert_eq!(books[0].book_name, "First");
}

#[test]
fn suggested_backup_file_name_embeds_date() {
    assert_eq!(
        backup_file_name("2024-06-01"),
        "library_backup_2024-06-01.json"
    );
}

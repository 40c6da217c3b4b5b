use chrono::{DateTime, Utc};
use tempfile::TempDir;
use zenhub_export::error::WriteError;
use zenhub_export::export::write_records;
use zenhub_export::types::{COLUMNS, Column, IssueState, MergedRecord};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn record(number: u64) -> MergedRecord {
    MergedRecord {
        repository: "acme/widgets".into(),
        number,
        title: format!("Issue {number}"),
        state: IssueState::Open,
        pipeline: Some("Backlog".into()),
        estimate: Some(2.5),
        is_epic: Some(false),
        epics: vec![],
        blocked_by: vec![3],
        priority: Some("Medium".into()),
        labels: "bug,Medium".into(),
        assignees: "alice,bob".into(),
        author: Some("carol".into()),
        milestone: Some("Sprint 4".into()),
        milestone_due: Some(at("2024-06-30T07:00:00Z")),
        created_at: at("2024-04-01T09:00:00Z"),
        updated_at: at("2024-04-02T10:30:00Z"),
        comments: None,
        body: "line one\nline, two".into(),
    }
}

fn read_csv(path: &std::path::Path) -> Vec<csv::StringRecord> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(Result::unwrap)
        .collect()
}

#[test]
fn csv_header_follows_column_order() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.csv");

    let rows = write_records(&out, &[record(1), record(2)], false).unwrap();
    assert_eq!(rows, 2);

    let records = read_csv(&out);
    assert_eq!(records.len(), 3);
    let header: Vec<&str> = records[0].iter().collect();
    let expected: Vec<&str> = COLUMNS.iter().map(|c| c.header()).collect();
    assert_eq!(header, expected);
    assert_eq!(header.first(), Some(&"Repository"));
    assert_eq!(header.last(), Some(&"User Story"));
}

#[test]
fn csv_cells_are_typed_and_quoted() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.csv");
    write_records(&out, &[record(7)], false).unwrap();

    let row = &read_csv(&out)[1];
    let cell = |column: Column| {
        let idx = COLUMNS.iter().position(|&c| c == column).unwrap();
        row.get(idx).unwrap().to_owned()
    };
    assert_eq!(cell(Column::Number), "7");
    assert_eq!(cell(Column::Estimate), "2.5");
    assert_eq!(cell(Column::IsEpic), "false");
    assert_eq!(cell(Column::Epics), "");
    assert_eq!(cell(Column::Blocked), "blocked");
    assert_eq!(cell(Column::BlockedBy), "3");
    assert_eq!(cell(Column::MilestoneDue), "2024-06-30T07:00:00Z");
    assert_eq!(cell(Column::UpdatedAt), "2024-04-02T10:30:00Z");
    assert_eq!(cell(Column::Body), "line one\nline, two");
}

#[test]
fn empty_export_still_has_a_header() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.csv");

    assert_eq!(write_records(&out, &[], false).unwrap(), 0);
    assert_eq!(read_csv(&out).len(), 1);
}

#[test]
fn overwrites_existing_file_by_default() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.csv");
    std::fs::write(&out, "stale").unwrap();

    write_records(&out, &[record(1)], false).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(contents.starts_with("Repository,"));
    assert!(!contents.contains("stale"));
}

#[test]
fn no_clobber_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.xlsx");
    std::fs::write(&out, "keep").unwrap();

    let err = write_records(&out, &[record(1)], true).unwrap_err();

    assert!(matches!(err, WriteError::Exists { .. }));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "keep");
}

#[test]
fn xlsx_output_is_a_workbook() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.xlsx");

    let mut long = record(1);
    long.body = "x".repeat(40_000);
    write_records(&out, &[long, record(2)], false).unwrap();

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn unwritable_destination_is_a_write_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-dir");

    let err = write_records(&missing.join("out.csv"), &[record(1)], false).unwrap_err();
    assert!(matches!(err, WriteError::Csv { .. }), "{err:?}");

    let err = write_records(&missing.join("out.xlsx"), &[record(1)], false).unwrap_err();
    assert!(matches!(err, WriteError::Xlsx { .. }), "{err:?}");
}

#[test]
fn names_without_csv_extension_get_a_workbook() {
    let dir = TempDir::new().unwrap();

    for name in ["issues", "issues.xls", "issues.txt"] {
        let out = dir.path().join(name);
        assert_eq!(write_records(&out, &[record(1)], false).unwrap(), 1);
        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"PK"), "{name} is not a workbook");
    }
}

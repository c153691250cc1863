use poseview::history::{Entry, FileStore, HistoryLog, Kind, MAX_RECORDS};
use serde_json::json;

#[test]
fn persisted_history() {
    let dir = tempfile::tempdir().unwrap();

    let mut log = HistoryLog::new(FileStore::new(dir.path()));
    let mut ids = Vec::new();
    for i in 0..=MAX_RECORDS {
        let kind = if i % 2 == 0 { Kind::Image } else { Kind::Video };
        ids.push(log.append(Entry::new(kind, i as f32)).unwrap());
    }

    let ids_as_numbers = ids
        .iter()
        .map(|id| id.parse::<i64>().unwrap())
        .collect::<Vec<_>>();
    assert!(ids_as_numbers.windows(2).all(|w| w[0] < w[1]));

    let reopened = HistoryLog::new(FileStore::new(dir.path()));
    let records = reopened.list().unwrap();
    assert_eq!(records.len(), MAX_RECORDS);
    assert_eq!(records[0].id, ids[MAX_RECORDS]);
    assert_eq!(records[0].score, MAX_RECORDS as f32);
    assert!(!records.iter().any(|r| r.id == ids[0]));
    assert!(reopened
        .filter(Kind::Video)
        .unwrap()
        .iter()
        .all(|r| r.kind == Kind::Video));
}

#[test]
fn corrupt_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("poseHistory.json"), "[{\"id\": 3").unwrap();

    let mut log = HistoryLog::new(FileStore::new(dir.path()));
    assert!(log.list().unwrap().is_empty());

    let id = log
        .append(Entry::new(Kind::Live, 77.0).with_data(json!({"frames": 120})))
        .unwrap();
    let records = log.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].data, Some(json!({"frames": 120})));

    log.clear().unwrap();
    assert!(!dir.path().join("poseHistory.json").exists());
}

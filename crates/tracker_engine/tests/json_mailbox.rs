mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use common::init_logging;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tracker_core::{SearchQuery, SearchWindow};
use tracker_engine::{JsonMailbox, MessageId, MessageStore, StoreError, ThreadId};

const FIXTURE: &str = r#"{
  "threads": [
    {
      "id": "older",
      "messages": [
        { "id": "o1", "subject": "Hi", "plain_body": "x", "date": "2025-06-20T08:00:00Z" }
      ]
    },
    {
      "id": "newer",
      "messages": [
        { "id": "n2", "subject": "Re: Hi", "html_body": "<p>later</p>", "date": "2025-06-20T18:00:00Z" },
        { "id": "n1", "subject": "Hi", "plain_body": "first", "date": "2025-06-20T09:00:00Z" }
      ]
    },
    {
      "id": "archived",
      "in_inbox": false,
      "messages": [
        { "id": "a1", "subject": "Hi", "date": "2025-06-20T10:00:00Z" }
      ]
    },
    {
      "id": "done",
      "labels": ["Job_Processed"],
      "messages": [
        { "id": "d1", "subject": "Hi", "date": "2025-06-20T11:00:00Z" }
      ]
    },
    {
      "id": "tomorrow",
      "messages": [
        { "id": "t1", "subject": "Hi", "date": "2025-06-21T00:00:00Z" }
      ]
    }
  ]
}"#;

fn query() -> SearchQuery {
    SearchQuery::new(
        SearchWindow::for_day(NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()),
        "Job_Processed",
    )
}

fn ids(threads: &[tracker_engine::MailThread]) -> Vec<&str> {
    threads.iter().map(|t| t.id.as_str()).collect()
}

#[tokio::test]
async fn search_filters_and_orders_threads() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mailbox.json");
    std::fs::write(&path, FIXTURE).unwrap();
    let mailbox = JsonMailbox::open(path).unwrap();

    let page = mailbox.search(&query(), 0, 10).await.unwrap();
    assert_eq!(ids(&page), vec!["newer", "older"]);

    // Messages come back chronologically and default to unread.
    let newer = &page[0];
    assert_eq!(newer.messages[0].id, MessageId("n1".into()));
    assert!(newer.messages[0].unread);
    assert_eq!(
        newer.messages[1].date,
        Utc.with_ymd_and_hms(2025, 6, 20, 18, 0, 0).unwrap()
    );

    let second = mailbox.search(&query(), 1, 1).await.unwrap();
    assert_eq!(ids(&second), vec!["older"]);
}

#[tokio::test]
async fn mutations_are_written_through() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mailbox.json");
    std::fs::write(&path, FIXTURE).unwrap();

    {
        let mailbox = JsonMailbox::open(path.clone()).unwrap();
        mailbox.ensure_label("Job_Processed").await.unwrap();
        mailbox
            .add_label(&ThreadId("older".into()), "Job_Processed")
            .await
            .unwrap();
        mailbox.mark_read(&MessageId("o1".into())).await.unwrap();
    }

    let reopened = JsonMailbox::open(path).unwrap();
    assert!(reopened
        .thread_labels(&ThreadId("older".into()))
        .unwrap()
        .contains("Job_Processed"));
    assert!(!reopened.is_unread(&MessageId("o1".into())).unwrap());
    assert!(reopened.is_unread(&MessageId("n1".into())).unwrap());

    let page = reopened.search(&query(), 0, 10).await.unwrap();
    assert_eq!(ids(&page), vec!["newer"]);
}

#[tokio::test]
async fn unknown_ids_are_errors() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let mailbox = JsonMailbox::open(dir.path().join("missing.json")).unwrap();

    assert!(mailbox.search(&query(), 0, 10).await.unwrap().is_empty());
    let err = mailbox
        .add_label(&ThreadId("ghost".into()), "Job_Processed")
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::UnknownThread(ThreadId("ghost".into())));
    let err = mailbox.mark_read(&MessageId("ghost".into())).await.unwrap_err();
    assert_eq!(err, StoreError::UnknownMessage(MessageId("ghost".into())));
}

#[test]
fn corrupt_mailbox_is_rejected() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mailbox.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        JsonMailbox::open(path),
        Err(StoreError::Unavailable(_))
    ));
}

#[tokio::test]
async fn failed_write_leaves_state_unchanged() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let sub = dir.path().join("sub");
    std::fs::create_dir(&sub).unwrap();
    let path = sub.join("mailbox.json");
    std::fs::write(&path, FIXTURE).unwrap();
    let mailbox = JsonMailbox::open(path.clone()).unwrap();

    // Replace the parent directory with a file so every write fails.
    std::fs::remove_dir_all(&sub).unwrap();
    std::fs::write(&sub, "blocker").unwrap();

    assert!(mailbox.ensure_label("Job_Processed").await.is_err());
    assert!(mailbox
        .add_label(&ThreadId("older".into()), "Job_Processed")
        .await
        .is_err());
    assert!(mailbox.mark_read(&MessageId("o1".into())).await.is_err());
    assert!(mailbox
        .thread_labels(&ThreadId("older".into()))
        .unwrap()
        .is_empty());
    assert!(mailbox.is_unread(&MessageId("o1".into())).unwrap());

    std::fs::remove_file(&sub).unwrap();
    std::fs::create_dir(&sub).unwrap();

    mailbox.ensure_label("Job_Processed").await.unwrap();
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("Job_Processed"), "{saved}");
}

// ABOUTME: Tests for the liveness handshake - ping delivery, timeout firing,
// ABOUTME: replies cancelling the timeout, and frame message handling.

use std::time::Duration;

use futures::stream;
use serde_json::json;

use super::test_support::{Fixture, app};
use crate::app::{AppPatch, Version};
use crate::channel::{FrameMessage, PingMessage};
use crate::notify::{APP_TOPIC, Notice};
use crate::timer::{Scheduler, TimerId};

#[test]
fn test_frame_loaded_pings_frame_origin() {
    let f = Fixture::new(&[("gae-std", "1")]);

    let timer = f.coordinator.frame_loaded("gae-std").unwrap();

    let posted = f.channel.last_for("gae-std").unwrap();
    assert_eq!(posted.origin, "https://gae-std.example.com");
    assert_eq!(posted.message, PingMessage { timeout_id: timer });
    assert_eq!(f.scheduler.pending(), 1);
}

#[test]
fn test_unanswered_ping_marks_unresponsive() {
    let f = Fixture::new(&[("gae-std", "1")]);
    f.coordinator.frame_loaded("gae-std");

    f.advance_ms(1_999);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(false));
    assert!(!f.container("gae-std").has_error());

    f.advance_ms(1);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(true));
    assert!(f.container("gae-std").has_error());
    assert_eq!(
        f.history.history(APP_TOPIC),
        vec![Notice::Unresponsive {
            id: "gae-std".to_string(),
            title: "App gae-std".to_string(),
        }]
    );
}

#[test]
fn test_reply_cancels_timeout() {
    let f = Fixture::new(&[("gae-std", "1")]);
    let timer = f.coordinator.frame_loaded("gae-std").unwrap();

    f.advance_ms(1_500);
    f.coordinator
        .handle_message(FrameMessage::reply(&PingMessage { timeout_id: timer }));
    assert_eq!(f.scheduler.pending(), 0);

    f.advance_ms(60_000);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(false));
    assert!(!f.container("gae-std").has_error());
    assert!(f.history.history(APP_TOPIC).is_empty());
}

#[test]
fn test_late_reply_leaves_error_until_next_merge() {
    let f = Fixture::new(&[("gae-std", "1")]);
    let timer = f.coordinator.frame_loaded("gae-std").unwrap();
    f.advance_ms(2_000);

    // A bare reply after expiry is a no-op
    f.coordinator
        .handle_message(FrameMessage::reply(&PingMessage { timeout_id: timer }));
    assert!(f.container("gae-std").has_error());

    // Any merge clears it
    f.coordinator.update(AppPatch::new("gae-std"));
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(false));
    assert!(!f.container("gae-std").has_error());
}

#[test]
fn test_reply_with_app_payload_merges() {
    let f = Fixture::new(&[("gae-std", "1")]);
    let timer = f.coordinator.frame_loaded("gae-std").unwrap();

    f.coordinator.handle_message(
        FrameMessage::reply(&PingMessage { timeout_id: timer })
            .with_app(AppPatch::new("gae-std").version("2")),
    );

    assert_eq!(f.scheduler.pending(), 1, "only the marker removal remains");
    assert_eq!(
        f.coordinator.get("gae-std").unwrap().version,
        Some(Version::from("2"))
    );
    assert_eq!(f.frame("gae-std").name(), "gae-std-2");
}

#[test]
fn test_new_ping_replaces_pending_one() {
    let f = Fixture::new(&[("gae-std", "1")]);
    let first = f.coordinator.frame_loaded("gae-std").unwrap();
    f.advance_ms(1_000);
    let second = f.coordinator.frame_loaded("gae-std").unwrap();

    assert_ne!(first, second);
    assert_eq!(f.scheduler.pending(), 1);
    assert!(!f.scheduler.cancel(first));

    // The first deadline passes without effect
    f.advance_ms(1_500);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(false));

    f.advance_ms(500);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(true));
    assert_eq!(f.history.history(APP_TOPIC).len(), 1);
}

#[test]
fn test_pings_are_per_application() {
    let f = Fixture::new(&[("a", "1"), ("b", "1")]);
    let timer_a = f.coordinator.frame_loaded("a").unwrap();
    f.coordinator.frame_loaded("b");

    f.coordinator
        .handle_message(FrameMessage::reply(&PingMessage { timeout_id: timer_a }));
    f.advance_ms(2_000);

    assert_eq!(f.coordinator.is_unresponsive("a"), Some(false));
    assert_eq!(f.coordinator.is_unresponsive("b"), Some(true));
}

#[test]
fn test_opaque_origin_still_arms_timeout() {
    let f = Fixture::new(&[("blank", "1")]);
    f.coordinator
        .update(AppPatch::new("blank").url("about:blank").version("2"));

    assert!(f.coordinator.frame_loaded("blank").is_some());
    assert!(f.channel.sent().is_empty());

    f.advance_ms(2_000);
    assert_eq!(f.coordinator.is_unresponsive("blank"), Some(true));
}

#[test]
fn test_send_failure_still_arms_timeout() {
    let f = Fixture::new(&[("gae-std", "1")]);
    f.channel.fail_with(Some("frame detached"));

    assert!(f.coordinator.frame_loaded("gae-std").is_some());
    assert!(f.channel.sent().is_empty());

    f.advance_ms(2_000);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(true));
}

#[test]
fn test_frame_loaded_for_untracked_app() {
    let f = Fixture::new(&[("gae-std", "1")]);
    assert!(f.coordinator.frame_loaded("ghost").is_none());
    assert_eq!(f.scheduler.pending(), 0);
    assert!(f.channel.sent().is_empty());
}

#[test]
fn test_unknown_timeout_id_is_ignored() {
    let f = Fixture::new(&[("gae-std", "1")]);
    f.coordinator.frame_loaded("gae-std");

    f.coordinator.handle_message(FrameMessage::reply(&PingMessage {
        timeout_id: TimerId::new(9_999),
    }));

    assert_eq!(f.scheduler.pending(), 1);
    f.advance_ms(2_000);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(true));
}

#[test]
fn test_raw_messages() {
    let f = Fixture::new(&[("gae-std", "1")]);
    let timer = f.coordinator.frame_loaded("gae-std").unwrap();

    f.coordinator.handle_raw_message(&json!("not an object"));
    f.coordinator.handle_raw_message(&json!({"timeoutID": "soon"}));
    assert_eq!(f.scheduler.pending(), 1);

    f.coordinator.handle_raw_message(&json!({
        "timeoutID": timer.get(),
        "app": {"id": "gae-std", "version": "3", "theme": {"font": "Lato"}}
    }));

    let record = f.coordinator.get("gae-std").unwrap();
    assert_eq!(record.version, Some(Version::from("3")));
    assert_eq!(record.extra["theme"]["font"], "Lato");
    f.advance_ms(2_000);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(false));
}

#[test]
fn test_malformed_report_does_not_lose_reply() {
    let f = Fixture::new(&[("gae-std", "1")]);
    let timer = f.coordinator.frame_loaded("gae-std").unwrap();

    f.coordinator.handle_raw_message(&json!({
        "timeoutID": timer.get(),
        "app": {"id": "gae-std", "title": 7, "version": "2"}
    }));

    f.advance_ms(2_000);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(false));
    let record = f.coordinator.get("gae-std").unwrap();
    assert_eq!(record.version, Some(Version::from("2")));
    assert_eq!(record.title, "App gae-std");
}

#[test]
fn test_reply_with_non_object_report_still_cancels() {
    let f = Fixture::new(&[("gae-std", "1")]);
    let timer = f.coordinator.frame_loaded("gae-std").unwrap();

    f.coordinator
        .handle_raw_message(&json!({"timeoutID": timer.get(), "app": 42}));

    assert_eq!(f.scheduler.pending(), 0);
    f.advance_ms(2_000);
    assert_eq!(f.coordinator.is_unresponsive("gae-std"), Some(false));
}

#[test]
fn test_dropped_coordinator_disarms_timeout() {
    let f = Fixture::new(&[("gae-std", "1")]);
    f.coordinator.frame_loaded("gae-std");
    let container = f.container("gae-std");
    let scheduler = f.scheduler.clone();
    drop(f);

    scheduler.advance(Duration::from_millis(2_000));
    assert!(!container.has_error());
}

#[tokio::test]
async fn test_listen_drains_stream() {
    let f = Fixture::new(&[("a", "1"), ("b", "1")]);
    let timer = f.coordinator.frame_loaded("a").unwrap();

    let messages = vec![
        FrameMessage::reply(&PingMessage { timeout_id: timer }),
        FrameMessage::report(AppPatch::new("b").version("2")),
        FrameMessage::report(app("ghost", "1")),
    ];
    f.coordinator.listen(stream::iter(messages)).await;

    f.advance_ms(2_000);
    assert_eq!(f.coordinator.is_unresponsive("a"), Some(false));
    assert_eq!(f.coordinator.get("b").unwrap().version, Some(Version::from("2")));
    assert_eq!(f.coordinator.len(), 2);
}

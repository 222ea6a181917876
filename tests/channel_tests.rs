// Tests for the update channel

use std::path::Path;

use quickhash::{Update, UpdateChannel};

#[test]
fn test_fifo_ordering() {
    let channel = UpdateChannel::new();
    channel.toast("first");
    channel.toast("second");

    assert_eq!(channel.try_pop(), Some(Update::Toast("first".to_string())));
    assert_eq!(channel.try_pop(), Some(Update::Toast("second".to_string())));
    assert_eq!(channel.try_pop(), None);
}

#[test]
fn test_try_pop_on_empty_channel() {
    let channel = UpdateChannel::new();
    assert!(channel.is_empty());
    assert_eq!(channel.try_pop(), None);
}

#[test]
fn test_progress_fraction_clamped() {
    let channel = UpdateChannel::new();
    channel.progress(1, 4);
    channel.progress(10, 5);
    channel.progress(0, 0);

    assert_eq!(channel.try_pop(), Some(Update::Progress(0.25)));
    assert_eq!(channel.try_pop(), Some(Update::Progress(1.0)));
    assert_eq!(channel.try_pop(), Some(Update::Progress(1.0)));
}

#[test]
fn test_result_and_error_payloads() {
    let channel = UpdateChannel::new();
    channel.result(Path::new("/base"), Path::new("/base/a"), "abc123".to_string(), "sha256");
    channel.error(Path::new("/base"), Path::new("/base/b"), "File is empty");

    match channel.try_pop() {
        Some(Update::Result { base, path, hash, algorithm }) => {
            assert_eq!(base, Path::new("/base"));
            assert_eq!(path, Path::new("/base/a"));
            assert_eq!(hash, "abc123");
            assert_eq!(algorithm, "sha256");
        }
        other => panic!("expected a result message, got {:?}", other),
    }
    match channel.try_pop() {
        Some(Update::Error { path, message, .. }) => {
            assert_eq!(path, Path::new("/base/b"));
            assert_eq!(message, "File is empty");
        }
        other => panic!("expected an error message, got {:?}", other),
    }
}

#[test]
fn test_reset_discards_pending_messages() {
    let channel = UpdateChannel::new();
    channel.toast("stale");
    channel.progress(1, 2);
    assert_eq!(channel.len(), 2);

    channel.reset();
    assert!(channel.is_empty());
    assert_eq!(channel.try_pop(), None);
}

#[test]
fn test_drain_is_bounded() {
    let channel = UpdateChannel::new();
    for i in 0..5 {
        channel.toast(format!("msg {}", i));
    }

    let first = channel.drain(3);
    assert_eq!(first.len(), 3);
    assert_eq!(channel.len(), 2);

    let rest = channel.drain(100);
    assert_eq!(rest.len(), 2);
    assert!(channel.is_empty());
}

#[test]
fn test_cloned_handles_share_the_queue() {
    let channel = UpdateChannel::new();
    let producer = channel.clone();

    producer.toast("from clone");
    assert_eq!(channel.try_pop(), Some(Update::Toast("from clone".to_string())));
}

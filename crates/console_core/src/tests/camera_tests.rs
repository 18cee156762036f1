use shared::{domain::UNKNOWN_CAMERA_MODE_LABEL, protocol::CommandPayload};
use tokio::sync::Semaphore;

use super::*;
use crate::test_support::RecordingChannel;

fn requested_codes(channel: &RecordingChannel) -> Vec<i64> {
    channel
        .sent()
        .into_iter()
        .map(|command| match command.data {
            Some(CommandPayload::Integer(code)) => code,
            other => panic!("unexpected camera payload {other:?}"),
        })
        .collect()
}

fn echoing_channel() -> RecordingChannel {
    RecordingChannel::with_responder(|command| match &command.data {
        Some(CommandPayload::Integer(code)) => Ok(code.to_string()),
        _ => Err("missing mode".to_string()),
    })
}

#[tokio::test]
async fn walks_the_mode_list_then_wraps() {
    let channel = Arc::new(echoing_channel());
    let (events, _) = broadcast::channel(16);
    let selector = CameraModeSelector::new(channel.clone(), events);

    let mut labels = Vec::new();
    for _ in 0..CameraMode::CYCLE.len() + 1 {
        labels.push(selector.cycle().await.expect("cycle").label);
    }

    assert_eq!(requested_codes(&channel), vec![0, 1, 2, 3, 999, 0]);
    assert_eq!(
        labels,
        vec![
            "No processing",
            "Centre of mass",
            "Camshift",
            "Connected components",
            "Colour training",
            "No processing",
        ]
    );
}

#[tokio::test]
async fn failed_requests_still_advance() {
    let channel = Arc::new(RecordingChannel::failing("timeout"));
    let (events, _) = broadcast::channel(16);
    let selector = CameraModeSelector::new(channel.clone(), events);

    selector.cycle().await.expect_err("first fails");
    assert_eq!(selector.next_mode(), CameraMode::CentreOfMass);
    selector.cycle().await.expect_err("second fails");
    assert_eq!(selector.next_mode(), CameraMode::Camshift);

    assert_eq!(requested_codes(&channel), vec![0, 1]);
}

#[tokio::test]
async fn unknown_reported_code_gets_generic_label() {
    let channel = Arc::new(RecordingChannel::replying("42"));
    let (events, mut rx) = broadcast::channel(16);
    let selector = CameraModeSelector::new(channel, events);

    let report = selector.cycle().await.expect("cycle");

    assert_eq!(report.requested, CameraMode::NoProcessing);
    assert_eq!(report.reported_code, 42);
    assert_eq!(report.label, UNKNOWN_CAMERA_MODE_LABEL);
    assert_eq!(
        rx.try_recv().expect("label event"),
        ConsoleEvent::CameraModeChanged {
            code: 42,
            label: UNKNOWN_CAMERA_MODE_LABEL.to_string(),
        }
    );
}

#[tokio::test]
async fn unreadable_reply_is_a_protocol_error_and_leaves_label_alone() {
    let channel = Arc::new(RecordingChannel::replying("<b>camera busy</b>"));
    let (events, mut rx) = broadcast::channel(16);
    let selector = CameraModeSelector::new(channel, events);

    let err = selector.cycle().await.expect_err("unparseable");

    assert!(matches!(err, CommandError::Protocol { .. }));
    assert!(matches!(rx.try_recv(), Ok(ConsoleEvent::Error(_))));
    assert!(rx.try_recv().is_err());
    assert_eq!(selector.next_mode(), CameraMode::CentreOfMass);
}

#[tokio::test]
async fn overlapping_calls_see_the_advanced_index() {
    let gate = Arc::new(Semaphore::new(0));
    let channel = Arc::new(echoing_channel().gated(gate.clone()));
    let (events, _) = broadcast::channel(16);
    let selector = Arc::new(CameraModeSelector::new(channel.clone(), events));

    let first = tokio::spawn({
        let selector = selector.clone();
        async move { selector.cycle().await }
    });
    while channel.sent().is_empty() {
        tokio::task::yield_now().await;
    }
    let second = tokio::spawn({
        let selector = selector.clone();
        async move { selector.cycle().await }
    });
    while channel.sent().len() < 2 {
        tokio::task::yield_now().await;
    }
    gate.add_permits(2);

    first.await.expect("join").expect("first cycle");
    second.await.expect("join").expect("second cycle");
    assert_eq!(requested_codes(&channel), vec![0, 1]);
}

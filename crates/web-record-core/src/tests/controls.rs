use crate::{
    Affordance, CaptureMode, Command, CommandResponse, ControlView, CoordinatorHandle,
    PageContext, PageOverlay, PopupPanel, PopupScreen, StateMirror, StateSnapshot, UiMessage,
    UserAction, coordinator::Envelope, format_elapsed, run_mirror,
};

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

fn recording(elapsed_time: u64, is_paused: bool) -> StateSnapshot {
    StateSnapshot {
        is_recording: true,
        is_paused,
        elapsed_time,
    }
}

/// WHAT: Elapsed milliseconds render as zero-padded HH:MM:SS
/// WHY: Both the overlay and the popup show this exact format
#[test]
fn given_elapsed_ms_when_formatting_then_hh_mm_ss() {
    // Given/When/Then: Boundaries, a mixed value and hours past a day
    assert_eq!(format_elapsed(0), "00:00:00");
    assert_eq!(format_elapsed(999), "00:00:00");
    assert_eq!(format_elapsed(3_725_000), "01:02:05");
    assert_eq!(format_elapsed(90 * 3_600_000), "90:00:00");
}

/// WHAT: The view offers pause or resume depending on state, always stop
/// WHY: Affordances follow the projection and nothing else
#[test]
fn given_snapshots_when_rendering_then_affordances_follow_state() {
    // Given: Idle, recording and paused projections
    let idle = ControlView::from_snapshot(&StateSnapshot::IDLE);
    let running = ControlView::from_snapshot(&recording(61_000, false));
    let paused = ControlView::from_snapshot(&recording(61_000, true));

    // Then: Hidden when idle; toggle flips between pause and resume
    assert_eq!(idle, ControlView::Hidden);
    assert_eq!(
        running,
        ControlView::Visible {
            timer: "00:01:01".to_string(),
            paused: false,
            affordances: vec![Affordance::Pause, Affordance::Stop],
        }
    );
    assert_eq!(
        paused,
        ControlView::Visible {
            timer: "00:01:01".to_string(),
            paused: true,
            affordances: vec![Affordance::Resume, Affordance::Stop],
        }
    );
}

/// WHAT: Buttons map to the matching coordinator commands
/// WHY: Control surfaces forward intent without interpreting it
#[test]
fn given_affordances_when_pressed_then_commands_forwarded() {
    assert_eq!(
        Affordance::Pause.action().into_command(),
        Command::PauseRecording
    );
    assert_eq!(
        Affordance::Resume.action().into_command(),
        Command::ResumeRecording
    );
    assert_eq!(Affordance::Stop.action().into_command(), Command::StopRecording);
}

/// WHAT: A page accepts only one overlay until the session ends
/// WHY: Re-injection on every start must not duplicate the controls
#[test]
fn given_page_with_overlay_when_injecting_again_then_refused() {
    // Given: A page with an injected overlay
    let page = PageContext::new();
    let first = PageOverlay::inject(&page);

    // When: Injecting again
    let second = PageOverlay::inject(&page);

    // Then: Only the first attached
    assert!(first.is_some_and(|overlay| overlay.is_attached()));
    assert!(second.is_none());
    assert!(page.has_overlay());
}

/// WHAT: The overlay removes itself on idle and the page can host a new one
/// WHY: A later recording of the same page needs fresh controls
#[test]
#[allow(clippy::unwrap_used)]
fn given_overlay_when_idle_received_then_removed_and_reinjectable() {
    // Given: An overlay mirroring a recording
    let page = PageContext::new();
    let mut overlay = PageOverlay::inject(&page).unwrap();
    overlay.apply(recording(5_000, false));
    assert!(overlay.view().is_visible());

    // When: The session goes idle
    overlay.apply(StateSnapshot::IDLE);

    // Then: Detached, hidden, and the page marker is clear
    assert!(!overlay.is_attached());
    assert_eq!(overlay.view(), ControlView::Hidden);
    assert!(!page.has_overlay());
    assert!(PageOverlay::inject(&page).is_some());
}

/// WHAT: The popup converts minutes from the input matching the mode
/// WHY: The coordinator expects the duration in seconds
#[test]
fn given_popup_inputs_when_starting_then_duration_in_seconds() {
    // Given: A popup with 5 timed minutes and a 60 minute cap
    let mut popup = PopupPanel::new(CaptureMode::Timed, Some(5), Some(60));

    // When: Starting in each mode, and with the cap cleared
    let timed = popup.start_action();
    popup.select_mode(CaptureMode::Always);
    let always = popup.start_action();
    popup.set_max_minutes(None);
    let unbounded = popup.start_action();

    // Then: Seconds from the matching input
    assert_eq!(
        timed,
        UserAction::Start {
            mode: CaptureMode::Timed,
            duration: Some(300),
        }
    );
    assert_eq!(
        always,
        UserAction::Start {
            mode: CaptureMode::Always,
            duration: Some(3_600),
        }
    );
    assert_eq!(
        unbounded.into_command(),
        Command::StartRecording {
            mode: CaptureMode::Always,
            duration: None,
        }
    );
}

/// WHAT: Popup screen and status badge follow the projection
/// WHY: The popup never derives state of its own
#[test]
fn given_popup_when_state_changes_then_screen_and_badge_follow() {
    // Given: A fresh popup
    let mut popup = PopupPanel::new(CaptureMode::Always, None, Some(60));
    assert_eq!(popup.screen(), PopupScreen::Setup);
    assert_eq!(popup.status_badge(), None);

    // When/Then: Recording, then paused, then idle
    popup.apply(recording(1_000, false));
    assert_eq!(popup.screen(), PopupScreen::Recording);
    assert_eq!(popup.status_badge(), Some("Recording"));

    popup.apply(recording(2_000, true));
    assert_eq!(popup.status_badge(), Some("Paused"));

    popup.apply(StateSnapshot::IDLE);
    assert_eq!(popup.screen(), PopupScreen::Setup);
}

/// WHAT: A mirror queries once on activation, then follows pushes
/// WHY: A popup opened mid-recording must show the current state at once
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_mirror_when_activated_then_queries_then_follows_updates() {
    // Given: A mirror driven through a bare mailbox
    let (handle, mut inbox) = CoordinatorHandle::channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let renders = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&renders);
    let mirror = tokio::spawn(run_mirror(
        PopupPanel::new(CaptureMode::Always, None, None),
        handle,
        shutdown_rx,
        move |panel: &PopupPanel| sink.lock().unwrap().push(panel.view()),
    ));

    // When: Answering the activation query, then pushing an idle update
    let Envelope { command, reply } = inbox.command_rx.recv().await.unwrap();
    assert_eq!(command, Command::GetState);
    reply
        .send(CommandResponse::State(recording(4_000, false)))
        .unwrap();
    while renders.lock().unwrap().is_empty() {
        tokio::task::yield_now().await;
    }
    inbox
        .updates_tx
        .send(UiMessage::StateUpdate {
            state: StateSnapshot::IDLE,
        })
        .unwrap();
    while renders.lock().unwrap().len() < 2 {
        tokio::task::yield_now().await;
    }
    shutdown_tx.send(true).unwrap();

    // Then: Rendered the queried state, then the pushed one
    let panel = mirror.await.unwrap().unwrap();
    let renders = renders.lock().unwrap().clone();
    assert!(renders[0].is_visible());
    assert_eq!(renders[1], ControlView::Hidden);
    assert_eq!(panel.screen(), PopupScreen::Setup);
}

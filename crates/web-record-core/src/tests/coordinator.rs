use crate::{
    CaptureId, CaptureMode, Command, CommandResponse, Coordinator, CoordinatorEvent,
    CoordinatorHandle, CoordinatorSettings, CoreResult, LocalSurfaceLink, MediaSource, OpenOptions,
    RecordingSink, StateSnapshot, SurfaceCommand, SurfaceEvent, SurfaceLink, SurfaceReporter,
    TabId, TabPlatform, TokioClock, UiMessage,
    tests::fakes::{FakeMedia, FakePlatform, FakeSink, FakeSurface},
};

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};

const TAB: TabId = TabId(42);

struct Harness {
    handle: CoordinatorHandle,
    platform: Arc<FakePlatform>,
    surface: Arc<FakeSurface>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<CoreResult<()>>,
}

fn spawn_with(
    platform: FakePlatform,
    make_surface: impl FnOnce(SurfaceReporter) -> FakeSurface,
    settings: CoordinatorSettings,
) -> Harness {
    let (handle, inbox) = CoordinatorHandle::channel();
    let platform = Arc::new(platform);
    let surface = Arc::new(make_surface(handle.reporter()));
    let coordinator = Coordinator::new(
        inbox,
        Arc::clone(&platform) as Arc<dyn TabPlatform>,
        Arc::clone(&surface) as Arc<dyn SurfaceLink>,
        Arc::new(TokioClock),
        settings,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(coordinator.run(shutdown_rx));

    Harness {
        handle,
        platform,
        surface,
        shutdown_tx,
        task,
    }
}

/// Coordinator over a platform with an active tab and a surface that
/// confirms every stop.
fn spawn_default() -> Harness {
    spawn_with(
        FakePlatform::with_tab(TAB),
        FakeSurface::completing,
        CoordinatorSettings::default(),
    )
}

#[allow(clippy::unwrap_used, clippy::panic)]
async fn state(handle: &CoordinatorHandle) -> StateSnapshot {
    match handle.send(Command::GetState).await.unwrap() {
        CommandResponse::State(snapshot) => snapshot,
        other => panic!("GET_STATE answered with {:?}", other),
    }
}

/// Poll until `predicate` holds; events race commands inside the select loop.
#[allow(clippy::panic)]
async fn eventually(
    handle: &CoordinatorHandle,
    predicate: impl Fn(&StateSnapshot) -> bool,
) -> StateSnapshot {
    for _ in 0..50 {
        let snapshot = state(handle).await;
        if predicate(&snapshot) {
            return snapshot;
        }
        tokio::task::yield_now().await;
    }
    panic!("state never satisfied the predicate");
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[allow(clippy::unwrap_used)]
async fn start(handle: &CoordinatorHandle) -> CommandResponse {
    handle
        .send(Command::StartRecording {
            mode: CaptureMode::Timed,
            duration: Some(300),
        })
        .await
        .unwrap()
}

/// WHAT: Elapsed time excludes paused intervals end to end
/// WHY: The operator-facing timer is driven entirely by the coordinator
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_pause_and_resume_when_querying_then_elapsed_excludes_pause() {
    // Given: Start at t=0, pause at t=2, resume at t=4
    let harness = spawn_default();
    assert_eq!(start(&harness.handle).await, CommandResponse::ok());
    tokio::time::advance(Duration::from_secs(2)).await;
    harness.handle.send(Command::PauseRecording).await.unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;
    harness.handle.send(Command::ResumeRecording).await.unwrap();

    // When: Querying at t=9
    tokio::time::advance(Duration::from_secs(5)).await;
    let snapshot = state(&harness.handle).await;

    // Then: 7 seconds recorded
    assert_eq!(
        snapshot,
        StateSnapshot {
            is_recording: true,
            is_paused: false,
            elapsed_time: 7_000,
        }
    );
}

/// WHAT: Several pause intervals are all excluded from elapsed time
/// WHY: The timer must match wall time minus every pause, not just the last
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_repeated_pauses_when_stopping_then_elapsed_excludes_all_pauses() {
    // Given: Pauses over [1,3) and [5,8) after a start at t=0
    let harness = spawn_default();
    start(&harness.handle).await;
    for (run, paused, frozen_ms) in [(1, 2, 1_000), (2, 3, 3_000)] {
        tokio::time::advance(Duration::from_secs(run)).await;
        harness.handle.send(Command::PauseRecording).await.unwrap();
        tokio::time::advance(Duration::from_secs(paused)).await;
        assert_eq!(state(&harness.handle).await.elapsed_time, frozen_ms);
        harness.handle.send(Command::ResumeRecording).await.unwrap();
    }

    // When: Querying at t=12, just before Stop
    tokio::time::advance(Duration::from_secs(4)).await;
    let snapshot = state(&harness.handle).await;

    // Then: 12s wall minus 5s paused
    assert_eq!(snapshot.elapsed_time, 7_000);
    assert!(!snapshot.is_paused);
}

/// WHAT: Start records the target, asks for one stream and attaches the overlay
/// WHY: The surface and the overlay must both be wired to the same tab
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_active_tab_when_starting_then_surface_started_for_that_tab() {
    // Given: A coordinator with tab 42 focused
    let harness = spawn_default();

    // When: Starting a timed recording
    let response = start(&harness.handle).await;

    // Then: The surface was created and started with the tab's stream and cap
    assert_eq!(response, CommandResponse::ok());
    assert_eq!(*harness.surface.ensured.lock().unwrap(), 1);
    assert_eq!(
        harness.surface.commands.lock().unwrap()[0],
        SurfaceCommand::StartInSurface {
            stream_id: crate::StreamId("stream-42".to_string()),
            duration: Some(300),
        }
    );
    assert_eq!(*harness.platform.overlays.lock().unwrap(), vec![TAB]);
    assert!(state(&harness.handle).await.is_recording);
}

/// WHAT: A second start is refused without touching the session
/// WHY: Only one recording may be active at a time
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_starting_again_then_already_recording() {
    // Given: A recording started at t=0
    let harness = spawn_default();
    start(&harness.handle).await;
    tokio::time::advance(Duration::from_secs(3)).await;

    // When: Starting again
    let response = start(&harness.handle).await;

    // Then: Refused; no second stream requested and timing kept
    assert_eq!(
        response,
        CommandResponse::failed("Recording is already in progress")
    );
    assert_eq!(harness.platform.stream_requests.lock().unwrap().len(), 1);
    assert_eq!(state(&harness.handle).await.elapsed_time, 3_000);
}

/// WHAT: Start without a focused tab fails before any capture work
/// WHY: Nothing should be created when there is nothing to record
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_no_active_tab_when_starting_then_fails_and_stays_idle() {
    // Given: No focused tab
    let harness = spawn_with(
        FakePlatform::default(),
        FakeSurface::completing,
        CoordinatorSettings::default(),
    );

    // When: Starting
    let response = start(&harness.handle).await;

    // Then: The operator sees the reason; no surface exists
    assert_eq!(response, CommandResponse::failed("No active tab found"));
    assert_eq!(state(&harness.handle).await, StateSnapshot::IDLE);
    assert_eq!(*harness.surface.ensured.lock().unwrap(), 0);
}

/// WHAT: A refused stream handle fails start with the platform's reason
/// WHY: Capture may be denied on restricted pages
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stream_refused_when_starting_then_capture_unavailable() {
    // Given: A platform that refuses stream handles
    let platform = FakePlatform {
        refuse_stream: true,
        ..FakePlatform::with_tab(TAB)
    };
    let harness = spawn_with(platform, FakeSurface::completing, CoordinatorSettings::default());

    // When: Starting
    let response = start(&harness.handle).await;

    // Then: Failed, idle, no surface
    assert_eq!(
        response,
        CommandResponse::failed("Capture unavailable: tab capture denied")
    );
    assert_eq!(state(&harness.handle).await, StateSnapshot::IDLE);
    assert_eq!(*harness.surface.ensured.lock().unwrap(), 0);
}

/// WHAT: A surface that cannot open the stream rolls the session back
/// WHY: No completion report follows a failed start
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_surface_start_fails_when_starting_then_rolled_back_to_idle() {
    // Given: A surface whose start fails
    let harness = spawn_with(
        FakePlatform::with_tab(TAB),
        |_| FakeSurface {
            fail_start: true,
            ..FakeSurface::default()
        },
        CoordinatorSettings::default(),
    );
    let mut updates = harness.handle.subscribe();

    // When: Starting
    let response = start(&harness.handle).await;

    // Then: Failed, idle again, and listeners saw both transitions
    assert_eq!(
        response,
        CommandResponse::failed("Capture unavailable: getUserMedia rejected")
    );
    assert_eq!(state(&harness.handle).await, StateSnapshot::IDLE);
    let UiMessage::StateUpdate { state: first } = updates.recv().await.unwrap();
    let UiMessage::StateUpdate { state: second } = updates.recv().await.unwrap();
    assert!(first.is_recording);
    assert_eq!(second, StateSnapshot::IDLE);
    assert!(harness.platform.overlays.lock().unwrap().is_empty());
}

/// WHAT: Overlay injection failure does not abort the recording
/// WHY: The popup still offers full control
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_overlay_refused_when_starting_then_recording_continues() {
    // Given: A page that cannot be scripted
    let platform = FakePlatform {
        refuse_overlay: true,
        ..FakePlatform::with_tab(TAB)
    };
    let harness = spawn_with(platform, FakeSurface::completing, CoordinatorSettings::default());

    // When: Starting
    let response = start(&harness.handle).await;

    // Then: Success
    assert_eq!(response, CommandResponse::ok());
    assert!(state(&harness.handle).await.is_recording);
}

/// WHAT: Stop waits for the surface report before going idle
/// WHY: Idle must mean the file has been handed off
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_stopped_then_idle_after_surface_report() {
    // Given: A running recording
    let harness = spawn_default();
    start(&harness.handle).await;

    // When: Stopping
    let response = harness.handle.send(Command::StopRecording).await.unwrap();

    // Then: Accepted; the surface was told once and the session closes
    assert_eq!(response, CommandResponse::ok());
    eventually(&harness.handle, |s| *s == StateSnapshot::IDLE).await;
    assert_eq!(harness.surface.count(&SurfaceCommand::StopInSurface), 1);
}

/// WHAT: Without a surface report, the stop watchdog forces idle
/// WHY: A crashed surface must not leave the session stuck
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_silent_surface_when_stop_times_out_then_forced_idle() {
    // Given: A surface that never reports, with a 3s stop timeout
    let settings = CoordinatorSettings {
        stop_timeout: Duration::from_secs(3),
        ..CoordinatorSettings::default()
    };
    let harness = spawn_with(FakePlatform::with_tab(TAB), |_| FakeSurface::default(), settings);
    start(&harness.handle).await;
    harness.handle.send(Command::StopRecording).await.unwrap();
    settle().await;
    assert!(state(&harness.handle).await.is_recording);

    // When: The timeout elapses
    tokio::time::advance(Duration::from_secs(3)).await;

    // Then: The session is idle
    eventually(&harness.handle, |s| *s == StateSnapshot::IDLE).await;
}

/// WHAT: A late report from a capture the watchdog gave up on is ignored
/// WHY: It must not close the session that started after the forced idle
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_forced_idle_when_old_capture_reports_late_then_new_session_kept() {
    // Given: Capture 1 forced idle by a 3s watchdog, then capture 2 started
    let settings = CoordinatorSettings {
        stop_timeout: Duration::from_secs(3),
        ..CoordinatorSettings::default()
    };
    let harness = spawn_with(FakePlatform::with_tab(TAB), |_| FakeSurface::default(), settings);
    start(&harness.handle).await;
    harness.handle.send(Command::StopRecording).await.unwrap();
    tokio::time::advance(Duration::from_secs(4)).await;
    eventually(&harness.handle, |s| *s == StateSnapshot::IDLE).await;
    assert_eq!(start(&harness.handle).await, CommandResponse::ok());

    // When: Capture 1 finally reports completion
    harness
        .handle
        .reporter()
        .report(CaptureId(1), SurfaceEvent::SurfaceStopped)
        .await;
    settle().await;

    // Then: Capture 2's session is still recording until its own report
    assert!(state(&harness.handle).await.is_recording);
    harness
        .handle
        .reporter()
        .report(CaptureId(2), SurfaceEvent::SurfaceStopped)
        .await;
    eventually(&harness.handle, |s| *s == StateSnapshot::IDLE).await;
}

/// WHAT: A stop timeout too large to add to the clock disables the watchdog
/// WHY: A huge configured value must not take the coordinator down
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_unbounded_stop_timeout_when_stopping_then_coordinator_keeps_serving() {
    // Given: A silent surface and a stop timeout of Duration::MAX
    let settings = CoordinatorSettings {
        stop_timeout: Duration::MAX,
        ..CoordinatorSettings::default()
    };
    let harness = spawn_with(FakePlatform::with_tab(TAB), |_| FakeSurface::default(), settings);
    start(&harness.handle).await;

    // When: Stopping and letting ticks pass
    let response = harness.handle.send(Command::StopRecording).await.unwrap();
    tokio::time::advance(Duration::from_secs(5)).await;

    // Then: Stop answered, the session waits for the surface, then closes
    assert_eq!(response, CommandResponse::ok());
    assert!(state(&harness.handle).await.is_recording);
    harness
        .handle
        .reporter()
        .report(CaptureId(1), SurfaceEvent::SurfaceStopped)
        .await;
    eventually(&harness.handle, |s| *s == StateSnapshot::IDLE).await;
}

/// WHAT: The duration cap of a real surface ends the session on its own
/// WHY: Timed recordings finish without a Stop from the operator
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_timed_recording_when_cap_reached_then_saved_and_idle() {
    // Given: A coordinator driving an in-process surface
    let (handle, inbox) = CoordinatorHandle::channel();
    let media = Arc::new(FakeMedia::with_chunks(vec![b"webm".to_vec(), b"-tail".to_vec()]));
    let sink = Arc::new(FakeSink::default());
    let surface = LocalSurfaceLink::new(
        Arc::clone(&media) as Arc<dyn MediaSource>,
        Arc::clone(&sink) as Arc<dyn RecordingSink>,
        OpenOptions::default(),
        handle.reporter(),
    );
    let coordinator = Coordinator::new(
        inbox,
        Arc::new(FakePlatform::with_tab(TAB)) as Arc<dyn TabPlatform>,
        Arc::new(surface) as Arc<dyn SurfaceLink>,
        Arc::new(TokioClock),
        CoordinatorSettings::default(),
    );
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(coordinator.run(shutdown_rx));
    let response = handle
        .send(Command::StartRecording {
            mode: CaptureMode::Timed,
            duration: Some(5),
        })
        .await
        .unwrap();
    assert_eq!(response, CommandResponse::ok());

    // When: Five seconds pass with no Stop
    tokio::time::advance(Duration::from_secs(4)).await;
    let before_cap = state(&handle).await;
    tokio::time::advance(Duration::from_secs(1)).await;

    // Then: Idle, with the recording saved once
    assert!(before_cap.is_recording);
    eventually(&handle, |s| *s == StateSnapshot::IDLE).await;
    let saved = sink.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].1, b"webm-tail");
}

/// WHAT: Closing the recorded tab stops the recording
/// WHY: There is nothing left to capture
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recorded_tab_closed_when_notified_then_recording_stops() {
    // Given: A recording of tab 42
    let harness = spawn_default();
    start(&harness.handle).await;

    // When: Another tab closes, then the recorded one
    harness
        .handle
        .notify(CoordinatorEvent::TabRemoved(TabId(7)))
        .await
        .unwrap();
    settle().await;
    let still_recording = state(&harness.handle).await.is_recording;
    harness
        .handle
        .notify(CoordinatorEvent::TabRemoved(TAB))
        .await
        .unwrap();

    // Then: Only the recorded tab's removal stopped the session
    assert!(still_recording);
    eventually(&harness.handle, |s| *s == StateSnapshot::IDLE).await;
    assert_eq!(harness.surface.count(&SurfaceCommand::StopInSurface), 1);
}

/// WHAT: A second pause is a no-op and is not forwarded
/// WHY: Double pause must not disturb the recorder or the timer
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_paused_when_paused_again_then_surface_told_once() {
    // Given: A paused recording
    let harness = spawn_default();
    start(&harness.handle).await;
    harness.handle.send(Command::PauseRecording).await.unwrap();

    // When: Pausing again and resuming twice
    let again = harness.handle.send(Command::PauseRecording).await.unwrap();
    harness.handle.send(Command::ResumeRecording).await.unwrap();
    harness.handle.send(Command::ResumeRecording).await.unwrap();

    // Then: Each instruction reached the surface exactly once
    assert_eq!(again, CommandResponse::ok());
    assert_eq!(harness.surface.count(&SurfaceCommand::PauseInSurface), 1);
    assert_eq!(harness.surface.count(&SurfaceCommand::ResumeInSurface), 1);
    assert!(!state(&harness.handle).await.is_paused);
}

/// WHAT: Commands that do not apply while idle are accepted as no-ops
/// WHY: Stale UIs may send them after the session ended
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_stop_pause_resume_then_no_surface_traffic() {
    // Given: An idle coordinator
    let harness = spawn_default();

    // When: Sending stop, pause, resume and a stray completion
    for command in [
        Command::StopRecording,
        Command::PauseRecording,
        Command::ResumeRecording,
    ] {
        assert_eq!(harness.handle.send(command).await.unwrap(), CommandResponse::ok());
    }
    harness
        .handle
        .reporter()
        .report(CaptureId(1), SurfaceEvent::SurfaceStopped)
        .await;
    settle().await;

    // Then: Still idle and the surface heard nothing
    assert_eq!(state(&harness.handle).await, StateSnapshot::IDLE);
    assert!(harness.surface.commands.lock().unwrap().is_empty());
}

/// WHAT: While recording, the state is re-broadcast every tick
/// WHY: Timers on every surface advance without polling
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_tick_fires_then_state_rebroadcast() {
    // Given: A subscriber and a fresh recording
    let harness = spawn_default();
    let mut updates = harness.handle.subscribe();
    start(&harness.handle).await;
    let UiMessage::StateUpdate { state: started } = updates.recv().await.unwrap();

    // When: One tick interval passes
    tokio::time::advance(Duration::from_secs(1)).await;
    let UiMessage::StateUpdate { state: ticked } = updates.recv().await.unwrap();

    // Then: Same session, one second later
    assert_eq!(started.elapsed_time, 0);
    assert_eq!(
        ticked,
        StateSnapshot {
            is_recording: true,
            is_paused: false,
            elapsed_time: 1_000,
        }
    );
}

/// WHAT: The recorded tab receives every update, including the final idle one
/// WHY: The overlay removes itself only when told the session ended
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_session_when_completed_then_former_tab_told_idle() {
    // Given: A recording that is stopped
    let harness = spawn_default();
    start(&harness.handle).await;
    harness.handle.send(Command::StopRecording).await.unwrap();
    eventually(&harness.handle, |s| *s == StateSnapshot::IDLE).await;

    // When: The delivery task catches up
    settle().await;

    // Then: The tab first saw recording, last saw idle
    let delivered = harness.platform.delivered.lock().unwrap().clone();
    assert!(delivered.iter().all(|(tab, _)| *tab == TAB));
    let UiMessage::StateUpdate { state: first } = delivered.first().unwrap().1;
    let UiMessage::StateUpdate { state: last } = delivered.last().unwrap().1;
    assert!(first.is_recording);
    assert_eq!(last, StateSnapshot::IDLE);
}

/// WHAT: Shutdown ends the loop cleanly
/// WHY: The host stops the coordinator on Ctrl+C
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_running_when_shutdown_signalled_then_run_returns_ok() {
    // Given: A running coordinator
    let harness = spawn_default();

    // When: Signalling shutdown
    harness.shutdown_tx.send(true).unwrap();

    // Then: The task finishes with Ok
    assert!(harness.task.await.unwrap().is_ok());
}

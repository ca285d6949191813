#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::time::Duration;

use common::FakeTransport;
use common::GatedStore;
use common::drain_events;
use common::load_default_config_for_test;
use common::memory_store;
use common::spawn_controller;
use common::wait_for_event;
use edu_core::INITIAL_SUBMIT_ID;
use edu_core::LOGGING_OUT_MESSAGE;
use edu_core::SEARCH_FAILED_MESSAGE;
use edu_core::UiController;
use edu_core::error::UiErr;
use edu_core::forms::NETWORK_ERROR_MESSAGE;
use edu_core::protocol::EventMsg;
use edu_core::protocol::FormId;
use edu_core::protocol::FormRequest;
use edu_core::protocol::FormResponse;
use edu_core::protocol::InputId;
use edu_core::protocol::NotificationKind;
use edu_core::protocol::Op;
use edu_core::protocol::OverlayTicket;
use edu_core::protocol::RemovalReason;
use edu_core::protocol::ResultsPanel;
use edu_core::protocol::SearchResult;
use edu_core::protocol::SubmitControlEvent;
use edu_core::protocol::Theme;
use edu_core::theme::THEME_STORAGE_KEY;
use edu_store::KeyValueStore;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::time::Instant;

fn result(title: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        description: format!("Learn {title}"),
        url: format!("/courses/{}", title.to_lowercase()),
    }
}

fn msgs(events: Vec<edu_core::protocol::Event>) -> Vec<EventMsg> {
    events.into_iter().map(|ev| ev.msg).collect()
}

async fn attach(ctrl: &UiController, input: &InputId) {
    ctrl.submit(Op::AttachSearch {
        input: input.clone(),
        endpoint: "/api/search".to_string(),
    })
    .await
    .unwrap();
}

async fn type_text(ctrl: &UiController, input: &InputId, text: &str) {
    ctrl.submit(Op::SearchInputChanged {
        input: input.clone(),
        text: text.to_string(),
    })
    .await
    .unwrap();
}

fn enroll_form() -> FormRequest {
    FormRequest {
        action: Some("/enroll".to_string()),
        fields: vec![("course_id".to_string(), "7".to_string())],
        submit_label: "Enroll".to_string(),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn first_event_describes_the_session() {
    let home = TempDir::new().unwrap();
    let ctrl = UiController::spawn(
        load_default_config_for_test(&home),
        FakeTransport::new(),
        memory_store(),
    );
    let ev = ctrl.next_event().await.unwrap();
    assert_eq!(ev.id, INITIAL_SUBMIT_ID);
    match ev.msg {
        EventMsg::SessionConfigured(configured) => {
            assert_eq!(configured.base_url, "http://localhost:5000/");
            assert_eq!(configured.theme, Theme::Light);
        }
        other => panic!("unexpected first event {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn search_waits_for_a_quiet_window_and_two_characters() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.on_search("rust", Duration::from_millis(50), vec![result("Rust")]);
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport.clone(),
        memory_store(),
    )
    .await;
    let input = InputId::new("course-search");
    attach(&ctrl, &input).await;

    type_text(&ctrl, &input, "r").await;
    assert_eq!(drain_events(&ctrl, Duration::from_secs(2)).await, Vec::new());
    assert!(transport.queries().is_empty());

    for text in ["ru", "rus", "rust"] {
        type_text(&ctrl, &input, text).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let dispatched = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::SearchDispatched(_))).await;
    let EventMsg::SearchDispatched(dispatched) = dispatched else {
        unreachable!()
    };
    assert_eq!(dispatched.query, "rust");

    let rendered = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::SearchResults(_))).await;
    let EventMsg::SearchResults(rendered) = rendered else {
        unreachable!()
    };
    assert_eq!(rendered.seq, dispatched.seq);
    assert_eq!(rendered.input, input);
    assert_eq!(rendered.panel, ResultsPanel::Results(vec![result("Rust")]));
    assert_eq!(transport.queries(), vec!["rust".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn empty_results_render_placeholder() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport.clone(),
        memory_store(),
    )
    .await;
    let input = InputId::new("q");
    attach(&ctrl, &input).await;
    type_text(&ctrl, &input, "zz").await;

    let rendered = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::SearchResults(_))).await;
    let EventMsg::SearchResults(rendered) = rendered else {
        unreachable!()
    };
    assert_eq!(rendered.panel, ResultsPanel::NoResults);
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_never_replaces_newer_results() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.on_search("slow", Duration::from_secs(2), vec![result("Slow")]);
    transport.on_search("fast", Duration::from_millis(100), vec![result("Fast")]);
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport.clone(),
        memory_store(),
    )
    .await;
    let input = InputId::new("q");
    attach(&ctrl, &input).await;

    type_text(&ctrl, &input, "slow").await;
    wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::SearchDispatched(_))).await;
    type_text(&ctrl, &input, "fast").await;

    let rendered = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::SearchResults(_))).await;
    let EventMsg::SearchResults(rendered) = rendered else {
        unreachable!()
    };
    assert_eq!(rendered.query, "fast");

    // The slow answer lands during this window and must be dropped.
    let late = drain_events(&ctrl, Duration::from_secs(3)).await;
    assert!(
        !late
            .iter()
            .any(|ev| matches!(ev.msg, EventMsg::SearchResults(_))),
        "stale results rendered: {late:?}"
    );
    assert_eq!(transport.queries(), vec!["slow".to_string(), "fast".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn search_failures_are_silent_unless_configured() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.fail_search("boom", "connection refused");
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport.clone(),
        memory_store(),
    )
    .await;
    let input = InputId::new("q");
    attach(&ctrl, &input).await;
    type_text(&ctrl, &input, "boom").await;

    let events = msgs(drain_events(&ctrl, Duration::from_secs(2)).await);
    assert!(matches!(events.as_slice(), [EventMsg::SearchDispatched(_)]), "{events:?}");

    let home = TempDir::new().unwrap();
    let mut config = load_default_config_for_test(&home);
    config.search.notify_on_error = true;
    let ctrl = spawn_controller(config, transport, memory_store()).await;
    attach(&ctrl, &input).await;
    type_text(&ctrl, &input, "boom").await;

    let shown = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::NotificationShown(_))).await;
    let EventMsg::NotificationShown(card) = shown else {
        unreachable!()
    };
    assert_eq!(card.kind, NotificationKind::Danger);
    assert_eq!(card.message, SEARCH_FAILED_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn detached_input_stops_searching() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport.clone(),
        memory_store(),
    )
    .await;
    let input = InputId::new("q");
    attach(&ctrl, &input).await;
    type_text(&ctrl, &input, "rust").await;
    ctrl.submit(Op::DetachSearch {
        input: input.clone(),
    })
    .await
    .unwrap();

    assert_eq!(drain_events(&ctrl, Duration::from_secs(2)).await, Vec::new());
    assert!(transport.queries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn response_from_before_reattach_is_not_rendered() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.on_search("slow", Duration::from_secs(2), vec![result("Slow")]);
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport.clone(),
        memory_store(),
    )
    .await;
    let input = InputId::new("q");
    attach(&ctrl, &input).await;
    type_text(&ctrl, &input, "slow").await;
    wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::SearchDispatched(_))).await;

    ctrl.submit(Op::DetachSearch {
        input: input.clone(),
    })
    .await
    .unwrap();
    attach(&ctrl, &input).await;

    let events = msgs(drain_events(&ctrl, Duration::from_secs(3)).await);
    assert!(
        !events
            .iter()
            .any(|ev| matches!(ev, EventMsg::SearchResults(_))),
        "{events:?}"
    );
    assert_eq!(transport.queries(), vec!["slow".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn unusable_endpoint_reports_search_failure() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    let mut config = load_default_config_for_test(&home);
    config.search.notify_on_error = true;
    let ctrl = spawn_controller(config, transport.clone(), memory_store()).await;
    let input = InputId::new("q");
    ctrl.submit(Op::AttachSearch {
        input: input.clone(),
        endpoint: "http://[::1".to_string(),
    })
    .await
    .unwrap();
    type_text(&ctrl, &input, "rust").await;

    let shown = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::NotificationShown(_))).await;
    let EventMsg::NotificationShown(card) = shown else {
        unreachable!()
    };
    assert_eq!(card.kind, NotificationKind::Danger);
    assert_eq!(card.message, SEARCH_FAILED_MESSAGE);
    assert!(transport.queries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn notification_stack_evicts_oldest_beyond_cap() {
    let home = TempDir::new().unwrap();
    let mut config = load_default_config_for_test(&home);
    config.notifications.max_visible = 2;
    let ctrl = spawn_controller(config, FakeTransport::new(), memory_store()).await;

    for message in ["one", "two", "three"] {
        ctrl.notify(NotificationKind::Info, message).await.unwrap();
    }

    let seen: Vec<String> = msgs(drain_events(&ctrl, Duration::from_millis(100)).await)
        .into_iter()
        .map(|msg| match msg {
            EventMsg::NotificationContainerCreated => "container".to_string(),
            EventMsg::NotificationShown(n) => format!("shown {} {}", n.id, n.message),
            EventMsg::NotificationRemoved { id, reason } => format!("removed {id} {reason:?}"),
            other => format!("{other:?}"),
        })
        .collect();
    assert_eq!(
        seen,
        vec![
            "container",
            "shown 1 one",
            "shown 2 two",
            "removed 1 Evicted",
            "shown 3 three",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn notification_expires_after_its_lifetime() {
    let home = TempDir::new().unwrap();
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        FakeTransport::new(),
        memory_store(),
    )
    .await;

    ctrl.submit(Op::Notify {
        kind: NotificationKind::Warning,
        message: "Heads up".to_string(),
        ttl: Some(Duration::from_secs(1)),
    })
    .await
    .unwrap();
    let shown = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::NotificationShown(_))).await;
    let start = Instant::now();
    let EventMsg::NotificationShown(card) = shown else {
        unreachable!()
    };

    let removed = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::NotificationRemoved { .. })).await;
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(
        removed,
        EventMsg::NotificationRemoved {
            id: card.id,
            reason: RemovalReason::Expired,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn dismissed_card_expiring_later_is_harmless() {
    let home = TempDir::new().unwrap();
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        FakeTransport::new(),
        memory_store(),
    )
    .await;

    ctrl.notify(NotificationKind::Success, "Saved").await.unwrap();
    let shown = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::NotificationShown(_))).await;
    let EventMsg::NotificationShown(card) = shown else {
        unreachable!()
    };

    ctrl.submit(Op::DismissNotification { id: card.id }).await.unwrap();
    let removed = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::NotificationRemoved { .. })).await;
    assert_eq!(
        removed,
        EventMsg::NotificationRemoved {
            id: card.id,
            reason: RemovalReason::Dismissed,
        }
    );

    // The 5s expiry still fires; it must find nothing to remove.
    assert_eq!(drain_events(&ctrl, Duration::from_secs(6)).await, Vec::new());
    ctrl.submit(Op::DismissNotification { id: card.id }).await.unwrap();
    ctrl.submit(Op::ToggleTheme).await.unwrap();
    let next = wait_for_event(&ctrl, |_| true).await;
    assert_eq!(next, EventMsg::ThemeChanged { theme: Theme::Dark });
}

#[tokio::test(start_paused = true)]
async fn rejected_form_shows_server_error_and_restores_control() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.on_form(
        Duration::from_millis(200),
        Ok(FormResponse {
            success: false,
            error: Some("bad data".to_string()),
            ..Default::default()
        }),
    );
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport.clone(),
        memory_store(),
    )
    .await;
    let form = FormId::new("enroll");

    // The control is disabled after the first submit; the second is ignored.
    for _ in 0..2 {
        ctrl.submit(Op::SubmitForm {
            form: form.clone(),
            request: enroll_form(),
        })
        .await
        .unwrap();
    }

    let events = msgs(drain_events(&ctrl, Duration::from_secs(1)).await);
    let controls: Vec<&SubmitControlEvent> = events
        .iter()
        .filter_map(|ev| match ev {
            EventMsg::SubmitControlChanged(c) => Some(c),
            _ => None,
        })
        .collect();
    assert_eq!(
        controls,
        vec![
            &SubmitControlEvent {
                form: form.clone(),
                label: "Processing...".to_string(),
                disabled: true,
            },
            &SubmitControlEvent {
                form: form.clone(),
                label: "Enroll".to_string(),
                disabled: false,
            },
        ]
    );
    let cards: Vec<(NotificationKind, String)> = events
        .iter()
        .filter_map(|ev| match ev {
            EventMsg::NotificationShown(n) => Some((n.kind, n.message.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(cards, vec![(NotificationKind::Danger, "bad data".to_string())]);
    assert!(!events.iter().any(|ev| matches!(ev, EventMsg::Navigate { .. })));
    assert_eq!(transport.form_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn successful_form_redirects_after_delay() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.on_form(
        Duration::ZERO,
        Ok(FormResponse {
            success: true,
            message: Some("Enrolled".to_string()),
            redirect: Some("/x".to_string()),
            ..Default::default()
        }),
    );
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport,
        memory_store(),
    )
    .await;
    ctrl.submit(Op::SubmitForm {
        form: FormId::new("enroll"),
        request: enroll_form(),
    })
    .await
    .unwrap();

    let shown = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::NotificationShown(_))).await;
    let start = Instant::now();
    let EventMsg::NotificationShown(card) = shown else {
        unreachable!()
    };
    assert_eq!(card.kind, NotificationKind::Success);
    assert_eq!(card.message, "Enrolled");

    let early = msgs(drain_events(&ctrl, Duration::from_millis(900)).await);
    assert!(!early.iter().any(|ev| matches!(ev, EventMsg::Navigate { .. })));

    let navigate = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::Navigate { .. })).await;
    assert!(start.elapsed() >= Duration::from_millis(1000));
    assert_eq!(
        navigate,
        EventMsg::Navigate {
            url: "/x".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn unreachable_server_reports_network_error() {
    let home = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.on_form(Duration::ZERO, Err("connection refused".to_string()));
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        transport,
        memory_store(),
    )
    .await;
    let form = FormId::new("profile");
    ctrl.submit(Op::SubmitForm {
        form: form.clone(),
        request: FormRequest {
            submit_label: "Save".to_string(),
            ..Default::default()
        },
    })
    .await
    .unwrap();

    let shown = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::NotificationShown(_))).await;
    let EventMsg::NotificationShown(card) = shown else {
        unreachable!()
    };
    assert_eq!(card.message, NETWORK_ERROR_MESSAGE);

    let restored = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::SubmitControlChanged(_))).await;
    assert_eq!(
        restored,
        EventMsg::SubmitControlChanged(SubmitControlEvent {
            form,
            label: "Save".to_string(),
            disabled: false,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn overlay_tickets_nest_and_stray_hides_are_ignored() {
    let home = TempDir::new().unwrap();
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        FakeTransport::new(),
        memory_store(),
    )
    .await;

    ctrl.hide_overlay(OverlayTicket(42)).await.unwrap();
    assert_eq!(drain_events(&ctrl, Duration::from_millis(100)).await, Vec::new());

    let outer = ctrl.show_overlay(None).await.unwrap();
    let inner = ctrl.show_overlay(Some("Saving...".to_string())).await.unwrap();
    ctrl.hide_overlay(inner).await.unwrap();
    ctrl.hide_overlay(outer).await.unwrap();
    ctrl.hide_overlay(outer).await.unwrap();

    let events = msgs(drain_events(&ctrl, Duration::from_millis(100)).await);
    assert_eq!(
        events,
        vec![
            EventMsg::OverlayShown {
                message: "Loading...".to_string()
            },
            EventMsg::OverlayShown {
                message: "Saving...".to_string()
            },
            EventMsg::OverlayShown {
                message: "Loading...".to_string()
            },
            EventMsg::OverlayHidden,
        ]
    );

    ctrl.show_overlay(None).await.unwrap();
    ctrl.show_overlay(None).await.unwrap();
    ctrl.submit(Op::HideAllOverlays).await.unwrap();
    let events = msgs(drain_events(&ctrl, Duration::from_millis(100)).await);
    assert_eq!(
        events,
        vec![
            EventMsg::OverlayShown {
                message: "Loading...".to_string()
            },
            EventMsg::OverlayHidden,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn theme_toggle_is_persisted_and_restored() {
    let home = TempDir::new().unwrap();
    let store = memory_store();
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        FakeTransport::new(),
        store.clone(),
    )
    .await;

    ctrl.submit(Op::ToggleTheme).await.unwrap();
    let changed = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::ThemeChanged { .. })).await;
    assert_eq!(changed, EventMsg::ThemeChanged { theme: Theme::Dark });
    assert_eq!(store.get(THEME_STORAGE_KEY).unwrap().as_deref(), Some("dark"));

    let reopened = UiController::spawn(
        load_default_config_for_test(&home),
        FakeTransport::new(),
        store,
    );
    let configured = wait_for_event(&reopened, |ev| matches!(ev, EventMsg::SessionConfigured(_))).await;
    let EventMsg::SessionConfigured(configured) = configured else {
        unreachable!()
    };
    assert_eq!(configured.theme, Theme::Dark);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_theme_write_does_not_stall_the_controller() {
    let home = TempDir::new().unwrap();
    let (store, release) = GatedStore::new();
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        FakeTransport::new(),
        store.clone(),
    )
    .await;

    ctrl.submit(Op::ToggleTheme).await.unwrap();
    ctrl.notify(NotificationKind::Info, "still here").await.unwrap();
    let first = tokio::time::timeout(
        Duration::from_secs(5),
        wait_for_event(&ctrl, |ev| {
            matches!(
                ev,
                EventMsg::NotificationShown(_) | EventMsg::ThemeChanged { .. }
            )
        }),
    )
    .await
    .expect("controller stalled behind the theme write");
    assert!(matches!(first, EventMsg::NotificationShown(_)), "{first:?}");

    release.send(()).unwrap();
    let changed = wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::ThemeChanged { .. })).await;
    assert_eq!(changed, EventMsg::ThemeChanged { theme: Theme::Dark });
    assert_eq!(store.get(THEME_STORAGE_KEY).unwrap().as_deref(), Some("dark"));
}

#[tokio::test(start_paused = true)]
async fn inactivity_warns_and_declining_logs_out() {
    let home = TempDir::new().unwrap();
    let mut config = load_default_config_for_test(&home);
    config.inactivity.timeout = Duration::from_secs(60);
    let ctrl = spawn_controller(config, FakeTransport::new(), memory_store()).await;
    let start = Instant::now();
    ctrl.submit(Op::SetSession {
        user: "ada".to_string(),
        access_token: Some("token".to_string()),
    })
    .await
    .unwrap();

    tokio::time::sleep(Duration::from_secs(50)).await;
    ctrl.submit(Op::UserActivity).await.unwrap();

    wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::InactivityWarning)).await;
    assert!(start.elapsed() >= Duration::from_secs(110));

    ctrl.submit(Op::InactivityResponse { stay: true }).await.unwrap();
    let again = Instant::now();
    wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::InactivityWarning)).await;
    assert!(again.elapsed() >= Duration::from_secs(60));

    ctrl.submit(Op::InactivityResponse { stay: false }).await.unwrap();
    let events = msgs(drain_events(&ctrl, Duration::from_millis(100)).await);
    assert_eq!(
        events,
        vec![
            EventMsg::SessionCleared,
            EventMsg::OverlayShown {
                message: LOGGING_OUT_MESSAGE.to_string()
            },
            EventMsg::Navigate {
                url: "/logout".to_string()
            },
        ]
    );

    // The watch is stopped once logged out.
    assert_eq!(drain_events(&ctrl, Duration::from_secs(120)).await, Vec::new());
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_controller() {
    let home = TempDir::new().unwrap();
    let ctrl = spawn_controller(
        load_default_config_for_test(&home),
        FakeTransport::new(),
        memory_store(),
    )
    .await;
    ctrl.notify(NotificationKind::Info, "bye").await.unwrap();
    ctrl.submit(Op::Shutdown).await.unwrap();

    wait_for_event(&ctrl, |ev| matches!(ev, EventMsg::ShutdownComplete)).await;
    assert!(matches!(ctrl.next_event().await, Err(UiErr::ControllerStopped)));
    assert!(matches!(
        ctrl.submit(Op::ToggleTheme).await,
        Err(UiErr::ControllerStopped)
    ));
}

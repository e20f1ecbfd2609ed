//! Behavior tests for the dashboard reconciliation point
//!
//! These drive DashboardState through a detached command channel so every
//! outbound command can be observed without a live transport.

use ecosim_monitor_core::{
    ActionField, Command, CommandChannel, ConnectionStatus, DashboardState, LinkEvent,
    LinkRequest, PolicyAction, SettingsStore, Snapshot, StatusCell,
};
use std::sync::mpsc::{self, Receiver};
use tempfile::TempDir;

fn snapshot(step: u64) -> Snapshot {
    Snapshot {
        step,
        gdp: 1000.0 + step as f64,
        real_gdp: 900.0 + step as f64,
        unemployment: 0.08,
        avg_price: 10.5,
        avg_wage: 5.1,
        inflation_rate: 0.01,
        tax_revenue: 90.0,
        govt_cash: 400.0,
        subsistence_failures: 1,
        gini: 0.42,
        action: PolicyAction {
            income_tax: 0.1,
            corp_tax: 0.15,
            ubi: 50.0,
        },
        firms: Vec::new(),
        households: Vec::new(),
    }
}

struct Harness {
    dashboard: DashboardState,
    outbound: Receiver<LinkRequest>,
    status: StatusCell,
    _dir: TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::open(dir.path().join("settings.json")).unwrap();
    let (tx, rx) = mpsc::channel();
    let status = StatusCell::new();
    let commands = CommandChannel::new(tx, status.clone());

    Harness {
        dashboard: DashboardState::new(settings, commands),
        outbound: rx,
        status,
        _dir: dir,
    }
}

impl Harness {
    fn go_online(&mut self) {
        self.status.set(ConnectionStatus::Open);
        self.dashboard
            .handle_event(LinkEvent::Status(ConnectionStatus::Open));
    }

    fn go_offline(&mut self) {
        self.status.set(ConnectionStatus::Closed);
        self.dashboard
            .handle_event(LinkEvent::Status(ConnectionStatus::Closed));
    }

    fn sent(&self) -> Vec<Command> {
        self.outbound
            .try_iter()
            .map(|request| match request {
                LinkRequest::Send(command) => command,
                other => panic!("unexpected link request {other:?}"),
            })
            .collect()
    }
}

#[test]
fn test_frames_replace_current_and_extend_history() {
    let mut h = harness();
    h.go_online();

    h.dashboard
        .handle_event(LinkEvent::Frame(Box::new(snapshot(1))));
    h.dashboard
        .handle_event(LinkEvent::Frame(Box::new(snapshot(2))));

    assert_eq!(h.dashboard.current_snapshot().unwrap().step, 2);
    assert_eq!(h.dashboard.history().len(), 2);
}

#[test]
fn test_reset_clears_locally_regardless_of_connection() {
    let mut h = harness();
    h.go_online();
    assert!(h.dashboard.start());
    for step in 1..=5 {
        h.dashboard
            .handle_event(LinkEvent::Frame(Box::new(snapshot(step))));
    }

    h.go_offline();
    h.dashboard.reset();

    assert_eq!(h.dashboard.history().len(), 0);
    assert!(!h.dashboard.is_running());
    // The RESET wire command itself was dropped: only START went out
    assert_eq!(h.sent(), vec![Command::Start]);
    // The frozen last-known snapshot survives the local reset
    assert_eq!(h.dashboard.current_snapshot().unwrap().step, 5);
}

#[test]
fn test_toggle_into_manual_sends_one_complete_action() {
    let mut h = harness();
    h.go_online();

    h.dashboard.set_manual(true).unwrap();

    let sent = h.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], Command::SetManual { value: true });
    match &sent[1] {
        Command::UpdateAction { action } => {
            assert_eq!(action.income_tax, 0.2);
            assert_eq!(action.corp_tax, 0.2);
            assert_eq!(action.ubi, 0.0);
        }
        other => panic!("expected UPDATE_ACTION, got {other:?}"),
    }
}

#[test]
fn test_toggle_out_of_manual_sends_no_action() {
    let mut h = harness();
    h.go_online();
    h.dashboard.set_manual(true).unwrap();
    let _ = h.sent();

    h.dashboard.set_manual(false).unwrap();

    assert_eq!(h.sent(), vec![Command::SetManual { value: false }]);
}

#[test]
fn test_single_field_edit_preserves_the_other_two() {
    let mut h = harness();
    h.go_online();

    h.dashboard.set_action_field(ActionField::Ubi, 250.0).unwrap();

    let expected = PolicyAction {
        income_tax: 0.2,
        corp_tax: 0.2,
        ubi: 250.0,
    };
    assert_eq!(h.dashboard.settings().manual_action(), expected);
    assert_eq!(h.sent(), vec![Command::UpdateAction { action: expected }]);

    // A second edit builds on the merged action, not the defaults
    h.dashboard
        .set_action_field(ActionField::CorpTax, 0.5)
        .unwrap();
    let merged = h.dashboard.settings().manual_action();
    assert_eq!(merged.income_tax, 0.2);
    assert_eq!(merged.corp_tax, 0.5);
    assert_eq!(merged.ubi, 250.0);
}

#[test]
fn test_edited_action_survives_restart() {
    let mut h = harness();
    h.go_online();
    h.dashboard.set_action_field(ActionField::Ubi, 250.0).unwrap();

    let path = h.dashboard.settings().path().to_path_buf();
    let reopened = SettingsStore::open(path).unwrap();
    assert_eq!(reopened.manual_action().ubi, 250.0);
    assert_eq!(reopened.manual_action().income_tax, 0.2);
}

#[test]
fn test_malformed_frame_leaves_state_unchanged() {
    let mut h = harness();
    h.go_online();
    h.dashboard
        .handle_event(LinkEvent::Frame(Box::new(snapshot(1))));

    h.dashboard
        .handle_event(LinkEvent::DecodeError("missing field `gini`".to_string()));

    assert_eq!(h.dashboard.current_snapshot().unwrap().step, 1);
    assert_eq!(h.dashboard.history().len(), 1);
    assert_eq!(h.dashboard.dropped_frames(), 1);
    assert_eq!(h.dashboard.connection_status(), ConnectionStatus::Open);
}

#[test]
fn test_active_action_follows_manual_mode() {
    let mut h = harness();
    h.dashboard
        .handle_event(LinkEvent::Frame(Box::new(snapshot(1))));

    // Auto mode: the agent-reported action from the latest snapshot
    let agent = h.dashboard.active_action();
    assert_eq!(agent.income_tax, 0.1);
    assert_eq!(agent.ubi, 50.0);

    // Manual mode wins even while offline (the toggle persists; only the
    // wire commands are dropped)
    h.dashboard.set_manual(true).unwrap();
    let manual = h.dashboard.active_action();
    assert_eq!(manual.income_tax, 0.2);
    assert_eq!(manual.ubi, 0.0);
    assert!(h.sent().is_empty());
}

#[test]
fn test_start_and_stop_flip_running_only_when_forwarded() {
    let mut h = harness();

    assert!(!h.dashboard.start());
    assert!(!h.dashboard.is_running());
    assert!(h.sent().is_empty());

    h.go_online();
    assert!(h.dashboard.start());
    assert!(h.dashboard.is_running());
    assert!(h.dashboard.stop());
    assert!(!h.dashboard.is_running());
}

#[test]
fn test_set_speed_persists_and_forwards() {
    let mut h = harness();
    h.go_online();

    h.dashboard.set_speed(8.0).unwrap();

    assert_eq!(h.dashboard.settings().speed(), 8.0);
    assert_eq!(h.sent(), vec![Command::SetSpeed { value: 8.0 }]);
}

#[test]
fn test_invalid_speed_is_rejected_without_side_effects() {
    let mut h = harness();
    h.go_online();

    h.dashboard.set_speed(0.0).unwrap();
    h.dashboard.set_speed(-2.0).unwrap();
    h.dashboard.set_speed(f64::NAN).unwrap();

    assert_eq!(h.dashboard.settings().speed(), 1.0);
    assert!(h.sent().is_empty());
}

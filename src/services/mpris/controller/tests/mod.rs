//! Unit tests for the controller state machine.
//!
//! Drives the controller with a recording bus and sink; no D-Bus involved.

#![allow(clippy::panic)]

use std::{cell::RefCell, collections::HashSet, rc::Rc};

use super::*;
use crate::services::mpris::{MetadataValue, UNKNOWN_ARTIST, UNKNOWN_TITLE};

#[derive(Default)]
struct BusLog {
    subscribed: Vec<(PlayerId, Epoch)>,
    commands: Vec<(PlayerId, PlayerCommand)>,
    live_subscriptions: usize,
}

#[derive(Clone, Default)]
struct FakeBus {
    log: Rc<RefCell<BusLog>>,
}

struct FakeSubscription {
    log: Rc<RefCell<BusLog>>,
}

impl Drop for FakeSubscription {
    fn drop(&mut self) {
        self.log.borrow_mut().live_subscriptions -= 1;
    }
}

impl PlayerBus for FakeBus {
    type Subscription = FakeSubscription;

    fn subscribe(&mut self, player_id: &PlayerId, epoch: Epoch) -> Self::Subscription {
        let mut log = self.log.borrow_mut();
        log.subscribed.push((player_id.clone(), epoch));
        log.live_subscriptions += 1;
        FakeSubscription {
            log: Rc::clone(&self.log),
        }
    }

    fn send_command(&mut self, player_id: &PlayerId, command: PlayerCommand) {
        self.log
            .borrow_mut()
            .commands
            .push((player_id.clone(), command));
    }
}

type Sink = Box<dyn FnMut(StatusChange)>;

struct Harness {
    controller: Controller<FakeBus, Sink>,
    emitted: Rc<RefCell<Vec<StatusChange>>>,
    bus: Rc<RefCell<BusLog>>,
}

impl Harness {
    fn new() -> Self {
        let bus = FakeBus::default();
        let log = Rc::clone(&bus.log);
        let emitted = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&emitted);
        let sink: Sink = Box::new(move |change| recorder.borrow_mut().push(change));

        Self {
            controller: Controller::new(bus, sink, PlayerFilter::default()),
            emitted,
            bus: log,
        }
    }

    fn epoch_of(&self, player_id: &PlayerId) -> Epoch {
        self.bus
            .borrow()
            .subscribed
            .iter()
            .rev()
            .find(|(id, _)| id == player_id)
            .map(|(_, epoch)| *epoch)
            .unwrap_or_else(|| panic!("{player_id} was never subscribed"))
    }

    fn appear(&mut self, player_id: &PlayerId) {
        self.controller
            .handle(ControllerEvent::PlayerAppeared(player_id.clone()));
    }

    fn appear_with(&mut self, player_id: &PlayerId, state: PlaybackState, metadata: RawMetadata) {
        self.appear(player_id);
        let epoch = self.epoch_of(player_id);
        self.controller.handle(ControllerEvent::PlayerSubscribed {
            player_id: player_id.clone(),
            epoch,
            result: Ok(PlayerSnapshot { state, metadata }),
        });
    }

    fn change(&mut self, player_id: &PlayerId, delta: PropertyDelta) {
        let epoch = self.epoch_of(player_id);
        self.controller.handle(ControllerEvent::PropertiesChanged {
            player_id: player_id.clone(),
            epoch,
            delta,
        });
    }

    fn vanish(&mut self, player_id: &PlayerId) {
        self.controller
            .handle(ControllerEvent::PlayerVanished(player_id.clone()));
    }

    fn take_emitted(&self) -> Vec<StatusChange> {
        std::mem::take(&mut *self.emitted.borrow_mut())
    }

    fn assert_invariants(&self) {
        let stack = self.controller.active_stack();
        let unique: HashSet<_> = stack.iter().collect();
        assert_eq!(unique.len(), stack.len(), "duplicate stack entries");

        for player_id in stack {
            assert!(
                self.controller.is_tracking(player_id),
                "{player_id} in stack but untracked"
            );
        }

        assert_eq!(
            self.bus.borrow().live_subscriptions,
            self.controller.tracked_players().count()
        );
    }
}

fn id(name: &str) -> PlayerId {
    PlayerId::from_bus_name(&format!("org.mpris.MediaPlayer2.{name}"))
}

fn song(title: &str, artist: &str) -> RawMetadata {
    RawMetadata {
        title: Some(title.into()),
        artist: Some(artist.into()),
        art_url: None,
    }
}

fn track(title: &str, artist: &str) -> Track {
    Track {
        title: title.to_string(),
        artist: artist.to_string(),
        art_url: None,
    }
}

#[test]
fn appeared_player_is_tracked_but_not_surfaced_until_pulled() {
    let mut h = Harness::new();

    h.appear(&id("a"));

    assert!(h.controller.is_tracking(&id("a")));
    assert_eq!(h.controller.active_player(), None);
    assert!(h.take_emitted().is_empty());
    h.assert_invariants();
}

#[test]
fn initial_pull_surfaces_new_player() {
    let mut h = Harness::new();

    h.appear_with(
        &id("a"),
        PlaybackState::Playing,
        RawMetadata {
            title: Some("Song X".into()),
            artist: Some(vec!["Alice", "Bob"].into()),
            art_url: None,
        },
    );

    assert_eq!(
        h.take_emitted(),
        vec![StatusChange::active(
            id("a"),
            PlaybackState::Playing,
            track("Song X", "Alice, Bob"),
        )]
    );
    assert_eq!(h.controller.active_player(), Some(&id("a")));
}

#[test]
fn irrelevant_names_are_ignored() {
    let mut h = Harness::new();

    h.appear(&PlayerId::from_bus_name("org.freedesktop.Notifications"));
    h.vanish(&PlayerId::from_bus_name("org.freedesktop.Notifications"));

    assert_eq!(h.controller.tracked_players().count(), 0);
    assert!(h.bus.borrow().subscribed.is_empty());
    assert!(h.take_emitted().is_empty());
}

#[test]
fn ignored_patterns_are_not_tracked() {
    let bus = FakeBus::default();
    let sink: Sink = Box::new(|_| {});
    let filter = PlayerFilter::new("org.mpris.MediaPlayer2.", vec!["chromium".to_string()]);
    let mut controller = Controller::new(bus, sink, filter);

    controller.player_appeared(id("chromium.instance42"));
    controller.player_appeared(id("vlc"));

    assert!(!controller.is_tracking(&id("chromium.instance42")));
    assert!(controller.is_tracking(&id("vlc")));
}

#[test]
fn duplicate_appearance_is_idempotent() {
    let mut h = Harness::new();

    h.appear(&id("a"));
    let first_epoch = h.epoch_of(&id("a"));
    h.appear(&id("a"));

    assert_eq!(h.bus.borrow().subscribed.len(), 1);
    assert_eq!(h.epoch_of(&id("a")), first_epoch);
    h.assert_invariants();
}

#[test]
fn property_change_moves_player_to_head() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.appear_with(&id("b"), PlaybackState::Paused, RawMetadata::default());
    h.take_emitted();

    h.change(
        &id("a"),
        PropertyDelta {
            state: Some(PlaybackState::Paused),
            metadata: None,
        },
    );

    assert_eq!(h.controller.active_stack(), &[id("a"), id("b")]);
    assert_eq!(
        h.take_emitted(),
        vec![StatusChange::active(
            id("a"),
            PlaybackState::Paused,
            track("A1", "Alice"),
        )]
    );
    h.assert_invariants();
}

#[test]
fn stopped_player_still_wins_by_recency() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.appear_with(&id("b"), PlaybackState::Paused, song("B1", "Bob"));
    h.take_emitted();

    h.change(
        &id("b"),
        PropertyDelta {
            state: Some(PlaybackState::Stopped),
            metadata: None,
        },
    );

    assert_eq!(h.controller.active_player(), Some(&id("b")));
    assert_eq!(h.take_emitted()[0].state, PlaybackState::Stopped);
}

#[test]
fn partial_delta_keeps_previous_values() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.take_emitted();

    h.change(
        &id("a"),
        PropertyDelta {
            state: None,
            metadata: Some(song("A2", "Alice")),
        },
    );

    assert_eq!(
        h.take_emitted(),
        vec![StatusChange::active(
            id("a"),
            PlaybackState::Playing,
            track("A2", "Alice"),
        )]
    );
}

#[test]
fn removing_non_head_player_emits_nothing() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.appear_with(&id("b"), PlaybackState::Playing, song("B1", "Bob"));
    h.take_emitted();

    h.vanish(&id("a"));

    assert!(h.take_emitted().is_empty());
    assert_eq!(h.controller.active_stack(), &[id("b")]);
    h.assert_invariants();
}

#[test]
fn removing_head_promotes_previous_with_cached_state() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.appear_with(&id("b"), PlaybackState::Paused, RawMetadata::default());
    h.take_emitted();

    h.vanish(&id("b"));

    assert_eq!(
        h.take_emitted(),
        vec![StatusChange::active(
            id("a"),
            PlaybackState::Playing,
            track("A1", "Alice"),
        )]
    );
    assert_eq!(h.controller.active_stack(), &[id("a")]);
    h.assert_invariants();
}

#[test]
fn removing_last_player_emits_idle_once() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.take_emitted();

    h.vanish(&id("a"));
    h.vanish(&id("a"));

    assert_eq!(h.take_emitted(), vec![StatusChange::idle()]);
    assert_eq!(h.controller.current_status(), StatusChange::idle());
    h.assert_invariants();
}

#[test]
fn removing_unsurfaced_player_emits_nothing() {
    let mut h = Harness::new();
    h.appear(&id("a"));

    h.vanish(&id("a"));

    assert!(h.take_emitted().is_empty());
    assert!(!h.controller.is_tracking(&id("a")));
    h.assert_invariants();
}

#[test]
fn failed_subscription_untracks_player_silently() {
    let mut h = Harness::new();
    h.appear(&id("a"));
    let epoch = h.epoch_of(&id("a"));

    h.controller.handle(ControllerEvent::PlayerSubscribed {
        player_id: id("a"),
        epoch,
        result: Err(MediaError::SubscriptionFailed {
            player: id("a"),
            details: "name has no owner".to_string(),
        }),
    });

    assert!(!h.controller.is_tracking(&id("a")));
    assert!(h.take_emitted().is_empty());
    h.assert_invariants();
}

#[test]
fn changes_for_untracked_players_are_discarded() {
    let mut h = Harness::new();

    h.controller.handle(ControllerEvent::PropertiesChanged {
        player_id: id("ghost"),
        epoch: Epoch::FIRST,
        delta: PropertyDelta {
            state: Some(PlaybackState::Playing),
            metadata: None,
        },
    });

    assert!(h.take_emitted().is_empty());
    assert!(h.controller.active_stack().is_empty());
}

#[test]
fn completions_from_an_earlier_subscription_are_discarded() {
    let mut h = Harness::new();
    h.appear(&id("a"));
    let old_epoch = h.epoch_of(&id("a"));
    h.vanish(&id("a"));
    h.appear(&id("a"));

    h.controller.handle(ControllerEvent::PlayerSubscribed {
        player_id: id("a"),
        epoch: old_epoch,
        result: Ok(PlayerSnapshot {
            state: PlaybackState::Playing,
            metadata: song("Old", "Stale"),
        }),
    });

    assert!(h.take_emitted().is_empty());
    assert!(h.controller.is_tracking(&id("a")));
    assert_ne!(h.epoch_of(&id("a")), old_epoch);
}

#[test]
fn commands_go_to_the_head() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.appear_with(&id("b"), PlaybackState::Paused, song("B1", "Bob"));

    h.controller.toggle_play_pause();
    h.controller.skip_next();
    h.controller.skip_previous();
    h.controller.stop();

    assert_eq!(
        h.bus.borrow().commands,
        vec![
            (id("b"), PlayerCommand::PlayPause),
            (id("b"), PlayerCommand::Next),
            (id("b"), PlayerCommand::Previous),
            (id("b"), PlayerCommand::Stop),
        ]
    );
}

#[test]
fn commands_without_active_player_are_no_ops() {
    let mut h = Harness::new();
    h.appear(&id("a"));

    h.controller.handle(ControllerEvent::Command(PlayerCommand::Next));

    assert!(h.bus.borrow().commands.is_empty());
    assert!(h.take_emitted().is_empty());
}

#[test]
fn command_failure_changes_nothing() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.take_emitted();
    let before = h.controller.current_status();

    h.controller.handle(ControllerEvent::CommandFinished {
        player_id: id("a"),
        command: PlayerCommand::Next,
        result: Err(MediaError::ControlFailed {
            player: id("a"),
            command: PlayerCommand::Next,
            details: "NotSupported".to_string(),
        }),
    });

    assert!(h.take_emitted().is_empty());
    assert_eq!(h.controller.current_status(), before);
}

#[test]
fn shutdown_releases_subscriptions_and_ignores_late_events() {
    let mut h = Harness::new();
    h.appear_with(&id("a"), PlaybackState::Playing, song("A1", "Alice"));
    h.appear(&id("b"));
    let epoch_b = h.epoch_of(&id("b"));
    h.take_emitted();

    h.controller.handle(ControllerEvent::Shutdown);

    assert!(!h.controller.is_alive());
    assert_eq!(h.bus.borrow().live_subscriptions, 0);
    assert_eq!(h.controller.tracked_players().count(), 0);

    h.controller.handle(ControllerEvent::PlayerSubscribed {
        player_id: id("b"),
        epoch: epoch_b,
        result: Ok(PlayerSnapshot::default()),
    });
    h.controller
        .handle(ControllerEvent::PlayerAppeared(id("c")));
    h.controller
        .handle(ControllerEvent::Command(PlayerCommand::PlayPause));

    assert!(h.take_emitted().is_empty());
    assert_eq!(h.bus.borrow().subscribed.len(), 2);
    assert!(h.bus.borrow().commands.is_empty());
}

#[test]
fn surfaced_track_never_leaks_missing_fields() {
    let mut h = Harness::new();

    h.appear_with(
        &id("a"),
        PlaybackState::Paused,
        RawMetadata {
            title: Some(MetadataValue::Unsupported),
            artist: Some(MetadataValue::List(Vec::new())),
            art_url: Some("".into()),
        },
    );

    let emitted = h.take_emitted();
    let track = emitted[0].track.clone().unwrap_or_else(|| panic!("no track"));
    assert_eq!(track.title, UNKNOWN_TITLE);
    assert_eq!(track.artist, UNKNOWN_ARTIST);
    assert_eq!(track.art_url, None);
}

#[test]
fn tracked_set_matches_appeared_minus_vanished() {
    let mut h = Harness::new();
    let names = ["a", "b", "c", "d"];
    let script: &[(bool, usize)] = &[
        (true, 0),
        (true, 1),
        (true, 2),
        (false, 1),
        (true, 3),
        (false, 0),
        (true, 1),
        (false, 3),
    ];

    let mut expected = HashSet::new();
    for &(appear, index) in script {
        let player_id = id(names[index]);
        if appear {
            h.appear_with(&player_id, PlaybackState::Playing, RawMetadata::default());
            expected.insert(player_id);
        } else {
            h.vanish(&player_id);
            expected.remove(&player_id);
        }

        let tracked: HashSet<_> = h.controller.tracked_players().cloned().collect();
        assert_eq!(tracked, expected);
        h.assert_invariants();
    }
}

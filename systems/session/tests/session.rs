use tillage_core::{
    CellCoord, ChangeReason, Crop, CropKind, Event, InputEvent, Key, PlayerPosition,
};
use tillage_system_save::{MemoryStore, SaveError, SaveStore};
use tillage_system_session::{Session, SessionError};
use tillage_world::{query, PlantTable, World};

#[derive(Debug, PartialEq, Eq)]
struct Observed {
    position: PlayerPosition,
    grid: String,
    plants: PlantTable,
}

fn observe(session: &Session) -> Observed {
    let world = session.world();
    Observed {
        position: query::player_position(world),
        grid: query::grid(world).serialize(),
        plants: query::plants(world).clone(),
    }
}

fn session(seed: u64) -> Session {
    Session::new(
        World::with_seed(6, seed),
        Crop::new(CropKind::new("A"), 0, 0),
    )
}

fn press(session: &mut Session, key: Key) -> Vec<Event> {
    let mut events = Vec::new();
    session
        .handle_input(InputEvent::Key(key), &mut events)
        .expect("key input succeeds");
    events
}

fn click(session: &mut Session, column: u32, row: u32) -> Vec<Event> {
    let mut events = Vec::new();
    session
        .handle_input(InputEvent::Click(CellCoord::new(column, row)), &mut events)
        .expect("click input succeeds");
    events
}

const EXECUTED: Event = Event::StateChanged {
    reason: ChangeReason::Executed,
};

#[test]
fn sow_reap_and_undo_reap_through_clicks() {
    let mut session = session(1);
    let _ = press(&mut session, Key::ArrowRight);
    let _ = press(&mut session, Key::ArrowDown);
    let cell = CellCoord::new(2, 2);

    assert_eq!(click(&mut session, 2, 2), vec![EXECUTED]);
    assert!(query::cell(session.world(), cell).expect("in bounds").sown);
    let plant = query::plant_at(session.world(), cell)
        .cloned()
        .expect("plant sown");
    assert_eq!(plant.growth_stage(), 0);
    assert_eq!(plant.kind().as_str(), "A");

    assert_eq!(click(&mut session, 2, 2), vec![EXECUTED]);
    assert!(!query::cell(session.world(), cell).expect("in bounds").sown);
    assert!(query::plant_at(session.world(), cell).is_none());

    let mut events = Vec::new();
    assert!(session.undo(&mut events).expect("undo"));
    assert_eq!(
        events,
        vec![Event::StateChanged {
            reason: ChangeReason::Undone
        }]
    );
    assert!(query::cell(session.world(), cell).expect("in bounds").sown);
    assert_eq!(query::plant_at(session.world(), cell), Some(&plant));
}

#[test]
fn move_off_the_grid_is_silently_ignored() {
    let mut session = session(2);
    let before = observe(&session);

    let events = press(&mut session, Key::ArrowLeft);
    assert!(events.is_empty(), "rejected move must not signal a change");
    assert_eq!(observe(&session), before);
    assert_eq!(session.history().undo_len(), 0);

    let events = press(&mut session, Key::ArrowUp);
    assert!(events.is_empty());
    assert_eq!(session.history().undo_len(), 0);
}

#[test]
fn clicks_out_of_reach_are_ignored() {
    let mut session = session(3);
    let before = observe(&session);
    assert!(click(&mut session, 4, 4).is_empty());
    assert_eq!(observe(&session), before);
    assert_eq!(session.history().undo_len(), 0);
}

#[test]
fn empty_undo_and_redo_emit_nothing() {
    let mut session = session(4);
    let mut events = Vec::new();
    assert!(!session.undo(&mut events).expect("undo"));
    assert!(!session.redo(&mut events).expect("redo"));
    assert!(events.is_empty());
}

#[test]
fn fresh_input_clears_redo() {
    let mut session = session(5);
    let _ = press(&mut session, Key::Enter);
    let _ = press(&mut session, Key::ArrowRight);

    let mut events = Vec::new();
    assert!(session.undo(&mut events).expect("undo"));
    assert_eq!(session.history().redo_len(), 1);

    let _ = press(&mut session, Key::ArrowDown);
    assert_eq!(session.history().redo_len(), 0);

    events.clear();
    assert!(!session.redo(&mut events).expect("redo"));
    assert!(events.is_empty());
}

#[test]
fn redo_replays_the_same_turn() {
    let mut session = session(6);
    let _ = press(&mut session, Key::Enter);
    let after_turn = observe(&session);

    let mut events = Vec::new();
    for _ in 0..5 {
        assert!(session.undo(&mut events).expect("undo"));
        assert!(session.redo(&mut events).expect("redo"));
        assert_eq!(observe(&session), after_turn);
    }
    assert_eq!(events.len(), 10);
    assert_eq!(
        events.last(),
        Some(&Event::StateChanged {
            reason: ChangeReason::Redone
        })
    );
}

#[test]
fn load_restores_saved_state_and_empties_history() {
    let mut session = session(7);
    let mut store = MemoryStore::new();
    let _ = press(&mut session, Key::ArrowRight);
    let _ = click(&mut session, 1, 1);
    let _ = press(&mut session, Key::Enter);

    let _ = session.save(&mut store, "s1").expect("save succeeds");
    let saved = observe(&session);

    let _ = press(&mut session, Key::ArrowDown);
    let _ = press(&mut session, Key::Enter);
    let _ = click(&mut session, 0, 2);
    assert_ne!(observe(&session), saved);

    let mut events = Vec::new();
    session.load(&store, "s1", &mut events).expect("load succeeds");
    assert_eq!(
        events,
        vec![Event::StateChanged {
            reason: ChangeReason::Loaded
        }]
    );
    assert_eq!(observe(&session), saved);
    assert_eq!(session.history().undo_len(), 0);
    assert_eq!(session.history().redo_len(), 0);
}

#[test]
fn loading_absent_key_changes_nothing() {
    let mut session = session(8);
    let store = MemoryStore::new();
    let _ = press(&mut session, Key::ArrowRight);
    let before = observe(&session);

    let mut events = Vec::new();
    let error = session
        .load(&store, "missing", &mut events)
        .expect_err("nothing saved");
    assert!(matches!(
        error,
        SessionError::Save(SaveError::SaveKeyAbsent { .. })
    ));
    assert!(events.is_empty());
    assert_eq!(observe(&session), before);
    assert_eq!(session.history().undo_len(), 1, "history survives a failed load");
}

#[test]
fn malformed_save_leaves_state_and_history_untouched() {
    let mut session = session(9);
    let mut store = MemoryStore::new();
    let _ = session.save(&mut store, "s1").expect("save");

    let tampered = store
        .get("s1")
        .expect("saved")
        .replace("\"gridState\":\"", "\"gridState\":\"AAAA");
    store.set("s1", tampered).expect("set");

    let _ = press(&mut session, Key::Enter);
    let before = observe(&session);

    let mut events = Vec::new();
    let error = session
        .load(&store, "s1", &mut events)
        .expect_err("grid snapshot is the wrong length");
    assert!(matches!(error, SessionError::Save(SaveError::World(_))));
    assert!(events.is_empty());
    assert_eq!(observe(&session), before);
    assert_eq!(session.history().undo_len(), 1);
}

#[test]
fn selected_crop_is_used_for_sowing() {
    let mut session = session(10);
    session.select_crop(Crop::new(CropKind::new("tree"), 5, 2));
    let _ = click(&mut session, 1, 0);

    let plant = query::plant_at(session.world(), CellCoord::new(1, 0)).expect("plant sown");
    assert_eq!(plant.kind().as_str(), "tree");
    assert_eq!((plant.min_sun(), plant.min_water()), (5, 2));
    assert_eq!(session.selected_crop().kind.as_str(), "tree");
}

#[test]
fn identical_seeds_and_inputs_replay_identically() {
    let script = [
        InputEvent::Key(Key::ArrowRight),
        InputEvent::Click(CellCoord::new(2, 1)),
        InputEvent::Key(Key::Enter),
        InputEvent::Key(Key::ArrowDown),
        InputEvent::Click(CellCoord::new(1, 1)),
        InputEvent::Key(Key::Enter),
        InputEvent::Click(CellCoord::new(2, 1)),
        InputEvent::Key(Key::Enter),
    ];

    let run = || {
        let mut session = session(11);
        let mut events = Vec::new();
        for input in script {
            session
                .handle_input(input, &mut events)
                .expect("scripted input succeeds");
        }
        (observe(&session), events)
    };

    let (first, first_events) = run();
    let (second, second_events) = run();
    assert_eq!(first, second, "replay diverged");
    assert_eq!(first_events, second_events);
    assert_eq!(first_events.len(), script.len());
}

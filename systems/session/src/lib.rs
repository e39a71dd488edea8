#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session that routes player input into reversible world actions.
//!
//! The [`Session`] owns one [`World`], the undo/redo [`History`] and the crop
//! currently selected for sowing. Adapters feed it [`InputEvent`] values and
//! an output buffer; after every committed mutation the session pushes a
//! single [`Event::StateChanged`] so the adapter can redraw from scratch.

use chrono::Utc;
use thiserror::Error;
use tillage_core::{CellCoord, ChangeReason, Crop, Event, InputEvent, Key};
use tillage_system_history::{Action, History};
use tillage_system_save::{SaveError, SaveFile, SaveStore};
use tillage_world::{query, World, WorldError};
use tracing::{debug, info};

/// Errors surfaced to the adapter driving the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The world rejected an action.
    #[error(transparent)]
    World(#[from] WorldError),
    /// Saving or loading failed.
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// One running game: a world, its action history and the selected crop.
#[derive(Debug)]
pub struct Session {
    world: World,
    history: History,
    crop: Crop,
}

impl Session {
    /// Starts a session over `world` with `crop` selected for sowing.
    #[must_use]
    pub fn new(world: World, crop: Crop) -> Self {
        Self {
            world,
            history: History::new(),
            crop,
        }
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the action history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Crop used by the next sow.
    #[must_use]
    pub fn selected_crop(&self) -> &Crop {
        &self.crop
    }

    /// Chooses the crop used by subsequent sows.
    pub fn select_crop(&mut self, crop: Crop) {
        debug!(crop = %crop.kind, "crop selected");
        self.crop = crop;
    }

    /// Routes a single input event.
    ///
    /// Directional keys move the player, `Enter` advances the turn, and a
    /// click on a cell next to the player sows or reaps it. Moves that would
    /// leave the grid and clicks out of reach are ignored.
    pub fn handle_input(
        &mut self,
        input: InputEvent,
        out: &mut Vec<Event>,
    ) -> Result<(), SessionError> {
        match input {
            InputEvent::Key(key) => self.handle_key(key, out),
            InputEvent::Click(cell) => self.handle_click(cell, out),
        }
    }

    fn handle_key(&mut self, key: Key, out: &mut Vec<Event>) -> Result<(), SessionError> {
        let action = match key.direction() {
            Some(direction) => {
                let (dx, dy) = direction.delta();
                match Action::movement(&self.world, dx, dy) {
                    Some(action) => action,
                    None => {
                        debug!(key = key.identifier(), "move blocked by grid edge");
                        return Ok(());
                    }
                }
            }
            None => Action::advance_turn(&self.world),
        };
        self.perform(action, out)
    }

    fn handle_click(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> Result<(), SessionError> {
        if !query::player(&self.world).is_adjacent(cell) {
            debug!(%cell, "click out of reach");
            return Ok(());
        }

        let action = if query::cell(&self.world, cell)?.sown {
            Action::reap(&self.world, cell)?
        } else {
            Action::sow(&self.world, cell, &self.crop)?
        };
        self.perform(action, out)
    }

    /// Executes a fresh action, discarding anything that could have been redone.
    pub fn perform(&mut self, action: Action, out: &mut Vec<Event>) -> Result<(), SessionError> {
        self.history.record(action, &mut self.world)?;
        out.push(Event::StateChanged {
            reason: ChangeReason::Executed,
        });
        Ok(())
    }

    /// Undoes the newest action. Emits nothing when there is nothing to undo.
    pub fn undo(&mut self, out: &mut Vec<Event>) -> Result<bool, SessionError> {
        let undone = self.history.undo(&mut self.world)?;
        if undone {
            out.push(Event::StateChanged {
                reason: ChangeReason::Undone,
            });
        }
        Ok(undone)
    }

    /// Redoes the newest undone action. Emits nothing when there is nothing to redo.
    pub fn redo(&mut self, out: &mut Vec<Event>) -> Result<bool, SessionError> {
        let redone = self.history.redo(&mut self.world)?;
        if redone {
            out.push(Event::StateChanged {
                reason: ChangeReason::Redone,
            });
        }
        Ok(redone)
    }

    /// Captures the world and writes it to `store` under `key`.
    pub fn save<S>(&self, store: &mut S, key: &str) -> Result<SaveFile, SessionError>
    where
        S: SaveStore + ?Sized,
    {
        let save = SaveFile::capture(&self.world, Utc::now());
        save.persist(store, key)?;
        info!(key, timestamp = %save.timestamp, "game saved");
        Ok(save)
    }

    /// Replaces the world with the save stored under `key`.
    ///
    /// Loading discards the whole action history. When the key is absent or
    /// the save is malformed the world and history are left untouched.
    pub fn load<S>(&mut self, store: &S, key: &str, out: &mut Vec<Event>) -> Result<(), SessionError>
    where
        S: SaveStore + ?Sized,
    {
        let save = SaveFile::fetch(store, key)?;
        save.restore(&mut self.world)?;
        self.history.clear();
        out.push(Event::StateChanged {
            reason: ChangeReason::Loaded,
        });
        info!(key, saved_at = %save.timestamp, "game loaded");
        Ok(())
    }
}

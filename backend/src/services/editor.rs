//! Editor session for one (stream, semester) timetable.
//!
//! The editor owns the in-memory schedule of the selected key. Mutations are
//! checked, applied optimistically, and the full snapshot is handed to the
//! [`SaveQueue`]. When a save fails the optimistic state is discarded and
//! the schedule is reloaded from the store.
//!
//! Cell editing follows a small state machine:
//!
//! ```text
//! Idle ──open_cell──▶ Editing ──submit ok──▶ (saved) Idle
//!                       │  ▲
//!          submit with  │  │ submit again / open_cell
//!            conflict   ▼  │
//!                    ConflictShown
//!
//! Editing / ConflictShown ──cancel──▶ Idle
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::save_queue::{SaveOutcome, SaveQueue};
use crate::api::{Actor, Revision, TimetableKey, TimetableRecord};
use crate::config::GridSettings;
use crate::db::services;
use crate::error::{TimetableError, TimetableResult};
use crate::models::{ClassAssignment, Coordinate, GridCell, Schedule, SlotGrid};
use crate::scheduler::{self, Conflict, ConflictRecord, MoveOutcome};

/// Editing rules shared by all sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub grid: SlotGrid,
    pub max_semester: u32,
    /// Re-check the teacher rule on drag-and-drop moves.
    pub strict_moves: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid: SlotGrid::default(),
            max_semester: 8,
            strict_moves: false,
        }
    }
}

impl EditorSettings {
    pub fn from_grid_settings(settings: &GridSettings) -> TimetableResult<Self> {
        Ok(Self {
            grid: settings.grid()?,
            max_semester: settings.max_semester,
            strict_moves: settings.strict_moves,
        })
    }
}

/// Where the cell editor currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EditorState {
    Idle,
    Editing {
        cell: Coordinate,
        /// Class occupying the cell when it was opened, used as prefill.
        existing: Option<ClassAssignment>,
    },
    ConflictShown {
        cell: Coordinate,
        existing: Option<ClassAssignment>,
        conflict: Conflict,
    },
}

/// Editing session for one timetable.
pub struct TimetableEditor {
    key: TimetableKey,
    queue: SaveQueue,
    settings: Arc<EditorSettings>,
    schedule: Schedule,
    revision: Revision,
    state: EditorState,
}

impl TimetableEditor {
    /// Load the timetable for `key` and start an idle session.
    pub async fn open(
        queue: SaveQueue,
        settings: Arc<EditorSettings>,
        key: TimetableKey,
    ) -> TimetableResult<Self> {
        key.validate(settings.max_semester)?;
        let record = services::load_timetable(queue.repository().as_ref(), &key).await?;
        debug!("Opened editor for {} at revision {}", key, record.revision);
        Ok(Self {
            key,
            queue,
            settings,
            schedule: record.schedule,
            revision: record.revision,
            state: EditorState::Idle,
        })
    }

    pub fn key(&self) -> &TimetableKey {
        &self.key
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Revision of the last snapshot known to be stored.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.settings.grid
    }

    /// One cell per grid coordinate with its current occupant.
    pub fn cells(&self) -> Vec<GridCell> {
        self.settings.grid.cells(&self.schedule)
    }

    /// Whole-schedule audit against the grid.
    pub fn audit(&self) -> Vec<ConflictRecord> {
        scheduler::find_conflicts(&self.schedule, &self.settings.grid)
    }

    /// Dry-run a placement without changing anything.
    pub fn check(
        &self,
        target: &Coordinate,
        candidate: &ClassAssignment,
        origin: Option<&Coordinate>,
    ) -> TimetableResult<()> {
        let target = self.cell(target)?;
        let origin = origin.map(|o| self.cell(o)).transpose()?;
        candidate.validate()?;
        scheduler::check_conflict(
            &self.schedule,
            &target,
            &candidate.normalized(),
            origin.as_ref(),
        )?;
        Ok(())
    }

    /// Grid-checked, trimmed copy of an incoming coordinate.
    fn cell(&self, coordinate: &Coordinate) -> TimetableResult<Coordinate> {
        self.settings.grid.validate(coordinate)?;
        Ok(Coordinate::new(coordinate.day, coordinate.time.as_str()))
    }

    // ==================== Cell editor state machine ====================

    /// Open a cell for editing and return its current class for prefill.
    pub fn open_cell(
        &mut self,
        actor: &Actor,
        cell: Coordinate,
    ) -> TimetableResult<Option<ClassAssignment>> {
        actor.ensure_can_edit()?;
        let cell = self.cell(&cell)?;
        let existing = self.schedule.get(&cell).cloned();
        self.state = EditorState::Editing {
            cell,
            existing: existing.clone(),
        };
        Ok(existing)
    }

    /// Submit the open cell's form.
    ///
    /// On a conflict the state becomes `ConflictShown` and the schedule is
    /// untouched; submitting again re-enters editing.
    pub async fn submit(
        &mut self,
        actor: &Actor,
        candidate: ClassAssignment,
    ) -> TimetableResult<TimetableRecord> {
        actor.ensure_can_edit()?;
        let (cell, existing) = match &self.state {
            EditorState::Idle => return Err(TimetableError::NoActiveEdit),
            EditorState::Editing { cell, existing }
            | EditorState::ConflictShown { cell, existing, .. } => (cell.clone(), existing.clone()),
        };
        self.state = EditorState::Editing {
            cell: cell.clone(),
            existing: existing.clone(),
        };

        candidate.validate()?;
        let candidate = candidate.normalized();
        let origin = existing.as_ref().map(|_| &cell);
        if let Err(conflict) = scheduler::check_conflict(&self.schedule, &cell, &candidate, origin)
        {
            warn!("{}: {} rejected: {}", self.key, cell, conflict);
            self.state = EditorState::ConflictShown {
                cell,
                existing,
                conflict: conflict.clone(),
            };
            return Err(conflict.into());
        }

        let next = scheduler::upsert(&self.schedule, origin, &cell, candidate);
        let result = self.commit(next).await;
        self.state = EditorState::Idle;
        result
    }

    /// Close the cell editor without changes.
    pub fn cancel(&mut self) -> TimetableResult<()> {
        if self.state == EditorState::Idle {
            return Err(TimetableError::NoActiveEdit);
        }
        self.state = EditorState::Idle;
        Ok(())
    }

    // ==================== Direct mutations ====================

    /// Place or edit a class.
    ///
    /// With an `origin`, the class there is vacated first (an edit that
    /// changes cell). Conflicts leave the schedule untouched.
    pub async fn place(
        &mut self,
        actor: &Actor,
        origin: Option<&Coordinate>,
        target: &Coordinate,
        candidate: ClassAssignment,
    ) -> TimetableResult<TimetableRecord> {
        actor.ensure_can_edit()?;
        let target = self.cell(target)?;
        let origin = origin.map(|o| self.cell(o)).transpose()?;
        candidate.validate()?;
        let candidate = candidate.normalized();

        if let Err(conflict) =
            scheduler::check_conflict(&self.schedule, &target, &candidate, origin.as_ref())
        {
            warn!("{}: placement at {} rejected: {}", self.key, target, conflict);
            return Err(conflict.into());
        }

        let next = scheduler::upsert(&self.schedule, origin.as_ref(), &target, candidate);
        self.commit(next).await
    }

    /// Remove the class at `coordinate`. Removing from a free cell is a no-op
    /// and does not write.
    pub async fn remove(
        &mut self,
        actor: &Actor,
        coordinate: &Coordinate,
    ) -> TimetableResult<TimetableRecord> {
        actor.ensure_can_edit()?;
        let coordinate = self.cell(coordinate)?;
        if !self.schedule.is_occupied(&coordinate) {
            debug!("{}: nothing to remove at {}", self.key, coordinate);
            return Ok(self.snapshot());
        }
        let next = scheduler::remove(&self.schedule, &coordinate);
        self.commit(next).await
    }

    /// Drag-and-drop move. Drops onto an occupied cell or from an empty one
    /// are no-ops and do not write.
    pub async fn move_class(
        &mut self,
        actor: &Actor,
        from: &Coordinate,
        to: &Coordinate,
    ) -> TimetableResult<MoveOutcome> {
        actor.ensure_can_edit()?;
        let (from, to) = (self.cell(from)?, self.cell(to)?);

        let next = match scheduler::move_assignment(&self.schedule, &from, &to) {
            MoveOutcome::Moved(next) => next,
            noop => {
                debug!("{}: move {} -> {} ignored: {:?}", self.key, from, to, noop);
                return Ok(noop);
            }
        };

        if self.settings.strict_moves {
            if let Err(conflict) = scheduler::check_move(&self.schedule, &from, &to) {
                warn!("{}: move {} -> {} rejected: {}", self.key, from, to, conflict);
                return Err(conflict.into());
            }
        }

        self.commit(next.clone()).await?;
        Ok(MoveOutcome::Moved(next))
    }

    /// Replace the whole schedule with a generated suggestion.
    ///
    /// Cells are not conflict-checked, but every class must still carry a
    /// subject and a teacher.
    pub async fn apply_suggestion(
        &mut self,
        actor: &Actor,
        suggestion: &Schedule,
    ) -> TimetableResult<TimetableRecord> {
        actor.ensure_can_edit()?;
        for (coordinate, assignment) in suggestion.iter() {
            assignment.validate().map_err(|err| {
                warn!("{}: suggestion rejected at {}: {}", self.key, coordinate, err);
                match err {
                    TimetableError::Validation(reason) => {
                        TimetableError::validation(format!("{}: {}", coordinate, reason))
                    }
                    other => other,
                }
            })?;
        }
        let suggestion = Schedule::from_entries(
            suggestion
                .iter()
                .map(|(coordinate, assignment)| (coordinate, assignment.normalized())),
        );
        let findings = scheduler::find_conflicts(&suggestion, &self.settings.grid);
        if !findings.is_empty() {
            warn!(
                "{}: applying suggestion with {} audit findings",
                self.key,
                findings.len()
            );
        }
        let next = scheduler::apply_suggestion(&self.schedule, &suggestion);
        info!("{}: suggestion applied by {}", self.key, actor.user);
        self.commit(next).await
    }

    /// Discard in-memory state and load the stored timetable.
    pub async fn reload(&mut self) -> TimetableResult<()> {
        let record = services::load_timetable(self.queue.repository().as_ref(), &self.key).await?;
        self.schedule = record.schedule;
        self.revision = record.revision;
        self.state = EditorState::Idle;
        Ok(())
    }

    /// Current in-memory state as a record.
    pub fn snapshot(&self) -> TimetableRecord {
        TimetableRecord {
            key: self.key.clone(),
            checksum: crate::db::schedule_checksum(&self.schedule),
            schedule: self.schedule.clone(),
            revision: self.revision,
            updated_at: None,
        }
    }

    /// Adopt `next` optimistically and persist it.
    async fn commit(&mut self, next: Schedule) -> TimetableResult<TimetableRecord> {
        self.schedule = next;
        match self.queue.save(&self.key, &self.schedule).await {
            Ok(SaveOutcome::Saved(record)) => {
                self.revision = record.revision;
                Ok(record)
            }
            Ok(SaveOutcome::Superseded) => {
                // A newer snapshot of this key will be written instead. It
                // only carries this change when it was built on top of it,
                // so editors sharing a key must not interleave load and save.
                Ok(self.snapshot())
            }
            Err(source) => {
                warn!("{}: save failed, reloading: {}", self.key, source);
                let reloaded = match self.reload().await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("{}: reload after failed save also failed: {}", self.key, e);
                        false
                    }
                };
                Err(TimetableError::SaveFailed { source, reloaded })
            }
        }
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;

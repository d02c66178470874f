//! Ordered view over the live task states of one board.
//!
//! [`StateOrdering`] is the single place where position arithmetic happens.
//! Repository adapters load the ordering under a board-level lock, apply one
//! mutation here, then persist the rows it reports as changed. This keeps the
//! contiguity invariant (live positions are exactly `1..=N`) independent of
//! the storage backend.

use super::{
    BoardId, Conflict, DEFAULT_STATE_CODES, MoveDirection, ReorderDirection, StatePosition,
    TaskActionType, TaskState, TaskStateId, WorkflowDomainError,
};
use chrono::{DateTime, Utc};

/// Which neighbor to resolve relative to a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborDirection {
    /// Closest state with a lower position.
    Previous,
    /// Closest state with a higher position.
    Next,
}

/// Result of inserting a state into an ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInsertion {
    /// The newly created state.
    pub state: TaskState,
    /// Every live state at or above this position moved up by one.
    pub shifted_from: StatePosition,
}

/// Result of removing a state from an ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRemoval {
    /// The removed state, marked deleted.
    pub removed: TaskState,
    /// Every live state above this position moved down by one.
    pub shifted_after: StatePosition,
}

/// Result of swapping a state with its neighbor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSwap {
    /// The state that was asked to move.
    pub moved: TaskState,
    /// The neighbor that took its old position.
    pub displaced: TaskState,
}

/// Where a task should go when it changes state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionTarget {
    /// One step along the ordering.
    Step(MoveDirection),
    /// Straight to the live state carrying this code.
    Code(String),
}

/// A task state change resolved against the current ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    /// State the task leaves.
    pub from: TaskState,
    /// State the task enters.
    pub to: TaskState,
    /// Record type describing the change.
    pub action_type: TaskActionType,
}

/// Live task states of a board sorted by position.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use taskboard::workflow::domain::{BoardId, StateOrdering};
///
/// let mut ordering = StateOrdering::new(BoardId::new(), Vec::new());
/// ordering.append_defaults(Utc::now()).expect("defaults fit an empty board");
///
/// let codes: Vec<&str> = ordering.states().iter().map(|s| s.code()).collect();
/// assert_eq!(codes, ["NEW", "IN_PROGRESS", "REVIEW", "DONE"]);
/// assert_eq!(ordering.max_position(), 4);
/// assert!(ordering.positions_are_contiguous());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateOrdering {
    board_id: BoardId,
    states: Vec<TaskState>,
}

impl StateOrdering {
    /// Builds an ordering, discarding deleted states and states of other
    /// boards.
    #[must_use]
    pub fn new(board_id: BoardId, states: Vec<TaskState>) -> Self {
        let mut live: Vec<TaskState> = states
            .into_iter()
            .filter(|state| !state.is_deleted() && state.board_id() == board_id)
            .collect();
        live.sort_by_key(TaskState::position);
        Self {
            board_id,
            states: live,
        }
    }

    /// Returns the board this ordering describes.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the live states in position order.
    #[must_use]
    pub fn states(&self) -> &[TaskState] {
        &self.states
    }

    /// Consumes the ordering, returning its states.
    #[must_use]
    pub fn into_states(self) -> Vec<TaskState> {
        self.states
    }

    /// Returns the number of live states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` when the board has no live states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the highest live position, or zero for an empty board.
    #[must_use]
    pub fn max_position(&self) -> u32 {
        self.states
            .iter()
            .map(|state| state.position().value())
            .max()
            .unwrap_or(0)
    }

    /// Finds a live state by identifier.
    #[must_use]
    pub fn get(&self, id: TaskStateId) -> Option<&TaskState> {
        self.states.iter().find(|state| state.id() == id)
    }

    /// Finds a live state by code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&TaskState> {
        self.states.iter().find(|state| state.code() == code)
    }

    /// Returns the closest live state strictly before or after `position`.
    #[must_use]
    pub fn neighbor(
        &self,
        position: StatePosition,
        direction: NeighborDirection,
    ) -> Option<&TaskState> {
        match direction {
            NeighborDirection::Previous => self
                .states
                .iter()
                .rev()
                .find(|state| state.position() < position),
            NeighborDirection::Next => self.states.iter().find(|state| state.position() > position),
        }
    }

    /// Resolves where a task sitting in `current` lands for `target`.
    ///
    /// Steps record `MOVED_FORWARD` or `MOVED_BACKWARD`. A jump by code
    /// records the direction implied by the relative positions, or `UPDATED`
    /// when the task already sits in the target.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::StateNotFound`] when `current` is not a
    /// live state of this board, [`WorkflowDomainError::MoveOutOfBounds`] when
    /// a step would leave the ordering, and
    /// [`WorkflowDomainError::StateCodeNotFound`] for unknown codes.
    pub fn resolve_transition(
        &self,
        current: TaskStateId,
        target: &TransitionTarget,
    ) -> Result<StateTransition, WorkflowDomainError> {
        let from = self
            .get(current)
            .ok_or(WorkflowDomainError::StateNotFound(current))?;
        let (to, action_type) = match target {
            TransitionTarget::Step(direction) => {
                let next = self.neighbor(from.position(), direction.neighbor()).ok_or(
                    WorkflowDomainError::MoveOutOfBounds {
                        state_id: current,
                        direction: *direction,
                    },
                )?;
                let step = match direction {
                    MoveDirection::Forward => TaskActionType::MovedForward,
                    MoveDirection::Backward => TaskActionType::MovedBackward,
                };
                (next, step)
            }
            TransitionTarget::Code(code) => {
                let named = self
                    .by_code(code)
                    .ok_or_else(|| WorkflowDomainError::StateCodeNotFound {
                        board_id: self.board_id,
                        code: code.clone(),
                    })?;
                let jump = match named.position().cmp(&from.position()) {
                    std::cmp::Ordering::Greater => TaskActionType::MovedForward,
                    std::cmp::Ordering::Less => TaskActionType::MovedBackward,
                    std::cmp::Ordering::Equal => TaskActionType::Updated,
                };
                (named, jump)
            }
        };
        Ok(StateTransition {
            from: from.clone(),
            to: to.clone(),
            action_type,
        })
    }

    /// Returns `true` when live positions are exactly `1..=len`.
    #[must_use]
    pub fn positions_are_contiguous(&self) -> bool {
        self.states
            .iter()
            .zip(1_u32..)
            .all(|(state, expected)| state.position().value() == expected)
    }

    /// Inserts a new state after `after`, or at the head when `after` is
    /// `None`. Every live state at or above the new position shifts up.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::StateNotFound`] when `after` is not a
    /// live state of this board, or a [`Conflict`] when the name or code is
    /// already used on the board.
    pub fn insert(
        &mut self,
        name: &str,
        code: &str,
        after: Option<TaskStateId>,
        now: DateTime<Utc>,
    ) -> Result<StateInsertion, WorkflowDomainError> {
        let position = match after {
            Some(id) => self
                .get(id)
                .map(|state| state.position().next())
                .ok_or(WorkflowDomainError::StateNotFound(id))?,
            None => StatePosition::FIRST,
        };
        let state = TaskState::new(self.board_id, name, code, position, now)?;
        self.ensure_label_free(state.name(), state.code(), None)?;

        for existing in &mut self.states {
            if existing.position() >= position {
                existing.place_at(existing.position().next(), now);
            }
        }
        self.states.push(state.clone());
        self.states.sort_by_key(TaskState::position);

        Ok(StateInsertion {
            state,
            shifted_from: position,
        })
    }

    /// Appends the default workflow after the current last state.
    ///
    /// Repeated calls keep appending; they fail only because codes collide.
    ///
    /// # Errors
    ///
    /// Returns a [`Conflict`] when a default name or code is already present.
    pub fn append_defaults(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskState>, WorkflowDomainError> {
        let mut position = StatePosition::following(self.max_position());
        let mut created = Vec::with_capacity(DEFAULT_STATE_CODES.len());
        for code in DEFAULT_STATE_CODES {
            let state = TaskState::new(
                self.board_id,
                &TaskState::default_name_for(code),
                code,
                position,
                now,
            )?;
            self.ensure_label_free(state.name(), state.code(), None)?;
            self.states.push(state.clone());
            created.push(state);
            position = position.next();
        }
        Ok(created)
    }

    /// Removes a state and closes the gap it leaves.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::StateNotFound`] when `id` is not a live
    /// state of this board.
    pub fn remove(
        &mut self,
        id: TaskStateId,
        now: DateTime<Utc>,
    ) -> Result<StateRemoval, WorkflowDomainError> {
        let index = self
            .states
            .iter()
            .position(|state| state.id() == id)
            .ok_or(WorkflowDomainError::StateNotFound(id))?;
        let mut removed = self.states.remove(index);
        removed.mark_deleted(now);
        let gap = removed.position();

        for existing in &mut self.states {
            if existing.position() > gap {
                existing.place_at(existing.position().previous(), now);
            }
        }

        Ok(StateRemoval {
            removed,
            shifted_after: gap,
        })
    }

    /// Renames a state and/or changes its code.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::StateNotFound`] for unknown states,
    /// a validation error for malformed values, or a [`Conflict`] when the
    /// new name or code is used by another state of the board.
    pub fn rename(
        &mut self,
        id: TaskStateId,
        name: Option<&str>,
        code: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TaskState, WorkflowDomainError> {
        let new_name = name.map(TaskState::validate_name).transpose()?;
        let new_code = code.map(TaskState::validate_code).transpose()?;
        let current = self
            .get(id)
            .ok_or(WorkflowDomainError::StateNotFound(id))?;
        let candidate_name = new_name.as_deref().unwrap_or_else(|| current.name());
        let candidate_code = new_code.as_deref().unwrap_or_else(|| current.code());
        self.ensure_label_free(candidate_name, candidate_code, Some(id))?;

        let state = self
            .states
            .iter_mut()
            .find(|state| state.id() == id)
            .ok_or(WorkflowDomainError::StateNotFound(id))?;
        state.relabel(new_name, new_code, now);
        Ok(state.clone())
    }

    /// Swaps a state with its neighbor in the given direction.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::StateNotFound`] for unknown states or
    /// [`WorkflowDomainError::ReorderOutOfBounds`] at the first or last
    /// position.
    pub fn reorder(
        &mut self,
        id: TaskStateId,
        direction: ReorderDirection,
        now: DateTime<Utc>,
    ) -> Result<StateSwap, WorkflowDomainError> {
        let current = self
            .get(id)
            .ok_or(WorkflowDomainError::StateNotFound(id))?;
        let from = current.position();
        let neighbor_direction = match direction {
            ReorderDirection::Up => NeighborDirection::Previous,
            ReorderDirection::Down => NeighborDirection::Next,
        };
        let neighbor = self
            .neighbor(from, neighbor_direction)
            .ok_or(WorkflowDomainError::ReorderOutOfBounds {
                state_id: id,
                direction,
            })?;
        let neighbor_id = neighbor.id();
        let to = neighbor.position();

        let mut moved = None;
        let mut displaced = None;
        for state in &mut self.states {
            if state.id() == id {
                state.place_at(to, now);
                moved = Some(state.clone());
            } else if state.id() == neighbor_id {
                state.place_at(from, now);
                displaced = Some(state.clone());
            }
        }
        self.states.sort_by_key(TaskState::position);

        match (moved, displaced) {
            (Some(moved_state), Some(displaced_state)) => Ok(StateSwap {
                moved: moved_state,
                displaced: displaced_state,
            }),
            _ => Err(WorkflowDomainError::StateNotFound(id)),
        }
    }

    fn ensure_label_free(
        &self,
        name: &str,
        code: &str,
        except: Option<TaskStateId>,
    ) -> Result<(), WorkflowDomainError> {
        let others = self
            .states
            .iter()
            .filter(|state| Some(state.id()) != except);
        for other in others {
            if other.name() == name {
                return Err(Conflict::StateName(name.to_owned()).into());
            }
            if other.code() == code {
                return Err(Conflict::StateCode(code.to_owned()).into());
            }
        }
        Ok(())
    }
}

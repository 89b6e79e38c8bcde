//! Session-side board state: what a client holds while the board is open.
//!
//! Every network round-trip is split into a `begin_*` step that validates and
//! applies local changes, and a `finish_*` step that applies the settled
//! result. The async helpers at the bottom drive both steps through
//! [`TaskActions`]; a UI that needs to render the in-flight state can call
//! the steps itself.

use std::collections::VecDeque;

use log::{error, warn};
use thiserror::Error;

use crate::actions::TaskActions;
use crate::board::BoardView;
use crate::error::{ActionResult, ErrorKind};
use crate::models::{Column, Task, TaskInput, TeamMember};

/// Shown instead of the backend error when the initial load fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load the board. Reload the page to try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Error(String),
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardData {
    pub team_members: Vec<TeamMember>,
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogMode {
    Create,
    Edit(Task),
}

/// Task dialog visibility and the task under edit, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDialog {
    pub open: bool,
    pub editing: Option<Task>,
}

impl TaskDialog {
    pub fn mode(&self) -> DialogMode {
        match &self.editing {
            Some(task) => DialogMode::Edit(task.clone()),
            None => DialogMode::Create,
        }
    }
}

/// Follow-up work queued by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace the whole task list with a fresh read.
    Resync,
}

/// The call a `begin_*` step asks the caller to make.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Create(TaskInput),
    Update { id: String, input: TaskInput },
}

#[derive(Debug, Clone, PartialEq)]
enum InFlight {
    Create,
    Update(String),
    Assignee(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("board is not ready")]
    NotReady,
    #[error("another change is still being saved")]
    Busy,
    #[error("task dialog is closed")]
    DialogClosed,
    #[error("task {0} is not on the board")]
    UnknownTask(String),
}

#[derive(Debug, Clone)]
pub struct BoardSession {
    phase: Phase,
    data: BoardData,
    dialog: TaskDialog,
    in_flight: Option<InFlight>,
    last_error: Option<String>,
    effects: VecDeque<Effect>,
}

impl Default for BoardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardSession {
    pub fn new() -> Self {
        BoardSession {
            phase: Phase::Loading,
            data: BoardData::default(),
            dialog: TaskDialog::default(),
            in_flight: None,
            last_error: None,
            effects: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn data(&self) -> &BoardData {
        &self.data
    }

    pub fn dialog(&self) -> &TaskDialog {
        &self.dialog
    }

    /// True while a create, update or assignee change is awaiting the store.
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.data.tasks.iter().find(|t| t.id == id)
    }

    /// The grouped board, rebuilt from the current collections.
    pub fn board(&self) -> BoardView {
        BoardView::build(&self.data.tasks, &self.data.columns)
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.effects.drain(..).collect()
    }

    // ─── LOADING ────────────────────────────────────────────────────────────

    pub fn begin_load(&mut self) {
        self.phase = Phase::Loading;
    }

    pub fn finish_load(&mut self, outcome: Result<BoardData, (ErrorKind, String)>) {
        match outcome {
            Ok(data) => {
                self.data = data;
                self.phase = Phase::Ready;
            }
            Err((kind, message)) => {
                error!("Board load failed ({:?}): {}", kind, message);
                self.phase = Phase::Error(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Apply a fresh task list, replacing whatever optimistic state is held.
    pub fn apply_resync(&mut self, outcome: ActionResult<Vec<Task>>) {
        match outcome.into_result() {
            Ok(tasks) => self.data.tasks = tasks,
            Err((kind, message)) => {
                error!("Task resync failed ({:?}): {}", kind, message);
                self.phase = Phase::Error(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    // ─── DIALOG ─────────────────────────────────────────────────────────────

    pub fn open_create_dialog(&mut self) {
        self.dialog = TaskDialog {
            open: true,
            editing: None,
        };
    }

    pub fn open_edit_dialog(&mut self, task_id: &str) -> Result<(), SessionError> {
        let task = self
            .task(task_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownTask(task_id.to_string()))?;
        self.dialog = TaskDialog {
            open: true,
            editing: Some(task),
        };
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.dialog = TaskDialog::default();
    }

    // ─── WRITES ─────────────────────────────────────────────────────────────

    fn ensure_writable(&self) -> Result<(), SessionError> {
        if self.phase != Phase::Ready {
            return Err(SessionError::NotReady);
        }
        if self.in_flight.is_some() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    /// Start saving the dialog's form. Create-mode yields a create request,
    /// edit-mode an update of the task under edit.
    pub fn begin_submit(&mut self, input: TaskInput) -> Result<Request, SessionError> {
        self.ensure_writable()?;
        if !self.dialog.open {
            return Err(SessionError::DialogClosed);
        }
        let request = match self.dialog.mode() {
            DialogMode::Create => {
                self.in_flight = Some(InFlight::Create);
                Request::Create(input)
            }
            DialogMode::Edit(task) => {
                self.in_flight = Some(InFlight::Update(task.id.clone()));
                Request::Update { id: task.id, input }
            }
        };
        Ok(request)
    }

    pub fn finish_submit(&mut self, outcome: ActionResult<Task>) {
        let in_flight = self.in_flight.take();
        match outcome.into_result() {
            Ok(task) => {
                match in_flight {
                    Some(InFlight::Update(_)) => self.replace_task(task),
                    _ => self.data.tasks.push(task),
                }
                self.last_error = None;
                self.close_dialog();
            }
            Err((_, message)) => {
                warn!("Task save failed: {}", message);
                self.last_error = Some(message);
            }
        }
    }

    /// Optimistically move a task to another member (or to nobody) and
    /// return the update to send. A member missing from the local roster
    /// leaves the task unassigned until the store answers.
    pub fn begin_assignee_change(
        &mut self,
        task_id: &str,
        assignee_id: Option<&str>,
    ) -> Result<Request, SessionError> {
        self.ensure_writable()?;
        let member = assignee_id
            .and_then(|id| self.data.team_members.iter().find(|m| m.id == id))
            .cloned();
        let task = self
            .data
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| SessionError::UnknownTask(task_id.to_string()))?;

        task.assignee = member;
        let input = task.to_input(assignee_id.map(String::from));
        self.in_flight = Some(InFlight::Assignee(task_id.to_string()));
        Ok(Request::Update {
            id: task_id.to_string(),
            input,
        })
    }

    /// Settle an assignee change. Failure keeps the optimistic value and
    /// queues a full resync.
    pub fn finish_assignee_change(&mut self, outcome: ActionResult<Task>) {
        self.in_flight = None;
        match outcome.into_result() {
            Ok(task) => {
                self.replace_task(task);
                self.last_error = None;
            }
            Err((_, message)) => {
                warn!("Assignee change failed, resyncing tasks: {}", message);
                self.last_error = Some(message);
                self.effects.push_back(Effect::Resync);
            }
        }
    }

    fn replace_task(&mut self, task: Task) {
        match self.data.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.data.tasks.push(task),
        }
    }

    // ─── DRIVERS ────────────────────────────────────────────────────────────

    /// Fetch members, columns and tasks together. The first failure wins and
    /// the other results are dropped.
    pub async fn load(&mut self, actions: &TaskActions) {
        self.begin_load();
        let outcome = futures::try_join!(
            async { actions.list_team_members().await.into_result() },
            async { actions.list_columns().await.into_result() },
            async { actions.list_tasks().await.into_result() },
        )
        .map(|(team_members, columns, tasks)| BoardData {
            team_members,
            columns,
            tasks,
        });
        self.finish_load(outcome);
    }

    pub async fn submit(&mut self, actions: &TaskActions, input: TaskInput) -> Result<(), SessionError> {
        let outcome = match self.begin_submit(input)? {
            Request::Create(input) => actions.create_task(input).await,
            Request::Update { id, input } => actions.update_task(&id, input).await,
        };
        self.finish_submit(outcome);
        Ok(())
    }

    pub async fn change_assignee(
        &mut self,
        actions: &TaskActions,
        task_id: &str,
        assignee_id: Option<&str>,
    ) -> Result<(), SessionError> {
        if let Request::Update { id, input } = self.begin_assignee_change(task_id, assignee_id)? {
            let outcome = actions.update_task(&id, input).await;
            self.finish_assignee_change(outcome);
        }
        self.run_effects(actions).await;
        Ok(())
    }

    pub async fn run_effects(&mut self, actions: &TaskActions) {
        for effect in self.take_effects() {
            match effect {
                Effect::Resync => {
                    let outcome = actions.list_tasks().await;
                    self.apply_resync(outcome);
                }
            }
        }
    }
}

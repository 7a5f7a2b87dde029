//! Board state: the notes, their stacking order, and every mutation on them.
//!
//! `Board` is the only owner of the task collection. Each operation mutates
//! the in-memory state, writes the whole collection back to storage, and then
//! tells subscribers what changed so a view can redraw from `snapshot()`.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use crate::error::BoardError;
use crate::geometry::{Point, Rect};
use crate::stacking::{StackOrder, DEFAULT_STACK_CEILING};
use crate::storage::{load_tasks, save_tasks, KeyValueStore};
use crate::task::{NewTask, Task, TaskId};

/// Tilt range for a freshly pinned note, in degrees either side of upright.
pub const PIN_TILT_DEG: f64 = 5.0;
/// Tilt range after a note is dropped somewhere new.
pub const DROP_TILT_DEG: f64 = 10.0;
/// Note size in board pixels.
pub const NOTE_WIDTH: f64 = 256.0;
pub const NOTE_HEIGHT: f64 = 192.0;

/// Uniform tilt in `[-spread, spread)` degrees.
pub fn random_tilt<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    rng.gen_range(-spread..spread)
}

/// Board dimensions and stacking limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSettings {
    pub bounds: Rect,
    pub stack_ceiling: u32,
}

impl Default for BoardSettings {
    fn default() -> Self {
        BoardSettings {
            bounds: Rect::new(0.0, 0.0, 1000.0, 600.0),
            stack_ceiling: DEFAULT_STACK_CEILING,
        }
    }
}

/// What changed, delivered to subscribers after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    Created(TaskId),
    Toggled { id: TaskId, is_done: bool },
    Raised { id: TaskId, rank: u32, renormalized: bool },
    Moved(TaskId),
    Deleted(TaskId),
}

/// Result of letting go of a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// Released over the trash: the note is gone.
    Trashed,
    /// Pinned at a new spot with a fresh tilt.
    Moved { position: Point, rotate: f64 },
}

/// Handle returned by [`Board::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A task together with its current stacking rank.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTask {
    pub task: Task,
    pub rank: u32,
}

type Listener = Box<dyn FnMut(&BoardEvent)>;

pub struct Board<S: KeyValueStore> {
    tasks: Vec<Task>,
    stack: StackOrder,
    store: S,
    settings: BoardSettings,
    rng: StdRng,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> Board<S> {
    /// Load the board from `store`.
    pub fn open(store: S, settings: BoardSettings) -> Self {
        Self::with_rng(store, settings, StdRng::from_entropy())
    }

    /// Load with a fixed seed so tilts and placements are reproducible.
    pub fn open_seeded(store: S, settings: BoardSettings, seed: u64) -> Self {
        Self::with_rng(store, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: S, settings: BoardSettings, mut rng: StdRng) -> Self {
        let tasks = load_tasks(&store, &mut rng);
        let stack = StackOrder::from_ids(tasks.iter().map(|t| &t.id));
        Board {
            tasks,
            stack,
            store,
            settings,
            rng,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tasks in the order they were added.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    pub fn rank(&self, id: &TaskId) -> Option<u32> {
        self.stack.get(id)
    }

    /// Tasks from the back of the stack to the front, i.e. the order to paint them.
    pub fn paint_order(&self) -> Vec<&Task> {
        self.stack
            .back_to_front()
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Owned copy of the board in insertion order, each task with its rank.
    pub fn snapshot(&self) -> Vec<PlacedTask> {
        self.tasks
            .iter()
            .map(|t| PlacedTask {
                task: t.clone(),
                rank: self.stack.get(&t.id).unwrap_or(0),
            })
            .collect()
    }

    /// Register a callback run after every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&BoardEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: &BoardEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    /// Save the collection, then notify. Subscribers hear about the change
    /// even when the write fails, since the in-memory board did change.
    fn commit(&mut self, event: BoardEvent) -> Result<(), BoardError> {
        let saved = save_tasks(&mut self.store, &self.tasks);
        if let Err(e) = &saved {
            error!(error = %e, "failed to save board");
        }
        self.notify(&event);
        Ok(saved?)
    }

    /// Pin a new note at a random spot near the top left of the board.
    pub fn create(&mut self, new: NewTask) -> Result<TaskId, BoardError> {
        let name = new.name.trim();
        if name.is_empty() {
            debug!("rejected task with empty name");
            return Err(BoardError::EmptyName);
        }

        let spot = Point::new(
            self.rng.gen_range(50.0..350.0),
            self.rng.gen_range(50.0..250.0),
        );
        let spot = self.settings.bounds.clamp_origin(spot, (NOTE_WIDTH, NOTE_HEIGHT));
        let task = Task {
            id: TaskId::new(),
            name: name.to_string(),
            is_done: false,
            priority: new.priority,
            deadline: new.deadline,
            description: new.description,
            x: spot.x,
            y: spot.y,
            rotate: random_tilt(&mut self.rng, PIN_TILT_DEG),
        };
        let id = task.id.clone();
        let rank = self.stack.push_top(id.clone());
        info!(id = %id, name = %task.name, rank, "created task");
        self.tasks.push(task);

        self.commit(BoardEvent::Created(id.clone()))?;
        Ok(id)
    }

    /// Flip the completion flag. `Ok(false)` if no such task.
    pub fn toggle_done(&mut self, id: &TaskId) -> Result<bool, BoardError> {
        let Some(task) = self.get_mut(id) else {
            debug!(id = %id, "toggle on unknown task");
            return Ok(false);
        };
        task.is_done = !task.is_done;
        let is_done = task.is_done;
        info!(id = %id, is_done, "toggled task");

        self.commit(BoardEvent::Toggled { id: id.clone(), is_done })?;
        Ok(true)
    }

    /// Pick a note up: bring it in front of every other note.
    /// Returns its new rank, or `None` if no such task.
    pub fn begin_drag(&mut self, id: &TaskId) -> Option<u32> {
        let Some((rank, renormalized)) = self.stack.raise(id, self.settings.stack_ceiling) else {
            debug!(id = %id, "drag on unknown task");
            return None;
        };
        if renormalized {
            debug!(id = %id, count = self.stack.len(), "stack packed down");
        }
        self.notify(&BoardEvent::Raised { id: id.clone(), rank, renormalized });
        Some(rank)
    }

    /// Let go of a note.
    ///
    /// `release` is where the pointer came up and `trash` the trash target as
    /// measured right now; `position` is where the drag left the note. A
    /// release over the trash deletes the note, anything else pins it at
    /// `position` with a new tilt. `Ok(None)` if no such task.
    pub fn end_drag(
        &mut self,
        id: &TaskId,
        release: Point,
        position: Point,
        trash: Rect,
    ) -> Result<Option<DropOutcome>, BoardError> {
        if trash.contains(release) {
            let Some(idx) = self.tasks.iter().position(|t| &t.id == id) else {
                debug!(id = %id, "drop on unknown task");
                return Ok(None);
            };
            let removed = self.tasks.remove(idx);
            self.stack.remove(id);
            info!(id = %id, name = %removed.name, "trashed task");
            self.commit(BoardEvent::Deleted(id.clone()))?;
            return Ok(Some(DropOutcome::Trashed));
        }

        let rotate = random_tilt(&mut self.rng, DROP_TILT_DEG);
        let Some(task) = self.get_mut(id) else {
            debug!(id = %id, "drop on unknown task");
            return Ok(None);
        };
        task.x = position.x;
        task.y = position.y;
        task.rotate = rotate;
        debug!(id = %id, x = position.x, y = position.y, "moved task");

        self.commit(BoardEvent::Moved(id.clone()))?;
        Ok(Some(DropOutcome::Moved { position, rotate }))
    }

    /// Number of open tasks past their deadline.
    pub fn overdue_count(&self) -> usize {
        let now = Utc::now();
        self.tasks.iter().filter(|t| t.is_overdue(now)).count()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::storage::{MemoryStore, TODOS_KEY};

    fn empty_board() -> Board<MemoryStore> {
        Board::open_seeded(MemoryStore::with_entry(TODOS_KEY, "[]"), BoardSettings::default(), 1)
    }

    #[test]
    fn listeners_hear_each_mutation_in_order() {
        let mut board = empty_board();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        board.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let id = board.create(NewTask::new("Pin me")).unwrap();
        board.toggle_done(&id).unwrap();
        board.begin_drag(&id);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], BoardEvent::Created(id.clone()));
        assert_eq!(seen[1], BoardEvent::Toggled { id: id.clone(), is_done: true });
        assert!(matches!(seen[2], BoardEvent::Raised { rank: 2, renormalized: false, .. }));
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let mut board = empty_board();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let sub = board.subscribe(move |_| *sink.borrow_mut() += 1);
        assert!(board.unsubscribe(sub));
        assert!(!board.unsubscribe(sub));
        board.create(NewTask::new("Quiet")).unwrap();
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn rejected_create_does_not_notify_or_save() {
        let mut board = empty_board();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        board.subscribe(move |_| *sink.borrow_mut() += 1);
        assert!(matches!(board.create(NewTask::new("  \t")), Err(BoardError::EmptyName)));
        assert_eq!(*count.borrow(), 0);
        assert_eq!(board.store().raw(TODOS_KEY), Some("[]"));
    }

    #[test]
    fn begin_drag_is_not_persisted() {
        let mut board = empty_board();
        let id = board.create(NewTask::new("One")).unwrap();
        let saved = board.store().raw(TODOS_KEY).map(str::to_string);
        board.begin_drag(&id);
        assert_eq!(board.store().raw(TODOS_KEY).map(str::to_string), saved);
    }

    #[test]
    fn paint_order_tracks_stack() {
        let mut board = empty_board();
        let a = board.create(NewTask::new("A")).unwrap();
        let b = board.create(NewTask::new("B")).unwrap();
        board.begin_drag(&a);
        let names: Vec<&str> = board.paint_order().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(board.rank(&b), Some(2));
    }

    #[test]
    fn created_name_is_trimmed() {
        let mut board = empty_board();
        let id = board.create(NewTask::new("  Essay  ")).unwrap();
        assert_eq!(board.get(&id).map(|t| t.name.as_str()), Some("Essay"));
    }
}

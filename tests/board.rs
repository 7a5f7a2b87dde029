//! Behaviour of the board: create, toggle, raise, drop and persistence.

use chrono::{Local, NaiveDateTime};
use corkboard::board::{Board, BoardSettings, DropOutcome, DROP_TILT_DEG, NOTE_HEIGHT, NOTE_WIDTH, PIN_TILT_DEG};
use corkboard::error::BoardError;
use corkboard::fields::Priority;
use corkboard::geometry::{Point, Rect};
use corkboard::storage::{KeyValueStore, MemoryStore, TODOS_KEY};
use corkboard::task::{parse_deadline_input, NewTask, TaskId};
use rstest::{fixture, rstest};

const TRASH: Rect = Rect { left: 800.0, top: 500.0, width: 120.0, height: 80.0 };

#[fixture]
fn board() -> Board<MemoryStore> {
    Board::open_seeded(MemoryStore::with_entry(TODOS_KEY, "[]"), BoardSettings::default(), 42)
}

fn with_tasks(board: &mut Board<MemoryStore>, names: &[&str]) -> Vec<TaskId> {
    names
        .iter()
        .map(|n| board.create(NewTask::new(*n)).expect("valid task"))
        .collect()
}

fn ranks(board: &Board<MemoryStore>, ids: &[TaskId]) -> Vec<u32> {
    ids.iter().map(|id| board.rank(id).expect("ranked")).collect()
}

#[rstest]
fn essay_example_is_first_on_the_stack(mut board: Board<MemoryStore>) {
    let deadline = parse_deadline_input("2025-06-01T10:00").unwrap();
    let id = board
        .create(NewTask::new("Essay").with_priority(Priority::Highest).with_deadline(deadline))
        .unwrap();

    assert_eq!(board.len(), 1);
    let task = board.get(&id).unwrap();
    assert!(!task.is_done);
    assert_eq!(task.priority.level(), 1);
    let expected = NaiveDateTime::parse_from_str("2025-06-01T10:00", "%Y-%m-%dT%H:%M").unwrap();
    assert_eq!(task.deadline.unwrap().with_timezone(&Local).naive_local(), expected);
    assert_eq!(board.rank(&id), Some(1));
}

#[rstest]
fn create_adds_one_open_task_on_top(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A", "B", "C"]);
    let top_before = ranks(&board, &ids).into_iter().max().unwrap();

    let id = board.create(NewTask::new("D").with_description("details")).unwrap();

    assert_eq!(board.len(), 4);
    let task = board.get(&id).unwrap();
    assert!(!task.is_done);
    assert_eq!(task.description, "details");
    assert!(board.rank(&id).unwrap() > top_before);
}

#[rstest]
fn created_notes_land_on_the_board_with_a_small_tilt(mut board: Board<MemoryStore>) {
    let bounds = board.settings().bounds;
    for i in 0..50 {
        let id = board.create(NewTask::new(format!("note {i}"))).unwrap();
        let t = board.get(&id).unwrap();
        assert!(t.rotate >= -PIN_TILT_DEG && t.rotate < PIN_TILT_DEG, "tilt {}", t.rotate);
        assert!(t.x >= bounds.left && t.x + NOTE_WIDTH <= bounds.right());
        assert!(t.y >= bounds.top && t.y + NOTE_HEIGHT <= bounds.bottom());
    }
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn blank_name_leaves_board_unchanged(mut board: Board<MemoryStore>, #[case] name: &str) {
    with_tasks(&mut board, &["A"]);
    let before = board.snapshot();
    let saved = board.store().raw(TODOS_KEY).map(str::to_string);

    let result = board.create(NewTask::new(name));

    assert!(matches!(result, Err(BoardError::EmptyName)));
    assert_eq!(board.snapshot(), before);
    assert_eq!(board.store().raw(TODOS_KEY).map(str::to_string), saved);
}

#[rstest]
fn toggling_twice_restores_everything(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A", "B"]);
    let before = board.snapshot();

    assert!(board.toggle_done(&ids[0]).unwrap());
    assert!(board.get(&ids[0]).unwrap().is_done);
    assert!(board.toggle_done(&ids[0]).unwrap());

    assert_eq!(board.snapshot(), before);
}

#[rstest]
fn toggle_keeps_place_rotation_and_rank(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A"]);
    let before = board.snapshot().remove(0);
    board.toggle_done(&ids[0]).unwrap();
    let after = board.snapshot().remove(0);
    assert!(after.task.is_done);
    assert_eq!(after.task.position(), before.task.position());
    assert_eq!(after.task.rotate, before.task.rotate);
    assert_eq!(after.rank, before.rank);
}

#[rstest]
fn stale_ids_are_ignored(mut board: Board<MemoryStore>) {
    with_tasks(&mut board, &["A"]);
    let before = board.snapshot();
    let ghost = TaskId::from("no-such-task");

    assert!(!board.toggle_done(&ghost).unwrap());
    assert_eq!(board.begin_drag(&ghost), None);
    assert_eq!(board.end_drag(&ghost, Point::new(10.0, 10.0), Point::new(0.0, 0.0), TRASH).unwrap(), None);
    assert_eq!(
        board.end_drag(&ghost, Point::new(810.0, 510.0), Point::new(0.0, 0.0), TRASH).unwrap(),
        None
    );
    assert_eq!(board.snapshot(), before);
}

#[rstest]
fn raising_a_over_b(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A", "B"]);
    assert_eq!(ranks(&board, &ids), [1, 2]);

    assert_eq!(board.begin_drag(&ids[0]), Some(3));

    assert_eq!(ranks(&board, &ids), [3, 2]);
}

#[rstest]
fn raised_task_is_strictly_in_front(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A", "B", "C", "D"]);
    for pick in [2, 0, 3, 0, 1] {
        board.begin_drag(&ids[pick]);
        let mine = board.rank(&ids[pick]).unwrap();
        for (i, other) in ids.iter().enumerate() {
            if i != pick {
                assert!(board.rank(other).unwrap() < mine);
            }
        }
    }
}

#[rstest]
fn ranks_stay_unique_and_bounded_over_many_drags(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A", "B", "C", "D", "E"]);
    let ceiling = board.settings().stack_ceiling;
    for i in 0..200 {
        board.begin_drag(&ids[(i * 7) % ids.len()]);
        let mut seen = ranks(&board, &ids);
        assert!(seen.iter().all(|r| *r <= ceiling));
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), ids.len());
    }
}

#[rstest]
fn passing_the_ceiling_repacks_in_order() {
    let settings = BoardSettings { stack_ceiling: 6, ..BoardSettings::default() };
    let mut board = Board::open_seeded(MemoryStore::with_entry(TODOS_KEY, "[]"), settings, 9);
    let ids = with_tasks(&mut board, &["A", "B", "C"]);
    board.begin_drag(&ids[1]); // B=4
    board.begin_drag(&ids[0]); // A=5
    board.begin_drag(&ids[1]); // B=6
    assert_eq!(ranks(&board, &ids), [5, 6, 3]);

    board.begin_drag(&ids[2]);

    // C, A, B before; C raised: A and B packed below it, order kept.
    assert_eq!(ranks(&board, &ids), [1, 2, 3]);
}

#[rstest]
fn drop_on_trash_removes_only_that_task(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A", "B", "C"]);
    board.begin_drag(&ids[1]);

    let outcome = board
        .end_drag(&ids[1], Point::new(TRASH.right(), TRASH.top), Point::new(5.0, 5.0), TRASH)
        .unwrap();

    assert_eq!(outcome, Some(DropOutcome::Trashed));
    assert_eq!(board.len(), 2);
    assert!(board.get(&ids[1]).is_none());
    assert!(board.rank(&ids[1]).is_none());
    assert!(board.get(&ids[0]).is_some() && board.get(&ids[2]).is_some());
    let saved = board.store().get(TODOS_KEY).unwrap().unwrap();
    assert!(!saved.contains(ids[1].as_str()));
}

#[rstest]
fn drop_elsewhere_moves_only_that_task(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A", "B", "C"]);
    let others: Vec<Point> = [0, 2].iter().map(|i| board.get(&ids[*i]).unwrap().position()).collect();
    board.begin_drag(&ids[1]);

    let target = Point::new(412.0, 233.5);
    let outcome = board
        .end_drag(&ids[1], Point::new(TRASH.left - 1.0, TRASH.top), target, TRASH)
        .unwrap();

    let Some(DropOutcome::Moved { position, rotate }) = outcome else {
        panic!("expected a move, got {outcome:?}");
    };
    assert_eq!(position, target);
    assert!(rotate >= -DROP_TILT_DEG && rotate < DROP_TILT_DEG);
    let moved = board.get(&ids[1]).unwrap();
    assert_eq!(moved.position(), target);
    assert_eq!(moved.rotate, rotate);
    assert_eq!(board.get(&ids[0]).unwrap().position(), others[0]);
    assert_eq!(board.get(&ids[2]).unwrap().position(), others[1]);
}

#[rstest]
fn completed_tasks_stay_pinned_until_trashed(mut board: Board<MemoryStore>) {
    let ids = with_tasks(&mut board, &["A"]);
    board.toggle_done(&ids[0]).unwrap();
    board.begin_drag(&ids[0]);
    board.end_drag(&ids[0], Point::new(0.0, 0.0), Point::new(20.0, 30.0), TRASH).unwrap();
    let t = board.get(&ids[0]).unwrap();
    assert!(t.is_done);
    assert_eq!(t.position(), Point::new(20.0, 30.0));
}

#[rstest]
fn every_mutation_is_saved_and_reloads_equal(mut board: Board<MemoryStore>) {
    let deadline = parse_deadline_input("2025-06-01T10:00").unwrap();
    let ids = with_tasks(&mut board, &["A", "B"]);
    board
        .create(NewTask::new("C").with_deadline(deadline).with_description("line one\nline two"))
        .unwrap();
    board.toggle_done(&ids[0]).unwrap();
    board.end_drag(&ids[1], Point::new(1.0, 1.0), Point::new(77.0, 88.0), TRASH).unwrap();

    let reopened = Board::open_seeded(board.store().clone(), BoardSettings::default(), 1);

    assert_eq!(reopened.tasks(), board.tasks());
}

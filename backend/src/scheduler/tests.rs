//! Property tests for the scheduling core.
//!
//! Schedules are generated over the default grid with a small pool of
//! teachers so that clashes actually occur.

use proptest::prelude::*;

use super::*;
use crate::models::{ClassAssignment, Coordinate, Day, Schedule, SlotGrid, DEFAULT_TIME_SLOTS};

const TEACHERS: [&str; 4] = ["Dr. A", "Ms. B", "Mr. C", "Dr. D"];
const SUBJECTS: [&str; 4] = ["Physics", "Maths", "Chemistry", "History"];

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (0..Day::WEEKDAYS.len(), 0..DEFAULT_TIME_SLOTS.len())
        .prop_map(|(d, t)| Coordinate::new(Day::WEEKDAYS[d], DEFAULT_TIME_SLOTS[t]))
}

fn assignment() -> impl Strategy<Value = ClassAssignment> {
    (0..SUBJECTS.len(), 0..TEACHERS.len()).prop_map(|(s, t)| ClassAssignment {
        subject: SUBJECTS[s].to_string(),
        teacher: TEACHERS[t].to_string(),
    })
}

fn schedule() -> impl Strategy<Value = Schedule> {
    prop::collection::vec((coordinate(), assignment()), 0..20).prop_map(Schedule::from_entries)
}

proptest! {
    #[test]
    fn prop_add_then_remove_restores_other_entries(
        s in schedule(),
        c in coordinate(),
        x in assignment(),
    ) {
        let result = remove(&upsert(&s, None, &c, x), &c);
        prop_assert!(result.get(&c).is_none());
        prop_assert_eq!(result, remove(&s, &c));
    }

    #[test]
    fn prop_occupied_slot_conflicts_unless_origin(
        s in schedule(),
        c in coordinate(),
        x in assignment(),
        y in assignment(),
    ) {
        // Keep x as the only class of its teacher on that day so the
        // self-slot exception is tested in isolation.
        let mut base = s;
        let same_day: Vec<Coordinate> = base
            .iter()
            .filter(|(k, a)| k.day == c.day && a.teacher == y.teacher)
            .map(|(k, _)| k)
            .collect();
        for k in same_day {
            base = remove(&base, &k);
        }
        let s = upsert(&base, None, &c, x);

        let fresh = check_conflict(&s, &c, &y, None);
        let is_slot_occupied = matches!(fresh, Err(Conflict::SlotOccupied { .. }));
        prop_assert!(is_slot_occupied);
        prop_assert!(check_conflict(&s, &c, &y, Some(&c)).is_ok());
    }

    #[test]
    fn prop_teacher_clash_same_day_only(
        t1 in 0..DEFAULT_TIME_SLOTS.len(),
        t2 in 0..DEFAULT_TIME_SLOTS.len(),
        d in 0..Day::WEEKDAYS.len(),
        teacher in 0..TEACHERS.len(),
    ) {
        prop_assume!(t1 != t2);
        let day = Day::WEEKDAYS[d];
        let booked = Coordinate::new(day, DEFAULT_TIME_SLOTS[t1]);
        let target = Coordinate::new(day, DEFAULT_TIME_SLOTS[t2]);
        let s = Schedule::from_entries(vec![(
            booked,
            ClassAssignment { subject: "Physics".into(), teacher: TEACHERS[teacher].into() },
        )]);

        let same = ClassAssignment { subject: "Maths".into(), teacher: TEACHERS[teacher].into() };
        let other = ClassAssignment {
            subject: "Maths".into(),
            teacher: TEACHERS[(teacher + 1) % TEACHERS.len()].into(),
        };
        let expected_time = DEFAULT_TIME_SLOTS[t1].to_string();
        let is_clash = matches!(
            check_conflict(&s, &target, &same, None),
            Err(Conflict::TeacherDoubleBooked { time, .. }) if time == expected_time
        );
        prop_assert!(is_clash);
        prop_assert!(check_conflict(&s, &target, &other, None).is_ok());
    }

    #[test]
    fn prop_remove_is_idempotent(s in schedule(), c in coordinate()) {
        let once = remove(&s, &c);
        prop_assert_eq!(remove(&once, &c), once);
    }

    #[test]
    fn prop_move_onto_occupied_is_noop(s in schedule(), from in coordinate(), to in coordinate()) {
        if s.is_occupied(&to) {
            prop_assert!(move_assignment(&s, &from, &to).is_noop());
        }
    }

    #[test]
    fn prop_move_preserves_slot_count(s in schedule(), from in coordinate(), to in coordinate()) {
        match move_assignment(&s, &from, &to) {
            MoveOutcome::Moved(next) => {
                prop_assert_eq!(next.len(), s.len());
                prop_assert_eq!(next.get(&to), s.get(&from));
            }
            MoveOutcome::NoOp(_) => {}
        }
    }

    #[test]
    fn prop_checker_is_deterministic(
        s in schedule(),
        c in coordinate(),
        x in assignment(),
        o in prop::option::of(coordinate()),
    ) {
        let first = check_conflict(&s, &c, &x, o.as_ref());
        let second = check_conflict(&s, &c, &x, o.as_ref());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_apply_suggestion_is_exact(current in schedule(), suggestion in schedule()) {
        prop_assert_eq!(apply_suggestion(&current, &suggestion), suggestion);
    }

    #[test]
    fn prop_checked_placements_leave_audit_clean(
        placements in prop::collection::vec((coordinate(), assignment()), 0..30),
    ) {
        let grid = SlotGrid::default();
        let mut s = Schedule::new();
        for (c, x) in placements {
            if check_conflict(&s, &c, &x, None).is_ok() {
                s = upsert(&s, None, &c, x);
            }
        }
        prop_assert!(find_conflicts(&s, &grid).is_empty());
    }
}

#[test]
fn test_scenario_place_on_empty_schedule() {
    let target = Coordinate::new(Day::Monday, "9:00 AM");
    let physics = ClassAssignment::new("Physics", "Dr. A").unwrap();
    assert!(check_conflict(&Schedule::new(), &target, &physics, None).is_ok());

    let s = upsert(&Schedule::new(), None, &target, physics.clone());
    assert_eq!(s.get(&target), Some(&physics));
    for c in SlotGrid::default().coordinates() {
        if c != target {
            assert!(s.get(&c).is_none());
        }
    }
}

#[test]
fn test_scenario_teacher_clash() {
    let s = Schedule::from_entries(vec![(
        Coordinate::new(Day::Monday, "9:00 AM"),
        ClassAssignment::new("Physics", "Dr. A").unwrap(),
    )]);
    let err = check_conflict(
        &s,
        &Coordinate::new(Day::Monday, "10:00 AM"),
        &ClassAssignment::new("Chemistry", "Dr. A").unwrap(),
        None,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "teacher Dr. A already scheduled at 9:00 AM");
}

#[test]
fn test_scenario_drag_to_empty_cell() {
    let from = Coordinate::new(Day::Tuesday, "8:00 AM");
    let to = Coordinate::new(Day::Tuesday, "11:00 AM");
    let x = ClassAssignment::new("Biology", "Dr. D").unwrap();
    let s = Schedule::from_entries(vec![(from.clone(), x.clone())]);

    let MoveOutcome::Moved(next) = move_assignment(&s, &from, &to) else {
        panic!("move onto an empty cell should succeed");
    };
    assert!(next.get(&from).is_none());
    assert_eq!(next.get(&to), Some(&x));
}

#[test]
fn test_scenario_apply_suggestion_wholesale() {
    let current = Schedule::from_entries(vec![(
        Coordinate::new(Day::Friday, "2:00 PM"),
        ClassAssignment::new("Art", "Ms. G").unwrap(),
    )]);
    let suggestion = Schedule::from_entries(vec![
        (
            Coordinate::new(Day::Monday, "8:00 AM"),
            ClassAssignment::new("Physics", "Dr. A").unwrap(),
        ),
        (
            Coordinate::new(Day::Monday, "9:00 AM"),
            ClassAssignment::new("Maths", "Ms. B").unwrap(),
        ),
    ]);
    assert_eq!(apply_suggestion(&current, &suggestion), suggestion);
}

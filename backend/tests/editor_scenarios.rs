//! End-to-end editing scenarios through the editor and save queue.

mod support;

use std::sync::Arc;

use institute_timetable::api::{Conflict, Day, MoveOutcome, Schedule};
use institute_timetable::db::repository::TimetableRepository;
use institute_timetable::error::TimetableError;
use institute_timetable::services::{EditorSettings, SaveQueue, TimetableEditor};
use support::{admin, at, class, cse1, seeded_repository, student};

async fn open(repo: &institute_timetable::db::LocalRepository) -> TimetableEditor {
    let queue = SaveQueue::new(Arc::new(repo.clone()));
    TimetableEditor::open(queue, Arc::new(EditorSettings::default()), cse1())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_place_into_empty_schedule() {
    let repo = seeded_repository();
    let mut editor = open(&repo).await;

    editor
        .place(&admin(), None, &at(Day::Monday, "9:00 AM"), class("Physics", "Dr. A"))
        .await
        .unwrap();

    let stored = repo.get_timetable(&cse1()).await.unwrap();
    assert_eq!(stored.schedule.len(), 1);
    assert_eq!(
        stored.schedule.get(&at(Day::Monday, "9:00 AM")),
        Some(&class("Physics", "Dr. A"))
    );
    assert!(!stored.schedule.is_occupied(&at(Day::Monday, "10:00 AM")));
}

#[tokio::test]
async fn test_teacher_double_booking_is_rejected() {
    let repo = seeded_repository();
    let mut editor = open(&repo).await;
    editor
        .place(&admin(), None, &at(Day::Monday, "9:00 AM"), class("Physics", "Dr. A"))
        .await
        .unwrap();

    let err = editor
        .place(&admin(), None, &at(Day::Monday, "10:00 AM"), class("Chemistry", "Dr. A"))
        .await
        .unwrap_err();
    match err {
        TimetableError::Conflict(conflict @ Conflict::TeacherDoubleBooked { .. }) => {
            assert_eq!(conflict.reason(), "teacher Dr. A already scheduled at 9:00 AM");
        }
        other => panic!("expected teacher conflict, got {other:?}"),
    }
    assert_eq!(editor.schedule().len(), 1);
    assert_eq!(repo.save_count(), 1);
}

#[tokio::test]
async fn test_drag_to_empty_cell() {
    let repo = seeded_repository();
    let mut editor = open(&repo).await;
    editor
        .place(&admin(), None, &at(Day::Tuesday, "8:00 AM"), class("Maths", "Ms. B"))
        .await
        .unwrap();

    let outcome = editor
        .move_class(&admin(), &at(Day::Tuesday, "8:00 AM"), &at(Day::Tuesday, "11:00 AM"))
        .await
        .unwrap();
    assert!(matches!(outcome, MoveOutcome::Moved(_)));

    let stored = repo.get_timetable(&cse1()).await.unwrap().schedule;
    assert!(!stored.is_occupied(&at(Day::Tuesday, "8:00 AM")));
    assert_eq!(
        stored.get(&at(Day::Tuesday, "11:00 AM")),
        Some(&class("Maths", "Ms. B"))
    );
}

#[tokio::test]
async fn test_suggestion_replaces_everything() {
    let repo = seeded_repository();
    let mut editor = open(&repo).await;
    editor
        .place(&admin(), None, &at(Day::Friday, "2:00 PM"), class("Maths", "Ms. B"))
        .await
        .unwrap();

    let suggestion = Schedule::from_entries(vec![
        (at(Day::Monday, "8:00 AM"), class("Physics", "Dr. A")),
        (at(Day::Wednesday, "10:00 AM"), class("Chemistry", "Ms. B")),
    ]);
    editor.apply_suggestion(&admin(), &suggestion).await.unwrap();

    assert_eq!(editor.schedule(), &suggestion);
    assert_eq!(repo.get_timetable(&cse1()).await.unwrap().schedule, suggestion);
}

#[tokio::test]
async fn test_students_cannot_edit() {
    let repo = seeded_repository();
    let mut editor = open(&repo).await;
    let err = editor
        .place(&student(), None, &at(Day::Monday, "9:00 AM"), class("Physics", "Dr. A"))
        .await
        .unwrap_err();
    assert!(matches!(err, TimetableError::Forbidden(_)));
    assert_eq!(repo.save_count(), 0);
}

#[tokio::test]
async fn test_two_sessions_see_each_others_writes_after_reload() {
    let repo = seeded_repository();
    let mut first = open(&repo).await;
    let mut second = open(&repo).await;

    first
        .place(&admin(), None, &at(Day::Monday, "9:00 AM"), class("Physics", "Dr. A"))
        .await
        .unwrap();
    assert!(second.schedule().is_empty());

    second.reload().await.unwrap();
    assert_eq!(second.schedule().len(), 1);
    assert_eq!(second.revision(), first.revision());
}

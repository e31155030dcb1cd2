//! Walk through an editing session on the in-memory repository.
//!
//! ```bash
//! cargo run --example edit_session
//! ```

use std::sync::Arc;

use institute_timetable::api::{Actor, ClassAssignment, Coordinate, Day, TimetableKey};
use institute_timetable::db::LocalRepository;
use institute_timetable::services::{EditorSettings, SaveQueue, TimetableEditor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let repo = LocalRepository::new();
    let queue = SaveQueue::new(Arc::new(repo));
    let mut editor = TimetableEditor::open(
        queue,
        Arc::new(EditorSettings::default()),
        TimetableKey::new("CSE", 3),
    )
    .await?;
    let admin = Actor::admin("registrar");

    println!("=== Editing {} ===\n", editor.key());

    let monday_9 = Coordinate::new(Day::Monday, "9:00 AM");
    let record = editor
        .place(&admin, None, &monday_9, ClassAssignment::new("Physics", "Dr. A")?)
        .await?;
    println!("1. Placed Physics at {} (revision {})", monday_9, record.revision);

    let monday_10 = Coordinate::new(Day::Monday, "10:00 AM");
    match editor
        .place(&admin, None, &monday_10, ClassAssignment::new("Chemistry", "Dr. A")?)
        .await
    {
        Ok(_) => println!("2. Chemistry placed"),
        Err(e) => println!("2. Chemistry rejected: {}", e),
    }

    let tuesday_11 = Coordinate::new(Day::Tuesday, "11:00 AM");
    let outcome = editor.move_class(&admin, &monday_9, &tuesday_11).await?;
    println!("3. Dragged Physics to {} (no-op: {})", tuesday_11, outcome.is_noop());

    println!("\n=== Grid ===");
    for cell in editor.cells().iter().filter(|c| c.assignment.is_some()) {
        if let Some(class) = &cell.assignment {
            println!("{} {}: {} ({})", cell.day, cell.time, class.subject, class.teacher);
        }
    }
    println!("Audit findings: {}", editor.audit().len());

    Ok(())
}

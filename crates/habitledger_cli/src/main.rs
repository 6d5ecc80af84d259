//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `habitledger_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use habitledger_core::db::open_db_in_memory;
use habitledger_core::{HabitService, NewHabit, SqliteHabitRepository, MS_PER_DAY};
use uuid::Uuid;

fn main() {
    println!("habitledger_core ping={}", habitledger_core::ping());
    println!(
        "habitledger_core version={}",
        habitledger_core::core_version()
    );

    // Tiny deterministic probe: three consecutive days against an in-memory
    // store, printed as a streak summary.
    let mut conn = open_db_in_memory().expect("in-memory db should open");
    let repo = SqliteHabitRepository::try_new(&mut conn).expect("schema should be ready");
    let mut service = HabitService::new(repo);

    let caller = Uuid::new_v4();
    let request = NewHabit {
        name: "smoke habit".to_string(),
        description: "cli probe".to_string(),
        emoji: "\u{2705}".to_string(),
        goal_type: 0,
        goal_count: 1,
        is_public: false,
    };
    let (habit_id, _) = service
        .create_habit(caller, request, 0)
        .expect("create should succeed");

    for day in 0..3i64 {
        service
            .check_in(habit_id, caller, None, day * MS_PER_DAY)
            .expect("consecutive check-in should succeed");
    }

    let info = service.habit_info(habit_id).expect("habit should exist");
    println!(
        "habitledger_core smoke habit_id={habit_id} streak={} longest={} total={}",
        info.current_streak, info.longest_streak, info.total_checkins
    );
}

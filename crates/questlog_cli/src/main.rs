//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `questlog_core` wiring: open an
//!   in-memory database, seed the starter achievements, and report counts.
//! - Keep output deterministic for quick local sanity checks.

use questlog_core::db::open_db_in_memory;
use questlog_core::{
    AchievementService, ProgressionService, SqliteAchievementRepository, SqliteUserRepository,
};

fn main() {
    println!("questlog_core version={}", questlog_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("database bootstrap failed: {err}");
            std::process::exit(1);
        }
    };

    let achievements = AchievementService::new(
        SqliteAchievementRepository::new(&conn),
        ProgressionService::new(SqliteUserRepository::new(&conn)),
    );

    match achievements
        .seed_defaults()
        .and_then(|_| achievements.list_achievements())
    {
        Ok(seeded) => println!("achievements seeded={}", seeded.len()),
        Err(err) => {
            eprintln!("achievement seeding failed: {err}");
            std::process::exit(1);
        }
    }
}

use clap::Subcommand;
use petling_core::clock;
use petling_core::session::PetSession;
use petling_core::storage::Database;

#[derive(Subcommand)]
pub enum QuietAction {
    /// Print quiet-time status as JSON
    Status,
}

pub fn run(action: QuietAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let now = clock::now_ms();
    let session = PetSession::load(&db, now);

    match action {
        QuietAction::Status => {
            let status = session.quiet_status(now)?;
            let active_minutes = session.active_minutes(now)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "active": status.active,
                    "remaining_ms": status.remaining_ms,
                    "active_minutes": active_minutes,
                }))?
            );
        }
    }
    Ok(())
}

use clap::Subcommand;
use petling_core::clock;
use petling_core::session::{ActionOutcome, PetSession};
use petling_core::storage::Database;
use petling_core::{ActionKind, Event};

#[derive(Subcommand)]
pub enum PetAction {
    /// Print the current pet state as JSON
    Status,
    /// Feed the pet (raises hunger)
    Feed,
    /// Groom the pet (raises cleanliness)
    Groom,
    /// Play with the pet (raises playfulness; a sleeping pet ignores this)
    Play,
    /// Cuddle the pet (raises affection)
    Cuddle,
    /// Generic activity signal: resets the idle clock only
    Poke,
    /// Advance the session to now and print any transition events
    Tick,
}

pub fn run(action: PetAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let now = clock::now_ms();
    let mut session = PetSession::load(&db, now);

    // Bring the session up to the present before acting.
    let mut events = session.tick(now)?;

    match action {
        PetAction::Status => {
            events.push(session.snapshot(now)?);
        }
        PetAction::Feed => apply(&db, &mut session, ActionKind::Feed, now, &mut events)?,
        PetAction::Groom => apply(&db, &mut session, ActionKind::Groom, now, &mut events)?,
        PetAction::Play => apply(&db, &mut session, ActionKind::Play, now, &mut events)?,
        PetAction::Cuddle => apply(&db, &mut session, ActionKind::Cuddle, now, &mut events)?,
        PetAction::Poke => {
            session.register_generic_activity(now);
            events.push(session.snapshot(now)?);
        }
        PetAction::Tick => {
            if events.is_empty() {
                events.push(session.snapshot(now)?);
            }
        }
    }

    session.save()?;
    for event in &events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}

fn apply(
    db: &Database,
    session: &mut PetSession<&Database>,
    kind: ActionKind,
    now: u64,
    events: &mut Vec<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    match session.apply(kind, now)? {
        ActionOutcome::Applied { events: applied } => {
            for event in &applied {
                if let Event::ActionApplied { kind, at, .. } = event {
                    db.record_action(*kind, *at)?;
                }
            }
            events.extend(applied);
        }
        ActionOutcome::Blocked { until_ms } => {
            let status = session.quiet_status(now)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "blocked": true,
                    "until_ms": until_ms,
                    "remaining_ms": status.remaining_ms,
                }))?
            );
        }
        ActionOutcome::Ignored => {
            // Sleeping pets ignore play; report the unchanged state.
            events.push(session.snapshot(now)?);
        }
    }
    Ok(())
}

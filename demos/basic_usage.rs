/// Basic usage example: feed motion readings, watch steps and missions
use chrono::{FixedOffset, TimeZone};
use stride_quest::{MemoryStore, MotionReading, PedometerSession, StaticSensor};

fn main() {
    println!("=== Stride Quest: Basic Example ===\n");

    let Some(now) = FixedOffset::east_opt(0)
        .and_then(|tz| tz.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).single())
    else {
        return;
    };
    let mut session = PedometerSession::with_store(MemoryStore::new());
    if let Err(err) = session.start(&mut StaticSensor::available(), now) {
        println!("Cannot start: {err}");
        return;
    }

    // Simulated walk at 50Hz: phone upright, vertical bounce at ~1.6 steps/sec.
    let sample_interval_ms = 20;
    let duration_ms = 90_000;
    let mut t_ms = 0;
    let mut achievements = 0;

    while t_ms < duration_ms {
        let t = t_ms as f32 / 1000.0;
        let bounce = 6.0 * (t * 1.6 * std::f32::consts::TAU).sin();
        let reading = MotionReading::new(0.3, 0.1, 9.81 + bounce);

        for update in session.process_reading(&reading, t_ms) {
            for event in &update.achievements {
                achievements += 1;
                println!(
                    "[{:>6}ms] achievement {:?} at {} steps",
                    t_ms, event.mission, update.ledger.daily_steps
                );
            }
        }
        t_ms += sample_interval_ms;
    }

    session.stop();

    println!("\n=== Summary ===");
    let ledger = session.ledger();
    println!("Daily steps: {}", ledger.daily_steps);
    println!("Weekly steps: {}", ledger.weekly_steps);
    println!("Achievements: {}", achievements);
    match session.current_mission() {
        Some(mission) => println!(
            "Next mission: {} {} ({:.0}%)",
            mission.icon,
            mission.text,
            session.mission_progress() * 100.0
        ),
        None => println!("All missions complete"),
    }
}

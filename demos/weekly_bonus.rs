/// Weekly bonus example: progress carried across simulated days of one week
use chrono::{DateTime, FixedOffset, TimeZone};
use stride_quest::{MemoryStore, MotionReading, PedometerSession, StaticSensor};

fn morning(day: u32) -> Option<DateTime<FixedOffset>> {
    FixedOffset::east_opt(0).and_then(|tz| tz.with_ymd_and_hms(2025, 5, day, 8, 0, 0).single())
}

fn main() {
    println!("=== Stride Quest: Weekly Bonus Example ===\n");

    let mut session = PedometerSession::with_store(MemoryStore::new());
    let mut sensor = StaticSensor::available();

    // May 7-13 share one week key; 8,000 steps a day crosses 35,000 on day five.
    for day in 7..=13 {
        let Some(now) = morning(day) else { continue };
        if let Err(err) = session.start(&mut sensor, now) {
            println!("Cannot start: {err}");
            return;
        }
        let opening = session.ledger();
        println!(
            "May {day}: streak {} day(s), week so far {} steps",
            opening.consecutive_days, opening.weekly_steps
        );

        let mut sign = 1.0;
        for step in 0..8_000u64 {
            let reading = MotionReading::new(20.0 * sign, 0.0, 0.0);
            sign = -sign;
            for update in session.process_reading(&reading, step * 600) {
                for event in update.achievements.iter().filter(|e| e.is_bonus) {
                    println!(
                        "  bonus {:?} at {} weekly steps",
                        event.mission, update.ledger.weekly_steps
                    );
                }
            }
        }
        session.stop();
    }

    println!("\n=== Bonus missions ===");
    for status in session.bonus_statuses() {
        println!(
            "{}: {}/{} visible={} completed={}",
            status.id, status.progress, status.goal, status.visible, status.completed
        );
    }
}

use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn fresh_stopwatch_is_all_zero() {
    let sw = Stopwatch::default();
    assert_eq!(sw.laps_count(), MAX_SAMPLES);
    assert_eq!(sw.last_lap(), Duration::ZERO);
    assert_eq!(sw.max_delta(), Duration::ZERO);
    assert_eq!(sw.average_delta(), Duration::ZERO);
    assert_eq!(sw.janky_laps(), 0);
}

#[test]
fn set_lap_time_records_in_order() {
    let mut sw = Stopwatch::default();
    sw.set_lap_time(ms(4));
    assert_eq!(sw.current_sample(), 0);
    assert_eq!(sw.last_lap(), ms(4));
    sw.set_lap_time(ms(9));
    assert_eq!(sw.current_sample(), 1);
    assert_eq!(sw.lap(0), Some(ms(4)));
    assert_eq!(sw.lap(1), Some(ms(9)));
    assert_eq!(sw.lap(MAX_SAMPLES), None);
    assert_eq!(sw.max_delta(), ms(9));
}

#[test]
fn ring_buffer_wraps_and_overwrites_oldest() {
    let mut sw = Stopwatch::default();
    for i in 0..(MAX_SAMPLES as u64 + 5) {
        sw.set_lap_time(ms(i + 1));
    }
    assert_eq!(sw.laps_count(), MAX_SAMPLES);
    assert_eq!(sw.current_sample(), 4);
    // Index 0 held the first lap (1ms) and now holds lap number MAX_SAMPLES + 1.
    assert_eq!(sw.lap(0), Some(ms(MAX_SAMPLES as u64 + 1)));
    assert_eq!(sw.last_lap(), ms(MAX_SAMPLES as u64 + 5));
    assert_eq!(sw.lap(5), Some(ms(6)));
}

#[test]
fn average_counts_unrecorded_slots_as_zero() {
    let mut sw = Stopwatch::default();
    sw.set_lap_time(ms(120));
    assert_eq!(sw.average_delta(), ms(1));
}

#[test]
fn start_stop_records_a_lap() {
    let mut sw = Stopwatch::default();
    sw.stop();
    assert_eq!(sw.current_sample(), MAX_SAMPLES - 1);
    sw.start();
    std::thread::sleep(ms(2));
    sw.stop();
    assert_eq!(sw.current_sample(), 0);
    assert!(sw.last_lap() >= ms(2));
}

#[test]
fn janky_laps_compare_against_refresh_budget() {
    let mut sw = Stopwatch::new(Arc::new(FixedRefreshRateUpdater::new(100.0)));
    assert_eq!(sw.frame_budget(), ms(10));
    sw.set_lap_time(ms(5));
    sw.set_lap_time(ms(15));
    sw.set_lap_time(ms(25));
    assert_eq!(sw.janky_laps(), 2);
    assert!((sw.unit_frame_interval(ms(15)) - 1.5).abs() < 1e-9);
}

#[test]
fn invalid_refresh_rate_falls_back_to_60hz() {
    let u = FixedRefreshRateUpdater::new(0.0);
    assert_eq!(u.frame_budget(), FixedRefreshRateUpdater::default().frame_budget());
}

#[test]
fn counter_increments_and_resets() {
    let mut c = Counter::default();
    c.increment(1);
    c.increment(2);
    assert_eq!(c.count(), 3);
    c.reset(10);
    assert_eq!(c.count(), 10);
}

#[test]
fn counter_values_track_extremes_in_window() {
    let mut v = CounterValues::default();
    v.add(5);
    v.add(-3);
    v.add(12);
    assert_eq!(v.last(), 12);
    assert_eq!(v.max_value(), 12);
    assert_eq!(v.min_value(), -3);
    assert_eq!(v.len(), MAX_SAMPLES);
    for _ in 0..MAX_SAMPLES {
        v.add(1);
    }
    assert_eq!(v.max_value(), 1);
    assert_eq!(v.min_value(), 1);
}

//! BPM estimation from beat timestamps
//!
//! The beat tracker (see [`beat_tracker`]) emits one timestamp per detected
//! beat. The estimate is the mean of the plausible inter-beat intervals,
//! folded once into the 60-200 BPM range.

pub mod beat_tracker;

pub use beat_tracker::AubioBeatTracker;

/// Shortest inter-beat interval kept (seconds); shorter gaps are double triggers
pub const MIN_BEAT_INTERVAL: f64 = 0.1;
/// Longest inter-beat interval kept (seconds); longer gaps are missed beats
pub const MAX_BEAT_INTERVAL: f64 = 2.0;
/// Estimates below this are doubled
pub const MIN_PLAUSIBLE_BPM: f64 = 60.0;
/// Estimates above this are halved
pub const MAX_PLAUSIBLE_BPM: f64 = 200.0;

/// Estimate the tempo from beat timestamps in seconds
///
/// Returns `None` when fewer than two positive timestamps exist or no
/// interval falls strictly inside 0.1s-2.0s.
pub fn estimate_bpm(beats: &[f64]) -> Option<f64> {
    let beats: Vec<f64> = beats.iter().copied().filter(|&t| t > 0.0).collect();
    if beats.len() < 2 {
        return None;
    }

    let intervals: Vec<f64> = beats
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|&interval| interval > MIN_BEAT_INTERVAL && interval < MAX_BEAT_INTERVAL)
        .collect();

    if intervals.is_empty() {
        return None;
    }

    let average = intervals.iter().sum::<f64>() / intervals.len() as f64;
    Some(correct_octave(60.0 / average))
}

/// Fold a raw estimate into the plausible range (single pass)
pub fn correct_octave(bpm: f64) -> f64 {
    if bpm < MIN_PLAUSIBLE_BPM {
        bpm * 2.0
    } else if bpm > MAX_PLAUSIBLE_BPM {
        bpm / 2.0
    } else {
        bpm
    }
}

/// Parse beat tracker output: one decimal number per line
///
/// Lines that do not parse as a positive number are dropped.
pub fn parse_beat_output(output: &str) -> Vec<f64> {
    output
        .lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .filter(|t| t.is_finite() && *t > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beats_at(interval: f64, count: usize) -> Vec<f64> {
        (1..=count).map(|i| i as f64 * interval).collect()
    }

    #[test]
    fn test_constant_interval_is_exact() {
        assert_eq!(estimate_bpm(&[0.0, 0.5, 1.0, 1.5, 2.0]), Some(120.0));
    }

    #[test]
    fn test_slow_estimate_is_doubled() {
        // 45 BPM raw
        let bpm = estimate_bpm(&beats_at(60.0 / 45.0, 8)).unwrap();
        assert!((bpm - 90.0).abs() < 1e-9, "got {}", bpm);
    }

    #[test]
    fn test_fast_estimate_is_halved() {
        // 240 BPM raw
        let bpm = estimate_bpm(&beats_at(0.25, 16)).unwrap();
        assert!((bpm - 120.0).abs() < 1e-9, "got {}", bpm);
    }

    #[test]
    fn test_correction_is_single_pass() {
        assert_eq!(correct_octave(25.0), 50.0);
        assert_eq!(correct_octave(500.0), 250.0);
        assert_eq!(correct_octave(60.0), 60.0);
        assert_eq!(correct_octave(200.0), 200.0);
    }

    #[test]
    fn test_too_few_beats() {
        assert_eq!(estimate_bpm(&[]), None);
        assert_eq!(estimate_bpm(&[1.0]), None);
        // Non-positive timestamps are dropped before counting
        assert_eq!(estimate_bpm(&[0.0, -1.0, 0.5]), None);
    }

    #[test]
    fn test_implausible_intervals_dropped() {
        // Double triggers (0.05s) and a missed-beat gap (3s) are ignored
        let beats = [0.5, 1.0, 1.05, 1.55, 4.55, 5.05];
        let bpm = estimate_bpm(&beats).unwrap();
        assert!((bpm - 120.0).abs() < 1e-6, "got {}", bpm);
    }

    #[test]
    fn test_no_surviving_interval() {
        assert_eq!(estimate_bpm(&[1.0, 1.05, 1.08]), None);
        assert_eq!(estimate_bpm(&[1.0, 3.5, 6.0]), None);
        // Interval bounds are exclusive
        assert_eq!(estimate_bpm(&[1.0, 3.0]), None);
    }

    #[test]
    fn test_parse_beat_output() {
        let output = "0.000000\n0.464399\n garbage \n0.928798\n-1.0\n\n1.393197\nNaN\n";
        assert_eq!(parse_beat_output(output), vec![0.464399, 0.928798, 1.393197]);
    }
}

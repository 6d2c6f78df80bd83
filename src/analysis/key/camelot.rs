//! Camelot Wheel notation and harmonic compatibility
//!
//! The Camelot Wheel is a visual representation of musical keys that
//! makes harmonic mixing intuitive for DJs.
//!
//! - Numbers 1-12 represent positions on the wheel
//! - 'A' suffix = minor key, 'B' suffix = major key
//! - Adjacent numbers are harmonically compatible (perfect fifth)
//! - Same number, different letter = relative major/minor

use crate::types::{Mode, PitchClass};
use std::fmt;
use std::str::FromStr;

/// Camelot code returned for keys outside 0-11
pub const FALLBACK_CAMELOT: &str = "1A";

/// Mapping from (pitch class, mode) to Camelot notation
///
/// Moving up a perfect fifth (+7 semitones) moves one step clockwise.
///
/// Layout:
/// ```text
///      5A      5B
///    /    \  /    \
///  4A      4B      6B
///  |       |       |
///  3A      3B      7B
///    \    /  \    /
///      2A      8B
///       ...
/// ```
pub fn pitch_to_camelot(pitch: PitchClass, mode: Mode) -> &'static str {
    match (pitch, mode) {
        // Minor keys (A)
        (PitchClass::A, Mode::Minor) => "8A",   // Am
        (PitchClass::As, Mode::Minor) => "3A",  // A#m / Bbm
        (PitchClass::B, Mode::Minor) => "10A",  // Bm
        (PitchClass::C, Mode::Minor) => "5A",   // Cm
        (PitchClass::Cs, Mode::Minor) => "12A", // C#m / Dbm
        (PitchClass::D, Mode::Minor) => "7A",   // Dm
        (PitchClass::Ds, Mode::Minor) => "2A",  // D#m / Ebm
        (PitchClass::E, Mode::Minor) => "9A",   // Em
        (PitchClass::F, Mode::Minor) => "4A",   // Fm
        (PitchClass::Fs, Mode::Minor) => "11A", // F#m / Gbm
        (PitchClass::G, Mode::Minor) => "6A",   // Gm
        (PitchClass::Gs, Mode::Minor) => "1A",  // G#m / Abm

        // Major keys (B)
        (PitchClass::A, Mode::Major) => "11B", // A
        (PitchClass::As, Mode::Major) => "6B", // A# / Bb
        (PitchClass::B, Mode::Major) => "1B",  // B
        (PitchClass::C, Mode::Major) => "8B",  // C
        (PitchClass::Cs, Mode::Major) => "3B", // C# / Db
        (PitchClass::D, Mode::Major) => "10B", // D
        (PitchClass::Ds, Mode::Major) => "5B", // D# / Eb
        (PitchClass::E, Mode::Major) => "12B", // E
        (PitchClass::F, Mode::Major) => "7B",  // F
        (PitchClass::Fs, Mode::Major) => "2B", // F# / Gb
        (PitchClass::G, Mode::Major) => "9B",  // G
        (PitchClass::Gs, Mode::Major) => "4B", // G# / Ab
    }
}

/// Convert a pitch class index (0 = C .. 11 = B) and mode to Camelot notation
///
/// Unknown keys map to [`FALLBACK_CAMELOT`].
pub fn to_camelot(key: u8, mode: Mode) -> &'static str {
    match PitchClass::from_index(key) {
        Some(pitch) => pitch_to_camelot(pitch, mode),
        None => FALLBACK_CAMELOT,
    }
}

/// A parsed position on the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CamelotKey {
    /// Wheel position, 1-12
    pub number: u8,
    /// A = minor, B = major
    pub mode: Mode,
}

impl CamelotKey {
    /// Create a key, returning `None` for positions outside 1-12
    pub fn new(number: u8, mode: Mode) -> Option<Self> {
        (1..=12).contains(&number).then_some(Self { number, mode })
    }

    /// One step counter-clockwise (wraps 1 -> 12)
    pub fn prev(self) -> Self {
        let number = if self.number == 1 { 12 } else { self.number - 1 };
        Self { number, ..self }
    }

    /// One step clockwise (wraps 12 -> 1)
    pub fn next(self) -> Self {
        let number = if self.number == 12 { 1 } else { self.number + 1 };
        Self { number, ..self }
    }

    /// Same number, opposite letter
    pub fn relative(self) -> Self {
        Self {
            mode: self.mode.relative(),
            ..self
        }
    }

    /// Circular distance between wheel numbers (0-6)
    pub fn distance(self, other: Self) -> u8 {
        let diff = self.number.abs_diff(other.number);
        diff.min(12 - diff)
    }

    /// Harmonic compatibility score in [0, 1]
    ///
    /// Same key scores 1.0, relative major/minor 0.85, one step on the
    /// wheel 0.9. Further positions fall off by distance, faster when the
    /// letters differ.
    pub fn compatibility(self, other: Self) -> f64 {
        if self.number == other.number {
            return if self.mode == other.mode { 1.0 } else { 0.85 };
        }

        let distance = self.distance(other);

        if self.mode == other.mode {
            match distance {
                1 => 0.9,
                2 => 0.6,
                3 => 0.4,
                4 => 0.3,
                5 => 0.2,
                _ => 0.1,
            }
        } else {
            (0.7 - f64::from(distance) * 0.12).max(0.1)
        }
    }

    /// Static string form of this key
    pub fn as_str(self) -> &'static str {
        let idx = usize::from(self.number - 1);
        match self.mode {
            Mode::Minor => MINOR_CODES[idx],
            Mode::Major => MAJOR_CODES[idx],
        }
    }
}

const MINOR_CODES: [&str; 12] = [
    "1A", "2A", "3A", "4A", "5A", "6A", "7A", "8A", "9A", "10A", "11A", "12A",
];
const MAJOR_CODES: [&str; 12] = [
    "1B", "2B", "3B", "4B", "5B", "6B", "7B", "8B", "9B", "10B", "11B", "12B",
];

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a Camelot code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCamelot(pub String);

impl fmt::Display for InvalidCamelot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a Camelot code (expected 1A-12B)", self.0)
    }
}

impl std::error::Error for InvalidCamelot {}

impl FromStr for CamelotKey {
    type Err = InvalidCamelot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).ok_or_else(|| InvalidCamelot(s.to_string()))
    }
}

/// Parse a Camelot code such as "7A" or "12B"
///
/// Requires one or more ASCII digits followed by exactly one 'A' or 'B',
/// with the number in 1-12.
pub fn parse(code: &str) -> Option<CamelotKey> {
    let (digits, mode) = if let Some(digits) = code.strip_suffix('A') {
        (digits, Mode::Minor)
    } else if let Some(digits) = code.strip_suffix('B') {
        (digits, Mode::Major)
    } else {
        return None;
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: u8 = digits.parse().ok()?;

    CamelotKey::new(number, mode)
}

/// Compatibility between two Camelot codes in [0, 1]
///
/// Returns 0.0 if either code does not parse.
pub fn compatibility(a: &str, b: &str) -> f64 {
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.compatibility(b),
        _ => 0.0,
    }
}

/// Get harmonically compatible keys (for mixing suggestions)
///
/// Returns keys that are safe to mix with the given key:
/// - Same key
/// - -1/+1 on the wheel (perfect fifth relationship)
/// - Same number, opposite letter (relative major/minor)
///
/// Empty if the code does not parse.
pub fn compatible_keys(code: &str) -> Vec<&'static str> {
    let Some(key) = parse(code) else {
        return vec![];
    };

    vec![
        key.as_str(),
        key.prev().as_str(),
        key.next().as_str(),
        key.relative().as_str(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_codes() -> Vec<&'static str> {
        MINOR_CODES.iter().chain(MAJOR_CODES.iter()).copied().collect()
    }

    #[test]
    fn test_camelot_mapping_covers_all_keys() {
        // Ensure all 24 key combinations map to unique Camelot codes
        let mut codes = HashSet::new();

        for key in 0..12 {
            for mode in [Mode::Major, Mode::Minor] {
                let code = to_camelot(key, mode);
                let parsed = parse(code).unwrap();
                assert_eq!(parsed.mode, mode, "Wrong letter for {} {:?}", key, mode);
                assert!(codes.insert(code), "Duplicate code: {}", code);
            }
        }

        assert_eq!(codes.len(), 24);
    }

    #[test]
    fn test_camelot_examples() {
        // Common DJ reference points
        assert_eq!(to_camelot(0, Mode::Major), "8B"); // C
        assert_eq!(to_camelot(9, Mode::Minor), "8A"); // Am
        assert_eq!(to_camelot(7, Mode::Minor), "6A"); // Gm
        assert_eq!(to_camelot(1, Mode::Minor), "12A"); // C#m
        assert_eq!(to_camelot(11, Mode::Major), "1B"); // B
    }

    #[test]
    fn test_fifth_moves_one_step() {
        for key in 0..12u8 {
            for mode in [Mode::Major, Mode::Minor] {
                let here = parse(to_camelot(key, mode)).unwrap();
                let fifth = parse(to_camelot((key + 7) % 12, mode)).unwrap();
                assert_eq!(here.next(), fifth);
            }
        }
    }

    #[test]
    fn test_unknown_key_falls_back() {
        assert_eq!(to_camelot(12, Mode::Major), "1A");
        assert_eq!(to_camelot(255, Mode::Minor), "1A");
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            parse("7A"),
            Some(CamelotKey {
                number: 7,
                mode: Mode::Minor
            })
        );
        assert_eq!(parse("12B").map(|k| k.number), Some(12));
        assert_eq!(parse("A"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("7C"), None);
        assert_eq!(parse("7a"), None);
        assert_eq!(parse("0A"), None);
        assert_eq!(parse("13B"), None);
        assert_eq!(parse("xA"), None);
        assert_eq!(parse("-1A"), None);
        assert_eq!(parse("+7A"), None);
        assert_eq!(parse("7ÄA"), None);
        assert_eq!(parse("7Ä"), None);
        assert!("9B".parse::<CamelotKey>().is_ok());
        assert!("99B".parse::<CamelotKey>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for code in all_codes() {
            assert_eq!(parse(code).unwrap().to_string(), code);
        }
    }

    #[test]
    fn test_compatibility_reference_values() {
        assert_eq!(compatibility("7A", "7B"), 0.85);
        assert_eq!(compatibility("7A", "6A"), 0.9);
        // Opposite side of the wheel
        assert_eq!(compatibility("7A", "1A"), 0.1);
        assert_eq!(compatibility("7A", "9A"), 0.6);
        assert_eq!(compatibility("12A", "1A"), 0.9);
        assert_eq!(compatibility("1B", "12B"), 0.9);
        assert_eq!(compatibility("3A", "8A"), 0.2);
        // Different letter, distance 1: 0.7 - 0.12
        assert!((compatibility("7A", "8B") - 0.58).abs() < 1e-12);
        // Different letter, distance 6 floors at 0.1
        assert!((compatibility("1A", "7B") - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_compatibility_invalid_is_zero() {
        assert_eq!(compatibility("7A", "garbage"), 0.0);
        assert_eq!(compatibility("", "7A"), 0.0);
        assert_eq!(compatibility("13A", "13A"), 0.0);
    }

    #[test]
    fn test_compatibility_identity_and_symmetry() {
        let codes = all_codes();
        for a in &codes {
            assert_eq!(compatibility(a, a), 1.0);
            for b in &codes {
                let score = compatibility(a, b);
                assert_eq!(score, compatibility(b, a), "{} vs {}", a, b);
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn test_compatible_keys() {
        let compatible: HashSet<_> = compatible_keys("7A").into_iter().collect();
        let expected: HashSet<_> = ["7A", "6A", "8A", "7B"].into_iter().collect();
        assert_eq!(compatible, expected);
    }

    #[test]
    fn test_compatible_keys_wrap() {
        let compatible = compatible_keys("12A");
        assert!(compatible.contains(&"1A")); // Wraps 12 -> 1
        assert!(compatible.contains(&"11A")); // -1

        let compatible = compatible_keys("1A");
        assert!(compatible.contains(&"12A")); // Wraps 1 -> 12
        assert!(compatible.contains(&"2A")); // +1
        assert!(compatible.contains(&"1B")); // Relative major
    }

    #[test]
    fn test_compatible_keys_invalid() {
        assert!(compatible_keys("nope").is_empty());
    }
}

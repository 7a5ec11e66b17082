//! Random password generation and the combinatorics behind its strength
//! estimate.

mod strength;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

pub use strength::{
    combination_stats, combination_stats_at, cracks_per_second, crack_duration_text,
    engineering_string, entropy_bits, CombinationStats, SecurityLevel, BASE_CRACKS_PER_SECOND,
};

const UPPER_CONSONANTS: &str = "BCDFGHJKLMNPQRSTVWXZ";
const UPPER_VOWELS: &str = "AEIOUY";
const LOWER_CONSONANTS: &str = "bcdfghjklmnpqrstvwxz";
const LOWER_VOWELS: &str = "aeiouy";
const DIGITS: &str = "0123456789";
const SPECIALS: &str = "~!@#$%^&*()-_=+[{]}\\|;:'\",<.>/?";

/// Easily confused glyphs.
const SIMILAR: &str = "IOQl0`-_;:'\",.";
/// Keys that move between common keyboard layouts.
const MOVABLE: &str = "YZyz`~#$%-,.";

// Candidates whose class mix never satisfies the options are retried
const MAX_ATTEMPTS: usize = 1000;

pub const DEFAULT_LENGTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordOptions {
    pub length: usize,
    pub include_upper: bool,
    pub include_lower: bool,
    pub include_digits: bool,
    pub include_special: bool,
    /// Drop easily confused glyphs such as `I`, `l` and `0`
    pub restrict_similar: bool,
    /// Drop keys whose position differs between keyboard layouts
    pub restrict_movable: bool,
    /// Alternate consonants and vowels; digits and specials count as vowels
    pub restrict_pronounceable: bool,
    /// No character equals the one before it
    pub restrict_repeated: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            include_upper: true,
            include_lower: true,
            include_digits: true,
            include_special: true,
            restrict_similar: false,
            restrict_movable: false,
            restrict_pronounceable: false,
            restrict_repeated: false,
        }
    }
}

impl PasswordOptions {
    fn allowed(&self, set: &str) -> Vec<char> {
        set.chars()
            .filter(|c| !(self.restrict_similar && SIMILAR.contains(*c)))
            .filter(|c| !(self.restrict_movable && MOVABLE.contains(*c)))
            .collect()
    }

    fn is_valid(&self) -> bool {
        self.length >= 1
            && (self.include_upper || self.include_lower || self.include_digits || self.include_special)
    }

    fn pronounceable(&self) -> bool {
        self.restrict_pronounceable && (self.include_upper || self.include_lower)
    }

    /// Number of distinct passwords these options can produce, assuming the
    /// attacker knows the options. `None` when nothing can be generated.
    pub fn combinations(&self) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        let mut all = 0usize;
        let mut vowels = 0usize;
        let mut consonants = 0usize;
        let mut add = |include: bool, v: &str, c: &str| {
            if include {
                let (v, c) = (self.allowed(v).len(), self.allowed(c).len());
                all += v + c;
                vowels += v;
                consonants += c;
            }
        };
        add(self.include_upper, UPPER_VOWELS, UPPER_CONSONANTS);
        add(self.include_lower, LOWER_VOWELS, LOWER_CONSONANTS);
        let digits = if self.include_digits { self.allowed(DIGITS).len() } else { 0 };
        let specials = if self.include_special { self.allowed(SPECIALS).len() } else { 0 };
        let all = all + digits + specials;
        let vowels = vowels + digits + specials;
        let consonants = consonants + digits + specials;
        if all == 0 {
            return None;
        }

        let len = self.length as i32;
        let (all, vowels, consonants) = (all as f64, vowels as f64, consonants as f64);
        let combinations = match (self.pronounceable(), self.restrict_repeated) {
            (true, true) => {
                let v = len / 2;
                (vowels - 1.0).powi(v) * (consonants - 1.0).powi(len - v - 1) * (vowels + consonants)
            }
            (true, false) => {
                let v = len / 2;
                vowels.powi(v) * consonants.powi(len - v - 1) * (vowels + consonants)
            }
            (false, true) => all * (all - 1.0).powi(len - 1),
            (false, false) => all.powi(len),
        };
        Some(combinations)
    }
}

/// Generates a password from the thread-local CSPRNG. `None` when the options
/// allow no characters or the length is zero.
pub fn generate(options: &PasswordOptions) -> Option<String> {
    generate_with(options, &mut rand::rng())
}

/// Generates a password from the given cryptographically secure source.
///
/// Each position first draws one of 16 slots: 6 for uppercase, 6 for
/// lowercase, 2 for digits and 2 for specials. A slot whose class is excluded
/// is redrawn. Within the class a character is picked uniformly. Every included
/// class appears at least once when the length allows it.
pub fn generate_with<R: CryptoRng + RngCore>(options: &PasswordOptions, rng: &mut R) -> Option<String> {
    if !options.is_valid() {
        return None;
    }
    let upper = (options.allowed(UPPER_VOWELS), options.allowed(UPPER_CONSONANTS));
    let lower = (options.allowed(LOWER_VOWELS), options.allowed(LOWER_CONSONANTS));
    let digits = options.allowed(DIGITS);
    let specials = options.allowed(SPECIALS);

    let classes = [
        (options.include_upper, [upper.0.as_slice(), upper.1.as_slice()].concat()),
        (options.include_lower, [lower.0.as_slice(), lower.1.as_slice()].concat()),
        (options.include_digits, digits.clone()),
        (options.include_special, specials.clone()),
    ];
    let required: Vec<&[char]> = classes
        .iter()
        .filter(|(include, set)| *include && !set.is_empty())
        .map(|(_, set)| set.as_slice())
        .collect();
    if required.is_empty() {
        return None;
    }

    let pronounceable = options.pronounceable();
    let mut candidate = String::new();
    for attempt in 0..MAX_ATTEMPTS {
        let mut password: Vec<char> = Vec::with_capacity(options.length);
        let mut vowel_next = false;
        while password.len() < options.length {
            let pool: Vec<char> = match random_below(rng, 16) {
                0..=5 if options.include_upper => letter_pool(&upper, pronounceable, &mut vowel_next),
                6..=11 if options.include_lower => letter_pool(&lower, pronounceable, &mut vowel_next),
                12..=13 if options.include_digits => {
                    if pronounceable && !vowel_next {
                        continue;
                    }
                    vowel_next = false;
                    digits.clone()
                }
                14..=15 if options.include_special => {
                    if pronounceable && !vowel_next {
                        continue;
                    }
                    vowel_next = false;
                    specials.clone()
                }
                _ => continue,
            };
            if pool.is_empty() {
                continue;
            }
            let next = pool[random_below(rng, pool.len() as u32) as usize];
            if options.restrict_repeated && password.last() == Some(&next) {
                continue;
            }
            password.push(next);
        }

        candidate.zeroize();
        candidate = password.iter().collect();
        let complete = required.len() > options.length
            || required.iter().all(|set| password.iter().any(|c| set.contains(c)));
        password.zeroize();
        if complete {
            return Some(candidate);
        }
        debug!("Password attempt {attempt} misses a character class, retrying");
    }
    Some(candidate)
}

fn letter_pool(set: &(Vec<char>, Vec<char>), pronounceable: bool, vowel_next: &mut bool) -> Vec<char> {
    let (vowels, consonants) = set;
    if !pronounceable {
        return [vowels.as_slice(), consonants.as_slice()].concat();
    }
    let pool = if *vowel_next { vowels.clone() } else { consonants.clone() };
    *vowel_next = !*vowel_next;
    pool
}

/// Uniform integer in `0..upper` by rejection sampling to avoid modulo bias.
fn random_below<R: RngCore>(rng: &mut R, upper: u32) -> u32 {
    let limit = u32::MAX - u32::MAX % upper;
    loop {
        let n = rng.next_u32();
        if n < limit {
            return n % upper;
        }
    }
}

#[cfg(test)]
mod password_tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    use super::{generate, generate_with, random_below, PasswordOptions, MOVABLE, SIMILAR};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5EED)
    }

    #[test]
    fn test_default_options() {
        let options = PasswordOptions::default();
        assert_eq!(options.length, 14);
        let password = generate(&options).unwrap();
        assert_eq!(password.chars().count(), 14);
    }

    #[test]
    fn test_invalid_options() {
        let zero = PasswordOptions { length: 0, ..PasswordOptions::default() };
        assert_eq!(generate(&zero), None);
        assert_eq!(zero.combinations(), None);

        let empty = PasswordOptions {
            include_upper: false,
            include_lower: false,
            include_digits: false,
            include_special: false,
            ..PasswordOptions::default()
        };
        assert_eq!(generate(&empty), None);
        assert_eq!(empty.combinations(), None);
    }

    #[test]
    fn test_all_classes_present() {
        let mut rng = rng();
        let options = PasswordOptions { length: 8, ..PasswordOptions::default() };
        for _ in 0..200 {
            let password = generate_with(&options, &mut rng).unwrap();
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password.chars().any(|c| !c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_restrictions() {
        let mut rng = rng();
        let options = PasswordOptions {
            length: 40,
            restrict_similar: true,
            restrict_movable: true,
            ..PasswordOptions::default()
        };
        for _ in 0..100 {
            let password = generate_with(&options, &mut rng).unwrap();
            assert!(!password.chars().any(|c| SIMILAR.contains(c) || MOVABLE.contains(c)));
        }
    }

    #[test]
    fn test_pronounceable_letters_alternate() {
        let mut rng = rng();
        let options = PasswordOptions {
            length: 30,
            include_upper: false,
            include_digits: false,
            include_special: false,
            restrict_pronounceable: true,
            ..PasswordOptions::default()
        };
        let password: Vec<char> = generate_with(&options, &mut rng).unwrap().chars().collect();
        for (i, c) in password.iter().enumerate() {
            assert_eq!("aeiouy".contains(*c), i % 2 == 1, "{password:?}");
        }
    }

    #[test]
    fn test_pronounceable_without_letters_terminates() {
        let options = PasswordOptions {
            include_upper: false,
            include_lower: false,
            restrict_pronounceable: true,
            ..PasswordOptions::default()
        };
        assert_eq!(generate_with(&options, &mut rng()).unwrap().len(), 14);
    }

    #[test]
    fn test_short_length_with_many_classes() {
        let options = PasswordOptions { length: 2, ..PasswordOptions::default() };
        assert_eq!(generate_with(&options, &mut rng()).unwrap().chars().count(), 2);
    }

    #[test_case(PasswordOptions::default(), 93f64.powi(14))]
    #[test_case(PasswordOptions { length: 8, include_special: false, ..PasswordOptions::default() }, 62f64.powi(8))]
    #[test_case(PasswordOptions { length: 4, restrict_repeated: true, include_upper: false, include_lower: false, include_special: false, ..PasswordOptions::default() }, 10.0 * 9f64.powi(3))]
    #[test_case(PasswordOptions { length: 10, include_upper: false, include_special: false, include_digits: false, restrict_similar: true, ..PasswordOptions::default() }, 25f64.powi(10))]
    #[test_case(PasswordOptions { length: 6, include_upper: false, include_digits: false, include_special: false, restrict_pronounceable: true, ..PasswordOptions::default() }, 6f64.powi(3) * 20f64.powi(2) * 26.0)]
    #[test_case(PasswordOptions { length: 5, include_upper: false, include_lower: false, include_special: false, restrict_pronounceable: true, ..PasswordOptions::default() }, 10f64.powi(5))]
    fn test_combinations(options: PasswordOptions, exp: f64) {
        let combinations = options.combinations().unwrap();
        assert!((combinations - exp).abs() <= exp * 1e-12, "{combinations} != {exp}");
    }

    #[test]
    fn test_random_below_range() {
        let mut rng = rng();
        let mut seen = [false; 7];
        for _ in 0..1000 {
            seen[random_below(&mut rng, 7) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}

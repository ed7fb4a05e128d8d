//! Password generation and strength scoring
//!
//! All character selection and shuffling goes through the OS RNG, never a
//! general-purpose PRNG. When a character class is enabled the output is
//! guaranteed to contain at least one character from it: one character per
//! enabled class is seeded up front, the rest drawn from the combined pool,
//! and the whole sequence shuffled so the seeds land at no fixed position.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SPECIAL: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Visually ambiguous glyphs removed by `exclude_similar`
const SIMILAR: &str = "loIO01";

/// Minimum password length accepted by the generator
pub const MIN_LENGTH: usize = 4;

/// Options for password generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Password length, at least [`MIN_LENGTH`]
    pub length: usize,
    pub use_uppercase: bool,
    pub use_lowercase: bool,
    pub use_digits: bool,
    pub use_special: bool,
    /// Drop `0/O`, `1/l/I` and lowercase `o` from the eligible pools
    pub exclude_similar: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            use_uppercase: true,
            use_lowercase: true,
            use_digits: true,
            use_special: true,
            exclude_similar: true,
        }
    }
}

/// Strength classification for a scored password
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    VeryWeak,
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

/// Result of a strength assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthReport {
    /// Score in [0, 100]
    pub score: u8,
    pub level: StrengthLevel,
    /// Human-readable suggestions, empty when nothing stands out
    pub feedback: Vec<String>,
}

fn class_pool(chars: &str, exclude_similar: bool) -> Vec<char> {
    chars
        .chars()
        .filter(|c| !exclude_similar || !SIMILAR.contains(*c))
        .collect()
}

/// Generate a random password
///
/// Fails when `length` is below [`MIN_LENGTH`] or no character class is
/// enabled.
pub fn generate(options: &GeneratorOptions) -> Result<String> {
    if options.length < MIN_LENGTH {
        return Err(VaultError::InvalidGeneratorOptions(format!(
            "length must be at least {}",
            MIN_LENGTH
        )));
    }

    let classes = [
        (options.use_lowercase, LOWERCASE),
        (options.use_uppercase, UPPERCASE),
        (options.use_digits, DIGITS),
        (options.use_special, SPECIAL),
    ];

    let mut rng = rand::rngs::OsRng;
    let mut pool: Vec<char> = Vec::new();
    let mut password: Vec<char> = Vec::with_capacity(options.length);

    // Seed one character per enabled class, then merge the class into the pool
    for (enabled, chars) in classes {
        if !enabled {
            continue;
        }
        let class = class_pool(chars, options.exclude_similar);
        password.push(class[rng.gen_range(0..class.len())]);
        pool.extend(class);
    }

    if pool.is_empty() {
        return Err(VaultError::InvalidGeneratorOptions(
            "at least one character class must be enabled".to_string(),
        ));
    }

    while password.len() < options.length {
        password.push(pool[rng.gen_range(0..pool.len())]);
    }

    password.shuffle(&mut rng);

    Ok(password.into_iter().collect())
}

/// Score a password and report weaknesses
///
/// Additive rubric with penalties, clamped to [0, 100]: length tiers, +15
/// per present character class, -10 for a low distinct-character ratio, -5
/// per run of three strictly consecutive code points.
pub fn assess(password: &str) -> StrengthReport {
    if password.is_empty() {
        return StrengthReport {
            score: 0,
            level: StrengthLevel::VeryWeak,
            feedback: vec!["Password must not be empty".to_string()],
        };
    }

    let mut score: i32 = 0;
    let mut feedback = Vec::new();

    let chars: Vec<char> = password.chars().collect();
    let length = chars.len();

    if length >= 12 {
        score += 25;
    } else if length >= 8 {
        score += 15;
    } else if length >= 6 {
        score += 10;
    } else {
        feedback.push("Use at least 8 characters".to_string());
    }

    let has_lower = chars.iter().any(|c| c.is_ascii_lowercase());
    let has_upper = chars.iter().any(|c| c.is_ascii_uppercase());
    let has_digit = chars.iter().any(|c| c.is_ascii_digit());
    let has_special = chars.iter().any(|c| SPECIAL.contains(*c));

    for (present, hint) in [
        (has_lower, "Add lowercase letters"),
        (has_upper, "Add uppercase letters"),
        (has_digit, "Add digits"),
        (has_special, "Add special characters"),
    ] {
        if present {
            score += 15;
        } else {
            feedback.push(hint.to_string());
        }
    }

    let distinct = {
        let mut seen: Vec<char> = chars.clone();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    };
    if (distinct as f64) < (length as f64) * 0.7 {
        score -= 10;
        feedback.push("Avoid repeated characters".to_string());
    }

    let sequential_runs = chars
        .windows(3)
        .filter(|w| {
            let (a, b, c) = (w[0] as u32, w[1] as u32, w[2] as u32);
            a + 1 == b && b + 1 == c
        })
        .count();
    if sequential_runs > 0 {
        score -= 5 * sequential_runs as i32;
        feedback.push("Avoid sequential characters (abc, 123)".to_string());
    }

    let score = score.clamp(0, 100) as u8;
    let level = match score {
        80..=100 => StrengthLevel::VeryStrong,
        60..=79 => StrengthLevel::Strong,
        40..=59 => StrengthLevel::Medium,
        20..=39 => StrengthLevel::Weak,
        _ => StrengthLevel::VeryWeak,
    };

    StrengthReport {
        score,
        level,
        feedback,
    }
}

//! Ocena jakości entropii - wzorce słabe i testy statystyczne
//!
//! Komunikaty opisują wyłącznie cechy zbiorcze, nigdy bajty entropii.

use serde::{Deserialize, Serialize};

use crate::error::{AlfaBip85Error, Result};
use crate::policy::{EntropyGrade, EntropyPolicy};

/// Minimalna długość dla testów okresowości i sekwencji
pub const PATTERN_MIN_LEN: usize = 4;

/// Najdłuższy okres sprawdzany jako powtarzający się wzorzec
const MAX_REPEAT_PERIOD: usize = 16;

/// Raport jakości entropii
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntropyQualityReport {
    /// Wynik 0-100
    pub score: u8,
    /// Czy entropia nadaje się do użycia
    pub acceptable: bool,
    pub grade: EntropyGrade,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub metrics: EntropyMetrics,
}

impl EntropyQualityReport {
    pub fn is_good(&self, policy: &EntropyPolicy) -> bool {
        self.acceptable && self.score >= policy.good_score
    }
}

/// Metryki zbiorcze (bez bajtów)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntropyMetrics {
    pub length: usize,
    pub unique_bytes: usize,
    pub shannon_bits_per_byte: f64,
    pub ones_ratio: f64,
    pub longest_run: usize,
    pub chi_square: Option<f64>,
    pub chi_square_ratio: Option<f64>,
    pub top_bucket_mass: Option<f64>,
}

/// Wykryty słaby wzorzec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakPattern {
    AllZero,
    AllOnes,
    Repeating { period: usize },
    Sequential,
}

impl WeakPattern {
    pub fn describe(&self) -> String {
        match self {
            Self::AllZero => "all bytes are zero".to_string(),
            Self::AllOnes => "all bits are set".to_string(),
            Self::Repeating { period } => format!("repeating cycle with period {}", period),
            Self::Sequential => "strictly sequential byte run".to_string(),
        }
    }
}

/// Sprawdza jakość entropii; błąd dla braków i słabych wzorców, w przeciwnym razie raport
pub fn validate_entropy_quality(entropy: &[u8], min_bits: u32) -> Result<EntropyQualityReport> {
    validate_entropy_quality_with(entropy, min_bits, &EntropyPolicy::default())
}

pub fn validate_entropy_quality_with(
    entropy: &[u8],
    min_bits: u32,
    policy: &EntropyPolicy,
) -> Result<EntropyQualityReport> {
    let actual_bits = entropy.len() * 8;
    if actual_bits < min_bits as usize {
        return Err(AlfaBip85Error::InsufficientEntropy {
            actual_bits,
            required_bits: min_bits,
        });
    }

    if let Some(pattern) = detect_weak_pattern(entropy) {
        return Err(AlfaBip85Error::WeakEntropyDetected(pattern.describe()));
    }

    if entropy.len() >= policy.chi_square_min_len {
        let histogram = histogram(entropy);
        let mass = top_bucket_mass(&histogram, entropy.len(), policy);
        if mass > policy.concentration_mass {
            return Err(AlfaBip85Error::RandomnessTestFailed(format!(
                "{:.0}% of bytes fall into {} of 256 values",
                mass * 100.0,
                concentration_buckets(policy)
            )));
        }
    }

    Ok(analyze_entropy(entropy, min_bits, policy))
}

/// Buduje raport bez zwracania błędu (warunki fatalne -> acceptable = false)
pub fn analyze_entropy(entropy: &[u8], min_bits: u32, policy: &EntropyPolicy) -> EntropyQualityReport {
    let n = entropy.len();
    let mut score: i32 = 100;
    let mut fatal = false;
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();
    let mut metrics = EntropyMetrics {
        length: n,
        ..Default::default()
    };

    if n == 0 {
        warnings.push("Entropy is empty".to_string());
        recommendations.push("Derive at least 16 bytes of entropy".to_string());
        return finish(0, true, warnings, recommendations, metrics, policy);
    }

    if n * 8 < min_bits as usize {
        fatal = true;
        score -= 50;
        warnings.push(format!(
            "Insufficient entropy: {} bits, required {}",
            n * 8,
            min_bits
        ));
        recommendations.push(format!("Request at least {} bytes", (min_bits as usize + 7) / 8));
    }

    let histogram = histogram(entropy);
    metrics.unique_bytes = histogram.iter().filter(|&&c| c > 0).count();
    metrics.shannon_bits_per_byte = shannon_entropy(&histogram, n);
    metrics.ones_ratio = ones_ratio(entropy);
    metrics.longest_run = longest_run(entropy);

    if let Some(pattern) = detect_weak_pattern(entropy) {
        fatal = true;
        score = 0;
        warnings.push(format!("Weak pattern detected: {}", pattern.describe()));
    } else {
        if n < PATTERN_MIN_LEN {
            score -= 10;
            warnings.push("Sequence too short for pattern analysis".to_string());
        } else if let Some(period) = repeating_period(entropy, 3, MAX_REPEAT_PERIOD) {
            score -= 50;
            warnings.push(format!("Repeating pattern with period {}", period));
        }

        let diversity = metrics.unique_bytes as f64 / expected_unique(n);
        if diversity < 0.6 {
            score -= 30;
            warnings.push("Low byte diversity".to_string());
        }

        let max_bits = (n.min(256) as f64).log2();
        if max_bits > 0.0 && metrics.shannon_bits_per_byte / max_bits < 0.8 {
            score -= 15;
            warnings.push("Low Shannon entropy".to_string());
        }

        if n >= PATTERN_MIN_LEN && (metrics.ones_ratio - 0.5).abs() > 0.15 {
            score -= 15;
            warnings.push("Bit balance deviates from 50%".to_string());
        }

        if metrics.longest_run >= 4 {
            score -= 20;
            warnings.push(format!("Run of {} identical bytes", metrics.longest_run));
        }
    }

    if n >= policy.chi_square_min_len {
        let chi = chi_square(&histogram, n);
        let ratio = chi / (255.0 * n as f64);
        let mass = top_bucket_mass(&histogram, n, policy);
        metrics.chi_square = Some(chi);
        metrics.chi_square_ratio = Some(ratio);
        metrics.top_bucket_mass = Some(mass);

        if mass > policy.concentration_mass {
            fatal = true;
            score -= 50;
            warnings.push("Extreme skew in byte distribution".to_string());
        } else if ratio > policy.max_chi_square_ratio {
            score -= 25;
            warnings.push("Byte distribution deviates from uniform".to_string());
        }
    }

    finish(score, fatal, warnings, recommendations, metrics, policy)
}

fn finish(
    score: i32,
    fatal: bool,
    warnings: Vec<String>,
    mut recommendations: Vec<String>,
    metrics: EntropyMetrics,
    policy: &EntropyPolicy,
) -> EntropyQualityReport {
    let score = score.clamp(0, 100) as u8;
    let acceptable = !fatal && score >= policy.acceptable_score;

    if !acceptable {
        recommendations
            .push("Do not use this entropy; verify the master seed source".to_string());
    } else if score < policy.good_score {
        recommendations.push("Consider deriving with a different index".to_string());
    }

    let grade = if acceptable {
        EntropyGrade::from_score(score, policy)
    } else {
        EntropyGrade::Weak
    };

    EntropyQualityReport {
        score,
        acceptable,
        grade,
        warnings,
        recommendations,
        metrics,
    }
}

/// Wykrywa wzorce fatalne: same zera, same jedynki, cykl o okresie <= 2, sekwencję
pub fn detect_weak_pattern(entropy: &[u8]) -> Option<WeakPattern> {
    if entropy.is_empty() {
        return None;
    }
    if entropy.iter().all(|&b| b == 0x00) {
        return Some(WeakPattern::AllZero);
    }
    if entropy.iter().all(|&b| b == 0xFF) {
        return Some(WeakPattern::AllOnes);
    }
    if entropy.len() < PATTERN_MIN_LEN {
        return None;
    }
    if let Some(period) = repeating_period(entropy, 1, 2) {
        return Some(WeakPattern::Repeating { period });
    }
    if is_sequential(entropy) {
        return Some(WeakPattern::Sequential);
    }
    None
}

// Najkrótszy okres p w [min, max] taki, że wzorzec powtarza się co najmniej dwa razy
fn repeating_period(entropy: &[u8], min: usize, max: usize) -> Option<usize> {
    (min..=max)
        .take_while(|&p| p * 2 <= entropy.len())
        .find(|&p| entropy.iter().skip(p).zip(entropy).all(|(a, b)| a == b))
}

fn is_sequential(entropy: &[u8]) -> bool {
    let ascending = entropy.windows(2).all(|w| w[1] == w[0].wrapping_add(1));
    let descending = entropy.windows(2).all(|w| w[1] == w[0].wrapping_sub(1));
    ascending || descending
}

fn histogram(entropy: &[u8]) -> [usize; 256] {
    let mut counts = [0usize; 256];
    for &b in entropy {
        counts[b as usize] += 1;
    }
    counts
}

fn shannon_entropy(histogram: &[usize; 256], n: usize) -> f64 {
    let n = n as f64;
    histogram
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

fn ones_ratio(entropy: &[u8]) -> f64 {
    let ones: u32 = entropy.iter().map(|b| b.count_ones()).sum();
    ones as f64 / (entropy.len() * 8) as f64
}

fn longest_run(entropy: &[u8]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;
    for &b in entropy {
        if Some(b) == previous {
            current += 1;
        } else {
            current = 1;
            previous = Some(b);
        }
        longest = longest.max(current);
    }
    longest
}

// Oczekiwana liczba różnych wartości w n losowych bajtach
fn expected_unique(n: usize) -> f64 {
    256.0 * (1.0 - (255.0f64 / 256.0).powi(n as i32))
}

/// Statystyka chi-kwadrat względem rozkładu jednostajnego na 256 kubełkach
pub fn chi_square(histogram: &[usize; 256], n: usize) -> f64 {
    let expected = n as f64 / 256.0;
    histogram
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

fn concentration_buckets(policy: &EntropyPolicy) -> usize {
    ((256.0 * policy.concentration_bucket_fraction).floor() as usize).max(1)
}

// Udział bajtów w najczęstszych kubełkach
fn top_bucket_mass(histogram: &[usize; 256], n: usize, policy: &EntropyPolicy) -> f64 {
    let mut sorted = *histogram;
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let top: usize = sorted.iter().take(concentration_buckets(policy)).sum();
    top as f64 / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random(len: usize) -> Vec<u8> {
        use sha2::{Digest, Sha512};
        let mut out = Vec::new();
        let mut counter = 0u32;
        while out.len() < len {
            out.extend_from_slice(&Sha512::digest(counter.to_be_bytes()));
            counter += 1;
        }
        out.truncate(len);
        out
    }

    #[test]
    fn test_all_zero_rejected() {
        let zeros = [0u8; 32];
        assert!(matches!(
            validate_entropy_quality(&zeros, 128),
            Err(AlfaBip85Error::WeakEntropyDetected(_))
        ));
        assert!(!analyze_entropy(&zeros, 128, &EntropyPolicy::default()).acceptable);
    }

    #[test]
    fn test_all_ones_rejected() {
        let ones = [0xFFu8; 32];
        assert!(matches!(
            validate_entropy_quality(&ones, 128),
            Err(AlfaBip85Error::WeakEntropyDetected(_))
        ));
        assert!(!analyze_entropy(&ones, 128, &EntropyPolicy::default()).acceptable);
    }

    #[test]
    fn test_deadbeef_not_acceptable() {
        let short = [0xDE, 0xAD, 0xBE, 0xEF, 0xDE, 0xAD, 0xBE, 0xEF];
        let report = validate_entropy_quality(&short, 64).unwrap();
        assert!(!report.acceptable);
        assert_eq!(report.grade, EntropyGrade::Weak);

        let long: Vec<u8> = short.iter().copied().cycle().take(32).collect();
        assert!(!analyze_entropy(&long, 128, &EntropyPolicy::default()).acceptable);
        assert!(matches!(
            validate_entropy_quality(&long, 128),
            Err(AlfaBip85Error::RandomnessTestFailed(_))
        ));
    }

    #[test]
    fn test_period_two_rejected() {
        let alternating: Vec<u8> = [0x55, 0xAA].iter().copied().cycle().take(16).collect();
        assert!(matches!(
            detect_weak_pattern(&alternating),
            Some(WeakPattern::Repeating { period: 2 })
        ));
    }

    #[test]
    fn test_sequential_rejected() {
        let ascending: Vec<u8> = (0xF0u8..=0xFF).chain(0x00..0x10).collect();
        assert_eq!(detect_weak_pattern(&ascending), Some(WeakPattern::Sequential));
        let descending: Vec<u8> = (0u8..32).rev().collect();
        assert_eq!(detect_weak_pattern(&descending), Some(WeakPattern::Sequential));
    }

    #[test]
    fn test_insufficient_entropy() {
        assert!(matches!(
            validate_entropy_quality(&pseudo_random(16), 256),
            Err(AlfaBip85Error::InsufficientEntropy { actual_bits: 128, required_bits: 256 })
        ));
    }

    #[test]
    fn test_random_entropy_accepted() {
        let policy = EntropyPolicy::default();
        for len in [16, 20, 24, 28, 32, 64] {
            let data = pseudo_random(len);
            let report = validate_entropy_quality(&data, (len * 8) as u32).unwrap();
            assert!(report.acceptable, "len {len}: {:?}", report.warnings);
            assert!(report.score >= policy.acceptable_score);
        }
    }

    #[test]
    fn test_chi_square_metrics_only_for_long_input() {
        let policy = EntropyPolicy::default();
        let short = analyze_entropy(&pseudo_random(16), 128, &policy);
        assert!(short.metrics.chi_square.is_none());
        let long = analyze_entropy(&pseudo_random(64), 512, &policy);
        let ratio = long.metrics.chi_square_ratio.unwrap();
        assert!(ratio < policy.max_chi_square_ratio);
    }

    #[test]
    fn test_chi_square_extremes() {
        let mut uniform = [0usize; 256];
        uniform.iter_mut().for_each(|c| *c = 1);
        assert_eq!(chi_square(&uniform, 256), 0.0);

        let mut skewed = [0usize; 256];
        skewed[7] = 64;
        assert!((chi_square(&skewed, 64) - 255.0 * 64.0).abs() < 1e-6);
    }

    #[test]
    fn test_messages_do_not_leak_bytes() {
        let data = [0u8; 32];
        let err = validate_entropy_quality(&data, 128).unwrap_err().to_string();
        assert!(!err.contains("00000000"));
    }

    #[test]
    fn test_empty_not_acceptable() {
        let report = analyze_entropy(&[], 0, &EntropyPolicy::default());
        assert!(!report.acceptable);
        assert_eq!(report.score, 0);
    }
}

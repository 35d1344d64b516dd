//! Polityka bezpieczeństwa - flagi audytu i progi jakości entropii

use serde::{Deserialize, Serialize};

use crate::crypto::DEFAULT_CLEAR_PASSES;
use crate::error::Result;

/// Ocena jakości entropii
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntropyGrade {
    /// Odrzucona
    Weak,
    /// Akceptowalna, ale poniżej progu "dobrej"
    Acceptable,
    /// Dobra
    Good,
    /// Bez żadnych zastrzeżeń
    Excellent,
}

impl EntropyGrade {
    pub fn from_score(score: u8, policy: &EntropyPolicy) -> Self {
        match score {
            100 => Self::Excellent,
            s if s >= policy.good_score => Self::Good,
            s if s >= policy.acceptable_score => Self::Acceptable,
            _ => Self::Weak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Acceptable => "acceptable",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

/// Progi heurystyk jakości entropii
///
/// Progi nie są skalibrowane względem formalnego poziomu istotności.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyPolicy {
    /// Minimalny wynik akceptacji (0-100)
    pub acceptable_score: u8,

    /// Wynik od którego entropia jest "dobra"
    pub good_score: u8,

    /// Od ilu bajtów uruchamiamy test chi-kwadrat
    pub chi_square_min_len: usize,

    /// Udział masy w najczęstszych kubełkach uznawany za skrajne skrzywienie
    pub concentration_mass: f64,

    /// Ułamek kubełków (z 256) branych do testu koncentracji
    pub concentration_bucket_fraction: f64,

    /// Znormalizowana statystyka chi-kwadrat (0..1) powyżej której karzemy wynik
    pub max_chi_square_ratio: f64,
}

impl Default for EntropyPolicy {
    fn default() -> Self {
        Self {
            acceptable_score: 70,
            good_score: 85,
            chi_square_min_len: 32,
            concentration_mass: 0.90,
            concentration_bucket_fraction: 0.05,
            max_chi_square_ratio: 0.25,
        }
    }
}

impl EntropyPolicy {
    /// Surowsze progi
    pub fn strict() -> Self {
        Self {
            acceptable_score: 80,
            good_score: 90,
            max_chi_square_ratio: 0.15,
            ..Default::default()
        }
    }
}

/// Stan audytu bezpieczeństwa - tworzony jawnie i przekazywany przez referencję
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Minimalny czas wykonania operacji (ochrona przed timing attacks)
    pub timing_attack_protection: bool,

    /// Wielokrotne nadpisywanie buforów losowymi bajtami
    pub memory_protection: bool,

    /// Walidacja jakości derywowanej entropii
    pub entropy_validation: bool,

    /// Jawna zgoda na słabą entropię ("akceptuję ryzyko")
    pub accept_weak_entropy: bool,

    /// Liczba przebiegów losowych przy czyszczeniu
    pub clear_passes: u32,

    /// Indeks od którego logujemy ostrzeżenie
    pub high_index_warning: u32,

    /// Progi jakości entropii
    pub entropy_policy: EntropyPolicy,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            timing_attack_protection: true,
            memory_protection: true,
            entropy_validation: true,
            accept_weak_entropy: false,
            clear_passes: DEFAULT_CLEAR_PASSES,
            high_index_warning: 1 << 30,
            entropy_policy: EntropyPolicy::default(),
        }
    }
}

impl SecurityConfig {
    /// Konfiguracja wysokiego bezpieczeństwa
    pub fn high_security() -> Self {
        Self {
            clear_passes: 5,
            high_index_warning: 1 << 20,
            entropy_policy: EntropyPolicy::strict(),
            ..Default::default()
        }
    }

    /// Konfiguracja do testów - bez sztucznych opóźnień
    pub fn testing() -> Self {
        Self {
            timing_attack_protection: false,
            ..Default::default()
        }
    }

    /// Wczytuje konfigurację z JSON (brakujące pola = domyślne)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Efektywna liczba przebiegów czyszczenia
    pub fn effective_clear_passes(&self) -> u32 {
        if self.memory_protection {
            self.clear_passes
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SecurityConfig::default();
        assert!(config.timing_attack_protection);
        assert!(config.memory_protection);
        assert!(config.entropy_validation);
        assert!(!config.accept_weak_entropy);
        assert_eq!(config.clear_passes, 3);
        assert_eq!(config.entropy_policy.acceptable_score, 70);
        assert_eq!(config.entropy_policy.good_score, 85);
    }

    #[test]
    fn test_grade_from_score() {
        let policy = EntropyPolicy::default();
        assert_eq!(EntropyGrade::from_score(100, &policy), EntropyGrade::Excellent);
        assert_eq!(EntropyGrade::from_score(90, &policy), EntropyGrade::Good);
        assert_eq!(EntropyGrade::from_score(70, &policy), EntropyGrade::Acceptable);
        assert_eq!(EntropyGrade::from_score(69, &policy), EntropyGrade::Weak);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SecurityConfig::from_json(r#"{"timing_attack_protection": false}"#).unwrap();
        assert!(!config.timing_attack_protection);
        assert!(config.entropy_validation);
        assert_eq!(config.entropy_policy, EntropyPolicy::default());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(SecurityConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SecurityConfig::high_security();
        let json = config.to_json().unwrap();
        let restored = SecurityConfig::from_json(&json).unwrap();
        assert_eq!(restored.clear_passes, 5);
        assert_eq!(restored.high_index_warning, config.high_index_warning);
        assert_eq!(restored.entropy_policy.acceptable_score, 80);
        assert!(restored.timing_attack_protection);
    }

    #[test]
    fn test_memory_protection_passes() {
        let mut config = SecurityConfig::default();
        assert_eq!(config.effective_clear_passes(), 3);
        config.memory_protection = false;
        assert_eq!(config.effective_clear_passes(), 0);
    }
}

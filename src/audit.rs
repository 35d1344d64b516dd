//! Raport audytu bezpieczeństwa - migawka konfiguracji i stanu cache

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::error::Result;
use crate::policy::SecurityConfig;

/// Raport audytu (eksport do JSON dla warstwy CLI/walidacji)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAuditReport {
    /// Czas wygenerowania
    pub generated_at: DateTime<Utc>,

    /// Wersja biblioteki
    pub version: String,

    pub timing_attack_protection: bool,
    pub memory_protection: bool,
    pub entropy_validation: bool,
    pub accept_weak_entropy: bool,

    /// Efektywna liczba przebiegów czyszczenia
    pub clear_passes: u32,

    /// Statystyki cache (jeśli podpięty)
    pub cache: Option<CacheStats>,

    /// Zalecenia
    pub recommendations: Vec<String>,
}

impl SecurityAuditReport {
    pub fn collect(config: &SecurityConfig, cache: Option<CacheStats>) -> Self {
        let mut recommendations = Vec::new();

        if !config.timing_attack_protection {
            recommendations.push("Enable timing attack protection outside of tests".to_string());
        }
        if !config.memory_protection {
            recommendations.push("Enable memory protection to overwrite derived buffers".to_string());
        }
        if !config.entropy_validation {
            recommendations.push("Enable entropy validation".to_string());
        }
        if config.accept_weak_entropy {
            recommendations.push("Weak entropy is accepted; disable the risk override".to_string());
        }
        if let Some(stats) = &cache {
            if stats.entries > 0 {
                recommendations.push(format!(
                    "Derivation cache holds {} secrets in memory; clear it when idle",
                    stats.entries
                ));
            }
        }

        Self {
            generated_at: Utc::now(),
            version: crate::VERSION.to_string(),
            timing_attack_protection: config.timing_attack_protection,
            memory_protection: config.memory_protection,
            entropy_validation: config.entropy_validation,
            accept_weak_entropy: config.accept_weak_entropy,
            clear_passes: config.effective_clear_passes(),
            cache,
            recommendations,
        }
    }

    /// Wszystkie zabezpieczenia aktywne i brak nadpisania ryzyka
    pub fn is_hardened(&self) -> bool {
        self.timing_attack_protection
            && self.memory_protection
            && self.entropy_validation
            && !self.accept_weak_entropy
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

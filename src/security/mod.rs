//! Warstwa bezpieczeństwa - granice indeksów, jakość entropii, ochrona czasowa

mod boundaries;
mod quality;
mod timing;

pub use boundaries::{
    is_high_index, validate_index_boundaries, validate_index_boundaries_with,
    HIGH_INDEX_THRESHOLD, INDEX_LIMIT,
};
pub use quality::{
    analyze_entropy, chi_square, detect_weak_pattern, validate_entropy_quality,
    validate_entropy_quality_with, EntropyMetrics, EntropyQualityReport, WeakPattern,
};
pub use timing::{timing_attack_protection, Operation, TimingGuard};

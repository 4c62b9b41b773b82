//! Priority heuristic: a base score plus ROI and payback bonuses.

use crate::domain::output::Priority;

pub const BASE_SCORE: u32 = 50;

pub const ROI_EXCEPTIONAL_PCT: f64 = 200.0;
pub const ROI_EXCEPTIONAL_BONUS: u32 = 25;
pub const ROI_STRONG_PCT: f64 = 100.0;
pub const ROI_STRONG_BONUS: u32 = 15;

pub const PAYBACK_FAST_MONTHS: f64 = 6.0;
pub const PAYBACK_FAST_BONUS: u32 = 25;
pub const PAYBACK_MODERATE_MONTHS: f64 = 12.0;
pub const PAYBACK_MODERATE_BONUS: u32 = 15;

pub const HIGH_PRIORITY_SCORE: u32 = 75;
pub const MEDIUM_PRIORITY_SCORE: u32 = 50;

/// Scores unrounded metrics. A missing payback (never recovered) earns no bonus.
pub fn score(roi_percentage: f64, payback_months: Option<f64>) -> u32 {
    let roi_bonus = if roi_percentage > ROI_EXCEPTIONAL_PCT {
        ROI_EXCEPTIONAL_BONUS
    } else if roi_percentage > ROI_STRONG_PCT {
        ROI_STRONG_BONUS
    } else {
        0
    };

    let payback_bonus = match payback_months {
        Some(m) if m < PAYBACK_FAST_MONTHS => PAYBACK_FAST_BONUS,
        Some(m) if m < PAYBACK_MODERATE_MONTHS => PAYBACK_MODERATE_BONUS,
        _ => 0,
    };

    BASE_SCORE + roi_bonus + payback_bonus
}

pub fn classify(score: u32) -> Priority {
    if score >= HIGH_PRIORITY_SCORE {
        Priority::High
    } else if score >= MEDIUM_PRIORITY_SCORE {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_score_without_bonuses() {
        assert_eq!(score(100.0, Some(12.0)), 50);
        assert_eq!(score(-40.0, None), 50);
        assert_eq!(score(0.0, Some(999.0)), 50);
    }

    #[test]
    fn maximum_score() {
        assert_eq!(score(200.1, Some(5.9)), 100);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(score(200.0, Some(6.0)), 50 + 15 + 15);
        assert_eq!(score(100.5, Some(11.9)), 50 + 15 + 15);
        assert_eq!(score(250.0, None), 75);
    }

    #[test]
    fn classification_cutoffs() {
        assert_eq!(classify(100), Priority::High);
        assert_eq!(classify(75), Priority::High);
        assert_eq!(classify(74), Priority::Medium);
        assert_eq!(classify(65), Priority::Medium);
        assert_eq!(classify(50), Priority::Medium);
        assert_eq!(classify(49), Priority::Low);
    }

    #[test]
    fn recommendation_text_follows_priority() {
        assert_eq!(
            classify(80).recommendation(),
            "Strong automation candidate. Consider prioritizing this project."
        );
        assert_eq!(
            classify(65).recommendation(),
            "Viable automation opportunity. Evaluate alongside other projects."
        );
        assert_eq!(
            classify(0).recommendation(),
            "Lower priority. May need further optimization or cost reduction."
        );
    }
}

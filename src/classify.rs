//! Coarse announcement classification by keyword membership.
//!
//! Each announcement gets exactly one [`RnsType`]. The title and body are
//! lowercased and concatenated, then tested against nine keyword sets in a
//! fixed priority order; the first set with any substring hit wins and
//! anything unmatched falls through to [`RnsType::Other`]. Order matters:
//! a headline mentioning both results and a contract is a results
//! announcement.
//!
//! The keyword table and its order are heuristics carried for behavioral
//! compatibility. They live in [`ClassifierRules`] so a caller can tune
//! them without touching the classification logic.

use crate::models::RnsType;

/// Ordered keyword table driving classification.
///
/// Built once at startup; priority is the vector order.
pub struct ClassifierRules {
    rules: Vec<(RnsType, Vec<&'static str>)>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        ClassifierRules {
            rules: vec![
                (
                    RnsType::Results,
                    vec![
                        "final results",
                        "interim results",
                        "half-year results",
                        "half year results",
                        "full year results",
                        "annual results",
                        "preliminary results",
                        "quarterly results",
                        "annual report",
                        "results for the",
                    ],
                ),
                (
                    RnsType::TradingUpdate,
                    vec![
                        "trading update",
                        "trading statement",
                        "profit warning",
                        "pre-close",
                        "guidance update",
                    ],
                ),
                (
                    RnsType::Acquisition,
                    vec![
                        "acquisition",
                        "acquires",
                        "to acquire",
                        "merger",
                        "takeover",
                        "offer for",
                        "recommended cash offer",
                    ],
                ),
                (
                    RnsType::Disposal,
                    vec!["disposal", "divestment", "divests", "sale of", "sells", "to sell"],
                ),
                (
                    RnsType::Dividend,
                    vec![
                        "dividend",
                        "distribution declaration",
                        "scrip alternative",
                    ],
                ),
                (
                    RnsType::Appointment,
                    vec![
                        "appointment",
                        "appoints",
                        "board change",
                        "new chief executive",
                        "new chairman",
                        "steps down",
                        "resignation",
                    ],
                ),
                (
                    RnsType::Fundraising,
                    vec![
                        "placing",
                        "fundraising",
                        "fundraise",
                        "capital raise",
                        "rights issue",
                        "share issue",
                        "subscription",
                        "ipo",
                    ],
                ),
                (
                    RnsType::Contract,
                    vec![
                        "contract",
                        "agreement",
                        "partnership",
                        "collaboration",
                        "order win",
                        "framework award",
                    ],
                ),
                (
                    RnsType::Regulatory,
                    vec![
                        "holding(s) in company",
                        "holdings in company",
                        "total voting rights",
                        "director/pdmr",
                        "rule 8",
                        "tr-1",
                        "block listing",
                        "regulatory",
                        "notification of major",
                    ],
                ),
            ],
        }
    }
}

impl ClassifierRules {
    /// Classify a title plus optional body text.
    ///
    /// Total over all inputs: always returns one of the fixed categories,
    /// never an unlisted value.
    pub fn classify(&self, title: &str, body: &str) -> RnsType {
        let text = format!("{} {}", title, body).to_lowercase();
        for (rns_type, keywords) in &self.rules {
            if keywords.iter().any(|kw| text.contains(kw)) {
                return *rns_type;
            }
        }
        RnsType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_beats_contract() {
        let rules = ClassifierRules::default();
        // Matches both "final results" and "contract"; results wins on priority.
        assert_eq!(
            rules.classify("Final Results and new supply contract", ""),
            RnsType::Results
        );
    }

    #[test]
    fn test_dividend_without_earlier_keywords() {
        let rules = ClassifierRules::default();
        assert_eq!(rules.classify("Interim Dividend Declaration", ""), RnsType::Dividend);
    }

    #[test]
    fn test_body_text_contributes() {
        let rules = ClassifierRules::default();
        assert_eq!(
            rules.classify("Announcement", "the board declares a dividend of 3.2p"),
            RnsType::Dividend
        );
    }

    #[test]
    fn test_unmatched_is_other() {
        let rules = ClassifierRules::default();
        assert_eq!(rules.classify("Notice of AGM", ""), RnsType::Other);
        assert_eq!(rules.classify("", ""), RnsType::Other);
    }

    #[test]
    fn test_each_category_reachable() {
        let rules = ClassifierRules::default();
        let cases = [
            ("Interim Results", RnsType::Results),
            ("Trading Update", RnsType::TradingUpdate),
            ("Proposed acquisition of Widget Ltd", RnsType::Acquisition),
            ("Disposal of non-core assets", RnsType::Disposal),
            ("Final dividend timetable", RnsType::Dividend),
            ("Board Change", RnsType::Appointment),
            ("Placing to raise \u{00A3}10m", RnsType::Fundraising),
            ("Major contract win", RnsType::Contract),
            ("Total Voting Rights", RnsType::Regulatory),
            ("Publication of circular", RnsType::Other),
        ];
        for (title, expected) in cases {
            assert_eq!(rules.classify(title, ""), expected, "title: {title}");
        }
    }
}

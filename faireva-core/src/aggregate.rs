//! Weighted aggregation of indicator points into principle and total scores.
//!
//! A principle score is `Σ(points · weight) / Σ(weight)` over that principle's
//! indicators, rounded to 3 decimals. The total applies the same formula across every
//! indicator of every principle and is rounded to 2 decimals.
//!
//! Non-positive weights are summed like any other weight. A principle whose weights sum
//! to zero (in particular one without indicators) scores [`Score::NotApplicable`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    catalog::IndicatorCatalog,
    error::{Error, Result},
    model::{EvaluationResult, Principle},
};

const PRINCIPLE_DECIMALS: i32 = 3;
const TOTAL_DECIMALS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Value(f64),
    NotApplicable,
}

impl Serialize for Score {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Score::Value(value) => serializer.serialize_f64(*value),
            Score::NotApplicable => serializer.serialize_str("NA"),
        }
    }
}

impl Score {
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Value(value) => Some(*value),
            Score::NotApplicable => None,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Value(value) => write!(f, "{:.2}", value),
            Score::NotApplicable => write!(f, "NA"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub principles: BTreeMap<Principle, Score>,
    pub total: Score,
}

impl ScoreSummary {
    pub fn score(&self, principle: Principle) -> Score {
        self.principles
            .get(&principle)
            .copied()
            .unwrap_or(Score::NotApplicable)
    }

    /// Numeric score of `principle`, or [`Error::EmptyPrinciple`] when it has nothing
    /// to weigh.
    pub fn principle_score(&self, principle: Principle) -> Result<f64> {
        self.score(principle)
            .value()
            .ok_or(Error::EmptyPrinciple { principle })
    }

    pub fn total_score(&self) -> Result<f64> {
        self.total.value().ok_or(Error::EmptyEvaluation)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct WeightedSum {
    points: f64,
    weight: f64,
}

impl WeightedSum {
    fn add(&mut self, points: f64, weight: f64) {
        self.points += points * weight;
        self.weight += weight;
    }

    fn merge(&mut self, other: &WeightedSum) {
        self.points += other.points;
        self.weight += other.weight;
    }

    fn average(&self, decimals: i32) -> Score {
        if self.weight == 0.0 {
            return Score::NotApplicable;
        }
        let average = self.points / self.weight;
        if !average.is_finite() {
            return Score::NotApplicable;
        }
        Score::Value(round_to(average, decimals))
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub struct ScoreAggregator<'a> {
    catalog: &'a IndicatorCatalog,
}

impl<'a> ScoreAggregator<'a> {
    pub fn new(catalog: &'a IndicatorCatalog) -> Self {
        Self { catalog }
    }

    /// Scores every principle of `result`, annotating each indicator with its catalog
    /// description and display name along the way.
    pub fn aggregate(&self, result: &mut EvaluationResult) -> Result<ScoreSummary> {
        let mut principles = BTreeMap::new();
        let mut overall = WeightedSum::default();

        for principle in Principle::ALL {
            let mut sum = WeightedSum::default();
            for indicator in result.principle_mut(principle).values_mut() {
                let entry = self.catalog.resolve(&indicator.name)?;
                indicator.indicator = Some(entry.description.to_string());
                indicator.name_smart = Some(entry.id.to_string());

                let weight = indicator.score.weight;
                if weight <= 0.0 {
                    warn!(
                        "Indicator {} has non-positive weight {}, counting it as is",
                        entry.id, weight
                    );
                }
                sum.add(indicator.points, weight);
            }

            let score = sum.average(PRINCIPLE_DECIMALS);
            if score == Score::NotApplicable {
                warn!("No weighted indicators for principle {}", principle);
            }
            debug!("Score for principle {}: {}", principle, score);
            principles.insert(principle, score);
            overall.merge(&sum);
        }

        let total = overall.average(TOTAL_DECIMALS);
        debug!("Total score: {}", total);
        Ok(ScoreSummary { principles, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IndicatorScore, Message, RawIndicatorResult};
    use proptest::prelude::*;

    fn indicator(name: &str, points: f64, weight: f64) -> RawIndicatorResult {
        RawIndicatorResult {
            name: name.to_string(),
            points,
            score: IndicatorScore { weight },
            message: Message::Empty,
            indicator: None,
            name_smart: None,
        }
    }

    fn insert(result: &mut EvaluationResult, principle: Principle, item: RawIndicatorResult) {
        result
            .principle_mut(principle)
            .insert(item.name.clone(), item);
    }

    fn full_result() -> EvaluationResult {
        let mut result = EvaluationResult::default();
        insert(&mut result, Principle::Findable, indicator("rda_f1_01m", 1.0, 2.0));
        insert(&mut result, Principle::Findable, indicator("rda_f1_01d", 0.25, 2.0));
        insert(&mut result, Principle::Accessible, indicator("rda_a1_01m", 0.5, 1.0));
        insert(&mut result, Principle::Interoperable, indicator("rda_i1_01m", 0.0, 3.0));
        insert(&mut result, Principle::Reusable, indicator("rda_r1_01m", 1.0, 1.0));
        insert(&mut result, Principle::Reusable, indicator("rda_r1_1_01m", 0.2, 2.0));
        result
    }

    #[test]
    fn test_weighted_principle_scores() {
        let catalog = IndicatorCatalog::rda().unwrap();
        let mut result = full_result();
        let summary = ScoreAggregator::new(&catalog).aggregate(&mut result).unwrap();

        assert_eq!(summary.score(Principle::Findable), Score::Value(0.625));
        assert_eq!(summary.score(Principle::Accessible), Score::Value(0.5));
        assert_eq!(summary.score(Principle::Interoperable), Score::Value(0.0));
        assert_eq!(summary.score(Principle::Reusable), Score::Value(0.467));
        // (2.0 + 0.5 + 0.5 + 0.0 + 1.0 + 0.4) / 11
        assert_eq!(summary.total, Score::Value(0.4));
    }

    #[test]
    fn test_indicators_are_annotated() {
        let catalog = IndicatorCatalog::rda().unwrap();
        let mut result = full_result();
        ScoreAggregator::new(&catalog).aggregate(&mut result).unwrap();

        let annotated = &result.reusable["rda_r1_1_01m"];
        assert_eq!(annotated.name_smart.as_deref(), Some("RDA-R1.1-01M"));
        assert_eq!(
            annotated.indicator.as_deref(),
            Some("Metadata includes information about the licence under which the data can be reused")
        );
    }

    #[test]
    fn test_unresolved_indicator_is_an_error() {
        let catalog = IndicatorCatalog::rda().unwrap();
        let mut result = full_result();
        insert(&mut result, Principle::Accessible, indicator("rda_x9_01m", 1.0, 1.0));

        let err = ScoreAggregator::new(&catalog)
            .aggregate(&mut result)
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedIndicator { name } if name == "rda_x9_01m"));
    }

    #[test]
    fn test_empty_principle_is_not_applicable() {
        let catalog = IndicatorCatalog::rda().unwrap();
        let mut result = full_result();
        result.interoperable.clear();

        let summary = ScoreAggregator::new(&catalog).aggregate(&mut result).unwrap();
        assert_eq!(summary.score(Principle::Interoperable), Score::NotApplicable);
        assert!(matches!(
            summary.principle_score(Principle::Interoperable),
            Err(Error::EmptyPrinciple {
                principle: Principle::Interoperable
            })
        ));
        // remaining indicators still produce a total: 4.4 / 8
        assert_eq!(summary.total_score().unwrap(), 0.55);
    }

    #[test]
    fn test_empty_result_has_no_scores() {
        let catalog = IndicatorCatalog::rda().unwrap();
        let mut result = EvaluationResult::default();

        let summary = ScoreAggregator::new(&catalog).aggregate(&mut result).unwrap();
        for principle in Principle::ALL {
            assert_eq!(summary.score(principle), Score::NotApplicable);
        }
        assert!(matches!(summary.total_score(), Err(Error::EmptyEvaluation)));
        assert_eq!(summary.total.to_string(), "NA");
    }

    #[test]
    fn test_zero_weight_indicator_is_counted() {
        let catalog = IndicatorCatalog::rda().unwrap();
        let mut result = EvaluationResult::default();
        insert(&mut result, Principle::Findable, indicator("rda_f1_01m", 1.0, 0.0));
        insert(&mut result, Principle::Findable, indicator("rda_f1_01d", 0.5, 1.0));

        let summary = ScoreAggregator::new(&catalog).aggregate(&mut result).unwrap();
        assert_eq!(summary.score(Principle::Findable), Score::Value(0.5));

        let mut only_zero = EvaluationResult::default();
        insert(&mut only_zero, Principle::Findable, indicator("rda_f1_01m", 1.0, 0.0));
        let summary = ScoreAggregator::new(&catalog)
            .aggregate(&mut only_zero)
            .unwrap();
        assert_eq!(summary.score(Principle::Findable), Score::NotApplicable);
    }

    #[test]
    fn test_negative_weight_is_counted() {
        let catalog = IndicatorCatalog::rda().unwrap();
        let mut result = EvaluationResult::default();
        insert(&mut result, Principle::Findable, indicator("rda_f1_01m", 1.0, -1.0));
        insert(&mut result, Principle::Findable, indicator("rda_f1_01d", 0.5, 3.0));

        let summary = ScoreAggregator::new(&catalog).aggregate(&mut result).unwrap();
        // (-1.0 + 1.5) / 2
        assert_eq!(summary.score(Principle::Findable), Score::Value(0.25));
    }

    #[test]
    fn test_summary_serialization() {
        let summary = ScoreSummary {
            principles: BTreeMap::from([
                (Principle::Findable, Score::Value(0.5)),
                (Principle::Accessible, Score::NotApplicable),
            ]),
            total: Score::Value(0.5),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["principles"]["findable"], 0.5);
        assert_eq!(value["principles"]["accessible"], "NA");
        assert_eq!(value["total"], 0.5);
    }

    const NAMES: [&str; 8] = [
        "rda_f1_01m",
        "rda_f1_01d",
        "rda_a1_01m",
        "rda_a1_02m",
        "rda_i1_01m",
        "rda_i1_02m",
        "rda_r1_01m",
        "rda_r1_3_01m",
    ];

    proptest! {
        #[test]
        fn prop_principle_score_is_weighted_average(
            items in prop::collection::vec((0.0f64..=1.0, 0.1f64..10.0), 1..=NAMES.len())
        ) {
            let catalog = IndicatorCatalog::rda().unwrap();
            let mut result = EvaluationResult::default();
            for (i, (points, weight)) in items.iter().enumerate() {
                insert(&mut result, Principle::Findable, indicator(NAMES[i], *points, *weight));
            }
            let summary = ScoreAggregator::new(&catalog).aggregate(&mut result).unwrap();

            let weighted: f64 = items.iter().map(|(p, w)| p * w).sum();
            let weights: f64 = items.iter().map(|(_, w)| w).sum();
            let score = summary.principle_score(Principle::Findable).unwrap();
            prop_assert!((score - weighted / weights).abs() <= 0.001);
        }

        #[test]
        fn prop_total_ignores_principle_assignment(
            items in prop::collection::vec((0.0f64..=1.0, 0.1f64..10.0, 0usize..4), 1..=NAMES.len())
        ) {
            let catalog = IndicatorCatalog::rda().unwrap();
            let mut spread = EvaluationResult::default();
            let mut single = EvaluationResult::default();
            for (i, (points, weight, slot)) in items.iter().enumerate() {
                insert(&mut spread, Principle::ALL[*slot], indicator(NAMES[i], *points, *weight));
                insert(&mut single, Principle::Reusable, indicator(NAMES[i], *points, *weight));
            }
            let aggregator = ScoreAggregator::new(&catalog);
            let spread_total = aggregator.aggregate(&mut spread).unwrap().total_score().unwrap();
            let single_total = aggregator.aggregate(&mut single).unwrap().total_score().unwrap();

            let weighted: f64 = items.iter().map(|(p, w, _)| p * w).sum();
            let weights: f64 = items.iter().map(|(_, w, _)| w).sum();
            prop_assert!((spread_total - single_total).abs() <= 0.01);
            prop_assert!((spread_total - weighted / weights).abs() <= 0.005 + 1e-9);
        }
    }
}

use crate::error::PipelineError;
use crate::pipeline::types::{ActionLabels, Decision};

/// Turns a probability vector into a [`Decision`].
///
/// Stateless: the threshold is passed per call so a concurrent update is
/// visible on the very next decision.
#[derive(Debug, Clone)]
pub struct ClassificationPolicy {
    labels: ActionLabels,
}

impl ClassificationPolicy {
    pub fn new(labels: ActionLabels) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &ActionLabels {
        &self.labels
    }

    pub fn decide(&self, distribution: &[f32], threshold: f32) -> Result<Decision, PipelineError> {
        if distribution.len() != self.labels.len() {
            return Err(PipelineError::InvalidInput(format!(
                "classifier returned {} probabilities for {} labels",
                distribution.len(),
                self.labels.len()
            )));
        }

        // First occurrence wins on ties.
        let (best_index, confidence) = distribution
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (index, value)| match best {
                Some((_, best_value)) if value <= best_value || value.is_nan() => best,
                _ => Some((index, value)),
            })
            .ok_or_else(|| PipelineError::InvalidInput("empty probability vector".to_string()))?;

        let label = if confidence > threshold {
            self.labels.get(best_index).map(str::to_string)
        } else {
            None
        };

        Ok(Decision {
            label,
            confidence,
            distribution: self
                .labels
                .iter()
                .map(str::to_string)
                .zip(distribution.iter().copied())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ClassificationPolicy {
        ClassificationPolicy::new(ActionLabels::new(["doom", "other", "third"]))
    }

    #[test]
    fn picks_label_above_threshold() {
        let decision = policy().decide(&[0.1, 0.7, 0.2], 0.5).unwrap();
        assert_eq!(decision.label.as_deref(), Some("other"));
        assert_eq!(decision.confidence, 0.7);
    }

    #[test]
    fn threshold_boundary_is_open() {
        let decision = policy().decide(&[0.5, 0.3, 0.2], 0.5).unwrap();
        assert_eq!(decision.label, None);
        assert_eq!(decision.confidence, 0.5);

        let decision = policy().decide(&[0.500_1, 0.3, 0.2], 0.5).unwrap();
        assert_eq!(decision.label.as_deref(), Some("doom"));
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let decision = policy().decide(&[0.2, 0.4, 0.4], 0.1).unwrap();
        assert_eq!(decision.label.as_deref(), Some("other"));

        let decision = policy().decide(&[0.4, 0.4, 0.2], 0.1).unwrap();
        assert_eq!(decision.label.as_deref(), Some("doom"));
    }

    #[test]
    fn near_miss_still_reports_confidence() {
        let decision = policy().decide(&[0.1, 0.45, 0.45], 0.9).unwrap();
        assert!(!decision.is_detected());
        assert_eq!(decision.confidence, 0.45);
    }

    #[test]
    fn distribution_is_keyed_in_label_order() {
        let decision = policy().decide(&[0.1, 0.2, 0.7], 0.5).unwrap();
        let keys: Vec<&str> = decision.distribution.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["doom", "other", "third"]);
        assert_eq!(decision.distribution["third"], 0.7);
    }

    #[test]
    fn decisions_are_deterministic() {
        let policy = policy();
        let first = policy.decide(&[0.3, 0.3, 0.3], 0.2).unwrap();
        for _ in 0..10 {
            assert_eq!(policy.decide(&[0.3, 0.3, 0.3], 0.2).unwrap(), first);
        }
    }

    #[test]
    fn probabilities_need_not_sum_to_one() {
        let decision = policy().decide(&[3.0, 1.0, 2.0], 0.5).unwrap();
        assert_eq!(decision.label.as_deref(), Some("doom"));
        assert_eq!(decision.confidence, 3.0);
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(matches!(
            policy().decide(&[0.5, 0.5], 0.5),
            Err(PipelineError::InvalidInput(_))
        ));
    }
}

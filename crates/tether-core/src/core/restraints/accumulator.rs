/// Scales derivative contributions by the weight of the term producing them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivativeAccumulator {
    weight: f64,
}

impl DerivativeAccumulator {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    pub fn accumulate(&self, value: f64) -> f64 {
        self.weight * value
    }
}

impl Default for DerivativeAccumulator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Collects the weighted score of one evaluation and, when derivatives were
/// requested, carries the accumulator restraints use to write them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreAccumulator {
    score: f64,
    weight: f64,
    derivatives: Option<DerivativeAccumulator>,
}

impl ScoreAccumulator {
    pub fn new(weight: f64, derivatives: bool) -> Self {
        Self {
            score: 0.0,
            weight,
            derivatives: derivatives.then(|| DerivativeAccumulator::new(weight)),
        }
    }

    #[inline]
    pub fn add_score(&mut self, score: f64) {
        self.score += self.weight * score;
    }

    /// `None` when only the score is being computed.
    pub fn derivative_accumulator(&self) -> Option<&DerivativeAccumulator> {
        self.derivatives.as_ref()
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

//! Additive detection and LPR counters.
//!
//! Every counter combines by plain addition, so totals do not depend on the
//! order frames are evaluated in, nor on whether they are reduced in
//! parallel.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::matching::MatchResult;

/// `num / den`, or 0.0 when the denominator is not positive.
pub(crate) fn safe_div(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// True positive / false positive / false negative counts for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionCounts {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl DetectionCounts {
    pub fn new(tp: usize, fp: usize, fn_: usize) -> Self {
        Self { tp, fp, fn_ }
    }

    /// Counts for a single matching call.
    pub fn from_match(result: &MatchResult) -> Self {
        Self {
            tp: result.true_positives(),
            fp: result.false_positives(),
            fn_: result.false_negatives(),
        }
    }

    /// Precision = TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        safe_div(self.tp as f64, (self.tp + self.fp) as f64)
    }

    /// Recall = TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        safe_div(self.tp as f64, (self.tp + self.fn_) as f64)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        safe_div(2.0 * precision * recall, precision + recall)
    }
}

impl Add for DetectionCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
        }
    }
}

impl AddAssign for DetectionCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Plate text recognition counts over matched vehicles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LprCounts {
    /// Pairs whose normalised text matched exactly.
    pub exact: usize,
    /// Pairs compared.
    pub total: usize,
    /// Sum of per-pair character error rates.
    pub cer_sum: f64,
}

impl LprCounts {
    /// Record one compared pair.
    pub fn record(&mut self, exact: bool, cer: f64) {
        self.total += 1;
        if exact {
            self.exact += 1;
        }
        self.cer_sum += cer;
    }

    pub fn exact_match_rate(&self) -> f64 {
        safe_div(self.exact as f64, self.total as f64)
    }

    pub fn mean_cer(&self) -> f64 {
        safe_div(self.cer_sum, self.total as f64)
    }
}

impl Add for LprCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            exact: self.exact + other.exact,
            total: self.total + other.total,
            cer_sum: self.cer_sum + other.cer_sum,
        }
    }
}

impl AddAssign for LprCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Everything one frame (or a whole run) contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvaluationCounts {
    pub car: DetectionCounts,
    pub plate: DetectionCounts,
    pub lpr: LprCounts,
}

impl EvaluationCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another set of counts into this one.
    pub fn merge(&mut self, other: &EvaluationCounts) {
        *self += *other;
    }
}

impl Add for EvaluationCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            car: self.car + other.car,
            plate: self.plate + other.plate,
            lpr: self.lpr + other.lpr,
        }
    }
}

impl AddAssign for EvaluationCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for EvaluationCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a EvaluationCounts> for EvaluationCounts {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

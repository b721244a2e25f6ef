use crate::problem::Sense;
use crate::solution::normalize_zero;

/// One simplex iterate: the vertex and its objective value
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSample {
    pub objective_value: f64,
    pub x: f64,
    pub y: f64,
}

/// Vertices in pivot order, possibly with repeats from degenerate pivots
pub type Trace = Vec<VertexSample>;

/// A row of the cleaned, user-facing trace
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceEntry {
    pub step_index: usize,
    pub objective_value: f64,
    pub x: f64,
    pub y: f64,
    /// Set on the last entry only; it is the optimal vertex
    pub is_final: bool,
}

impl TraceEntry {
    pub fn sample(&self) -> VertexSample {
        VertexSample {
            objective_value: self.objective_value,
            x: self.x,
            y: self.y,
        }
    }
}

/// Drop every sample that exactly repeats an earlier one, keeping order
pub fn dedup(samples: &[VertexSample]) -> Vec<VertexSample> {
    let mut kept: Vec<VertexSample> = Vec::with_capacity(samples.len());
    for sample in samples {
        if !kept.contains(sample) {
            kept.push(*sample);
        }
    }
    kept
}

/// Turn the engine's raw trace into numbered entries in the caller's sign convention
pub fn clean(trace: &[VertexSample], sense: Sense) -> Vec<TraceEntry> {
    let signed: Vec<VertexSample> = trace
        .iter()
        .map(|s| match sense {
            Sense::Maximize => VertexSample {
                objective_value: -s.objective_value,
                ..*s
            },
            Sense::Minimize => *s,
        })
        .collect();

    let unique = dedup(&signed);
    let last = unique.len().saturating_sub(1);

    unique
        .into_iter()
        .enumerate()
        .map(|(i, s)| TraceEntry {
            step_index: i,
            objective_value: normalize_zero(s.objective_value),
            x: normalize_zero(s.x),
            y: normalize_zero(s.y),
            is_final: i == last,
        })
        .collect()
}

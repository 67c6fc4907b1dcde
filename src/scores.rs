use crate::constants;
use crate::part_perm::OligoKPerm;
use crate::types_structs::*;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_core::SeedableRng;

/// Cost of placing the oligos `perm[i]` at positions `state[i]`. Costs are
/// negative log-likelihood like: lower is better.
pub trait CostFunction {
    fn evaluate(&self, state: &[f64]) -> f64;
    fn gradient(&self, state: &[f64]) -> Vec<f64>;
}

fn sign(x: f64) -> f64 {
    if x > 0. {
        1.
    } else if x < 0. {
        -1.
    } else {
        0.
    }
}

pub struct PdfCost<'a> {
    pub dists: &'a [NormDist],
    pub perm: &'a [OligoId],
}

impl<'a> CostFunction for PdfCost<'a> {
    fn evaluate(&self, state: &[f64]) -> f64 {
        -self
            .perm
            .iter()
            .zip(state.iter())
            .map(|(id, x)| self.dists[*id].ln_pdf(*x))
            .sum::<f64>()
    }

    fn gradient(&self, state: &[f64]) -> Vec<f64> {
        self.perm
            .iter()
            .zip(state.iter())
            .map(|(id, x)| {
                let dist = &self.dists[*id];
                (x - dist.loc()) / dist.eff_scale().powi(2)
            })
            .collect()
    }
}

//Sum over oligos of the central percentile each position sits at.
pub struct PercentileCost<'a> {
    pub dists: &'a [NormDist],
    pub perm: &'a [OligoId],
}

impl<'a> CostFunction for PercentileCost<'a> {
    fn evaluate(&self, state: &[f64]) -> f64 {
        self.perm
            .iter()
            .zip(state.iter())
            .map(|(id, x)| {
                let dist = &self.dists[*id];
                2. * dist.cdf(dist.loc() + (x - dist.loc()).abs()) - 1.
            })
            .sum()
    }

    //Flat at the mean and far in the tails.
    fn gradient(&self, state: &[f64]) -> Vec<f64> {
        self.perm
            .iter()
            .zip(state.iter())
            .map(|(id, x)| {
                let dist = &self.dists[*id];
                2. * dist.pdf(*x) * sign(x - dist.loc())
            })
            .collect()
    }
}

pub fn make_cost<'a>(kind: CostKind, dists: &'a [NormDist], perm: &'a [OligoId]) -> Box<dyn CostFunction + 'a> {
    match kind {
        CostKind::Pdf => Box::new(PdfCost { dists, perm }),
        CostKind::Percentile => Box::new(PercentileCost { dists, perm }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptiResult {
    pub state: Vec<f64>,
    //None when the optimizer did not converge.
    pub cost: Option<f64>,
    pub iterations: usize,
    pub converged: bool,
}

//Pool adjacent violators. Returns the weighted least squares projection of
//vals onto non-decreasing sequences.
pub fn pava(vals: &[f64], weights: &[f64]) -> Vec<f64> {
    //(weighted mean, total weight, number of values)
    let mut blocks: Vec<(f64, f64, usize)> = Vec::with_capacity(vals.len());
    for (val, w) in vals.iter().zip(weights.iter()) {
        blocks.push((*val, *w, 1));
        while blocks.len() > 1 {
            let last = blocks[blocks.len() - 1];
            let prev = blocks[blocks.len() - 2];
            if prev.0 <= last.0 {
                break;
            }
            let weight = prev.1 + last.1;
            let mean = (prev.0 * prev.1 + last.0 * last.1) / weight;
            blocks.pop();
            let len = blocks.len();
            blocks[len - 1] = (mean, weight, prev.2 + last.2);
        }
    }
    let mut toret = Vec::with_capacity(vals.len());
    for (mean, _, count) in blocks {
        for _ in 0..count {
            toret.push(mean);
        }
    }
    toret
}

/// Maximum likelihood positions of the oligos `perm` under their priors, with
/// the constraint that positions follow the order of `perm`.
///
/// Each iteration steps along the cost gradient scaled by the priors' variances,
/// projects the result onto ordered states in the metric of the priors'
/// precisions, and halves the step until the cost does not increase. For
/// [`PdfCost`] the full step lands on the prior means, so the first accepted
/// step is the exact constrained optimum and the run settles on the next
/// iteration. The starting state is projected before the first step.
pub struct OptiDistPerm<'a> {
    pub dists: &'a [NormDist],
    pub perm: &'a [OligoId],
    pub options: OptiOptions,
}

impl<'a> OptiDistPerm<'a> {
    pub fn new(dists: &'a [NormDist], perm: &'a [OligoId], options: OptiOptions) -> OptiDistPerm<'a> {
        OptiDistPerm {
            dists,
            perm,
            options,
        }
    }

    pub fn means(&self) -> Vec<f64> {
        self.perm.iter().map(|id| self.dists[*id].loc()).collect()
    }

    fn weights(&self) -> Vec<f64> {
        self.perm
            .iter()
            .map(|id| 1. / self.dists[*id].eff_scale().powi(2))
            .collect()
    }

    pub fn cost(&self, state: &[f64]) -> f64 {
        make_cost(self.options.cost_kind, self.dists, self.perm).evaluate(state)
    }

    //Longest halving of the scaled step which does not increase the cost.
    fn line_search(
        &self,
        cost_fn: &dyn CostFunction,
        state: &[f64],
        cost: f64,
        weights: &[f64],
    ) -> Option<(Vec<f64>, f64)> {
        let direction: Vec<f64> = cost_fn
            .gradient(state)
            .iter()
            .zip(weights.iter())
            .map(|(g, w)| g / w)
            .collect();
        let longest = direction.iter().fold(0., |acc: f64, d| acc.max(d.abs()));
        let mut step = 1.;
        while step * longest >= self.options.epsilon {
            let stepped: Vec<f64> = state
                .iter()
                .zip(direction.iter())
                .map(|(x, d)| x - step * d)
                .collect();
            let candidate = pava(&stepped, weights);
            let candidate_cost = cost_fn.evaluate(&candidate);
            if candidate_cost <= cost {
                return Some((candidate, candidate_cost));
            }
            step *= 0.5;
        }
        None
    }

    pub fn run(&self, init: Option<&[f64]>) -> OptiResult {
        let means = self.means();
        let weights = self.weights();
        let start = match init {
            Some(init) if init.len() == means.len() => init.to_vec(),
            Some(init) => {
                log::debug!(
                    "Initial state of size {} does not match {} oligos, starting from the priors",
                    init.len(),
                    means.len()
                );
                means.clone()
            }
            None => means.clone(),
        };
        if start.is_empty() {
            return OptiResult {
                state: start,
                cost: Some(0.),
                iterations: 0,
                converged: true,
            };
        }

        let cost_fn = make_cost(self.options.cost_kind, self.dists, self.perm);
        let mut state = pava(&start, &weights);
        let mut cost = cost_fn.evaluate(&state);
        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.options.max_iter {
            iterations += 1;
            let (next, next_cost) = match self.line_search(cost_fn.as_ref(), &state, cost, &weights) {
                Some(found) => found,
                None => {
                    converged = true;
                    break;
                }
            };
            let change = next
                .iter()
                .zip(state.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0., f64::max);
            state = next;
            cost = next_cost;
            if change < self.options.epsilon {
                converged = true;
                break;
            }
        }

        let cost = if converged {
            Some(cost)
        } else {
            log::debug!(
                "Optimization of {:?} did not converge after {} iterations",
                self.perm,
                iterations
            );
            None
        };
        OptiResult {
            state,
            cost,
            iterations,
            converged,
        }
    }
}

/// Optimizes the positions of one kperm. With more than one start, random
/// starting points around the priors are tried as well and the best converged
/// result is kept.
pub struct OptiKPerm<'a> {
    pub kperm: &'a OligoKPerm,
    pub dists: &'a [NormDist],
    pub options: OptiOptions,
    result: Option<OptiResult>,
}

impl<'a> OptiKPerm<'a> {
    pub fn new(kperm: &'a OligoKPerm, dists: &'a [NormDist], options: OptiOptions) -> OptiKPerm<'a> {
        OptiKPerm {
            kperm,
            dists,
            options,
            result: None,
        }
    }

    pub fn run(&mut self) -> &OptiResult {
        let result = match self.result.take() {
            Some(result) => result,
            None => self.optimize(),
        };
        self.result.insert(result)
    }

    pub fn pstate(&self) -> Option<&[f64]> {
        self.result.as_ref().map(|r| r.state.as_slice())
    }

    pub fn cost(&self) -> Option<f64> {
        self.result.as_ref().and_then(|r| r.cost)
    }

    fn optimize(&self) -> OptiResult {
        let opti = OptiDistPerm::new(self.dists, self.kperm.kpermids(), self.options.clone());
        let mut best = opti.run(None);
        if self.options.n_starts <= 1 {
            return best;
        }

        let means = opti.means();
        let scales: Vec<f64> = self
            .kperm
            .kpermids()
            .iter()
            .map(|id| self.dists[*id].eff_scale())
            .collect();
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        for start in 1..self.options.n_starts {
            let init: Vec<f64> = means
                .iter()
                .zip(scales.iter())
                .map(|(m, s)| {
                    let spread = constants::RESTART_SPREAD * s;
                    m + rng.gen_range(-spread..=spread)
                })
                .collect();
            let result = opti.run(Some(&init));
            if best.converged && result.converged {
                let diff = result
                    .state
                    .iter()
                    .zip(best.state.iter())
                    .map(|(a, b)| (a - b).abs())
                    .fold(0., f64::max);
                if diff > self.options.epsilon {
                    log::debug!(
                        "Start {} of {:?} settled {} away from the best state",
                        start,
                        self.kperm.kpermids(),
                        diff
                    );
                }
            }
            if better(&result, &best) {
                best = result;
            }
        }
        best
    }
}

fn better(a: &OptiResult, b: &OptiResult) -> bool {
    match (a.cost, b.cost) {
        (Some(ca), Some(cb)) => ca < cb,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Best first; kperms whose optimization did not converge come last.
pub fn rank_kperms(kperms: &[OligoKPerm], dists: &[NormDist], options: &OptiOptions) -> Vec<(OligoKPerm, Option<f64>)> {
    let mut toret: Vec<(OligoKPerm, Option<f64>)> = kperms
        .iter()
        .map(|kperm| {
            let mut opti = OptiKPerm::new(kperm, dists, options.clone());
            let cost = opti.run().cost;
            (kperm.clone(), cost)
        })
        .collect();
    toret.sort_by_key(|(kperm, cost)| {
        (
            cost.is_none(),
            OrderedFloat(cost.unwrap_or(f64::INFINITY)),
            kperm.kpermids().to_vec(),
        )
    });
    toret
}

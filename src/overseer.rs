use crate::cyclic_paths;
use crate::errors::AsmError;
use crate::overlap_graph::OverlapGraph;
use crate::part_perm::OligoKPerm;
use crate::scaler::Scaler;
use crate::scores::OptiKPerm;
use crate::shuffler::{ShuffleOutcome, Shuffler};
use crate::types_structs::*;
use crate::utils_seqs;
use fxhash::FxHashSet;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub order: Vec<usize>,
    pub noverlaps: usize,
    pub cost: Option<f64>,
    //Last oligo links back to the first in the overlap graph.
    pub cyclic: bool,
    pub sequence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatus {
    Resolved,
    Unresolved,
    //Shuffling turned off.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainResult {
    pub oligos: Vec<usize>,
    pub status: DomainStatus,
    pub best: Option<Vec<usize>>,
    pub alternatives: usize,
    //Alternative layouts the shuffler could not merge.
    pub unmerged: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    //Oligos of each peak array along the cycle, without repeating the start.
    pub nodes: Vec<Vec<usize>>,
    pub sequence: String,
}

/// Outcome of one assembly. Every oligo index refers to the slice given to
/// [`Overseer::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyResult {
    pub candidates: Vec<Candidate>,
    pub domains: Vec<DomainResult>,
    pub cycles: Vec<CycleResult>,
    pub dead: usize,
    pub best_sequence: Option<String>,
}

impl AssemblyResult {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

pub struct Overseer {
    oligos: Vec<Oligo>,
    //Position-sorted id to caller index.
    to_caller: Vec<usize>,
    options: Options,
}

impl Overseer {
    pub fn new(oligos: &[Oligo], options: Options) -> Result<Overseer, AsmError> {
        options.validate()?;
        let mut to_caller: Vec<usize> = (0..oligos.len()).collect();
        to_caller.sort_by(|a, b| {
            oligos[*a]
                .pos()
                .partial_cmp(&oligos[*b].pos())
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(b))
        });
        let sorted = to_caller.iter().map(|i| oligos[*i].clone()).collect();
        Ok(Overseer {
            oligos: sorted,
            to_caller,
            options,
        })
    }

    pub fn oligos(&self) -> &[Oligo] {
        &self.oligos
    }

    fn caller_ids(&self, ids: &[OligoId]) -> Vec<usize> {
        ids.iter().map(|id| self.to_caller[*id]).collect()
    }

    fn sequence_of(&self, order: &[OligoId]) -> String {
        utils_seqs::pile_sequences(order.iter().map(|id| self.oligos[*id].seq()))
    }

    fn candidates(&self, graph: &OverlapGraph, orders: Vec<Vec<OligoId>>) -> Vec<Candidate> {
        let dists: Vec<NormDist> = self.oligos.iter().map(|o| o.dist().clone()).collect();
        let mut scored: Vec<(Vec<OligoId>, usize, Option<f64>, bool)> = orders
            .into_iter()
            .map(|order| {
                let noverlaps = utils_seqs::noverlaps(&order, &self.oligos, self.options.graph.min_overlap);
                let cost = match OligoKPerm::new(order.clone()) {
                    Ok(kperm) => {
                        let mut opti = OptiKPerm::new(&kperm, &dists, self.options.shuffler.opti.clone());
                        opti.run().cost
                    }
                    Err(_) => None,
                };
                let cyclic = match (order.first(), order.last()) {
                    (Some(first), Some(last)) if order.len() > 1 => {
                        match (graph.node_of(*last), graph.node_of(*first)) {
                            (Some(a), Some(b)) => graph.has_edge(a, b),
                            _ => false,
                        }
                    }
                    _ => false,
                };
                (order, noverlaps, cost, cyclic)
            })
            .collect();

        //Longest first, then most overlaps, then lowest cost.
        scored.sort_by_key(|(order, noverlaps, cost, _)| {
            (
                std::cmp::Reverse(order.len()),
                std::cmp::Reverse(*noverlaps),
                cost.is_none(),
                OrderedFloat(cost.unwrap_or(f64::INFINITY)),
                order.clone(),
            )
        });

        scored
            .into_iter()
            .map(|(order, noverlaps, cost, cyclic)| Candidate {
                sequence: self.sequence_of(&order),
                order: self.caller_ids(&order),
                noverlaps,
                cost,
                cyclic,
            })
            .collect()
    }

    fn shuffle_domains(&self, domains: Vec<Vec<OligoId>>) -> Vec<DomainResult> {
        if !self.options.shuffle {
            return domains
                .into_iter()
                .map(|domain| DomainResult {
                    oligos: self.caller_ids(&domain),
                    status: DomainStatus::Skipped,
                    best: None,
                    alternatives: 0,
                    unmerged: 0,
                })
                .collect();
        }

        let shuffler = Shuffler::new(&self.oligos, self.options.shuffler.clone());
        let outcomes: Vec<ShuffleOutcome> = domains
            .par_iter()
            .map(|domain| shuffler.run(domain))
            .collect();

        domains
            .iter()
            .zip(outcomes.into_iter())
            .map(|(domain, outcome)| {
                let status = if outcome.is_resolved() {
                    DomainStatus::Resolved
                } else {
                    log::info!("Could not resolve the order of oligos {:?}", self.caller_ids(domain));
                    DomainStatus::Unresolved
                };
                DomainResult {
                    oligos: self.caller_ids(domain),
                    status,
                    best: outcome.best().map(|b| self.caller_ids(&b.order)),
                    alternatives: outcome.ranked().len(),
                    unmerged: outcome.unmerged(),
                }
            })
            .collect()
    }

    fn cycles(&self) -> Vec<CycleResult> {
        let graph = OverlapGraph::from_peak_arrays(&self.oligos, &self.options.graph);
        let max_len = self.options.max_cycle_len.unwrap_or(usize::MAX);
        let mut seen = FxHashSet::default();
        let mut toret = vec![];
        for source in 0..graph.node_count() {
            if toret.len() >= self.options.max_cycles {
                break;
            }
            for cycle in cyclic_paths::cyclic_paths(&graph, source).with_max_len(max_len) {
                let cycle = cyclic_paths::normalize_cycle(&cycle);
                if !seen.insert(cycle.clone()) {
                    continue;
                }
                let open = &cycle[..cycle.len() - 1];
                let sequence = utils_seqs::pile_sequences(
                    open.iter()
                        .filter_map(|node| graph.oligos_of(*node).first())
                        .map(|id| self.oligos[*id].seq()),
                );
                toret.push(CycleResult {
                    nodes: open.iter().map(|node| self.caller_ids(graph.oligos_of(*node))).collect(),
                    sequence,
                });
                if toret.len() >= self.options.max_cycles {
                    break;
                }
            }
        }
        toret
    }

    pub fn run(&self) -> Result<AssemblyResult, AsmError> {
        log::info!("Assembling {} oligos", self.oligos.len());
        let graph = OverlapGraph::from_oligos(&self.oligos, &self.options.graph);
        let scaled = Scaler::new(&self.oligos, &graph, self.options.scaler.clone()).run();

        let mut seen_orders = FxHashSet::default();
        let mut orders = vec![];
        let mut seen_domains = FxHashSet::default();
        let mut domains = vec![];
        for stack in scaled.stacks.iter() {
            if seen_orders.insert(stack.order().to_vec()) {
                orders.push(stack.order().to_vec());
            }
            for domain in stack.domains(&self.oligos, self.options.scaler.nscale) {
                if domain.len() > 1 && seen_domains.insert(domain.clone()) {
                    domains.push(domain);
                }
            }
        }

        let candidates = self.candidates(&graph, orders);
        let domains = self.shuffle_domains(domains);
        let cycles = self.cycles();
        let best_sequence = candidates.first().map(|c| c.sequence.clone());

        log::info!(
            "{} candidate orders, {} domains, {} cycles, {} dead branches",
            candidates.len(),
            domains.len(),
            cycles.len(),
            scaled.dead.len()
        );
        Ok(AssemblyResult {
            candidates,
            domains,
            cycles,
            dead: scaled.dead.len(),
            best_sequence,
        })
    }
}

/// Runs independent assemblies in parallel. Results keep the order of `batches`.
pub fn assemble_batches(batches: &[Vec<Oligo>], options: &Options) -> Vec<Result<AssemblyResult, AsmError>> {
    batches
        .par_iter()
        .map(|oligos| Overseer::new(oligos, options.clone())?.run())
        .collect()
}

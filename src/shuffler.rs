use crate::part_perm::{self, OligoKPerm, Partition};
use crate::scores::OptiKPerm;
use crate::types_structs::*;
use crate::utils_dists;
use crate::utils_seqs;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::sync::Arc;

pub trait KPermFilter {
    fn keep(&self, measured: &[OligoId], permids: &[OligoId]) -> bool;
}

//Every oligo moved away from its measured rank must overlap one of its new
//neighbours.
pub struct RequireOverlapFilter<'a> {
    pub oligos: &'a [Oligo],
    pub min_overlap: usize,
}

impl<'a> KPermFilter for RequireOverlapFilter<'a> {
    fn keep(&self, measured: &[OligoId], permids: &[OligoId]) -> bool {
        for (i, id) in permids.iter().enumerate() {
            if measured[i] == *id {
                continue;
            }
            let after_prev = i > 0
                && utils_seqs::may_overlap(
                    self.oligos[permids[i - 1]].seq(),
                    self.oligos[*id].seq(),
                    self.min_overlap,
                );
            let before_next = i + 1 < permids.len()
                && utils_seqs::may_overlap(
                    self.oligos[*id].seq(),
                    self.oligos[permids[i + 1]].seq(),
                    self.min_overlap,
                );
            if !after_prev && !before_next {
                return false;
            }
        }
        true
    }
}

//Oligos of a same batch keep their measured order.
pub struct BetweenBatchFilter<'a> {
    pub oligos: &'a [Oligo],
}

impl<'a> KPermFilter for BetweenBatchFilter<'a> {
    fn keep(&self, _measured: &[OligoId], permids: &[OligoId]) -> bool {
        let mut last_in_batch: FxHashMap<usize, OligoId> = FxHashMap::default();
        for id in permids.iter() {
            if let Some(batch) = self.oligos[*id].batch_id() {
                if let Some(prev) = last_in_batch.insert(batch, *id) {
                    if prev > *id {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredOrder {
    pub order: Vec<OligoId>,
    pub noverlaps: usize,
    //None if the order was not optimized or the optimizer did not converge.
    pub cost: Option<f64>,
    //Cycles moving oligos away from their measured rank.
    pub moves: Vec<Vec<OligoId>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShuffleOutcome {
    Resolved {
        best: ScoredOrder,
        ranked: Vec<ScoredOrder>,
        unmerged: usize,
    },
    Unresolved {
        group: Vec<OligoId>,
        ranked: Vec<ScoredOrder>,
        unmerged: usize,
    },
}

impl ShuffleOutcome {
    pub fn best(&self) -> Option<&ScoredOrder> {
        match self {
            ShuffleOutcome::Resolved { best, .. } => Some(best),
            ShuffleOutcome::Unresolved { .. } => None,
        }
    }

    pub fn ranked(&self) -> &[ScoredOrder] {
        match self {
            ShuffleOutcome::Resolved { ranked, .. } => ranked,
            ShuffleOutcome::Unresolved { ranked, .. } => ranked,
        }
    }

    //Partition pairs which shared a layout but could not be merged while folding.
    pub fn unmerged(&self) -> usize {
        match self {
            ShuffleOutcome::Resolved { unmerged, .. } => *unmerged,
            ShuffleOutcome::Unresolved { unmerged, .. } => *unmerged,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ShuffleOutcome::Resolved { .. })
    }
}

/// Looks for the best reordering of a group of oligos whose measured positions
/// are too close to be trusted. Oligo ids index a position-sorted collection,
/// so the measured order of a group is its id order.
pub struct Shuffler<'a> {
    oligos: &'a [Oligo],
    dists: Vec<NormDist>,
    options: ShufflerOptions,
}

impl<'a> Shuffler<'a> {
    pub fn new(oligos: &'a [Oligo], options: ShufflerOptions) -> Shuffler<'a> {
        let dists = oligos.iter().map(|o| o.dist().clone()).collect();
        Shuffler {
            oligos,
            dists,
            options,
        }
    }

    //Each oligo with every oligo whose prior overlaps its own; duplicates removed.
    pub fn subgroups(&self, group: &[OligoId]) -> Vec<Vec<OligoId>> {
        let mut seen = FxHashSet::default();
        let mut toret = vec![];
        for id in group.iter() {
            let interval = self.oligos[*id].interval(self.options.nscale);
            let sub: Vec<OligoId> = group
                .iter()
                .copied()
                .filter(|other| {
                    utils_dists::intervals_overlap(interval, self.oligos[*other].interval(self.options.nscale))
                })
                .collect();
            if sub.len() > 1 && seen.insert(sub.clone()) {
                toret.push(sub);
            }
        }
        toret
    }

    //Admissible reorderings of a subgroup, each as its non trivial cycles.
    fn find_kperms(&self, sub: &[OligoId]) -> Vec<Vec<OligoKPerm>> {
        let overlap_filter = RequireOverlapFilter {
            oligos: self.oligos,
            min_overlap: self.options.min_overlap,
        };
        let batch_filter = BetweenBatchFilter { oligos: self.oligos };

        let mut seen = FxHashSet::default();
        let mut toret = vec![];
        let mut nperms = 0;
        for permids in sub.iter().copied().permutations(sub.len()) {
            nperms += 1;
            if nperms > self.options.max_kperms {
                log::debug!(
                    "Stopped enumerating permutations of {:?} after {}",
                    sub,
                    self.options.max_kperms
                );
                break;
            }
            if !overlap_filter.keep(sub, &permids) || !batch_filter.keep(sub, &permids) {
                continue;
            }
            let mut kperms = vec![];
            for cycle in part_perm::find_cyclicsubs(&permids) {
                if cycle.len() < 2 {
                    continue;
                }
                if let Ok(kperm) = part_perm::cperm2kperm(&cycle) {
                    kperms.push(kperm);
                }
            }
            if seen.insert(kperms.clone()) {
                toret.push(kperms);
            }
        }
        toret
    }

    fn complete_order(group: &[OligoId], part: &Partition, path: &[OligoId]) -> Vec<OligoId> {
        let moved: FxHashMap<OligoId, OligoId> = part.domain().iter().copied().zip(path.iter().copied()).collect();
        group
            .iter()
            .map(|id| moved.get(id).copied().unwrap_or(*id))
            .collect()
    }

    fn max_noverlaps(&self, group: &[OligoId], part: &Partition) -> usize {
        part.paths()
            .map(|path| {
                let order = Shuffler::complete_order(group, part, &path);
                utils_seqs::noverlaps(&order, self.oligos, self.options.min_overlap)
            })
            .max()
            .unwrap_or(0)
    }

    /// Partitions of compatible kperms over the group. Subgroups are folded in
    /// one at a time, keeping only partitions with the most overlaps and merging
    /// those which differ only around the subgroup.
    pub fn partitions(&self, group: &[OligoId]) -> Vec<Partition> {
        self.fold_partitions(group).0
    }

    //Partitions, and the number of unmerged pairs left by the reductions.
    fn fold_partitions(&self, group: &[OligoId]) -> (Vec<Partition>, usize) {
        let mut unmerged = 0;
        let mut partitions = vec![Partition::new()];
        for sub in self.subgroups(group) {
            let candidates = self.find_kperms(&sub);
            let mut added = vec![];
            for part in partitions.iter() {
                for kperms in candidates.iter() {
                    let mut new_part = part.clone();
                    let fits = kperms
                        .iter()
                        .all(|kperm| new_part.add_in_place(Arc::new(kperm.clone())).is_ok());
                    if fits && !added.contains(&new_part) {
                        added.push(new_part);
                    }
                }
            }
            for part in added.iter_mut() {
                part.noverlaps = self.max_noverlaps(group, part);
            }
            let best = added.iter().map(|p| p.noverlaps).max().unwrap_or(0);
            added.retain(|p| p.noverlaps == best);

            let index = sub[0];
            let reduction = part_perm::reduce_partitions(&added, index, self.options.policy);
            if !reduction.unresolved.is_empty() {
                log::debug!(
                    "{} partition pairs left apart around oligo {}: {:?}",
                    reduction.unresolved.len(),
                    index,
                    reduction.unresolved
                );
            }
            unmerged += reduction.unresolved.len();
            partitions = reduction.partitions;
            log::trace!("{} partitions after subgroup {:?}", partitions.len(), sub);
        }
        (partitions, unmerged)
    }

    fn score(&self, order: Vec<OligoId>) -> ScoredOrder {
        let noverlaps = utils_seqs::noverlaps(&order, self.oligos, self.options.min_overlap);
        let moves = part_perm::find_cyclicsubs(&order)
            .into_iter()
            .filter(|c| c.len() > 1)
            .collect();
        let cost = match OligoKPerm::new(order.clone()) {
            Ok(kperm) => {
                let mut opti = OptiKPerm::new(&kperm, &self.dists, self.options.opti.clone());
                opti.run().cost
            }
            Err(_) => None,
        };
        ScoredOrder {
            order,
            noverlaps,
            cost,
            moves,
        }
    }

    pub fn run(&self, group: &[OligoId]) -> ShuffleOutcome {
        let mut group = group.to_vec();
        group.sort();
        group.dedup();
        if group.len() <= 1 {
            let best = ScoredOrder {
                order: group,
                noverlaps: 0,
                cost: None,
                moves: vec![],
            };
            return ShuffleOutcome::Resolved {
                ranked: vec![best.clone()],
                best,
                unmerged: 0,
            };
        }

        let mut orders = FxHashSet::default();
        let mut ranked = vec![];
        let (partitions, unmerged) = self.fold_partitions(&group);
        for part in partitions.iter() {
            for path in part.paths() {
                let order = Shuffler::complete_order(&group, part, &path);
                if orders.insert(order.clone()) {
                    ranked.push(self.score(order));
                }
            }
        }
        ranked.sort_by_key(|s| {
            (
                std::cmp::Reverse(s.noverlaps),
                s.cost.is_none(),
                OrderedFloat(s.cost.unwrap_or(f64::INFINITY)),
                s.order.clone(),
            )
        });

        let resolved = match (ranked.get(0), ranked.get(1)) {
            (Some(first), _) if first.cost.is_none() => false,
            (Some(first), Some(second)) => match (first.cost, second.cost) {
                (Some(c1), Some(c2)) => {
                    first.noverlaps > second.noverlaps || c2 - c1 > self.options.opti.epsilon
                }
                _ => true,
            },
            (Some(_), None) => true,
            (None, _) => false,
        };

        log::debug!(
            "Shuffled group {:?}: {} orders, resolved {}",
            group,
            ranked.len(),
            resolved
        );
        if resolved {
            ShuffleOutcome::Resolved {
                best: ranked[0].clone(),
                ranked,
                unmerged,
            }
        } else {
            ShuffleOutcome::Unresolved {
                group,
                ranked,
                unmerged,
            }
        }
    }
}

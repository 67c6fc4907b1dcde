use crate::overlap_graph::OverlapGraph;
use crate::types_structs::*;
use crate::utils_dists;
use fxhash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackStatus {
    Growing,
    Terminal,
    Dead,
}

//Oligos without a batch id are a batch of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BatchKey {
    Batch(usize),
    Single(OligoId),
}

fn batch_key(oligos: &[Oligo], id: OligoId) -> BatchKey {
    match oligos[id].batch_id() {
        Some(batch) => BatchKey::Batch(batch),
        None => BatchKey::Single(id),
    }
}

/// Partial assembly grown by the scaler: oligos in assembled order with the
/// base position each was given, and the rescaling fitted for each batch.
#[derive(Debug, Clone)]
pub struct Stack {
    order: Vec<OligoId>,
    stack: BTreeMap<BasePosition, Vec<OligoId>>,
    bpos: FxHashMap<OligoId, BasePosition>,
    rescales: FxHashMap<BatchKey, Rescale>,
    anchors: FxHashMap<BatchKey, Vec<(f64, f64)>>,
    status: StackStatus,
}

impl Stack {
    fn seed(oligos: &[Oligo], id: OligoId, options: &ScalerOptions) -> Stack {
        let key = batch_key(oligos, id);
        let bpos = (options.default_stretch * oligos[id].pos()).round() as BasePosition;
        let mut rescales = FxHashMap::default();
        rescales.insert(
            key,
            Rescale {
                stretch: options.default_stretch,
                bias: 0.,
            },
        );
        let mut anchors = FxHashMap::default();
        anchors.insert(key, vec![(oligos[id].pos(), bpos as f64)]);
        let mut stack = BTreeMap::new();
        stack.insert(bpos, vec![id]);
        let mut bpos_map = FxHashMap::default();
        bpos_map.insert(id, bpos);
        Stack {
            order: vec![id],
            stack,
            bpos: bpos_map,
            rescales,
            anchors,
            status: StackStatus::Growing,
        }
    }

    pub fn order(&self) -> &[OligoId] {
        &self.order
    }

    pub fn status(&self) -> StackStatus {
        self.status
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, id: OligoId) -> bool {
        self.bpos.contains_key(&id)
    }

    pub fn bpos(&self, id: OligoId) -> Option<BasePosition> {
        self.bpos.get(&id).copied()
    }

    pub fn stack(&self) -> &BTreeMap<BasePosition, Vec<OligoId>> {
        &self.stack
    }

    pub fn rescale_of(&self, oligos: &[Oligo], id: OligoId) -> Option<Rescale> {
        self.rescales.get(&batch_key(oligos, id)).copied()
    }

    pub fn frontier(&self) -> Option<OligoId> {
        self.order.last().copied()
    }

    /// Ambiguity groups of the stack: oligos whose priors overlap at `nscale`,
    /// transitively. Each group is sorted by oligo id.
    pub fn domains(&self, oligos: &[Oligo], nscale: f64) -> Vec<Vec<OligoId>> {
        let dists: Vec<NormDist> = self.order.iter().map(|id| oligos[*id].dist().clone()).collect();
        let grouping = utils_dists::group_overlapping_normdists(&dists, nscale);
        grouping
            .groups
            .into_iter()
            .map(|group| {
                let mut ids: Vec<OligoId> = group.into_iter().map(|i| self.order[i]).collect();
                ids.sort();
                ids
            })
            .collect()
    }

    //Placed oligos with their base positions, and the frontier. Anchors and
    //rescales follow from the placements, so equal keys grow identically.
    fn key(&self) -> (Vec<(OligoId, BasePosition)>, Option<OligoId>) {
        let mut placed: Vec<(OligoId, BasePosition)> = self.bpos.iter().map(|(id, b)| (*id, *b)).collect();
        placed.sort();
        (placed, self.frontier())
    }

    fn place(&self, oligos: &[Oligo], id: OligoId, bpos: BasePosition, rescale: Rescale) -> Stack {
        let key = batch_key(oligos, id);
        let mut toret = self.clone();
        toret.order.push(id);
        toret.stack.entry(bpos).or_insert(vec![]).push(id);
        toret.bpos.insert(id, bpos);
        toret.rescales.insert(key, rescale);
        toret
            .anchors
            .entry(key)
            .or_insert(vec![])
            .push((oligos[id].pos(), bpos as f64));
        toret
    }
}

//Least squares fit of bpos = stretch * pos + bias.
fn fit_rescale(points: &[(f64, f64)], default_stretch: f64) -> Rescale {
    let n = points.len() as f64;
    let mean_pos = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_bpos = points.iter().map(|p| p.1).sum::<f64>() / n;
    let var: f64 = points.iter().map(|p| (p.0 - mean_pos).powi(2)).sum();
    let cov: f64 = points
        .iter()
        .map(|p| (p.0 - mean_pos) * (p.1 - mean_bpos))
        .sum();
    let stretch = if points.len() < 2 || var <= f64::EPSILON {
        default_stretch
    } else {
        cov / var
    };
    Rescale {
        stretch,
        bias: mean_bpos - stretch * mean_pos,
    }
}

#[derive(Debug, Clone)]
pub struct ScalerRun {
    pub stacks: Vec<Stack>,
    //Stacks whose every candidate broke the bounds.
    pub dead: Vec<Stack>,
}

/// Grows stacks of oligos along the overlap graph, branching whenever several
/// successors fit the bias and stretch bounds of their batch.
pub struct Scaler<'a> {
    oligos: &'a [Oligo],
    graph: &'a OverlapGraph,
    options: ScalerOptions,
}

impl<'a> Scaler<'a> {
    pub fn new(oligos: &'a [Oligo], graph: &'a OverlapGraph, options: ScalerOptions) -> Scaler<'a> {
        Scaler {
            oligos,
            graph,
            options,
        }
    }

    pub fn seeds(&self) -> Vec<OligoId> {
        let mut seeds: Vec<OligoId> = (0..self.graph.node_count())
            .filter(|node| self.graph.predecessors(*node).is_empty())
            .flat_map(|node| self.graph.oligos_of(node).to_vec())
            .collect();
        if seeds.is_empty() {
            let dists: Vec<NormDist> = self.oligos.iter().map(|o| o.dist().clone()).collect();
            let grouping = utils_dists::group_overlapping_normdists(&dists, self.options.nscale);
            if let Some(lowest) = grouping.groups.into_iter().next() {
                seeds = lowest;
            }
        }
        seeds
    }

    //Unplaced successors of the frontier, grouped by sequence. Within a group
    //ids come in measured order.
    fn candidates(&self, stack: &Stack) -> Vec<Vec<(OligoId, usize)>> {
        let frontier = match stack.frontier() {
            Some(frontier) => frontier,
            None => return vec![],
        };
        let fnode = match self.graph.node_of(frontier) {
            Some(node) => node,
            None => return vec![],
        };
        let mut by_seq: FxHashMap<&str, usize> = FxHashMap::default();
        let mut toret: Vec<Vec<(OligoId, usize)>> = vec![];
        for node in self.graph.successors(fnode) {
            let overlap = self.graph.overlap(fnode, node).unwrap_or(0);
            for id in self.graph.oligos_of(node) {
                if stack.contains(*id) {
                    continue;
                }
                let group = *by_seq.entry(self.oligos[*id].seq()).or_insert_with(|| {
                    toret.push(vec![]);
                    toret.len() - 1
                });
                toret[group].push((*id, overlap));
            }
        }
        for group in toret.iter_mut() {
            group.sort();
        }
        toret
    }

    //Child stack placing id after the frontier, if its batch rescale fits the bounds.
    fn extend(&self, stack: &Stack, id: OligoId, overlap: usize) -> Option<Stack> {
        let frontier = stack.frontier()?;
        let fbpos = stack.bpos(frontier)?;
        let expected = fbpos + self.oligos[frontier].size() as BasePosition - overlap as BasePosition;

        let key = batch_key(self.oligos, id);
        let mut points = stack.anchors.get(&key).cloned().unwrap_or(vec![]);
        points.push((self.oligos[id].pos(), expected as f64));
        let rescale = fit_rescale(&points, self.options.default_stretch);

        if !self.options.bstretch.contains(rescale.stretch) || !self.options.bbias.contains(rescale.bias) {
            log::trace!(
                "Rejected oligo {} after {}: stretch {} bias {}",
                id,
                frontier,
                rescale.stretch,
                rescale.bias
            );
            return None;
        }
        Some(stack.place(self.oligos, id, expected, rescale))
    }

    pub fn run(&self) -> ScalerRun {
        let mut growing: Vec<Stack> = self
            .seeds()
            .into_iter()
            .map(|id| Stack::seed(self.oligos, id, &self.options))
            .collect();
        let mut seen: FxHashSet<(Vec<(OligoId, BasePosition)>, Option<OligoId>)> = FxHashSet::default();
        growing.retain(|stack| seen.insert(stack.key()));
        let mut finished = vec![];
        let mut dead = vec![];

        let mut iteration = 0;
        while !growing.is_empty() && iteration < self.options.maxstack {
            iteration += 1;
            let mut next_growing = vec![];
            for mut stack in growing.into_iter() {
                let candidates = self.candidates(&stack);
                if candidates.is_empty() {
                    stack.status = StackStatus::Terminal;
                    finished.push(stack);
                    continue;
                }
                //Copies of a sequence are interchangeable: only the first copy
                //that fits the bounds branches.
                let children: Vec<Stack> = candidates
                    .iter()
                    .filter_map(|group| {
                        group
                            .iter()
                            .find_map(|(id, overlap)| self.extend(&stack, *id, *overlap))
                    })
                    .collect();
                if children.is_empty() {
                    stack.status = StackStatus::Dead;
                    dead.push(stack);
                    continue;
                }
                for child in children.into_iter() {
                    if seen.insert(child.key()) {
                        next_growing.push(child);
                    }
                }
            }
            growing = next_growing;
            log::trace!(
                "Scaler iteration {}: {} growing, {} finished, {} dead",
                iteration,
                growing.len(),
                finished.len(),
                dead.len()
            );
        }
        for mut stack in growing.into_iter() {
            stack.status = StackStatus::Terminal;
            finished.push(stack);
        }

        log::debug!("Scaler built {} stacks, {} dead branches", finished.len(), dead.len());
        ScalerRun {
            stacks: finished,
            dead,
        }
    }
}

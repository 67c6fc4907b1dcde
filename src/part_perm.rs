use crate::errors::AsmError;
use crate::types_structs::{BoundaryPolicy, OligoId};
use fxhash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Reordering of a fixed set of oligo ids. Ids index the position-sorted oligo
/// collection: placing `kpermids` into the sorted slots of `domain` gives the
/// new local order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OligoKPerm {
    kpermids: Vec<OligoId>,
    domain: BTreeSet<OligoId>,
    span: (OligoId, OligoId),
}

impl OligoKPerm {
    pub fn new(kpermids: Vec<OligoId>) -> Result<OligoKPerm, AsmError> {
        if kpermids.is_empty() {
            return Err(AsmError::EmptyKPerm);
        }
        let mut domain = BTreeSet::new();
        for id in kpermids.iter() {
            if !domain.insert(*id) {
                return Err(AsmError::RepeatedOligo {
                    id: *id,
                    kpermids: kpermids.clone(),
                });
            }
        }
        //Non-empty so both ends exist.
        let span = (
            *domain.iter().next().unwrap_or(&0),
            *domain.iter().next_back().unwrap_or(&0),
        );
        Ok(OligoKPerm {
            kpermids,
            domain,
            span,
        })
    }

    pub fn with_domain(kpermids: Vec<OligoId>, domain: BTreeSet<OligoId>) -> Result<OligoKPerm, AsmError> {
        let kperm = OligoKPerm::new(kpermids)?;
        if kperm.domain != domain {
            return Err(AsmError::InconsistentDomain {
                domain: domain.into_iter().collect(),
                kpermids: kperm.kpermids,
            });
        }
        Ok(kperm)
    }

    pub fn identity(domain: &BTreeSet<OligoId>) -> Result<OligoKPerm, AsmError> {
        OligoKPerm::new(domain.iter().copied().collect())
    }

    pub fn kpermids(&self) -> &[OligoId] {
        &self.kpermids
    }

    pub fn domain(&self) -> &BTreeSet<OligoId> {
        &self.domain
    }

    pub fn span(&self) -> (OligoId, OligoId) {
        self.span
    }

    pub fn len(&self) -> usize {
        self.kpermids.len()
    }

    pub fn is_identity(&self) -> bool {
        self.kpermids.iter().zip(self.domain.iter()).all(|(a, b)| a == b)
    }

    pub fn is_compatible(&self, other: &OligoKPerm) -> bool {
        self.domain.is_disjoint(&other.domain)
    }

    pub fn spans(&self, index: OligoId) -> bool {
        self.span.0 <= index && index <= self.span.1
    }

    //(domain id, id placed there) pairs.
    pub fn placements(&self) -> impl Iterator<Item = (OligoId, OligoId)> + '_ {
        self.domain.iter().copied().zip(self.kpermids.iter().copied())
    }
}

type Slot = Vec<Arc<OligoKPerm>>;

/// Set of domain-disjoint slots, each slot holding one or more alternative
/// kperms over the same domain.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    slots: Vec<Slot>,
    domain: BTreeSet<OligoId>,
    pub noverlaps: usize,
    pub pdfcost: Option<f64>,
}

impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl Partition {
    pub fn new() -> Partition {
        Partition::default()
    }

    pub fn from_kperms<I>(kperms: I) -> Result<Partition, AsmError>
    where
        I: IntoIterator<Item = OligoKPerm>,
    {
        let mut part = Partition::new();
        for kperm in kperms {
            part.add_in_place(Arc::new(kperm))?;
        }
        Ok(part)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn domain(&self) -> &BTreeSet<OligoId> {
        &self.domain
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    //Number of concrete orderings.
    pub fn npaths(&self) -> usize {
        self.slots.iter().map(|s| s.len()).product()
    }

    fn check_conflict(&self, domain: &BTreeSet<OligoId>) -> Result<(), AsmError> {
        let shared: Vec<OligoId> = self.domain.intersection(domain).copied().collect();
        if !shared.is_empty() {
            return Err(AsmError::DomainConflict {
                added: domain.iter().copied().collect(),
                shared,
            });
        }
        Ok(())
    }

    fn insert_slot(&mut self, slot: Slot) {
        let first = match slot.first() {
            Some(first) => first.clone(),
            None => return,
        };
        self.domain.extend(first.domain().iter().copied());
        let at = self
            .slots
            .iter()
            .position(|s| s[0].span().0 > first.span().0)
            .unwrap_or(self.slots.len());
        self.slots.insert(at, slot);
    }

    pub fn add(&self, kperm: Arc<OligoKPerm>) -> Result<Partition, AsmError> {
        self.check_conflict(kperm.domain())?;
        let mut toret = self.clone();
        toret.insert_slot(vec![kperm]);
        Ok(toret)
    }

    pub fn add_in_place(&mut self, kperm: Arc<OligoKPerm>) -> Result<(), AsmError> {
        self.check_conflict(kperm.domain())?;
        self.insert_slot(vec![kperm]);
        Ok(())
    }

    //Adds a slot of alternatives; they must all share a single domain.
    pub fn add_alternatives(&mut self, alternatives: Vec<Arc<OligoKPerm>>) -> Result<(), AsmError> {
        let first = match alternatives.first() {
            Some(first) => first.clone(),
            None => return Err(AsmError::EmptyKPerm),
        };
        for alt in alternatives.iter() {
            if alt.domain() != first.domain() {
                return Err(AsmError::InconsistentDomain {
                    domain: first.domain().iter().copied().collect(),
                    kpermids: alt.kpermids().to_vec(),
                });
            }
        }
        self.check_conflict(first.domain())?;
        self.insert_slot(alternatives);
        Ok(())
    }

    pub fn paths(&self) -> PartitionPaths {
        PartitionPaths {
            partition: self,
            cursor: vec![0; self.slots.len()],
            done: false,
        }
    }

    //Ordering from the first alternative of every slot.
    pub fn merge(&self) -> Vec<OligoId> {
        let choice = vec![0; self.slots.len()];
        self.ordering(&choice)
    }

    fn ordering(&self, choice: &[usize]) -> Vec<OligoId> {
        let mut placed: Vec<(OligoId, OligoId)> = self
            .slots
            .iter()
            .zip(choice.iter())
            .flat_map(|(slot, c)| slot[*c].placements())
            .collect();
        placed.sort();
        placed.into_iter().map(|(_, id)| id).collect()
    }

    fn boundary(&self, index: OligoId, policy: BoundaryPolicy) -> Option<usize> {
        let mut candidates = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s[0].spans(index))
            .map(|(i, _)| i);
        //Slots are sorted by their lowest id.
        match policy {
            BoundaryPolicy::LowestDomain => candidates.next(),
            BoundaryPolicy::HighestDomain => candidates.last(),
        }
    }

    fn layout(&self) -> Vec<&BTreeSet<OligoId>> {
        self.slots.iter().map(|s| s[0].domain()).collect()
    }
}

/// Concrete orderings of a partition, one per combination of slot
/// alternatives. An empty partition yields a single empty ordering.
pub struct PartitionPaths<'a> {
    partition: &'a Partition,
    cursor: Vec<usize>,
    done: bool,
}

impl<'a> PartitionPaths<'a> {
    pub fn restart(&mut self) {
        self.cursor.iter_mut().for_each(|c| *c = 0);
        self.done = false;
    }
}

impl<'a> Iterator for PartitionPaths<'a> {
    type Item = Vec<OligoId>;

    fn next(&mut self) -> Option<Vec<OligoId>> {
        if self.done {
            return None;
        }
        let toret = self.partition.ordering(&self.cursor);

        //Odometer increment, last slot first.
        self.done = true;
        for i in (0..self.cursor.len()).rev() {
            self.cursor[i] += 1;
            if self.cursor[i] < self.partition.slots[i].len() {
                self.done = false;
                break;
            }
            self.cursor[i] = 0;
        }
        Some(toret)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reduction {
    pub partitions: Vec<Partition>,
    //Pairs of output partitions sharing a slot layout which could not be merged.
    pub unresolved: Vec<(usize, usize)>,
}

struct ReductionKey<'a> {
    others: Vec<&'a Slot>,
    boundary: Option<&'a BTreeSet<OligoId>>,
}

impl<'a> ReductionKey<'a> {
    fn new(part: &'a Partition, index: OligoId, policy: BoundaryPolicy) -> ReductionKey<'a> {
        let bslot = part.boundary(index, policy);
        ReductionKey {
            others: part
                .slots
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != bslot)
                .map(|(_, s)| s)
                .collect(),
            boundary: bslot.map(|b| part.slots[b][0].domain()),
        }
    }

    fn matches(&self, other: &ReductionKey) -> bool {
        self.boundary == other.boundary && self.others == other.others
    }
}

fn merge_into(target: &mut Partition, other: &Partition, index: OligoId, policy: BoundaryPolicy) {
    if let (Some(bt), Some(bo)) = (target.boundary(index, policy), other.boundary(index, policy)) {
        let mut alternatives = target.slots[bt].clone();
        alternatives.extend(other.slots[bo].iter().cloned());
        alternatives.sort_by(|a, b| a.kpermids().cmp(b.kpermids()));
        alternatives.dedup_by(|a, b| a.kpermids() == b.kpermids());
        target.slots[bt] = alternatives;
    }
    target.noverlaps = usize::max(target.noverlaps, other.noverlaps);
    target.pdfcost = match (target.pdfcost, other.pdfcost) {
        (Some(a), Some(b)) => Some(f64::min(a, b)),
        (a, b) => a.or(b),
    };
}

/// Merges partitions which differ only by the alternatives of the slot found
/// at `index`. Output keeps first-occurrence order.
pub fn reduce_partitions(partitions: &[Partition], index: OligoId, policy: BoundaryPolicy) -> Reduction {
    let mut reps: Vec<Partition> = vec![];
    //Input index of each representative's first occurrence.
    let mut firsts: Vec<usize> = vec![];
    for (input_id, part) in partitions.iter().enumerate() {
        let key = ReductionKey::new(part, index, policy);
        let found = firsts
            .iter()
            .position(|i| ReductionKey::new(&partitions[*i], index, policy).matches(&key));
        match found {
            Some(rep_id) => merge_into(&mut reps[rep_id], part, index, policy),
            None => {
                firsts.push(input_id);
                reps.push(part.clone());
            }
        }
    }

    let mut unresolved = vec![];
    let mut by_layout: FxHashMap<Vec<&BTreeSet<OligoId>>, Vec<usize>> = FxHashMap::default();
    for (i, rep) in reps.iter().enumerate() {
        by_layout.entry(rep.layout()).or_insert(vec![]).push(i);
    }
    let mut reported = FxHashSet::default();
    for ids in by_layout.values() {
        for (k, i) in ids.iter().enumerate() {
            for j in ids[k + 1..].iter() {
                if reported.insert((*i, *j)) {
                    unresolved.push((*i, *j));
                }
            }
        }
    }
    unresolved.sort();

    log::trace!(
        "Reduced {} partitions to {} at index {}, {} unresolved pairs",
        partitions.len(),
        reps.len(),
        index,
        unresolved.len()
    );

    Reduction {
        partitions: reps,
        unresolved,
    }
}

//None when the two partitions differ outside the boundary slot.
pub fn reduce_pair(a: &Partition, b: &Partition, index: OligoId, policy: BoundaryPolicy) -> Option<Partition> {
    if !ReductionKey::new(a, index, policy).matches(&ReductionKey::new(b, index, policy)) {
        return None;
    }
    let mut toret = a.clone();
    merge_into(&mut toret, b, index, policy);
    Some(toret)
}

/// Cycle decomposition of a permutation: the id sitting at the k-th smallest
/// id's slot in `permids` is where that id goes. Each cycle starts from its
/// smallest id; fixed points are cycles of length one.
pub fn find_cyclicsubs(permids: &[OligoId]) -> Vec<Vec<OligoId>> {
    let mut sorted = permids.to_vec();
    sorted.sort();
    let next: FxHashMap<OligoId, OligoId> = sorted
        .iter()
        .copied()
        .zip(permids.iter().copied())
        .collect();

    let mut visited = FxHashSet::default();
    let mut toret = vec![];
    for start in sorted.iter() {
        if visited.contains(start) {
            continue;
        }
        let mut cycle = vec![*start];
        visited.insert(*start);
        let mut cur = next.get(start).copied().unwrap_or(*start);
        while cur != *start && visited.insert(cur) {
            cycle.push(cur);
            cur = next.get(&cur).copied().unwrap_or(*start);
        }
        toret.push(cycle);
    }
    toret
}

//The slot of each cycle member receives the next member; the last wraps around.
pub fn cperm2kperm(cycle: &[OligoId]) -> Result<OligoKPerm, AsmError> {
    if cycle.is_empty() {
        return Err(AsmError::EmptyKPerm);
    }
    let mut moved: FxHashMap<OligoId, OligoId> = FxHashMap::default();
    for (k, id) in cycle.iter().enumerate() {
        moved.insert(*id, cycle[(k + 1) % cycle.len()]);
    }
    let mut domain: Vec<OligoId> = cycle.to_vec();
    domain.sort();
    let kpermids = domain
        .iter()
        .map(|slot| moved.get(slot).copied().unwrap_or(*slot))
        .collect();
    OligoKPerm::new(kpermids)
}

use crate::types_structs::NormDist;
use disjoint_sets::UnionFind;
use fxhash::FxHashMap;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistGrouping {
    //Directly overlapping pairs (i, j) with i < j.
    pub overlaps: Vec<(usize, usize)>,
    pub groups: Vec<Vec<usize>>,
}

//Closed intervals; touching bounds intersect.
pub fn intervals_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Groups distributions whose `nscale`-scaled intervals intersect,
/// transitively. Every index appears in exactly one group. Groups come out
/// ordered by their lowest interval bound and members by mean then index.
pub fn group_overlapping_normdists(dists: &[NormDist], nscale: f64) -> DistGrouping {
    let intervals: Vec<(f64, f64)> = dists.iter().map(|d| d.interval(nscale)).collect();

    //Sweep over intervals sorted by lower bound; the active list holds intervals
    //whose upper bound is not yet behind the sweep.
    let mut by_lower: Vec<usize> = (0..dists.len()).collect();
    by_lower.sort_by(|a, b| {
        intervals[*a]
            .0
            .partial_cmp(&intervals[*b].0)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    });

    let mut uf = UnionFind::new(dists.len());
    let mut overlaps = vec![];
    let mut active: Vec<usize> = vec![];
    for idx in by_lower.iter() {
        let lower = intervals[*idx].0;
        active.retain(|j| intervals[*j].1 >= lower);
        for j in active.iter() {
            overlaps.push((usize::min(*idx, *j), usize::max(*idx, *j)));
            uf.union(*idx, *j);
        }
        active.push(*idx);
    }
    overlaps.sort();

    let mut rep_to_group: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for idx in 0..dists.len() {
        let rep = uf.find(idx);
        let group = rep_to_group.entry(rep).or_insert(vec![]);
        group.push(idx);
    }

    let mut groups: Vec<Vec<usize>> = rep_to_group.into_iter().map(|(_, g)| g).collect();
    for group in groups.iter_mut() {
        group.sort_by(|a, b| {
            dists[*a]
                .loc()
                .partial_cmp(&dists[*b].loc())
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(b))
        });
    }
    let lowest = |group: &Vec<usize>| {
        group
            .iter()
            .map(|i| intervals[*i].0)
            .fold(f64::INFINITY, f64::min)
    };
    groups.sort_by(|a, b| {
        lowest(a)
            .partial_cmp(&lowest(b))
            .unwrap_or(Ordering::Equal)
            .then(a.iter().min().cmp(&b.iter().min()))
    });

    log::trace!(
        "Grouped {} distributions into {} groups at nscale {}",
        dists.len(),
        groups.len(),
        nscale
    );

    DistGrouping { overlaps, groups }
}

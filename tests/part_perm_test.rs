use oligo_asm::errors::AsmError;
use oligo_asm::part_perm::*;
use oligo_asm::types_structs::BoundaryPolicy;
use std::collections::BTreeSet;
use std::sync::Arc;

fn kperm(ids: &[usize]) -> Arc<OligoKPerm> {
    Arc::new(OligoKPerm::new(ids.to_vec()).unwrap())
}

fn partition(kperms: &[&[usize]]) -> Partition {
    let mut part = Partition::new();
    for ids in kperms.iter() {
        part.add_in_place(kperm(ids)).unwrap();
    }
    part
}

#[test]
fn kperm_test() {
    assert!(matches!(OligoKPerm::new(vec![]), Err(AsmError::EmptyKPerm)));
    assert!(matches!(
        OligoKPerm::new(vec![1, 1]),
        Err(AsmError::RepeatedOligo { id: 1, .. })
    ));
    let domain: BTreeSet<usize> = [1, 3].iter().copied().collect();
    assert!(matches!(
        OligoKPerm::with_domain(vec![1, 2], domain),
        Err(AsmError::InconsistentDomain { .. })
    ));

    let perm = OligoKPerm::new(vec![3, 1, 2]).unwrap();
    assert_eq!(perm.span(), (1, 3));
    assert_eq!(perm.domain().iter().copied().collect::<Vec<usize>>(), vec![1, 2, 3]);
    assert!(!perm.is_identity());
    assert!(perm.spans(2));
    assert!(!perm.spans(4));
    assert!(perm.is_compatible(&OligoKPerm::new(vec![5, 4]).unwrap()));
    assert!(!perm.is_compatible(&OligoKPerm::new(vec![3]).unwrap()));
}

#[test]
fn partition_add_test() {
    let empty = Partition::new();
    let part = empty.add(kperm(&[1, 0])).unwrap();
    assert!(empty.is_empty());
    assert_eq!(part.slots().len(), 1);

    let conflict = part.add(kperm(&[0, 2]));
    assert!(matches!(conflict, Err(AsmError::DomainConflict { .. })));
    if let Err(AsmError::DomainConflict { shared, .. }) = conflict {
        assert_eq!(shared, vec![0]);
    }

    let mut part = part;
    assert!(part.add_in_place(kperm(&[1])).is_err());
    part.add_in_place(kperm(&[4, 2, 3])).unwrap();
    part.add_in_place(kperm(&[5])).unwrap();

    let merged = part.merge();
    assert_eq!(merged, vec![1, 0, 4, 2, 3, 5]);
    let unique: BTreeSet<usize> = merged.iter().copied().collect();
    assert_eq!(unique.len(), merged.len());
}

#[test]
fn partition_paths_test() {
    let mut part = partition(&[&[1, 0]]);
    part.add_alternatives(vec![kperm(&[2, 3]), kperm(&[3, 2])]).unwrap();
    assert_eq!(part.npaths(), 2);

    let paths: Vec<Vec<usize>> = part.paths().collect();
    assert_eq!(paths, vec![vec![1, 0, 2, 3], vec![1, 0, 3, 2]]);
    let again: Vec<Vec<usize>> = part.paths().collect();
    assert_eq!(paths, again);

    let mut iter = part.paths();
    let first = iter.next();
    iter.restart();
    assert_eq!(iter.next(), first);

    assert!(part
        .add_alternatives(vec![kperm(&[5, 6]), kperm(&[6, 7])])
        .is_err());
}

#[test]
fn empty_partition_paths_test() {
    let part = Partition::new();
    let paths: Vec<Vec<usize>> = part.paths().collect();
    assert_eq!(paths, vec![Vec::<usize>::new()]);
    assert!(part.merge().is_empty());
}

#[test]
fn reduce_partitions_test() {
    let p1 = partition(&[&[1, 0], &[2, 3]]);
    let p2 = partition(&[&[1, 0], &[3, 2]]);
    let p3 = partition(&[&[0, 1], &[2, 3]]);
    let input = vec![p1.clone(), p2.clone(), p3.clone()];

    let reduction = reduce_partitions(&input, 2, BoundaryPolicy::LowestDomain);
    assert!(reduction.partitions.len() <= input.len());
    assert_eq!(reduction.partitions.len(), 2);
    assert_eq!(reduction.partitions[0].npaths(), 2);
    let paths: Vec<Vec<usize>> = reduction.partitions[0].paths().collect();
    assert_eq!(paths, vec![vec![1, 0, 2, 3], vec![1, 0, 3, 2]]);
    assert_eq!(reduction.partitions[1], p3);
    assert_eq!(reduction.unresolved, vec![(0, 1)]);
    for part in reduction.partitions.iter() {
        assert!(part.paths().count() >= 1);
    }

    assert!(reduce_pair(&p1, &p2, 2, BoundaryPolicy::LowestDomain).is_some());
    assert!(reduce_pair(&p1, &p3, 2, BoundaryPolicy::LowestDomain).is_none());
}

#[test]
fn reduce_duplicates_test() {
    let p1 = partition(&[&[1, 0]]);
    let reduction = reduce_partitions(&[p1.clone(), p1.clone()], 0, BoundaryPolicy::LowestDomain);
    assert_eq!(reduction.partitions.len(), 1);
    assert_eq!(reduction.partitions[0].npaths(), 1);
    assert!(reduction.unresolved.is_empty());

    let reduction = reduce_partitions(&[], 0, BoundaryPolicy::LowestDomain);
    assert!(reduction.partitions.is_empty());
}

#[test]
fn boundary_policy_test() {
    let p1 = partition(&[&[3, 0], &[2, 1]]);
    let p2 = partition(&[&[0, 3], &[2, 1]]);
    let input = vec![p1, p2];

    let lowest = reduce_partitions(&input, 2, BoundaryPolicy::LowestDomain);
    assert_eq!(lowest.partitions.len(), 1);
    assert_eq!(lowest.partitions[0].npaths(), 2);

    let highest = reduce_partitions(&input, 2, BoundaryPolicy::HighestDomain);
    assert_eq!(highest.partitions.len(), 2);
    assert_eq!(highest.unresolved, vec![(0, 1)]);
}

#[test]
fn cyclicsubs_test() {
    assert_eq!(
        find_cyclicsubs(&[1, 0, 2, 4, 3]),
        vec![vec![0, 1], vec![2], vec![3, 4]]
    );
    let cycles = find_cyclicsubs(&[0, 2, 3, 4, 1]);
    assert_eq!(cycles, vec![vec![0], vec![1, 2, 3, 4]]);

    let perm = cperm2kperm(&cycles[1]).unwrap();
    assert_eq!(perm.kpermids(), &[2, 3, 4, 1]);
    assert_eq!(perm.span(), (1, 4));
    assert!(cperm2kperm(&[]).is_err());

    let part = partition(&[&[0], perm.kpermids()]);
    assert_eq!(part.merge(), vec![0, 2, 3, 4, 1]);
}

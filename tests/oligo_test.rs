use approx::assert_abs_diff_eq;
use oligo_asm::errors::AsmError;
use oligo_asm::types_structs::*;
use oligo_asm::utils_dists;
use oligo_asm::utils_seqs;

fn dists(params: &[(f64, f64)]) -> Vec<NormDist> {
    params
        .iter()
        .map(|(loc, scale)| NormDist::new(*loc, *scale).unwrap())
        .collect()
}

#[test]
fn build_oligo_test() {
    let oligo = build_oligo(0, "ACGT", 1., 0.5).unwrap();
    assert_eq!(oligo.seq(), "acgt");
    assert_eq!(oligo.size(), 4);
    assert_eq!(oligo.bpos(), None);
    assert_eq!(oligo.batch_id(), None);
    assert_abs_diff_eq!(oligo.interval(2.).0, 0.);
    assert_abs_diff_eq!(oligo.interval(2.).1, 2.);

    let oligo = oligo.with_batch(3).with_bpos(12);
    assert_eq!(oligo.batch_id(), Some(3));
    assert_eq!(oligo.bpos(), Some(12));
}

#[test]
fn malformed_oligo_test() {
    assert!(matches!(build_oligo(4, "", 0., 1.), Err(AsmError::EmptySequence { index: 4 })));
    assert!(matches!(
        build_oligo(0, "acgn", 0., 1.),
        Err(AsmError::InvalidBase { base: 'n', .. })
    ));
    assert!(matches!(
        build_oligo(0, "acg", 0., -1.),
        Err(AsmError::NegativeUncertainty { .. })
    ));
    assert!(matches!(build_oligo(0, "acg", f64::NAN, 1.), Err(AsmError::NonFinite { .. })));
    assert!(matches!(
        build_oligo(0, "acg", 0., f64::INFINITY),
        Err(AsmError::NonFinite { .. })
    ));
}

#[test]
fn zero_uncertainty_test() {
    let oligo = build_oligo(0, "acg", 5., 0.).unwrap();
    assert_eq!(oligo.interval(1.), (5., 5.));
    assert!(oligo.dist().pdf(5.).is_finite());
    assert!(oligo.dist().pdf(5.) > 1e6);
}

#[test]
fn tail_overlap_test() {
    assert_eq!(utils_seqs::tail_overlap("gtg", "tga"), "tg");
    assert_eq!(utils_seqs::tail_overlap("agt", "tga"), "t");
    assert_eq!(utils_seqs::tail_overlap("ag", "agt"), "ag");
    assert_eq!(utils_seqs::tail_overlap("acg", "ttt"), "");
    assert_eq!(utils_seqs::overlap_len("aaa", "aaa"), 3);
    assert_eq!(utils_seqs::overlap_len("gtg", "gtg"), 3);
    assert_eq!(utils_seqs::overlap_len("ag", "agt"), 2);
    assert_eq!(utils_seqs::overlap_len("agt", "ag"), 0);
    assert!(utils_seqs::may_overlap("gaa", "aag", 2));
    assert!(!utils_seqs::may_overlap("agt", "tga", 2));
}

#[test]
fn sequence_test() {
    assert_eq!(utils_seqs::reverse_complement("aacg"), "cgtt");
    assert_eq!(utils_seqs::add_to_sequence("", "acg"), "acg");
    assert_eq!(utils_seqs::add_to_sequence("acg", "cgt"), "acgt");
    assert_eq!(utils_seqs::add_to_sequence("acg", "ttt"), "acgttt");
    assert_eq!(
        utils_seqs::pile_sequences(vec!["agt", "gtg", "tga", "gaa", "aag"]),
        "agtgaag"
    );

    let oligos: Vec<Oligo> = ["gtg", "agt", "tga", "gaa", "aag"]
        .iter()
        .enumerate()
        .map(|(i, s)| build_oligo(i, s, i as f64, 2.).unwrap())
        .collect();
    assert_eq!(utils_seqs::noverlaps(&[1, 0, 2, 3, 4], &oligos, 2), 4);
    assert_eq!(utils_seqs::noverlaps(&[0, 1, 2, 3, 4], &oligos, 2), 2);
    assert_eq!(utils_seqs::noverlaps(&[], &oligos, 2), 0);
}

#[test]
fn grouping_test() {
    let d = dists(&[(0., 1.), (1.5, 1.), (10., 1.)]);
    let grouping = utils_dists::group_overlapping_normdists(&d, 1.);
    assert_eq!(grouping.groups, vec![vec![0, 1], vec![2]]);
    assert_eq!(grouping.overlaps, vec![(0, 1)]);

    //Touching intervals are grouped.
    let d = dists(&[(0., 1.), (2., 1.)]);
    let grouping = utils_dists::group_overlapping_normdists(&d, 1.);
    assert_eq!(grouping.groups, vec![vec![0, 1]]);

    //Groups follow their lowest bound, not the input order.
    let d = dists(&[(10., 0.1), (0., 0.1), (0.5, 0.1)]);
    let grouping = utils_dists::group_overlapping_normdists(&d, 1.);
    assert_eq!(grouping.groups, vec![vec![1], vec![2], vec![0]]);

    let d = dists(&[(0., 1.), (5., 0.), (10., 1.)]);
    let grouping = utils_dists::group_overlapping_normdists(&d, 1.);
    assert_eq!(grouping.groups, vec![vec![0], vec![1], vec![2]]);
    assert!(grouping.overlaps.is_empty());

    let grouping = utils_dists::group_overlapping_normdists(&[], 1.);
    assert!(grouping.groups.is_empty());
}

#[test]
fn grouping_monotonic_test() {
    let d = dists(&[(0., 1.), (2.1, 1.), (4.3, 1.), (6.0, 1.), (9.0, 1.), (1.0, 0.2)]);
    let fine = utils_dists::group_overlapping_normdists(&d, 1.0);
    let coarse = utils_dists::group_overlapping_normdists(&d, 1.1);
    assert!(fine.groups.len() >= coarse.groups.len());
    for group in fine.groups.iter() {
        assert!(coarse
            .groups
            .iter()
            .any(|cgroup| group.iter().all(|i| cgroup.contains(i))));
    }
    let total: usize = fine.groups.iter().map(|g| g.len()).sum();
    assert_eq!(total, d.len());
}

#[test]
fn options_validate_test() {
    assert!(Options::default().validate().is_ok());

    let mut options = Options::default();
    options.graph.min_overlap = 0;
    assert!(matches!(
        options.validate(),
        Err(AsmError::InvalidOption { name: "min_overlap", .. })
    ));

    let mut options = Options::default();
    options.scaler.bbias = Bounds::new(1., -1.);
    assert!(options.validate().is_err());

    let mut options = Options::default();
    options.scaler.default_stretch = 2.;
    assert!(options.validate().is_err());

    let mut options = Options::default();
    options.shuffler.opti.epsilon = 0.;
    assert!(options.validate().is_err());

    let options = Options::default().with_overlap(3, 2.);
    assert_eq!(options.graph.min_overlap, 3);
    assert_eq!(options.shuffler.min_overlap, 3);
    assert_eq!(options.scaler.nscale, 2.);
}

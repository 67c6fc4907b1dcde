use approx::assert_abs_diff_eq;
use oligo_asm::part_perm::OligoKPerm;
use oligo_asm::scores::*;
use oligo_asm::types_structs::*;

fn two_dists() -> Vec<NormDist> {
    vec![NormDist::new(1., 0.5).unwrap(), NormDist::new(2., 0.5).unwrap()]
}

#[test]
fn pdf_cost_test() {
    let dists = two_dists();
    let good = PdfCost {
        dists: &dists,
        perm: &[0, 1],
    };
    let reversed = PdfCost {
        dists: &dists,
        perm: &[1, 0],
    };
    assert_abs_diff_eq!(good.evaluate(&[1., 2.]), 0.45158, epsilon = 1e-5);
    assert_abs_diff_eq!(reversed.evaluate(&[1., 2.]), 4.45158, epsilon = 1e-5);
    assert!(good.evaluate(&[1., 2.]) < reversed.evaluate(&[1., 2.]));
}

#[test]
fn percentile_cost_test() {
    let dists = two_dists();
    let cost = make_cost(CostKind::Percentile, &dists, &[0, 1]);
    assert_abs_diff_eq!(cost.evaluate(&[1., 2.]), 0., epsilon = 1e-9);
    let far = cost.evaluate(&[0., 3.]);
    assert!(far > 0.9 && far < 2.);
    let pdf = make_cost(CostKind::Pdf, &dists, &[0, 1]);
    assert_abs_diff_eq!(pdf.evaluate(&[1., 2.]), 0.45158, epsilon = 1e-5);
}

#[test]
fn pava_test() {
    assert_eq!(pava(&[3., 1., 2.], &[1., 1., 1.]), vec![2., 2., 2.]);
    assert_eq!(pava(&[1., 2., 3.], &[1., 1., 1.]), vec![1., 2., 3.]);
    let weighted = pava(&[2., 1.], &[3., 1.]);
    assert_abs_diff_eq!(weighted[0], 1.75);
    assert_abs_diff_eq!(weighted[1], 1.75);
    assert!(pava(&[], &[]).is_empty());
}

#[test]
fn opti_dist_perm_test() {
    let dists = two_dists();
    let opti = OptiDistPerm::new(&dists, &[0, 1], OptiOptions::default());
    let result = opti.run(None);
    assert!(result.converged);
    assert_abs_diff_eq!(result.state[0], 1., epsilon = 1e-6);
    assert_abs_diff_eq!(result.state[1], 2., epsilon = 1e-6);
    assert_abs_diff_eq!(result.cost.unwrap(), 0.45158, epsilon = 1e-5);

    //Out of order priors meet in the middle.
    let opti = OptiDistPerm::new(&dists, &[1, 0], OptiOptions::default());
    let result = opti.run(None);
    assert!(result.converged);
    assert_abs_diff_eq!(result.state[0], 1.5, epsilon = 1e-6);
    assert_abs_diff_eq!(result.state[1], 1.5, epsilon = 1e-6);
    assert_abs_diff_eq!(result.cost.unwrap(), 1.45158, epsilon = 1e-5);
    assert!(result.state[0] <= result.state[1]);
}

#[test]
fn initial_guess_test() {
    let dists = vec![
        NormDist::new(0., 1.).unwrap(),
        NormDist::new(3., 0.5).unwrap(),
        NormDist::new(1., 2.).unwrap(),
    ];
    let options = OptiOptions::default();
    let opti = OptiDistPerm::new(&dists, &[0, 1, 2], options.clone());
    let a = opti.run(Some(&[0., 0., 0.]));
    let b = opti.run(Some(&[10., -3., 7.]));
    let c = opti.run(None);
    for ((x, y), z) in a.state.iter().zip(b.state.iter()).zip(c.state.iter()) {
        assert_abs_diff_eq!(x, y, epsilon = options.epsilon);
        assert_abs_diff_eq!(x, z, epsilon = options.epsilon);
    }
    for w in a.state.windows(2) {
        assert!(w[0] <= w[1]);
    }
}

#[test]
fn non_convergence_test() {
    let dists = two_dists();
    let options = OptiOptions {
        max_iter: 1,
        ..OptiOptions::default()
    };
    let opti = OptiDistPerm::new(&dists, &[0, 1], options);
    let result = opti.run(Some(&[10., 10.]));
    assert!(!result.converged);
    assert_eq!(result.cost, None);
    assert_eq!(result.iterations, 1);
    //The first step already reached the optimum, but was not confirmed.
    assert_abs_diff_eq!(result.state[0], 1., epsilon = 1e-9);

    let opti = OptiDistPerm::new(&dists, &[0, 1], OptiOptions::default());
    let result = opti.run(Some(&[10., 10.]));
    assert!(result.converged);
    assert_eq!(result.iterations, 2);
}

#[test]
fn percentile_opti_test() {
    let dists = two_dists();
    let options = OptiOptions {
        cost_kind: CostKind::Percentile,
        ..OptiOptions::default()
    };
    let opti = OptiDistPerm::new(&dists, &[0, 1], options.clone());
    let result = opti.run(Some(&[0., 3.]));
    assert!(result.converged);
    assert!(result.iterations > 1);
    assert_abs_diff_eq!(result.state[0], 1., epsilon = 1e-5);
    assert_abs_diff_eq!(result.state[1], 2., epsilon = 1e-5);
    assert_abs_diff_eq!(result.cost.unwrap(), 0., epsilon = 1e-5);

    let opti = OptiDistPerm::new(&dists, &[1, 0], options);
    let result = opti.run(None);
    assert!(result.converged);
    assert_abs_diff_eq!(result.state[0], 1.5, epsilon = 1e-9);
    assert_abs_diff_eq!(result.state[1], 1.5, epsilon = 1e-9);
    assert_abs_diff_eq!(result.cost.unwrap(), 1.36538, epsilon = 1e-5);
}

#[test]
fn opti_kperm_test() {
    let dists = vec![
        NormDist::new(0., 1.).unwrap(),
        NormDist::new(1., 1.).unwrap(),
        NormDist::new(2., 1.).unwrap(),
    ];
    let kperm = OligoKPerm::new(vec![1, 0, 2]).unwrap();
    let mut single = OptiKPerm::new(&kperm, &dists, OptiOptions::default());
    assert!(single.pstate().is_none());
    let single_cost = single.run().cost.unwrap();
    assert!(single.pstate().is_some());
    assert_eq!(single.cost(), Some(single_cost));

    let options = OptiOptions {
        n_starts: 5,
        seed: 7,
        ..OptiOptions::default()
    };
    let mut multi = OptiKPerm::new(&kperm, &dists, options);
    let multi_cost = multi.run().cost.unwrap();
    assert_abs_diff_eq!(single_cost, multi_cost, epsilon = 1e-9);
    let state = multi.pstate().unwrap();
    assert_abs_diff_eq!(state[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(state[1], 0.5, epsilon = 1e-6);
}

#[test]
fn rank_kperms_test() {
    let dists = two_dists();
    let kperms = vec![
        OligoKPerm::new(vec![1, 0]).unwrap(),
        OligoKPerm::new(vec![0, 1]).unwrap(),
    ];
    let ranked = rank_kperms(&kperms, &dists, &OptiOptions::default());
    assert_eq!(ranked[0].0.kpermids(), &[0, 1]);
    assert_eq!(ranked[1].0.kpermids(), &[1, 0]);
    assert!(ranked[0].1.unwrap() < ranked[1].1.unwrap());
}

//! # Kinematics Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arm_lib::{
    dh_chain::TransformId,
    fwd_kin::{arm_dh_table, ForwardKinematics},
    ik::{BaseBranch, ElbowSign, IkSolver},
};
use nalgebra::Point3;

fn kinematics_benchmark(c: &mut Criterion) {
    let solver = IkSolver::default();
    let target = Point3::new(0.5, 0.6, 0.7);

    c.bench_function("IkSolver::solve", |b| {
        b.iter(|| solver.solve(black_box(&target)))
    });

    c.bench_function("IkSolver::solve_candidate", |b| {
        b.iter(|| {
            solver.solve_candidate(BaseBranch::Backward, ElbowSign::Negative, black_box(&target))
        })
    });

    let fk = ForwardKinematics::new().unwrap();

    c.bench_function("ForwardKinematics::solve", |b| {
        b.iter(|| fk.solve(black_box((0.3, 0.4, -0.9))).unwrap())
    });

    // One off cost at startup
    let table = arm_dh_table();
    c.bench_function("DhTable::build + simplify", |b| {
        b.iter(|| {
            let mut chain = table.build().unwrap();
            chain.simplify_matrices(&[TransformId::base(3)]).unwrap();
            chain
        })
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);

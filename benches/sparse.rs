#![allow(non_snake_case)]

use colsparse::{
    perm::Perm,
    sparse::{
        linalg::{
            lu::{SparseLu, SparseLuDecomposition},
            matmul::{
                sparse_dense_matmul, sparse_sparse_matmul, sparse_sparse_matmul_req,
                sparse_sparse_matmul_transpose_lhs, sparse_sparse_matmul_transpose_lhs_req,
            },
            permute::permute,
            qr::SparseQr,
        },
        ops::{add, add_req, concat_rows},
        SparseColMat,
    },
    Mat,
};
use criterion::{criterion_group, criterion_main, Criterion};
use dyn_stack::{GlobalPodBuffer, PodStack};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use reborrow::*;

fn random_sparse(rng: &mut StdRng, n: usize, per_col: usize) -> SparseColMat<u32, f64> {
    let mut triplets = Vec::new();
    for j in 0..n {
        triplets.push((j as u32, j as u32, n as f64));
        for _ in 0..per_col {
            let i = rng.gen_range(0..n) as u32;
            triplets.push((i, j as u32, rng.gen::<f64>() - 0.5));
        }
    }
    SparseColMat::try_new_from_triplets(n, n, &triplets).unwrap()
}

fn random_perm(rng: &mut StdRng, n: usize) -> Perm<u32> {
    let mut forward: Vec<u32> = (0..n as u32).collect();
    forward.shuffle(rng);
    Perm::from_forward(forward)
}

pub fn kernels(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);

    for n in [64, 256, 1024, 4096] {
        let A = random_sparse(&mut rng, n, 4);
        let B = random_sparse(&mut rng, n, 4);

        {
            let mut mem = GlobalPodBuffer::new(sparse_sparse_matmul_req::<u32, f64>(n).unwrap());
            let mut stack = PodStack::new(&mut mem);
            c.bench_function(&format!("matmul-{n}"), |b| {
                b.iter(|| {
                    sparse_sparse_matmul(A.as_ref(), B.as_ref(), 1.0, stack.rb_mut()).unwrap();
                })
            });
        }
        {
            let mut mem = GlobalPodBuffer::new(
                sparse_sparse_matmul_transpose_lhs_req::<u32, f64>(n, n).unwrap(),
            );
            let mut stack = PodStack::new(&mut mem);
            c.bench_function(&format!("matmul-tn-{n}"), |b| {
                b.iter(|| {
                    sparse_sparse_matmul_transpose_lhs(A.as_ref(), B.as_ref(), 1.0, stack.rb_mut())
                        .unwrap();
                })
            });
        }
        {
            let x = Mat::from_fn(n, 4, |_, _| rng.gen::<f64>());
            let mut acc = Mat::zeros(n, 4);
            c.bench_function(&format!("matmul-dense-{n}"), |b| {
                b.iter(|| {
                    sparse_dense_matmul(acc.as_mut(), A.as_ref(), x.as_ref(), None, 1.0);
                })
            });
        }
        {
            let mut mem = GlobalPodBuffer::new(add_req::<u32, f64>(n).unwrap());
            let mut stack = PodStack::new(&mut mem);
            c.bench_function(&format!("add-{n}"), |b| {
                b.iter(|| {
                    add(1.0, A.as_ref(), -1.0, B.as_ref(), stack.rb_mut()).unwrap();
                })
            });
        }
        {
            let row_perm = random_perm(&mut rng, n);
            let col_perm = random_perm(&mut rng, n);
            c.bench_function(&format!("permute-{n}"), |b| {
                b.iter(|| {
                    permute(A.as_ref(), row_perm.as_ref(), col_perm.as_ref()).unwrap();
                })
            });
        }
    }
}

pub fn lu(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);

    for n in [64, 256, 1024] {
        let A = random_sparse(&mut rng, n, 3);
        let rhs = Mat::from_fn(n, 1, |_, _| rng.gen::<f64>());

        let mut lu = SparseLu::<u32, f64>::new();
        c.bench_function(&format!("sparse-lu-{n}"), |b| {
            b.iter(|| {
                assert!(lu.decompose(A.as_ref()));
            })
        });

        let mut x = rhs.clone();
        c.bench_function(&format!("sparse-lu-solve-{n}"), |b| {
            b.iter(|| {
                x.as_mut().copy_from(rhs.as_ref());
                lu.solve_in_place(x.as_mut());
            })
        });
    }
}

pub fn qr(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);

    for n in [64, 256] {
        let top = random_sparse(&mut rng, n, 3);
        let bottom = random_sparse(&mut rng, n, 2);
        let A = concat_rows(top.as_ref(), bottom.as_ref()).unwrap();
        let rhs = Mat::from_fn(2 * n, 1, |_, _| rng.gen::<f64>());

        let mut qr = SparseQr::<u32, f64>::new();
        c.bench_function(&format!("sparse-qr-{n}"), |b| {
            b.iter(|| {
                assert!(qr.decompose(A.as_ref()));
            })
        });

        c.bench_function(&format!("sparse-qr-solve-{n}"), |b| {
            b.iter(|| qr.solve(rhs.as_ref()))
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = kernels, lu, qr
);
criterion_main!(benches);

use std::hint::black_box;

use benchy::{benchmark, BenchmarkRun};
use rand::thread_rng;
use smirk::{Element, Tree};

fn make_leaves(n: usize) -> Vec<Element> {
    core::iter::from_fn(|| Some(Element::secure_random(thread_rng())))
        .take(n)
        .collect()
}

#[benchmark]
pub fn append_1000(b: &mut BenchmarkRun) {
    let leaves = make_leaves(1000);

    b.run(|| {
        let mut tree = Tree::<32>::new();
        tree.extend(leaves.iter().copied()).unwrap();

        black_box(tree);
    });

    b.metrics
        .insert("hash_count".into(), zk_primitives::hash_count());

    b.metrics.insert(
        "hash_element_count".into(),
        zk_primitives::hash_element_count(),
    );
}

#[benchmark]
pub fn witness_1000(b: &mut BenchmarkRun) {
    let tree = Tree::<32>::from_leaves(make_leaves(1000)).unwrap();

    b.run(|| {
        for index in 0..tree.len() {
            black_box(tree.witness_for(index).unwrap());
        }
    });
}

benchy::main!(append_1000, witness_1000);

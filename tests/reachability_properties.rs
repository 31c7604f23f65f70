//! Randomly generated object graphs against a reachability oracle
use std::collections::VecDeque;

use marksweep::eval::{machine::runtime::Runtime, memory::object::ObjectRef};
use proptest::collection::vec;
use proptest::prelude::*;

/// Out-edges per node and roots per frame, all as node indices
#[derive(Debug, Clone)]
struct Graph {
    edges: Vec<Vec<usize>>,
    frames: Vec<Vec<usize>>,
}

fn graph() -> impl Strategy<Value = Graph> {
    (1usize..40).prop_flat_map(|n| {
        (
            vec(vec(0..n, 0..4), n),
            vec(vec(0..n, 0..4), 0..5),
        )
            .prop_map(|(edges, frames)| Graph { edges, frames })
    })
}

/// Nodes without edges become integers, the rest arrays with one
/// slot per edge. Slots are filled after every node exists so any
/// shape, cycles included, can be built.
fn build(rt: &mut Runtime, g: &Graph) -> Vec<ObjectRef> {
    let nodes: Vec<ObjectRef> = g
        .edges
        .iter()
        .enumerate()
        .map(|(i, out)| {
            if out.is_empty() {
                rt.new_integer(i as i32).unwrap()
            } else {
                rt.new_array(out.len()).unwrap()
            }
        })
        .collect();

    for (i, out) in g.edges.iter().enumerate() {
        for (slot, target) in out.iter().enumerate() {
            rt.array_set(nodes[i], slot, nodes[*target]).unwrap();
        }
    }

    for roots in &g.frames {
        let frame = rt.push_frame().unwrap();
        for r in roots {
            assert!(rt.reference(frame, nodes[*r]).unwrap());
        }
    }

    nodes
}

/// Breadth first search from the roots of the given frames
fn reachable(g: &Graph, frames: usize) -> Vec<bool> {
    let mut seen = vec![false; g.edges.len()];
    let mut queue: VecDeque<usize> = g.frames[..frames].iter().flatten().copied().collect();
    while let Some(i) = queue.pop_front() {
        if !seen[i] {
            seen[i] = true;
            queue.extend(g.edges[i].iter().copied());
        }
    }
    seen
}

fn check(rt: &Runtime, nodes: &[ObjectRef], expected: &[bool]) -> Result<(), TestCaseError> {
    for (node, live) in nodes.iter().zip(expected) {
        prop_assert_eq!(rt.is_live(*node), *live);
    }
    prop_assert_eq!(rt.object_count(), expected.iter().filter(|b| **b).count());
    prop_assert!(rt.objects().all(|o| !rt.is_marked(o)));
    Ok(())
}

proptest! {
    #[test]
    fn collect_keeps_exactly_the_reachable_objects(g in graph()) {
        let mut rt = Runtime::new();
        let nodes = build(&mut rt, &g);

        rt.collect().unwrap();
        check(&rt, &nodes, &reachable(&g, g.frames.len()))?;
    }
}

proptest! {
    #[test]
    fn unwinding_frames_frees_what_they_alone_reached(g in graph(), pops in 0usize..5) {
        let mut rt = Runtime::new();
        let nodes = build(&mut rt, &g);
        rt.collect().unwrap();

        let pops = pops.min(g.frames.len());
        for _ in 0..pops {
            prop_assert!(rt.pop_frame());
        }
        rt.collect().unwrap();
        check(&rt, &nodes, &reachable(&g, g.frames.len() - pops))?;

        let report = rt.shutdown().unwrap();
        prop_assert_eq!(report.collection.survivors, 0);
    }
}

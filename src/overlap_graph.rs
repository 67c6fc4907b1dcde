use crate::types_structs::*;
use crate::utils_dists;
use crate::utils_seqs;
use fxhash::FxHashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction;

/// Directed graph of oligos (or peak arrays of identical oligos) which can be
/// neighbours in the assembled sequence. Node weights are the oligo ids of the
/// node ordered by measured position, edge weights the overlap length.
#[derive(Debug, Clone)]
pub struct OverlapGraph {
    graph: DiGraph<Vec<OligoId>, usize>,
    oligo_to_node: FxHashMap<OligoId, usize>,
}

impl OverlapGraph {
    //One node per oligo.
    pub fn from_oligos(oligos: &[Oligo], options: &GraphOptions) -> OverlapGraph {
        let arrays: Vec<Vec<OligoId>> = (0..oligos.len()).map(|i| vec![i]).collect();
        build_graph(oligos, arrays, options)
    }

    //Oligos sharing a sequence (up to reverse complement if requested) are
    //merged into a single node.
    pub fn from_peak_arrays(oligos: &[Oligo], options: &GraphOptions) -> OverlapGraph {
        let mut seq_to_array: FxHashMap<String, usize> = FxHashMap::default();
        let mut arrays: Vec<Vec<OligoId>> = vec![];
        for (i, oligo) in oligos.iter().enumerate() {
            let key = if options.with_reverse {
                let rev = utils_seqs::reverse_complement(oligo.seq());
                if rev.as_str() < oligo.seq() {
                    rev
                } else {
                    oligo.seq().to_string()
                }
            } else {
                oligo.seq().to_string()
            };
            let array_id = *seq_to_array.entry(key).or_insert_with(|| {
                arrays.push(vec![]);
                arrays.len() - 1
            });
            arrays[array_id].push(i);
        }
        for array in arrays.iter_mut() {
            array.sort_by(|a, b| {
                oligos[*a]
                    .pos()
                    .partial_cmp(&oligos[*b].pos())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(b))
            });
        }
        build_graph(oligos, arrays, options)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_edge(&self, source: usize, target: usize) -> bool {
        if source >= self.node_count() || target >= self.node_count() {
            return false;
        }
        self.graph
            .find_edge(NodeIndex::new(source), NodeIndex::new(target))
            .is_some()
    }

    pub fn overlap(&self, source: usize, target: usize) -> Option<usize> {
        if source >= self.node_count() || target >= self.node_count() {
            return None;
        }
        self.graph
            .find_edge(NodeIndex::new(source), NodeIndex::new(target))
            .and_then(|e| self.graph.edge_weight(e).copied())
    }

    //Sorted, so that traversals do not depend on edge insertion order.
    pub fn successors(&self, node: usize) -> Vec<usize> {
        self.neighbors(node, Direction::Outgoing)
    }

    pub fn predecessors(&self, node: usize) -> Vec<usize> {
        self.neighbors(node, Direction::Incoming)
    }

    fn neighbors(&self, node: usize, dir: Direction) -> Vec<usize> {
        if node >= self.node_count() {
            return vec![];
        }
        let mut toret: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(node), dir)
            .map(|n| n.index())
            .collect();
        toret.sort();
        toret.dedup();
        toret
    }

    pub fn oligos_of(&self, node: usize) -> &[OligoId] {
        match self.graph.node_weight(NodeIndex::new(node)) {
            Some(ids) => ids,
            None => &[],
        }
    }

    pub fn node_of(&self, oligo: OligoId) -> Option<usize> {
        self.oligo_to_node.get(&oligo).copied()
    }

    //Number of nodes reachable from source, source included.
    pub fn reachable_count(&self, source: usize) -> usize {
        if source >= self.node_count() {
            return 0;
        }
        let mut bfs = Bfs::new(&self.graph, NodeIndex::new(source));
        let mut count = 0;
        while let Some(_) = bfs.next(&self.graph) {
            count += 1;
        }
        count
    }

    pub fn edges(&self) -> Vec<(usize, usize, usize)> {
        let mut toret: Vec<(usize, usize, usize)> = self
            .graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect();
        toret.sort();
        toret
    }
}

fn build_graph(oligos: &[Oligo], arrays: Vec<Vec<OligoId>>, options: &GraphOptions) -> OverlapGraph {
    let mut graph = DiGraph::<Vec<OligoId>, usize>::with_capacity(arrays.len(), arrays.len());
    let mut oligo_to_node = FxHashMap::default();
    for array in arrays.into_iter() {
        for id in array.iter() {
            oligo_to_node.insert(*id, graph.node_count());
        }
        graph.add_node(array);
    }

    let reverse: Vec<String> = if options.with_reverse {
        oligos
            .iter()
            .map(|o| utils_seqs::reverse_complement(o.seq()))
            .collect()
    } else {
        vec![]
    };

    let node_count = graph.node_count();
    for source in 0..node_count {
        for target in 0..node_count {
            let mut best = 0;
            for a in graph[NodeIndex::new(source)].iter() {
                for b in graph[NodeIndex::new(target)].iter() {
                    //An oligo never follows itself; identical copies may.
                    if a == b {
                        continue;
                    }
                    if !utils_dists::intervals_overlap(
                        oligos[*a].interval(options.nscale),
                        oligos[*b].interval(options.nscale),
                    ) {
                        continue;
                    }
                    let mut len = utils_seqs::overlap_len(oligos[*a].seq(), oligos[*b].seq());
                    if options.with_reverse {
                        len = usize::max(len, utils_seqs::overlap_len(oligos[*a].seq(), &reverse[*b]));
                    }
                    best = usize::max(best, len);
                }
            }
            if best >= options.min_overlap {
                graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), best);
            }
        }
    }

    log::debug!(
        "Overlap graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    OverlapGraph {
        graph,
        oligo_to_node,
    }
}

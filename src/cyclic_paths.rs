use crate::overlap_graph::OverlapGraph;
use fxhash::FxHashSet;

struct Frame {
    successors: Vec<usize>,
    cursor: usize,
}

/// Lazy enumeration of the simple cycles going through a source node.
/// Cycles are returned as closed node paths (`path[0] == path[last] == source`)
/// by increasing number of edges.
pub struct CyclicPaths<'a> {
    graph: &'a OverlapGraph,
    source: usize,
    max_len: usize,
    len: usize,
    started: bool,
    frames: Vec<Frame>,
    path: Vec<usize>,
    on_path: FxHashSet<usize>,
    seen: FxHashSet<Vec<(usize, usize)>>,
}

pub fn cyclic_paths(graph: &OverlapGraph, source: usize) -> CyclicPaths {
    //A simple cycle can not visit more nodes than those reachable from the source.
    let max_len = graph.reachable_count(source);
    CyclicPaths {
        graph,
        source,
        max_len,
        len: 1,
        started: false,
        frames: vec![],
        path: vec![],
        on_path: FxHashSet::default(),
        seen: FxHashSet::default(),
    }
}

impl<'a> CyclicPaths<'a> {
    pub fn with_max_len(mut self, max_len: usize) -> CyclicPaths<'a> {
        self.max_len = usize::min(self.max_len, max_len);
        self
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn restart(&mut self) {
        self.len = 1;
        self.started = false;
        self.frames.clear();
        self.path.clear();
        self.on_path.clear();
        self.seen.clear();
    }

    fn push(&mut self, node: usize) {
        self.frames.push(Frame {
            successors: self.graph.successors(node),
            cursor: 0,
        });
        self.path.push(node);
        self.on_path.insert(node);
    }

    fn pop(&mut self) {
        self.frames.pop();
        if let Some(node) = self.path.pop() {
            self.on_path.remove(&node);
        }
    }
}

impl<'a> Iterator for CyclicPaths<'a> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        loop {
            if self.len > self.max_len {
                return None;
            }
            if self.frames.is_empty() {
                if self.started {
                    self.len += 1;
                    self.started = false;
                    continue;
                }
                self.started = true;
                let source = self.source;
                self.push(source);
            }

            let next = {
                let frame = match self.frames.last_mut() {
                    Some(frame) => frame,
                    None => continue,
                };
                if frame.cursor >= frame.successors.len() {
                    None
                } else {
                    frame.cursor += 1;
                    Some(frame.successors[frame.cursor - 1])
                }
            };
            let next = match next {
                Some(next) => next,
                None => {
                    self.pop();
                    continue;
                }
            };

            //Taking the edge to next uses path.len() edges in total.
            if next == self.source {
                if self.path.len() == self.len {
                    let mut cycle = self.path.clone();
                    cycle.push(self.source);
                    let mut key: Vec<(usize, usize)> = cycle.windows(2).map(|w| (w[0], w[1])).collect();
                    key.sort();
                    if self.seen.insert(key) {
                        log::trace!("Cycle of length {} from {}: {:?}", self.len, self.source, cycle);
                        return Some(cycle);
                    }
                }
                continue;
            }
            if self.on_path.contains(&next) || self.path.len() >= self.len {
                continue;
            }
            self.push(next);
        }
    }
}

//Rotates a closed cycle so that it starts from its smallest node.
pub fn normalize_cycle(cycle: &[usize]) -> Vec<usize> {
    if cycle.len() < 2 {
        return cycle.to_vec();
    }
    let open = &cycle[..cycle.len() - 1];
    let start = open
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| **node)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut toret: Vec<usize> = open[start..].iter().chain(open[..start].iter()).copied().collect();
    toret.push(toret[0]);
    toret
}

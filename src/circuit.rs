use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{DeBruijnError, Result};
use crate::graph::{DeBruijnGraph, Edge, START_VERTEX};

/// オイラー閉路: 全辺をちょうど1回ずつ通る閉じた歩道
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    edges: Vec<Edge>,
    /// 接ぎ木した部分閉路の数
    splices: usize,
}

impl Circuit {
    /// 訪問順の辺列
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// 訪問順のラベル列
    pub fn labels(&self) -> impl Iterator<Item = u8> + '_ {
        self.edges.iter().map(|e| e.label)
    }

    pub fn splice_count(&self) -> usize {
        self.splices
    }

    /// 連続する辺がつながり、末尾が先頭の始点に戻るか
    pub fn is_closed_walk(&self) -> bool {
        let (first, last) = match (self.edges.first(), self.edges.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return true,
        };
        last.target == first.source && self.edges.windows(2).all(|w| w[0].target == w[1].source)
    }
}

/// Hierholzer 法でオイラー閉路を求める。
///
/// 頂点 `START_VERTEX` から出発し、各頂点では辺リスト中で最初の未使用出辺を
/// 辿る（並べ替えはしない）。行き詰まったら歩道を巻き戻し、未使用出辺が残る
/// 頂点で部分閉路を探索して接ぎ木する。
///
/// 走査前に `validate` で次数均衡・連結性を検査し、崩れていれば `GraphInvariant`。
/// `cancel` は部分閉路の接ぎ木ごとに確認する。
/// 終了時に未使用辺が残れば `IncompleteCircuit`（部分閉路は返さない）。
pub fn find_eulerian_circuit(graph: &DeBruijnGraph, cancel: Option<&AtomicBool>) -> Result<Circuit> {
    graph.validate()?;
    traverse(graph, cancel, |_| {})
}

/// 検査済みグラフの走査本体。`on_splice` には接ぎ木のたびに累計数を渡す
/// （キャンセル確認の直前）。
pub(crate) fn traverse(
    graph: &DeBruijnGraph,
    cancel: Option<&AtomicBool>,
    mut on_splice: impl FnMut(usize),
) -> Result<Circuit> {
    let vertex_count = graph.vertex_count();
    let edges = graph.edges();
    let total = edges.len();

    // CSR 形式の隣接リスト。頂点内の順序は辺リストの順序を保つ。
    let mut offsets = vec![0usize; vertex_count + 1];
    for e in edges {
        if e.source as usize >= vertex_count || e.target as usize >= vertex_count {
            return Err(DeBruijnError::GraphInvariant(format!(
                "edge {}->{} outside vertex range 0..{}",
                e.source, e.target, vertex_count
            )));
        }
        offsets[e.source as usize + 1] += 1;
    }
    for v in 0..vertex_count {
        offsets[v + 1] += offsets[v];
    }

    let mut adjacency = vec![0u32; total];
    let mut fill = offsets[..vertex_count].to_vec();
    for (i, e) in edges.iter().enumerate() {
        let s = e.source as usize;
        adjacency[fill[s]] = i as u32;
        fill[s] += 1;
    }

    // 各頂点の次の未使用出辺位置
    let mut cursor = offsets[..vertex_count].to_vec();

    let mut path: Vec<u32> = Vec::with_capacity(total);
    let mut circuit: Vec<u32> = Vec::with_capacity(total);
    let mut splices = 0usize;
    let mut backtracking = false;
    let mut v = START_VERTEX as usize;

    if is_cancelled(cancel) {
        return Err(DeBruijnError::Cancelled);
    }

    loop {
        if cursor[v] < offsets[v + 1] {
            if backtracking {
                // 閉路上の頂点に未使用辺あり → ここから部分閉路を接ぎ木
                backtracking = false;
                splices += 1;
                on_splice(splices);
                if is_cancelled(cancel) {
                    return Err(DeBruijnError::Cancelled);
                }
            }
            let ei = adjacency[cursor[v]];
            cursor[v] += 1;
            path.push(ei);
            v = edges[ei as usize].target as usize;
        } else {
            match path.pop() {
                Some(ei) => {
                    circuit.push(ei);
                    backtracking = true;
                    v = edges[ei as usize].source as usize;
                }
                None => break,
            }
        }
    }

    if circuit.len() != total {
        return Err(DeBruijnError::IncompleteCircuit {
            used: circuit.len(),
            total,
        });
    }

    circuit.reverse();
    debug!(order = graph.order(), edges = total, splices, "eulerian circuit found");

    Ok(Circuit {
        edges: circuit.into_iter().map(|i| edges[i as usize]).collect(),
        splices,
    })
}

#[inline]
fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|c| c.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::shuffle::shuffle_edges;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn assert_euler(graph: &DeBruijnGraph, circuit: &Circuit) {
        assert_eq!(circuit.len(), graph.edge_count());
        assert!(circuit.is_closed_walk());
        assert_eq!(circuit.edges()[0].source, START_VERTEX);
        // 多重辺 (source, label) は一意
        let used: HashSet<(u32, u8)> = circuit.edges().iter().map(|e| (e.source, e.label)).collect();
        assert_eq!(used.len(), graph.edge_count());
    }

    #[test]
    fn test_unshuffled_order_2() {
        let g = build_graph(2).unwrap();
        let c = find_eulerian_circuit(&g, None).unwrap();
        assert_euler(&g, &c);
        assert_eq!(c.labels().collect::<Vec<_>>(), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_covers_all_edges() {
        for n in 2..=12 {
            let g = build_graph(n).unwrap();
            let c = find_eulerian_circuit(&g, None).unwrap();
            assert_euler(&g, &c);
        }
    }

    #[test]
    fn test_shuffled_covers_all_edges() {
        let g = build_graph(9).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..10 {
            let s = shuffle_edges(&g, &mut rng);
            let c = find_eulerian_circuit(&s, None).unwrap();
            assert_euler(&s, &c);
        }
    }

    #[test]
    fn test_deterministic_for_fixed_order() {
        let g = build_graph(8).unwrap();
        let a = find_eulerian_circuit(&g, None).unwrap();
        let b = find_eulerian_circuit(&g, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_disconnected_graph_is_incomplete() {
        // 頂点 0 と 3 に自己ループ2本ずつ、頂点 1, 2 は孤立
        let edges = vec![
            Edge { source: 0, target: 0, label: 0 },
            Edge { source: 3, target: 3, label: 1 },
            Edge { source: 0, target: 0, label: 0 },
            Edge { source: 3, target: 3, label: 1 },
        ];
        let g = DeBruijnGraph::from_edges(3, edges).unwrap();
        // 公開版は走査前に弾く
        assert!(matches!(find_eulerian_circuit(&g, None), Err(DeBruijnError::GraphInvariant(_))));
        // 検査を飛ばした走査でも部分閉路は返さない
        assert_eq!(
            traverse(&g, None, |_| {}),
            Err(DeBruijnError::IncompleteCircuit { used: 2, total: 4 })
        );
    }

    #[test]
    fn test_closed_but_short_edge_list_rejected() {
        // 自己ループ1本だけでも閉じた歩道になるが、辺数不足
        let g = DeBruijnGraph::from_edges(3, vec![Edge { source: 0, target: 0, label: 0 }]).unwrap();
        assert!(matches!(find_eulerian_circuit(&g, None), Err(DeBruijnError::GraphInvariant(_))));
    }

    #[test]
    fn test_closed_but_unbalanced_edge_list_rejected() {
        // 辺数は 2^n だが頂点 0 の自己ループのみ
        let g = DeBruijnGraph::from_edges(3, vec![Edge { source: 0, target: 0, label: 0 }; 8]).unwrap();
        let err = find_eulerian_circuit(&g, None).unwrap_err();
        assert!(matches!(err, DeBruijnError::GraphInvariant(msg) if msg.contains("unbalanced")));
    }

    #[test]
    fn test_cancel_at_first_splice() {
        let g = build_graph(8).unwrap();
        let shuffled = shuffle_edges(&g, &mut StdRng::seed_from_u64(31));

        // この辺順では部分閉路の接ぎ木が発生する
        let full = find_eulerian_circuit(&shuffled, None).unwrap();
        assert!(full.splice_count() > 0);

        let cancel = AtomicBool::new(false);
        let mut reached = 0usize;
        let r = traverse(&shuffled, Some(&cancel), |n| {
            reached = n;
            cancel.store(true, Ordering::Relaxed);
        });
        assert_eq!(r, Err(DeBruijnError::Cancelled));
        assert_eq!(reached, 1);
    }

    #[test]
    fn test_splice_callback_counts_match() {
        let g = build_graph(9).unwrap();
        let shuffled = shuffle_edges(&g, &mut StdRng::seed_from_u64(8));
        let mut last = 0usize;
        let c = traverse(&shuffled, None, |n| last = n).unwrap();
        assert_eq!(c.splice_count(), last);
    }

    #[test]
    fn test_cancel_before_start() {
        let g = build_graph(6).unwrap();
        let cancel = AtomicBool::new(true);
        assert_eq!(find_eulerian_circuit(&g, Some(&cancel)), Err(DeBruijnError::Cancelled));
    }

    #[test]
    fn test_uncancelled_flag_completes() {
        let g = build_graph(6).unwrap();
        let cancel = AtomicBool::new(false);
        let c = find_eulerian_circuit(&g, Some(&cancel)).unwrap();
        assert_euler(&g, &c);
    }
}

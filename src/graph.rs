use tracing::debug;

use crate::error::{DeBruijnError, Result};

/// 窓長 n の下限（k = n-1 >= 1）
pub const MIN_ORDER: u32 = 2;
/// 窓長 n の上限。頂点番号を u32 に収めるため k <= 31。
pub const MAX_ORDER: u32 = 32;

/// 閉路探索の開始頂点（再現性のため固定）
pub const START_VERTEX: u32 = 0;

/// De Bruijn グラフの辺: source --label--> target。
/// target = ((source << 1) | label) & mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: u32,
    pub target: u32,
    /// 遷移で追加されるビット (0 / 1)
    pub label: u8,
}

impl Edge {
    /// source に label ビットを押し込むシフト遷移を作る
    #[inline]
    pub fn shift(source: u32, label: u8, mask: u32) -> Self {
        Edge {
            source,
            target: ((source << 1) | label as u32) & mask,
            label,
        }
    }

    /// シフト遷移として整合しているか
    #[inline]
    pub fn is_shift(&self, mask: u32) -> bool {
        self.label <= 1 && self.target == ((self.source << 1) | self.label as u32) & mask
    }
}

/// n の範囲チェック
pub fn check_order(order: u32) -> Result<()> {
    if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
        return Err(DeBruijnError::Configuration { order });
    }
    Ok(())
}

/// GF(2) 上の (n-1) 次元 De Bruijn グラフ。
///
/// 頂点は k = n-1 ビット整数 [0, 2^k)、辺は各頂点から label 0/1 の2本。
/// 自己ループ（頂点 0 と 2^k-1）を含む多重グラフなので、隣接構造ではなく
/// 辺の多重集合 `Vec<Edge>` として保持する。並び順がそのまま閉路探索での
/// 辺の提示順になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeBruijnGraph {
    order: u32,
    mask: u32,
    edges: Vec<Edge>,
}

/// 窓長 n の De Bruijn グラフを構築する。辺数は 2^n。
pub fn build_graph(order: u32) -> Result<DeBruijnGraph> {
    check_order(order)?;

    let k = order - 1;
    let mask = vertex_mask(k);
    let vertex_count = 1usize << k;

    let mut edges = Vec::with_capacity(vertex_count * 2);
    for v in 0..vertex_count {
        let v = v as u32;
        edges.push(Edge::shift(v, 1, mask));
        edges.push(Edge::shift(v, 0, mask));
    }

    debug!(order, vertices = vertex_count, edges = edges.len(), "built de bruijn graph");

    Ok(DeBruijnGraph { order, mask, edges })
}

#[inline]
fn vertex_mask(k: u32) -> u32 {
    ((1u64 << k) - 1) as u32
}

impl DeBruijnGraph {
    /// `build_graph` の別名
    pub fn new(order: u32) -> Result<Self> {
        build_graph(order)
    }

    /// 任意の辺リストからグラフを作る。構造は検査しない（`validate` を使う）。
    pub fn from_edges(order: u32, edges: Vec<Edge>) -> Result<Self> {
        check_order(order)?;
        Ok(DeBruijnGraph {
            order,
            mask: vertex_mask(order - 1),
            edges,
        })
    }

    /// 窓長 n
    pub fn order(&self) -> u32 {
        self.order
    }

    /// 頂点ビット数 k = n-1
    pub fn vertex_bits(&self) -> u32 {
        self.order - 1
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn vertex_count(&self) -> usize {
        1usize << self.vertex_bits()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// 走査前の防御的検査。
    /// 1. 辺数 = 2^n、全辺がシフト遷移
    /// 2. 全頂点で入次数 = 出次数 = 2
    /// 3. 頂点 0 から全頂点に到達可能（均衡グラフなので強連結と同値）
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertex_count();
        if self.edges.len() != vertex_count * 2 {
            return Err(DeBruijnError::GraphInvariant(format!(
                "expected {} edges, found {}",
                vertex_count * 2,
                self.edges.len()
            )));
        }

        let mut out_deg = vec![0u8; vertex_count];
        let mut in_deg = vec![0u8; vertex_count];
        let mut successors = vec![[0u32; 2]; vertex_count];

        for e in &self.edges {
            if e.source as usize >= vertex_count || e.target as usize >= vertex_count {
                return Err(DeBruijnError::GraphInvariant(format!(
                    "edge {}->{} outside vertex range 0..{}",
                    e.source, e.target, vertex_count
                )));
            }
            if !e.is_shift(self.mask) {
                return Err(DeBruijnError::GraphInvariant(format!(
                    "edge {}->{} with label {} is not a shift transition",
                    e.source, e.target, e.label
                )));
            }
            let s = e.source as usize;
            let slot = out_deg[s];
            if slot < 2 {
                successors[s][slot as usize] = e.target;
            }
            out_deg[s] = slot.saturating_add(1);
            in_deg[e.target as usize] = in_deg[e.target as usize].saturating_add(1);
        }

        for v in 0..vertex_count {
            if out_deg[v] != 2 || in_deg[v] != 2 {
                return Err(DeBruijnError::GraphInvariant(format!(
                    "vertex {} is unbalanced: in={}, out={}",
                    v, in_deg[v], out_deg[v]
                )));
            }
        }

        // 頂点 START_VERTEX からの到達可能性
        let mut visited = vec![false; vertex_count];
        let mut stack = vec![START_VERTEX];
        visited[START_VERTEX as usize] = true;
        let mut reached = 1usize;
        while let Some(v) = stack.pop() {
            for &t in &successors[v as usize] {
                if !visited[t as usize] {
                    visited[t as usize] = true;
                    reached += 1;
                    stack.push(t);
                }
            }
        }
        if reached != vertex_count {
            return Err(DeBruijnError::GraphInvariant(format!(
                "only {} of {} vertices reachable from vertex {}",
                reached, vertex_count, START_VERTEX
            )));
        }

        Ok(())
    }
}

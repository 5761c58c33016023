use rand::seq::SliceRandom;
use rand::Rng;

use crate::graph::{DeBruijnGraph, Edge};

/// 辺リストを一様ランダムに並べ替えた新しいグラフを返す。元のグラフは変更しない。
///
/// 頂点ごとの出辺の提示順が変わるだけで次数は保存される。
/// どのオイラー閉路が選ばれるかはこの順序で決まる（系列の多様性の唯一の源）。
pub fn shuffle_edges<R: Rng + ?Sized>(graph: &DeBruijnGraph, rng: &mut R) -> DeBruijnGraph {
    let mut shuffled = graph.clone();
    shuffle_in_place(shuffled.edges_mut(), rng);
    shuffled
}

/// Fisher-Yates によるその場シャッフル
pub fn shuffle_in_place<R: Rng + ?Sized>(edges: &mut [Edge], rng: &mut R) {
    edges.shuffle(rng);
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::circuit::traverse;
use crate::config::GeneratorConfig;
use crate::error::{DeBruijnError, Result};
use crate::graph::{build_graph, DeBruijnGraph};
use crate::sequence::{assemble_sequence, Sequence};
use crate::shuffle::shuffle_edges;

/// キャンセル可能なバッチ生成の結果
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// 完成した系列（要求順、キャンセルで欠けた分は詰める）
    pub sequences: Vec<Sequence>,
    /// 要求本数
    pub requested: usize,
    /// 途中でキャンセルされたか
    pub cancelled: bool,
}

/// シャッフル → 閉路 → 組み立てを1回行う。グラフは検査済みであること。
fn generate_one<R: Rng + ?Sized>(
    graph: &DeBruijnGraph,
    rng: &mut R,
    cancel: Option<&AtomicBool>,
) -> Result<Sequence> {
    // シャッフルは次数を保つので再検査しない
    let shuffled = shuffle_edges(graph, rng);
    let circuit = traverse(&shuffled, cancel, |_| {})?;
    assemble_sequence(&shuffled, &circuit)
}

/// 系列ごとのシードを呼び出し側の乱数源から先に引く。
/// 逐次版と並列版で同じ系列が得られる。
fn draw_seeds<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<u64> {
    (0..count).map(|_| rng.gen()).collect()
}

/// ランダムな De Bruijn 系列を1本生成する
pub fn generate_sequence<R: Rng + ?Sized>(graph: &DeBruijnGraph, rng: &mut R) -> Result<Sequence> {
    graph.validate()?;
    generate_one(graph, rng, None)
}

/// `count` 本の系列を生成する（シングルスレッド版）。
/// 各系列は独立にシャッフルした辺リストから作る。
pub fn generate_sequences<R: Rng + ?Sized>(
    graph: &DeBruijnGraph,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Sequence>> {
    graph.validate()?;
    info!(order = graph.order(), count, "generating sequences");
    let timer = Instant::now();

    let mut sequences = Vec::with_capacity(count);
    for (i, seed) in draw_seeds(rng, count).into_iter().enumerate() {
        let mut local = StdRng::seed_from_u64(seed);
        sequences.push(generate_one(graph, &mut local, None)?);
        debug!(index = i, "sequence done");
    }

    info!(count, elapsed_ms = timer.elapsed().as_millis() as u64, "generation finished");
    Ok(sequences)
}

/// `count` 本の系列を生成する（並列版）。
/// 各タスクは自分のシードから作った乱数源と辺リストの複製を持つ。
/// 出力は `generate_sequences` と同一（スレッド数に依存しない）。
pub fn generate_sequences_parallel<R: Rng + ?Sized>(
    graph: &DeBruijnGraph,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Sequence>> {
    graph.validate()?;
    let threads = rayon::current_num_threads();
    info!(order = graph.order(), count, threads, "generating sequences in parallel");
    let timer = Instant::now();

    let sequences = draw_seeds(rng, count)
        .into_par_iter()
        .map(|seed| {
            let mut local = StdRng::seed_from_u64(seed);
            generate_one(graph, &mut local, None)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(count, elapsed_ms = timer.elapsed().as_millis() as u64, "generation finished");
    Ok(sequences)
}

/// キャンセル可能な並列生成。cancel が true になると完成済みの系列だけを返す。
/// キャンセルは各タスク開始時と閉路の接ぎ木ごとに確認する。
/// progress_callback: (完了数, 総数) を完成のたびに呼ぶ（スレッドセーフ）。
pub fn generate_sequences_parallel_cancellable<R: Rng + ?Sized>(
    graph: &DeBruijnGraph,
    count: usize,
    rng: &mut R,
    cancel: &AtomicBool,
    progress_callback: impl Fn(u64, u64) + Sync,
) -> Result<BatchResult> {
    graph.validate()?;
    let timer = Instant::now();
    let total = count as u64;
    let done = AtomicU64::new(0);

    let results = draw_seeds(rng, count)
        .into_par_iter()
        .map(|seed| {
            if cancel.load(Ordering::Relaxed) {
                return Ok(None);
            }
            let mut local = StdRng::seed_from_u64(seed);
            match generate_one(graph, &mut local, Some(cancel)) {
                Ok(seq) => {
                    let d = done.fetch_add(1, Ordering::Relaxed) + 1;
                    progress_callback(d, total);
                    Ok(Some(seq))
                }
                Err(DeBruijnError::Cancelled) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .collect::<Result<Vec<Option<Sequence>>>>()?;

    let sequences: Vec<Sequence> = results.into_iter().flatten().collect();
    let cancelled = sequences.len() < count;
    if cancelled {
        warn!(completed = sequences.len(), requested = count, "generation cancelled");
    } else {
        info!(count, elapsed_ms = timer.elapsed().as_millis() as u64, "generation finished");
    }

    Ok(BatchResult {
        sequences,
        requested: count,
        cancelled,
    })
}

/// 設定に従ってグラフ構築から生成までを行う
pub fn generate_from_config(config: &GeneratorConfig) -> Result<Vec<Sequence>> {
    config.validate()?;
    let graph = build_graph(config.order)?;
    let mut rng = config.rng();
    if config.parallel {
        generate_sequences_parallel(&graph, config.count, &mut rng)
    } else {
        generate_sequences(&graph, config.count, &mut rng)
    }
}

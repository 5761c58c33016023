//! GF(2) 上の De Bruijn 系列合成
//!
//! 窓長 n の2値 De Bruijn 系列（長さ 2^n の巡回ビット列で、全ての n ビット窓が
//! ちょうど1回ずつ現れるもの）を生成する。
//!
//! パイプライン: グラフ構築 → 辺シャッフル → オイラー閉路 (Hierholzer)
//! → 系列組み立て → 窓のアドレス化。各段は前段の出力のみを受け取る。

pub mod batch;
pub mod circuit;
pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod sequence;
pub mod shuffle;
pub mod verify;

pub use batch::{generate_from_config, generate_sequence, generate_sequences, generate_sequences_parallel, generate_sequences_parallel_cancellable, BatchResult};
pub use circuit::{find_eulerian_circuit, Circuit};
pub use config::GeneratorConfig;
pub use error::{DeBruijnError, Result};
pub use graph::{build_graph, DeBruijnGraph, Edge, MAX_ORDER, MIN_ORDER, START_VERTEX};
pub use index::{sequence_to_indices, sequence_to_indices_as};
pub use sequence::{assemble_sequence, Sequence};
pub use shuffle::{shuffle_edges, shuffle_in_place};
pub use verify::{verify_sequence, VerifyResult, MAX_REPORTED};

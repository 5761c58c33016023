use thiserror::Error;

/// 系列合成パイプラインのエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeBruijnError {
    /// 窓長 n が範囲外（n < 2 または MAX_ORDER 超過）
    #[error("invalid window length n={order}: expected 2 <= n <= {max}", max = crate::graph::MAX_ORDER)]
    Configuration { order: u32 },

    /// グラフの次数均衡・連結性の前提が崩れている
    #[error("graph invariant violated: {0}")]
    GraphInvariant(String),

    /// Hierholzer 終了時に未使用辺が残った
    #[error("incomplete circuit: consumed {used} of {total} edges")]
    IncompleteCircuit { used: usize, total: usize },

    /// 組み立てた系列で同じ窓が二度現れた
    #[error("window {window:#b} repeats at offset {offset}")]
    WindowCollision { window: u64, offset: usize },

    /// 0/1 以外の文字を含む入力
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    /// 窓幅が 0、系列長超過、または出力整数型に収まらない
    #[error("invalid window width {width} for sequence of length {len}")]
    InvalidWindow { width: usize, len: usize },

    #[error("generation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DeBruijnError>;

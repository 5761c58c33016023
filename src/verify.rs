use std::collections::HashSet;

use crate::error::{DeBruijnError, Result};
use crate::graph::check_order;
use crate::index::{parse_bit, sequence_to_indices};

/// `duplicates` と `missing` に載せる値の上限
pub const MAX_REPORTED: usize = 64;

/// 系列検証の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyResult {
    /// 窓長 n
    pub order: u32,
    /// 期待される長さ 2^n + n - 1
    pub expected_len: usize,
    /// 実際の長さ
    pub actual_len: usize,
    /// 検査した窓の数（オフセット 0..2^n のうち存在するもの）
    pub total_windows: usize,
    /// 異なる窓の数
    pub distinct_windows: usize,
    /// 2回目以降に現れた窓の総数
    pub duplicate_count: usize,
    /// 一度も現れなかった窓値の総数
    pub missing_count: usize,
    /// 重複窓の値（出現順、先頭 `MAX_REPORTED` 件まで）
    pub duplicates: Vec<u64>,
    /// 欠落窓の値（昇順、先頭 `MAX_REPORTED` 件まで）
    pub missing: Vec<u64>,
    /// 末尾 n-1 文字が先頭 n-1 文字と一致するか
    pub wrap_consistent: bool,
    /// 全条件を満たす De Bruijn 系列か
    pub is_de_bruijn: bool,
}

/// 系列が窓長 n の De Bruijn 系列（パディング付き）かを診断する。
/// 不正文字や n より短い系列はエラー、それ以外は結果に不一致を集計する。
///
/// 使用メモリは入力長に比例し、2^n には比例しない。
/// 窓数が 2^n に比べて少なければ疎な集合で記録する。
pub fn verify_sequence(sequence: &str, order: u32) -> Result<VerifyResult> {
    check_order(order)?;

    let n = order as usize;
    let k = n - 1;
    let cycle_len = 1usize << n;
    let expected_len = cycle_len + k;
    let actual_len = sequence.len();

    let indices = sequence_to_indices(sequence, n)?;
    let total_windows = indices.len().min(cycle_len);

    let mut seen = WindowSet::for_windows(total_windows, cycle_len);
    let mut duplicate_count = 0usize;
    let mut duplicates = Vec::new();
    for &w in &indices[..total_windows] {
        if !seen.insert(w) {
            duplicate_count += 1;
            if duplicates.len() < MAX_REPORTED {
                duplicates.push(w);
            }
        }
    }
    let distinct_windows = seen.count();
    let missing_count = cycle_len - distinct_windows;

    // 見つかった窓は distinct_windows 個なので走査は distinct + MAX_REPORTED で止まる
    let missing: Vec<u64> = (0..cycle_len as u64)
        .filter(|&w| !seen.contains(w))
        .take(MAX_REPORTED)
        .collect();

    let wrap_consistent = actual_len == expected_len && sequence[cycle_len..] == sequence[..k];

    let is_de_bruijn = wrap_consistent && duplicate_count == 0 && missing_count == 0;

    Ok(VerifyResult {
        order,
        expected_len,
        actual_len,
        total_windows,
        distinct_windows,
        duplicate_count,
        missing_count,
        duplicates,
        missing,
        wrap_consistent,
        is_de_bruijn,
    })
}

/// 組み立て直後の高速検査。最初の重複窓で `WindowCollision` を返す。
/// 長さ 2^n + n - 1 の 0/1 列であることは呼び出し側が保証する。
pub(crate) fn check_windows(bits: &[u8], order: u32) -> Result<()> {
    let n = order as usize;
    let cycle_len = 1usize << n;
    let mask = (cycle_len - 1) as u64;

    let mut seen = Bitset::new(cycle_len);
    let mut window = 0u64;
    for (i, &b) in bits[..cycle_len + n - 1].iter().enumerate() {
        window = ((window << 1) | parse_bit(b, i)? as u64) & mask;
        if i + 1 >= n {
            let offset = i + 1 - n;
            if !seen.insert(window as usize) {
                return Err(DeBruijnError::WindowCollision { window, offset });
            }
        }
    }
    Ok(())
}

/// 検証用の訪問済み窓集合。窓数が値域の 1/64 以上ならビット集合を使う。
enum WindowSet {
    Dense(Bitset),
    Sparse(HashSet<u64>),
}

impl WindowSet {
    fn for_windows(windows: usize, range: usize) -> Self {
        if windows >= range / 64 {
            WindowSet::Dense(Bitset::new(range))
        } else {
            WindowSet::Sparse(HashSet::with_capacity(windows))
        }
    }

    fn insert(&mut self, w: u64) -> bool {
        match self {
            WindowSet::Dense(b) => b.insert(w as usize),
            WindowSet::Sparse(s) => s.insert(w),
        }
    }

    fn contains(&self, w: u64) -> bool {
        match self {
            WindowSet::Dense(b) => b.contains(w as usize),
            WindowSet::Sparse(s) => s.contains(&w),
        }
    }

    fn count(&self) -> usize {
        match self {
            WindowSet::Dense(b) => b.count(),
            WindowSet::Sparse(s) => s.len(),
        }
    }
}

/// 2^n ビットの訪問済み集合
struct Bitset {
    words: Vec<u64>,
    count: usize,
}

impl Bitset {
    fn new(bits: usize) -> Self {
        Bitset {
            words: vec![0u64; bits.div_ceil(64)],
            count: 0,
        }
    }

    /// 新規なら true
    #[inline]
    fn insert(&mut self, i: usize) -> bool {
        let (w, b) = (i / 64, i % 64);
        let fresh = (self.words[w] >> b) & 1 == 0;
        if fresh {
            self.words[w] |= 1u64 << b;
            self.count += 1;
        }
        fresh
    }

    #[inline]
    fn contains(&self, i: usize) -> bool {
        (self.words[i / 64] >> (i % 64)) & 1 != 0
    }

    fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequences() {
        for (s, n) in [("00110", 2), ("11001", 2), ("0001011100", 3)] {
            let r = verify_sequence(s, n).unwrap();
            assert!(r.is_de_bruijn, "{} should be de bruijn: {:?}", s, r);
            assert_eq!(r.distinct_windows, 1 << n);
        }
    }

    #[test]
    fn test_duplicate_window_reported() {
        // 窓 00 が重複し 11 が欠落
        let r = verify_sequence("00010", 2).unwrap();
        assert!(!r.is_de_bruijn);
        assert_eq!(r.duplicates, vec![0]);
        assert_eq!(r.missing, vec![3]);
        assert_eq!((r.duplicate_count, r.missing_count), (1, 1));
    }

    #[test]
    fn test_missing_padding() {
        let r = verify_sequence("0011", 2).unwrap();
        assert!(!r.wrap_consistent);
        assert!(!r.is_de_bruijn);
        assert_eq!(r.total_windows, 3);
        assert_eq!(r.missing, vec![2]);
    }

    #[test]
    fn test_trailing_garbage() {
        // 先頭 2^n 窓は正しいが長さ超過
        let r = verify_sequence("001100", 2).unwrap();
        assert!(r.duplicates.is_empty() && r.missing.is_empty());
        assert_eq!(r.actual_len, 6);
        assert!(!r.wrap_consistent);
        assert!(!r.is_de_bruijn);
    }

    #[test]
    fn test_wrong_length_at_max_order_is_bounded() {
        // 窓1個だけの入力で 2^32 ビットの集合や欠落リストを作らない
        let r = verify_sequence(&"0".repeat(32), 32).unwrap();
        assert_eq!(r.total_windows, 1);
        assert_eq!(r.distinct_windows, 1);
        assert_eq!(r.missing_count, (1usize << 32) - 1);
        assert_eq!(r.missing.len(), MAX_REPORTED);
        assert_eq!(r.missing[..3], [1, 2, 3]);
        assert!(!r.wrap_consistent);
        assert!(!r.is_de_bruijn);
    }

    #[test]
    fn test_reported_values_are_capped() {
        // 全て 0 の系列: 窓 0 が 2^n 回、それ以外は全て欠落
        let n = 10u32;
        let bits = "0".repeat((1usize << n) + n as usize - 1);
        let r = verify_sequence(&bits, n).unwrap();
        assert_eq!(r.duplicate_count, (1 << n) - 1);
        assert_eq!(r.missing_count, (1 << n) - 1);
        assert_eq!(r.duplicates.len(), MAX_REPORTED);
        assert_eq!(r.missing.len(), MAX_REPORTED);
        assert!(r.wrap_consistent);
        assert!(!r.is_de_bruijn);
    }

    #[test]
    fn test_sparse_window_set() {
        // 窓数 1 と値域 2^12: 疎な集合側
        let r = verify_sequence("101100111000", 12).unwrap();
        assert_eq!(r.distinct_windows, 1);
        assert_eq!(r.missing_count, 4095);
        assert_eq!(r.missing[..2], [0, 1]);
    }

    #[test]
    fn test_check_windows_collision() {
        assert_eq!(
            check_windows(b"00010", 2),
            Err(DeBruijnError::WindowCollision { window: 0, offset: 1 })
        );
        assert_eq!(check_windows(b"00110", 2), Ok(()));
    }

    #[test]
    fn test_order_checked() {
        assert_eq!(verify_sequence("0", 1), Err(DeBruijnError::Configuration { order: 1 }));
    }
}

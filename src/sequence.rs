use std::fmt;

use crate::circuit::Circuit;
use crate::error::{DeBruijnError, Result};
use crate::graph::{check_order, DeBruijnGraph};
use crate::index::{sequence_to_indices, sequence_to_indices_as};
use crate::verify::{check_windows, verify_sequence};

/// 窓長 n の De Bruijn 系列（'0'/'1' 文字列）。
///
/// 長さは 2^n + (n-1)。末尾 n-1 文字は先頭 n-1 文字の複製で、
/// 剰余なしで全ての n 窓・(n-1) 窓を読める。組み立て後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    bits: String,
    order: u32,
}

/// 閉路のラベルを訪問順に連結し、先頭 k ビットを末尾に付加する。
/// 結果は窓の重複検査を通したものだけを返す。
pub fn assemble_sequence(graph: &DeBruijnGraph, circuit: &Circuit) -> Result<Sequence> {
    let total = graph.edge_count();
    let expected = 1usize << graph.order();
    if total != expected {
        return Err(DeBruijnError::GraphInvariant(format!(
            "expected {} edges, found {}",
            expected, total
        )));
    }
    if circuit.len() != total {
        return Err(DeBruijnError::IncompleteCircuit {
            used: circuit.len(),
            total,
        });
    }

    let k = graph.vertex_bits() as usize;
    let mut buf: Vec<u8> = Vec::with_capacity(total + k);
    buf.extend(circuit.labels().map(|l| b'0' + l));
    buf.extend_from_within(..k);

    check_windows(&buf, graph.order())?;

    // check_windows が '0'/'1' のみであることを確認済み
    let bits = String::from_utf8(buf)
        .map_err(|e| DeBruijnError::InvalidSequence(e.to_string()))?;

    Ok(Sequence {
        bits,
        order: graph.order(),
    })
}

impl Sequence {
    /// 外部の文字列を窓長 n の系列として取り込む。De Bruijn 性を満たさなければエラー。
    pub fn parse(bits: &str, order: u32) -> Result<Self> {
        check_order(order)?;
        let report = verify_sequence(bits, order)?;
        if !report.is_de_bruijn {
            if let Some(&window) = report.duplicates.first() {
                let offset = sequence_to_indices(bits, order as usize)?
                    .iter()
                    .enumerate()
                    .filter(|&(_, &w)| w == window)
                    .map(|(i, _)| i)
                    .nth(1)
                    .unwrap_or(0);
                return Err(DeBruijnError::WindowCollision { window, offset });
            }
            return Err(DeBruijnError::InvalidSequence(format!(
                "not a padded de bruijn sequence of order {} (length {}, expected {})",
                order, report.actual_len, report.expected_len
            )));
        }
        Ok(Sequence {
            bits: bits.to_owned(),
            order,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.bits
    }

    pub fn into_string(self) -> String {
        self.bits
    }

    /// 窓長 n
    pub fn order(&self) -> u32 {
        self.order
    }

    /// パディング込みの長さ 2^n + n - 1
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// 巡回部分（先頭 2^n 文字）
    pub fn cyclic_part(&self) -> &str {
        &self.bits[..1usize << self.order]
    }

    /// 幅 `width` の窓をオフセット順に返す（ストライド1）
    pub fn windows(&self, width: usize) -> impl Iterator<Item = &str> + '_ {
        let count = if width == 0 || width > self.bits.len() {
            0
        } else {
            self.bits.len() - width + 1
        };
        (0..count).map(move |i| &self.bits[i..i + width])
    }

    /// `sequence_to_indices` の短縮形
    pub fn indices(&self, width: usize) -> Result<Vec<u64>> {
        sequence_to_indices(&self.bits, width)
    }

    /// 窓長 n のアドレス列（0..2^n の順列）を u32 で返す
    pub fn addresses(&self) -> Result<Vec<u32>> {
        let mut addrs: Vec<u32> = sequence_to_indices_as(&self.bits, self.order as usize)?;
        addrs.truncate(1usize << self.order);
        Ok(addrs)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bits)
    }
}

impl AsRef<str> for Sequence {
    fn as_ref(&self) -> &str {
        &self.bits
    }
}

impl From<Sequence> for String {
    fn from(s: Sequence) -> Self {
        s.bits
    }
}

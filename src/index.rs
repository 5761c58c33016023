use num_traits::{PrimInt, Unsigned};

use crate::error::{DeBruijnError, Result};

/// 系列の幅 `width` の窓を、ストライド1で整数アドレスに変換する。
/// オフセット 0..=len-width の各窓を MSB 先頭の2進数として読む。
/// 折り返しは行わない（組み立て時に付加済みのパディングのみ使う）。
pub fn sequence_to_indices(sequence: &str, width: usize) -> Result<Vec<u64>> {
    sequence_to_indices_as::<u64>(sequence, width)
}

/// `sequence_to_indices` の出力型指定版（u16 のアドレステーブル等）。
/// `width` は T のビット幅以下であること。
pub fn sequence_to_indices_as<T: PrimInt + Unsigned>(sequence: &str, width: usize) -> Result<Vec<T>> {
    let bytes = sequence.as_bytes();
    let len = bytes.len();
    let type_bits = T::zero().count_zeros() as usize;
    if width == 0 || width > len || width > type_bits {
        return Err(DeBruijnError::InvalidWindow { width, len });
    }

    let mask = if width == type_bits {
        T::max_value()
    } else {
        (T::one() << width) - T::one()
    };

    let mut indices = Vec::with_capacity(len - width + 1);
    let mut window = T::zero();
    for (i, &b) in bytes.iter().enumerate() {
        let bit = parse_bit(b, i)?;
        window = ((window << 1) | if bit == 1 { T::one() } else { T::zero() }) & mask;
        if i + 1 >= width {
            indices.push(window);
        }
    }
    Ok(indices)
}

/// '0' / '1' を 0 / 1 に
#[inline]
pub(crate) fn parse_bit(b: u8, offset: usize) -> Result<u8> {
    match b {
        b'0' => Ok(0),
        b'1' => Ok(1),
        other => Err(DeBruijnError::InvalidSequence(format!(
            "unexpected character {:?} at offset {}",
            other as char, offset
        ))),
    }
}

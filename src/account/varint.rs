//! Unsigned LEB128 integers, as used for account key variants.

/// Longest encoding of a `u64`
const MAX_LENGTH: usize = 10;

/// Encode `value`, seven bits per byte, low group first
pub(super) fn encode(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(2);
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let low = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(low);
            return out;
        }
        out.push(low | 0x80);
    }
}

/// Decode a prefix of `bytes`, returning the value and bytes consumed
pub(super) fn decode(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().take(MAX_LENGTH).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte() {
        assert_eq!(encode(0x11), vec![0x11]);
        assert_eq!(encode(0x13), vec![0x13]);
        assert_eq!(decode(&[0x13, 0xff]), Some((0x13, 1)));
    }

    #[test]
    fn test_multi_byte() {
        assert_eq!(encode(300), vec![0xAC, 0x02]);
        assert_eq!(decode(&[0xAC, 0x02]), Some((300, 2)));
    }

    #[test]
    fn test_truncated() {
        assert_eq!(decode(&[]), None);
        assert_eq!(decode(&[0x80]), None);
        assert_eq!(decode(&[0xFF; 12]), None);
    }
}

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const BITS_PER_CHAR: u32 = 5;
const MASK: u64 = 0x1F;

/// Number of Crockford base32 characters needed to hold a `u64`
/// (`ceil(64 / 5)`).
pub const SERIAL_LEN: usize = 13;

/// Encodes `value` as a fixed-width, zero-padded Crockford base32 string,
/// most significant character first.
///
/// The top character only carries the four highest bits, so the output for
/// `u64::MAX` is `FZZZZZZZZZZZZ`. Fixed width keeps lexicographic order equal
/// to numeric order.
pub(crate) fn encode_serial(value: u64) -> [u8; SERIAL_LEN] {
    let mut buf = [ALPHABET[0]; SERIAL_LEN];
    let mut acc = value;
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(acc & MASK) as usize];
        acc >>= BITS_PER_CHAR;
    }
    buf
}

#[cfg(test)]
pub(crate) fn decode_serial(encoded: &str) -> Option<u64> {
    encoded.bytes().try_fold(0_u64, |acc, b| {
        let digit = ALPHABET.iter().position(|&c| c == b)? as u64;
        acc.checked_mul(32)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> String {
        String::from_utf8(encode_serial(value).to_vec()).unwrap()
    }

    #[test]
    fn encodes_fixed_width() {
        assert_eq!(encoded(0), "0000000000000");
        assert_eq!(encoded(1), "0000000000001");
        assert_eq!(encoded(31), "000000000000Z");
        assert_eq!(encoded(32), "0000000000010");
        assert_eq!(encoded(u64::MAX), "FZZZZZZZZZZZZ");
    }

    #[test]
    fn skips_ambiguous_letters() {
        for value in [0x0123_4567_89AB_CDEF, u64::MAX / 3, 1 << 40] {
            let s = encoded(value);
            assert!(!s.contains(&['I', 'L', 'O', 'U'][..]), "{s}");
            assert_eq!(decode_serial(&s), Some(value));
        }
    }

    #[test]
    fn preserves_numeric_order() {
        let mut prev = encoded(0);
        for value in [1, 31, 32, 1023, 1024, 1 << 35, u64::MAX - 1, u64::MAX] {
            let next = encoded(value);
            assert!(prev < next, "{prev} !< {next}");
            prev = next;
        }
    }
}

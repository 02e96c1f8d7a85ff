use std::convert::TryInto;

/**
    Converts a slice into a fixed size array.

    Returns None if the slice is not exactly N long.
*/
pub fn try_into<T: Copy, const N: usize>(v: &[T]) -> Option<[T; N]> {
    v.try_into().ok()
}

/**
    Appends the CompactSize (varint) encoding of n to the buffer.

    0..=0xfc is a single byte, larger values are prefixed with
    0xfd, 0xfe or 0xff followed by 2, 4 or 8 little endian bytes.
*/
pub fn write_compact_size(n: u64, buf: &mut Vec<u8>) {
    match n {
        0..=0xfc => buf.push(n as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(n as u16).to_le_bytes());
        },
        0x10000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        },
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Appends `data` prefixed with its CompactSize length.
pub fn write_var_bytes(data: &[u8], buf: &mut Vec<u8>) {
    write_compact_size(data.len() as u64, buf);
    buf.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_size_boundaries() {
        let cases: [(u64, &str); 7] = [
            (0, "00"),
            (0xfc, "fc"),
            (0xfd, "fdfd00"),
            (0xffff, "fdffff"),
            (0x10000, "fe00000100"),
            (0xffff_ffff, "feffffffff"),
            (0x1_0000_0000, "ff0000000001000000"),
        ];

        for (n, expected) in cases.iter() {
            let mut buf = Vec::new();
            write_compact_size(*n, &mut buf);
            assert_eq!(hex::encode(&buf), *expected);
        }
    }

    #[test]
    fn var_bytes_prefixes_length() {
        let mut buf = Vec::new();
        write_var_bytes(b"abc", &mut buf);
        assert_eq!(buf, vec![0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn slice_to_array() {
        let a: Option<[u8; 2]> = try_into(&[1, 2]);
        assert_eq!(a, Some([1, 2]));
        let b: Option<[u8; 3]> = try_into(&[1, 2]);
        assert!(b.is_none());
    }
}

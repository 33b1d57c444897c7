use std::io::Write;

use guppi_types::GuppiResult;

/// Сколько байт нужно добавить к `len`, чтобы получить кратное `align`.
pub fn padding_len(
    len: usize,
    align: usize,
) -> usize {
    (align - len % align) % align
}

/// Записывает `n` байт-заполнителей `fill`.
pub fn write_padding<W: Write>(
    writer: &mut W,
    n: usize,
    fill: u8,
) -> GuppiResult<()> {
    const CHUNK: usize = 512;
    let chunk = [fill; CHUNK];
    let mut left = n;

    while left > 0 {
        let take = left.min(CHUNK);
        writer.write_all(&chunk[..take])?;
        left -= take;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_len() {
        assert_eq!(padding_len(80, 512), 432);
        assert_eq!(padding_len(640, 512), 384);
        assert_eq!(padding_len(1024, 512), 0);
        assert_eq!(padding_len(0, 512), 0);
    }

    #[test]
    fn test_write_padding() {
        let mut out = Vec::new();
        write_padding(&mut out, 1300, b'*').unwrap();
        assert_eq!(out.len(), 1300);
        assert!(out.iter().all(|&b| b == b'*'));
    }
}

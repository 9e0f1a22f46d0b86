/// Classic 16-bytes-per-line hex dump; `start_offset` labels the first line.
pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offs = start_offset + (i as u64) * 16;
        let hexs: String = chunk.iter().map(|b| format!("{b:02x} ")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect();
        out.push_str(&format!("{offs:08x}  {hexs:<48}  |{ascii}|\n"));
    }
    out
}

/// Canonical 8-4-4-4-12 form of a 16-byte user type.
pub fn uuid_string(u: &[u8; 16]) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        hex::encode(&u[0..4]),
        hex::encode(&u[4..6]),
        hex::encode(&u[6..8]),
        hex::encode(&u[8..10]),
        hex::encode(&u[10..16]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_pads_short_lines() {
        let s = hex_dump(b"ftyp", 0x20);
        assert_eq!(s, format!("00000020  {:<48}  |ftyp|\n", "66 74 79 70 "));
    }

    #[test]
    fn uuid_groups() {
        let u = [
            0xa5, 0xd4, 0x0b, 0x30, 0xe8, 0x14, 0x11, 0xdd, 0xba, 0x2f, 0x08, 0x00, 0x20, 0x0c,
            0x9a, 0x66,
        ];
        assert_eq!(uuid_string(&u), "a5d40b30-e814-11dd-ba2f-0800200c9a66");
    }
}

//! Input text decoding for DBC files.
//!
//! DBC databases come out of vendor tools with no declared encoding. The
//! reader probes a fixed candidate list and keeps the first encoding that
//! decodes the whole byte stream without error; when none does, it falls back
//! to lossy UTF-8 rather than failing.

use encoding_rs::{GBK, UTF_8};

/// Probe order. ASCII sits after GBK to mirror the candidate list the file
/// format is commonly read with.
const CANDIDATES: [Candidate; 4] = [
    Candidate::Utf8,
    Candidate::Gbk,
    Candidate::Ascii,
    Candidate::Latin1,
];

#[derive(Clone, Copy)]
enum Candidate {
    Utf8,
    Gbk,
    Ascii,
    Latin1,
}

impl Candidate {
    fn try_decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Candidate::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Candidate::Gbk => GBK
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned()),
            Candidate::Ascii => bytes
                .is_ascii()
                .then(|| String::from_utf8_lossy(bytes).into_owned()),
            // Latin-1 maps every byte, so this candidate always succeeds.
            Candidate::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes).into_owned()),
        }
    }
}

/// Decodes raw DBC bytes into text using the first matching candidate
/// encoding, defaulting to lossy UTF-8.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    for candidate in CANDIDATES {
        if let Some(text) = candidate.try_decode(bytes) {
            return text;
        }
    }
    UTF_8.decode(bytes).0.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_is_utf8() {
        assert_eq!(decode_text(b"VERSION \"1.0\""), "VERSION \"1.0\"");
    }

    #[test]
    fn utf8_multibyte_survives() {
        let text = "CM_ BU_ Motor \"Motorsteuergerät\";";
        assert_eq!(decode_text(text.as_bytes()), text);
    }

    #[test]
    fn gbk_bytes_decode_to_chinese_text() {
        // "转速" (rotational speed) in GBK.
        let bytes: &[u8] = &[0xD7, 0xAA, 0xCB, 0xD9];
        assert_eq!(decode_text(bytes), "转速");
    }

    #[test]
    fn arbitrary_bytes_fall_through_to_latin1() {
        // 0x80 alone is invalid UTF-8 and an incomplete GBK sequence.
        let decoded = decode_text(&[0x41, 0x80, 0x42]);
        assert_eq!(decoded.chars().count(), 3);
        assert!(decoded.starts_with('A') && decoded.ends_with('B'));
    }
}

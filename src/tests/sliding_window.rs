#[cfg(test)]
mod tests {
    use crate::codec::SlidingWindowCodec;
    use crate::{Codec, SerializerError};
    use tracing_subscriber::EnvFilter;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Undo the rolling obfuscation on everything after the 5-byte outer header.
    fn deobfuscate(encoded: &[u8]) -> Vec<u8> {
        encoded[5..]
            .iter()
            .enumerate()
            .map(|(i, &b)| b ^ 0x57u8.wrapping_add(i as u8).reverse_bits() ^ 0xB9)
            .collect()
    }

    fn obfuscate(inner: &[u8]) -> Vec<u8> {
        // The transform is symmetric.
        let mut framed = vec![0u8; 5];
        framed.extend_from_slice(inner);
        deobfuscate(&framed)
    }

    #[test]
    fn two_chunk_scenario() {
        let data = [0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8];
        let codec = SlidingWindowCodec::new();
        let encoded = codec.encode_bytes(&data).unwrap();

        assert_eq!(encoded[0], 8 ^ 0x53);
        assert_eq!(&encoded[1..5], &(16u32 ^ 0x5457_4F53).to_le_bytes());

        // Chunk 1 hits slot 0 exactly; chunk 2 shares one byte with slot 1.
        let body = [0, 0x00, 1, 0xFE, 2, 3, 4, 5, 6, 7, 8];
        let checksum = body.iter().fold(0u8, |a, &b| a.wrapping_add(b));
        assert_eq!(checksum, 34);
        let mut inner = vec![checksum, 16, 0, 0, 0];
        inner.extend_from_slice(&body);
        assert_eq!(deobfuscate(&encoded), inner);

        let mut out = Vec::new();
        let report = codec
            .decode_with_report(&mut encoded.as_slice(), &mut out)
            .unwrap();
        assert_eq!(out, data);
        assert!(report.checksum_matches());
        assert!(report.size_matches());
        assert_eq!(report.computed_checksum, 34);
        assert_eq!(report.actual_size, 16);
    }

    #[test]
    fn repeated_chunks_reuse_dictionary_slot() {
        let data = b"ABCDEFGHABCDEFGHABCDEFGH";
        let codec = SlidingWindowCodec::new();
        let encoded = codec.encode_bytes(data).unwrap();
        let inner = deobfuscate(&encoded);
        assert_eq!(
            &inner[5..],
            &[b'A', 0xFE, b'B', b'C', b'D', b'E', b'F', b'G', b'H', b'A', 0, b'A', 0]
        );
        assert_eq!(codec.decode_bytes(&encoded).unwrap(), data);
    }

    #[test]
    fn short_tail_is_terminated_by_length() {
        let codec = SlidingWindowCodec::new();
        let encoded = codec.encode_bytes(&[9]).unwrap();
        assert_eq!(&deobfuscate(&encoded)[5..], &[9, 0, 1]);
        assert_eq!(codec.decode_bytes(&encoded).unwrap(), [9]);

        let data: Vec<u8> = (0..13).map(|i| i * 17).collect();
        assert_eq!(codec.decode_bytes(&codec.encode_bytes(&data).unwrap()).unwrap(), data);
    }

    #[test]
    fn empty_input() {
        let codec = SlidingWindowCodec::new();
        let encoded = codec.encode_bytes(&[]).unwrap();
        assert_eq!(encoded.len(), 10);
        let mut out = Vec::new();
        let report = codec
            .decode_with_report(&mut encoded.as_slice(), &mut out)
            .unwrap();
        assert!(out.is_empty());
        assert!(report.checksum_matches() && report.size_matches());
    }

    #[test]
    fn checksum_mismatch_is_not_fatal() {
        init_tracing();
        let codec = SlidingWindowCodec::new();
        let data = b"save slot 1: world 4".to_vec();
        let mut encoded = codec.encode_bytes(&data).unwrap();
        // Stored checksum is the first obfuscated byte.
        encoded[5] ^= 0x01;

        let mut out = Vec::new();
        let report = codec
            .decode_with_report(&mut encoded.as_slice(), &mut out)
            .unwrap();
        assert_eq!(out, data);
        assert!(!report.checksum_matches());
        assert!(report.size_matches());
        assert_eq!(codec.decode_bytes(&encoded).unwrap(), data);
    }

    #[test]
    fn size_mismatch_is_not_fatal() {
        init_tracing();
        let codec = SlidingWindowCodec::new();
        // Hand-built stream whose inner header claims 9 bytes for an 8-byte body.
        let body = [3u8, 0x00];
        let mut inner = vec![3, 9, 0, 0, 0];
        inner.extend_from_slice(&body);
        let mut encoded = vec![8 ^ 0x53];
        encoded.extend_from_slice(&(9u32 ^ 0x5457_4F53).to_le_bytes());
        encoded.extend_from_slice(&obfuscate(&inner));

        let mut out = Vec::new();
        let report = codec
            .decode_with_report(&mut encoded.as_slice(), &mut out)
            .unwrap();
        assert_eq!(out, [3; 8]);
        assert!(report.checksum_matches());
        assert!(!report.size_matches());
        assert_eq!(report.declared_size, 9);
    }

    /// Frame a plain body with correct headers and checksum.
    fn framed(declared: u32, body: &[u8]) -> Vec<u8> {
        let checksum = body.iter().fold(0u8, |a, &b| a.wrapping_add(b));
        let mut inner = vec![checksum];
        inner.extend_from_slice(&declared.to_le_bytes());
        inner.extend_from_slice(body);
        let mut encoded = vec![8 ^ 0x53];
        encoded.extend_from_slice(&(declared ^ 0x5457_4F53).to_le_bytes());
        encoded.extend_from_slice(&obfuscate(&inner));
        encoded
    }

    #[test]
    fn hand_framed_tail_decodes() {
        // Slot 3 untouched, then a tail of 5.
        let got = SlidingWindowCodec::new().decode_bytes(&framed(5, &[3, 0x00, 5])).unwrap();
        assert_eq!(got, [3; 5]);
    }

    #[test]
    fn tail_without_preceding_group_is_rejected() {
        let err = SlidingWindowCodec::new()
            .decode_bytes(&framed(1, &[1]))
            .unwrap_err();
        match err {
            SerializerError::Format(msg) => assert!(msg.contains("without a preceding group"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tail_longer_than_window_is_rejected() {
        let err = SlidingWindowCodec::new()
            .decode_bytes(&framed(9, &[3, 0x00, 9]))
            .unwrap_err();
        match err {
            SerializerError::Format(msg) => {
                assert_eq!(msg, "tail length 9 exceeds window size 8");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Every length up to the window size is accepted.
        for len in 0..=8u8 {
            let got = SlidingWindowCodec::new()
                .decode_bytes(&framed(u32::from(len), &[4, 0x00, len]))
                .unwrap();
            assert_eq!(got, vec![4; usize::from(len)]);
        }
    }

    #[test]
    fn wrong_window_size_is_rejected() {
        let codec = SlidingWindowCodec::new();
        let mut encoded = codec.encode_bytes(b"abc").unwrap();
        encoded[0] = 16 ^ 0x53;
        let err = codec.decode_bytes(&encoded).unwrap_err();
        assert!(matches!(
            err,
            SerializerError::ValueMismatch {
                what: "sliding window size",
                expected: 8,
                actual: 16
            }
        ));
    }

    #[test]
    fn truncated_streams_are_format_errors() {
        let codec = SlidingWindowCodec::new();
        assert!(codec.decode_bytes(&[8 ^ 0x53, 0, 0]).unwrap_err().is_format_error());

        let encoded = codec.encode_bytes(b"ABCDEFGH").unwrap();
        // Drop the last literal of the only group.
        let err = codec.decode_bytes(&encoded[..encoded.len() - 1]).unwrap_err();
        assert!(matches!(err, SerializerError::UnexpectedEof { .. }));
    }

    #[test]
    fn long_input_roundtrip() {
        let codec = SlidingWindowCodec::new();
        let mut x = 0x2545_F491u32;
        let data: Vec<u8> = (0..10_000)
            .map(|i| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                if i % 3 == 0 { 0 } else { (x >> 24) as u8 }
            })
            .collect();
        let encoded = codec.encode_bytes(&data).unwrap();
        let mut out = Vec::new();
        let report = codec
            .decode_with_report(&mut encoded.as_slice(), &mut out)
            .unwrap();
        assert_eq!(out, data);
        assert!(report.checksum_matches());
        assert_eq!(report.declared_size, 10_000);
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::{MultiXorCodec, SegmentedCodec, XorCodec};
    use crate::{Codec, CodecSpec, SerializerError};

    #[test]
    fn single_byte_xor_is_self_inverse() {
        let codec = XorCodec::new(0x5A);
        let plain = b"level 3-2".to_vec();
        let enc = codec.encode_bytes(&plain).unwrap();
        assert_eq!(enc[0], b'l' ^ 0x5A);
        assert_eq!(codec.decode_bytes(&enc).unwrap(), plain);
        assert_eq!(codec.decode_bytes(&plain).unwrap(), enc);
        assert!(codec.encode_bytes(&[]).unwrap().is_empty());
    }

    #[test]
    fn multi_xor_repeats_key() {
        let codec = MultiXorCodec::new([0x01u8, 0x02, 0x03], false);
        let got = codec.encode_bytes(&[0, 0, 0, 0, 0]).unwrap();
        assert_eq!(got, [1, 2, 3, 1, 2]);
    }

    #[test]
    fn multi_xor_skips_incomplete_tail() {
        let codec = MultiXorCodec::new([0xFFu8, 0xFF], true);
        let got = codec.encode_bytes(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(got, [1 ^ 0xFF, 2 ^ 0xFF, 3 ^ 0xFF, 4 ^ 0xFF, 5]);
        assert_eq!(codec.decode_bytes(&got).unwrap(), [1, 2, 3, 4, 5]);

        // Whole blocks only: nothing is protected.
        let got = codec.encode_bytes(&[1, 2, 3, 4]).unwrap();
        assert_eq!(got, [0xFE, 0xFD, 0xFC, 0xFB]);

        // Shorter than the key: everything is tail.
        let wide = MultiXorCodec::new([0xAAu8; 4], true);
        assert_eq!(wide.encode_bytes(&[9, 9, 9]).unwrap(), [9, 9, 9]);
    }

    #[test]
    fn multi_xor_rejects_empty_key() {
        let err = MultiXorCodec::new(Vec::<u8>::new(), false)
            .encode_bytes(&[1])
            .unwrap_err();
        assert!(matches!(err, SerializerError::Unsupported(_)));
    }

    #[test]
    fn segmented_applies_codecs_in_order() {
        let codec = SegmentedCodec::new(vec![
            (Box::new(XorCodec::new(0x0F)), 2),
            (Box::new(XorCodec::new(0xF0)), 3),
        ]);
        assert_eq!(codec.total_len(), 5);
        let got = codec.decode_bytes(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(got, [1 ^ 0x0F, 2 ^ 0x0F, 3 ^ 0xF0, 4 ^ 0xF0, 5 ^ 0xF0]);
        assert_eq!(codec.encode_bytes(&got).unwrap(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn segmented_multi_xor_tail_is_per_segment() {
        // Each segment sees only its own slice, so the protected tail is
        // computed from the segment length.
        let codec = SegmentedCodec::new(vec![
            (Box::new(MultiXorCodec::new([0xFFu8, 0xFF], true)), 3),
            (Box::new(XorCodec::new(0)), 1),
        ]);
        assert_eq!(codec.encode_bytes(&[1, 2, 3, 4]).unwrap(), [0xFE, 0xFD, 3, 4]);
    }

    #[test]
    fn segmented_short_input_is_format_error() {
        let codec = SegmentedCodec::new(vec![
            (Box::new(XorCodec::new(1)), 4),
            (Box::new(XorCodec::new(2)), 4),
        ]);
        let err = codec.decode_bytes(&[0; 6]).unwrap_err();
        assert!(matches!(err, SerializerError::UnexpectedEof { offset: 6, need: 2 }));
    }

    #[test]
    fn segmented_trailing_input_is_format_error() {
        let codec = SegmentedCodec::new(vec![(Box::new(XorCodec::new(1)), 2)]);
        let err = codec.decode_bytes(&[0; 3]).unwrap_err();
        assert!(matches!(err, SerializerError::Format(_)));
    }

    #[test]
    fn empty_segment_list_accepts_only_empty_input() {
        let codec = SegmentedCodec::new(Vec::new());
        assert!(codec.decode_bytes(&[]).unwrap().is_empty());
        assert!(codec.decode_bytes(&[1]).is_err());
    }

    #[test]
    fn spec_builds_nested_codecs() {
        let spec = CodecSpec::Segmented(vec![
            (CodecSpec::Xor { key: 0x0F }, 2),
            (
                CodecSpec::MultiXor {
                    key: vec![0xF0],
                    skip_incomplete_sequences: false,
                },
                3,
            ),
        ]);
        let codec = spec.build();
        assert_eq!(codec.name(), "segmented");
        assert_eq!(
            codec.decode_bytes(&[1, 2, 3, 4, 5]).unwrap(),
            [1 ^ 0x0F, 2 ^ 0x0F, 3 ^ 0xF0, 4 ^ 0xF0, 5 ^ 0xF0]
        );
    }
}

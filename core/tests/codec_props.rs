use proptest::prelude::*;
use wordstat_core::huffman::{build_codec, decode, HuffmanTree};

proptest! {
    #[test]
    fn decode_inverts_encode(text in "\\PC{0,200}") {
        let enc = build_codec(&text).unwrap();
        prop_assert_eq!(decode(&enc.bits, &enc.codebook).unwrap(), text.clone());
        prop_assert_eq!(HuffmanTree::from_text(&text).decode(&enc.bits).unwrap(), text);
    }

    #[test]
    fn single_symbol_texts_round_trip(c in any::<char>(), n in 1usize..50) {
        let text: String = std::iter::repeat(c).take(n).collect();
        let enc = build_codec(&text).unwrap();
        prop_assert_eq!(enc.codebook.get(c), Some("0"));
        prop_assert_eq!(enc.bits.len(), n);
        prop_assert_eq!(decode(&enc.bits, &enc.codebook).unwrap(), text);
    }

    #[test]
    fn codebook_is_deterministic(text in "[a-e ,.]{0,120}") {
        prop_assert_eq!(build_codec(&text).unwrap(), build_codec(&text).unwrap());
    }

    #[test]
    fn codebook_is_prefix_free(text in "[a-z0-9 ]{2,150}") {
        let book = build_codec(&text).unwrap().codebook;
        let codes: Vec<&str> = book.iter().map(|(_, code)| code).collect();
        for (i, a) in codes.iter().enumerate() {
            prop_assert!(!a.is_empty());
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    prop_assert!(!b.starts_with(a), "{} is a prefix of {}", a, b);
                }
            }
        }
    }
}

#[test]
fn every_character_is_a_symbol() {
    let enc = build_codec("a b.\n").unwrap();
    for c in ['a', ' ', 'b', '.', '\n'] {
        assert!(enc.codebook.get(c).is_some(), "missing {c:?}");
    }
}

use vigil_crypto::{from_base64, from_url_safe_base64, to_base64, to_url_safe_base64, utf8_to_string};

#[test]
fn standard_roundtrip() {
    let data = b"vault bytes \x00\xff\x7f";
    let encoded = to_base64(data);
    assert_eq!(from_base64(&encoded).unwrap(), data);
}

#[test]
fn url_safe_roundtrip() {
    let data = [0xfbu8, 0xff, 0xbf, 0x00, 0x01];
    let encoded = to_url_safe_base64(&data);
    assert_eq!(from_url_safe_base64(&encoded).unwrap(), data);
}

#[test]
fn url_safe_has_no_padding_or_unsafe_chars() {
    // 0xfb ensures '+'/'/' would appear in the standard alphabet
    let data = [0xfbu8, 0xef, 0xfe, 0xfb, 0xef];
    let encoded = to_url_safe_base64(&data);
    assert!(!encoded.contains('='));
    assert!(!encoded.contains('+'));
    assert!(!encoded.contains('/'));
}

#[test]
fn empty_input_roundtrips() {
    assert_eq!(from_base64(&to_base64(b"")).unwrap(), b"");
    assert_eq!(from_url_safe_base64(&to_url_safe_base64(b"")).unwrap(), b"");
}

#[test]
fn wrong_alphabet_rejected() {
    // '+' is not in the URL-safe alphabet
    assert!(from_url_safe_base64("ab+cd").is_err());
}

#[test]
fn malformed_input_rejected() {
    assert!(from_base64("not base64!!!").is_err());
    assert!(from_url_safe_base64("%%%%").is_err());
}

#[test]
fn padding_rejected_in_url_safe_variant() {
    let padded = "AAAA====";
    assert!(from_url_safe_base64(padded).is_err());
}

#[test]
fn utf8_conversion() {
    assert_eq!(utf8_to_string("héllo".as_bytes()).unwrap(), "héllo");
    assert!(utf8_to_string(&[0xff, 0xfe]).is_err());
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn standard_always_roundtrips(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(from_base64(&to_base64(&bytes)).unwrap(), bytes);
        }

        #[test]
        fn url_safe_always_roundtrips(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(from_url_safe_base64(&to_url_safe_base64(&bytes)).unwrap(), bytes);
        }
    }
}

//! Property-based tests for string preparation and the codec.
//!
//! Uses proptest to generate random inputs and verify that:
//! 1. saslprep never panics and is idempotent
//! 2. The characters it is required to strip never survive
//! 3. Base64 round-trips are lossless
//! 4. Mechanism payloads keep their structure for arbitrary credentials

use proptest::prelude::*;
use sasl_client::codec::{b64_decode, b64_encode};
use sasl_client::{saslprep, Authenticator, Credentials};

/// Characters from the "commonly mapped to nothing" table that saslprep
/// must remove.
const MAPPED_TO_NOTHING: &[char] = &[
    '\u{00ad}', '\u{034f}', '\u{1806}', '\u{180b}', '\u{180c}', '\u{180d}', '\u{200c}',
    '\u{200d}', '\u{2060}', '\u{fe00}', '\u{fe0f}', '\u{feff}',
];

/// Non-ASCII space characters that saslprep must map to U+0020.
const MAPPED_TO_SPACE: &[char] = &[
    '\u{00a0}', '\u{1680}', '\u{2000}', '\u{2005}', '\u{200b}', '\u{202f}', '\u{205f}',
    '\u{3000}',
];

/// ASCII word with an invisible character spliced into it.
fn polluted_word() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[a-zA-Z0-9]{1,12}").expect("valid regex"),
        0usize..MAPPED_TO_NOTHING.len(),
        0usize..12,
    )
        .prop_map(|(mut word, junk, pos)| {
            let pos = pos.min(word.len());
            word.insert(pos, MAPPED_TO_NOTHING[junk]);
            word
        })
}

proptest! {
    #[test]
    fn saslprep_never_panics(s in any::<String>()) {
        let _ = saslprep(&s);
    }

    #[test]
    fn saslprep_is_idempotent(s in any::<String>()) {
        let once = saslprep(&s);
        prop_assert_eq!(saslprep(&once), once);
    }

    #[test]
    fn saslprep_strips_mapped_to_nothing(word in polluted_word()) {
        let prepped = saslprep(&word);
        for &junk in MAPPED_TO_NOTHING {
            prop_assert!(!prepped.contains(junk));
        }
    }

    #[test]
    fn saslprep_maps_spaces_to_ascii(
        a in "[a-z]{1,8}",
        b in "[a-z]{1,8}",
        space in 0usize..MAPPED_TO_SPACE.len(),
    ) {
        let input = format!("{a}{}{b}", MAPPED_TO_SPACE[space]);
        prop_assert_eq!(saslprep(&input), format!("{a} {b}"));
    }

    #[test]
    fn base64_round_trips(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let encoded = b64_encode(&bytes);
        prop_assert_eq!(b64_decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn plain_payload_keeps_its_structure(
        user in "[a-zA-Z0-9@.]{1,16}",
        pass in "[a-zA-Z0-9]{1,16}",
    ) {
        let mut auth = Authenticator::new(
            "imap",
            "mail.example.org",
            &["PLAIN"],
            Credentials::basic(user.clone(), pass.clone()),
        ).unwrap();
        auth.try_next_auth().unwrap();

        let payload = b64_decode(&auth.auth_step("").unwrap()).unwrap();
        let expected = format!("\0{user}\0{pass}");
        prop_assert_eq!(payload, expected.into_bytes());
    }
}

//! SASLprep string preparation (RFC 4013).
//!
//! Usernames and passwords pass through stringprep before they are
//! encoded into mechanism payloads, so that visually equivalent inputs
//! authenticate identically. This is the *querying* profile: the client
//! normalizes what it sends but does not reject prohibited or unassigned
//! code points, since classification is the credential store's job.
//!
//! # Reference
//! - RFC 4013 (SASLprep): <https://tools.ietf.org/html/rfc4013>
//! - RFC 3454 (stringprep): <https://tools.ietf.org/html/rfc3454>

use stringprep::tables;
use unicode_normalization::UnicodeNormalization;

/// Prepare a username or password for use in a SASL payload.
///
/// Applies, in order:
///
/// 1. mapping of non-ASCII space characters (RFC 3454 table C.1.2) to
///    U+0020,
/// 2. removal of the "commonly mapped to nothing" set (table B.1;
///    U+200B is claimed by the space mapping first),
/// 3. Unicode Normalization Form KC.
///
/// The function is total and idempotent.
///
/// # Example
///
/// ```
/// use sasl_client::saslprep;
///
/// // Soft hyphens are invisible and vanish.
/// assert_eq!(saslprep("ti\u{00ad}m"), "tim");
/// // Non-ASCII spaces collapse to the ASCII one.
/// assert_eq!(saslprep("a\u{2003}b"), "a b");
/// ```
pub fn saslprep(s: &str) -> String {
    s.chars()
        .filter_map(|c| {
            if tables::non_ascii_space_character(c) {
                Some(' ')
            } else if tables::commonly_mapped_to_nothing(c) {
                None
            } else {
                Some(c)
            }
        })
        .nfkc()
        .collect()
}

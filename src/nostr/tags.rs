//! Tag helpers for direct-message events.
//!
//! A NIP-04 style direct message names its recipient with a `p` tag:
//! `["p", <recipient pubkey hex>]`.

use nostr::Tag;

/// Tag name carrying the recipient public key.
pub const RECIPIENT_TAG: &str = "p";

/// Builder and reader for direct-message tags.
///
/// # Example
///
/// ```
/// use assistant_bridge::nostr::TagBuilder;
///
/// let tag = TagBuilder::p_tag("abc123");
/// assert_eq!(tag, vec!["p", "abc123"]);
/// ```
pub struct TagBuilder;

impl TagBuilder {
    /// Builds the `p` tag addressing `pubkey_hex`.
    #[must_use]
    pub fn p_tag(pubkey_hex: &str) -> Vec<String> {
        vec![RECIPIENT_TAG.to_string(), pubkey_hex.to_string()]
    }

    /// Returns the value of the first `p` tag, if any.
    ///
    /// A `p` tag without a value, or with an empty one, does not count.
    pub fn recipient<'a, I>(tags: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        tags.into_iter().find_map(|tag| {
            let values = tag.as_slice();
            if values.first().map(String::as_str) != Some(RECIPIENT_TAG) {
                return None;
            }
            values
                .get(1)
                .map(String::as_str)
                .filter(|value| !value.is_empty())
        })
    }
}

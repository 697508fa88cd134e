use std::collections::HashMap;

use cairn_verify::Checksum;

/// Per-directory checksum manifest, one `<sha1> <filename>` pair per line.
pub const CHECKSUMS_FILE: &str = "SHA1SUMS";
/// Detached signature of [`CHECKSUMS_FILE`].
pub const CHECKSUMS_SIGNATURE: &str = "SHA1SUMS.asc";
/// Public key that signed [`CHECKSUMS_FILE`].
pub const CHECKSUMS_KEY: &str = "SHA1SUMS.key";
/// Entries starting with this prefix belong to the trust chain, not the payload.
pub const CHECKSUMS_PREFIX: &str = "SHA1SUMS";

/// A manifest line that is not exactly two whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: expected '<digest> <filename>', got '{content}'")]
pub struct ManifestError {
    /// 1-based line number.
    pub line:    usize,
    pub content: String,
}

/// Expected digests keyed by bare file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestIndex(HashMap<String, Checksum>);

impl DigestIndex {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, name: impl Into<String>, checksum: Checksum) {
        self.0.insert(name.into(), checksum);
    }

    pub fn get(&self, name: &str) -> Option<&Checksum> { self.0.get(name) }

    /// The digest for `name`, or the empty checksum when unknown.
    pub fn checksum_for(&self, name: &str) -> Checksum { self.get(name).cloned().unwrap_or_default() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Checksum)> {
        self.0.iter().map(|(name, checksum)| (name.as_str(), checksum))
    }
}

/// Parse a `SHA1SUMS` manifest.
///
/// Any line that is not exactly two tokens fails the whole manifest. A
/// leading `*` on the file name (binary-mode marker written by `sha1sum -b`)
/// is dropped; a name that is empty afterwards is skipped. Later lines win
/// over earlier ones for the same name.
///
/// # Examples
///
/// ```
/// use cairn_fetch::core::parse_manifest;
///
/// let index = parse_manifest("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed  hello\n").unwrap();
/// assert_eq!(index.get("hello").unwrap().value(), "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
///
/// assert!(parse_manifest("onlyonetoken\n").is_err());
/// ```
pub fn parse_manifest(content: &str) -> Result<DigestIndex, ManifestError> {
    let mut index = DigestIndex::new();
    for (n, line) in content.lines().enumerate() {
        let words: Vec<&str> = line.split_whitespace().collect();
        let &[digest, name] = words.as_slice() else {
            return Err(ManifestError {
                line:    n + 1,
                content: line.to_string(),
            });
        };
        let name = name.strip_prefix('*').unwrap_or(name);
        if name.is_empty() {
            continue;
        }
        index.insert(name, Checksum::sha1(digest));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_pairs() {
        let index = parse_manifest(
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa file1\n\
             BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB\tfile2\n",
        )
        .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("file1"), Some(&Checksum::sha1("a".repeat(40))));
        assert_eq!(index.get("file2"), Some(&Checksum::sha1("b".repeat(40))));
        assert!(index.checksum_for("file3").is_empty());
    }

    #[test]
    fn single_token_is_fatal() {
        let err = parse_manifest("aaaa file1\nonlyonetoken\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.content, "onlyonetoken");
    }

    #[test]
    fn three_tokens_are_fatal() {
        assert!(parse_manifest("aaaa file with-space\n").is_err());
    }

    #[test]
    fn blank_line_is_fatal() {
        assert!(parse_manifest("aaaa file1\n\naaaa file2\n").is_err());
    }

    #[test]
    fn binary_marker_and_empty_names() {
        let index = parse_manifest("aaaa *file1\nbbbb *\n").unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get("file1").is_some());
    }

    #[test]
    fn empty_manifest() {
        assert!(parse_manifest("").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn two_token_lines_always_parse(
            digest in "[0-9a-f]{40}",
            name in "[A-Za-z0-9._-]{1,32}",
            sep in "[ \t]{1,4}",
        ) {
            let index = parse_manifest(&format!("{digest}{sep}{name}\n")).unwrap();
            prop_assert_eq!(index.get(&name), Some(&Checksum::sha1(&digest)));
        }

        #[test]
        fn other_token_counts_fail(words in prop::collection::vec("[a-z0-9]{1,8}", 0..6)) {
            prop_assume!(words.len() != 2);
            let line = format!("{}\n", words.join(" "));
            prop_assert!(parse_manifest(&line).is_err());
        }
    }
}

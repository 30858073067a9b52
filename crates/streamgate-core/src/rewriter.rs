//! Manifest rewriting.
//!
//! A manifest is scanned line by line. A line whose trimmed text ends with the
//! segment suffix is a segment reference and is replaced by
//! `<segment path>?expiry=<expiry>&sig=<sig>`; every other line is passed
//! through verbatim and in order. The rewritten manifest is computed per
//! request and never stored.

use std::borrow::Cow;

use streamgate_auth::TokenCodec;
use streamgate_auth::reference::{EXPIRY_PARAM, SIGNATURE_PARAM};

use crate::subrequest::split_uri;

/// How segment references obtain their signature.
#[derive(Debug, Clone, Copy)]
pub enum SegmentSigner<'a> {
    /// Reuse the `(expiry, signature)` pair the caller presented for the
    /// manifest. Valid under stream-scoped signatures.
    Shared {
        /// The caller's expiry, as presented.
        expiry: &'a str,
        /// The caller's signature, as presented.
        signature: &'a str,
    },
    /// Sign every segment path separately, keeping the caller's expiry.
    /// Required under resource-scoped signatures.
    PerResource {
        /// The codec minting segment signatures.
        codec: &'a TokenCodec,
        /// The caller's expiry, as presented.
        expiry: &'a str,
    },
}

impl SegmentSigner<'_> {
    /// Build the signed reference for `segment_path`.
    ///
    /// Per-resource signatures cover the path only, so a `scheme://host/..`
    /// line is signed over the path a validating proxy will forward.
    #[must_use]
    pub fn signed_reference(&self, segment_path: &str) -> String {
        let (expiry, signature) = match *self {
            Self::Shared { expiry, signature } => (expiry, Cow::Borrowed(signature)),
            Self::PerResource { codec, expiry } => {
                (expiry, Cow::Owned(codec.sign(split_uri(segment_path).0, expiry)))
            }
        };
        format!("{segment_path}?{EXPIRY_PARAM}={expiry}&{SIGNATURE_PARAM}={signature}")
    }
}

/// Rewrites segment lines of a manifest into signed references.
///
/// # Examples
///
/// ```
/// use streamgate_core::rewriter::{ManifestRewriter, SegmentSigner};
///
/// let rewriter = ManifestRewriter::new(".ts");
/// let signer = SegmentSigner::Shared { expiry: "9999999999", signature: "ab12" };
/// let out = rewriter.rewrite("#EXTM3U\nseg0.ts", &signer);
/// assert_eq!(out, "#EXTM3U\nseg0.ts?expiry=9999999999&sig=ab12");
/// ```
#[derive(Debug, Clone)]
pub struct ManifestRewriter {
    segment_suffix: String,
    base_path: Option<String>,
}

impl ManifestRewriter {
    /// Create a rewriter treating lines ending in `segment_suffix` as segments.
    #[must_use]
    pub fn new(segment_suffix: impl Into<String>) -> Self {
        Self {
            segment_suffix: segment_suffix.into(),
            base_path: None,
        }
    }

    /// Prefix relative segment names with `base_path` (e.g. `/hls/streamkey/`).
    #[must_use]
    pub fn with_base_path(mut self, base_path: Option<String>) -> Self {
        self.base_path = base_path;
        self
    }

    /// The segment suffix.
    #[must_use]
    pub fn segment_suffix(&self) -> &str {
        &self.segment_suffix
    }

    /// Whether `line` references a media segment.
    #[must_use]
    pub fn is_segment_line(&self, line: &str) -> bool {
        !self.segment_suffix.is_empty() && line.trim().ends_with(self.segment_suffix.as_str())
    }

    /// The path a segment line refers to.
    ///
    /// Absolute paths and URLs are kept; relative names get the base path.
    #[must_use]
    pub fn segment_path<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let name = line.trim();
        match &self.base_path {
            Some(base) if !name.starts_with('/') && !name.contains("://") => {
                Cow::Owned(format!("{base}{name}"))
            }
            _ => Cow::Borrowed(name),
        }
    }

    /// Lazily rewrite `manifest` line by line.
    ///
    /// The iterator is cheap to clone, and calling this again restarts the scan.
    pub fn rewrite_lines<'a>(
        &'a self,
        manifest: &'a str,
        signer: &'a SegmentSigner<'a>,
    ) -> impl Iterator<Item = Cow<'a, str>> + Clone + 'a {
        manifest.lines().map(move |line| {
            if self.is_segment_line(line) {
                Cow::Owned(signer.signed_reference(&self.segment_path(line)))
            } else {
                Cow::Borrowed(line)
            }
        })
    }

    /// Rewrite `manifest` into a newline-joined string.
    #[must_use]
    pub fn rewrite(&self, manifest: &str, signer: &SegmentSigner<'_>) -> String {
        self.rewrite_lines(manifest, signer)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

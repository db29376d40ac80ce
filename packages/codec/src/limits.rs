//! Size and depth ceilings shared by every codec and parser.

use serde::{Deserialize, Serialize};

/// Largest input or output any codec accepts.
///
/// Keeps the 3x/5x worst-case expansion arithmetic far inside `usize` on
/// every platform and within signed 32-bit range for collaborators that
/// report sizes as `i32`.
pub const MAX_STRING_LENGTH: usize = 2_147_483_646;

/// Default nesting ceiling for parsed payloads.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Explicit limits handed to each codec, serializer, parser and forger.
///
/// Nothing in the workspace reads process-wide configuration; callers
/// construct a `Limits` (or deserialize one from their own config file)
/// and pass it in.
///
/// ```rust
/// use rowfs_codec::Limits;
///
/// let limits = Limits::default().with_max_depth(8);
/// assert_eq!(limits.max_depth, 8);
/// ```
///
/// The length fields are public, so a struct literal can hold a value past
/// [`MAX_STRING_LENGTH`]. Consumers read them through
/// [`Limits::string_ceiling`] and [`Limits::update_ceiling`], which never
/// exceed it, and deserialization clamps them on the way in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LimitsConfig")]
pub struct Limits {
    /// Ceiling on any single input or produced text buffer, in bytes.
    pub max_string_len: usize,
    /// Deepest object nesting the parser will open.
    pub max_depth: usize,
    /// Ceiling on a forged `SET` fragment, in bytes.
    pub max_update_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_string_len: MAX_STRING_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            max_update_len: MAX_STRING_LENGTH,
        }
    }
}

impl Limits {
    /// Effective `max_string_len`, clamped to [`MAX_STRING_LENGTH`].
    pub fn string_ceiling(&self) -> usize {
        self.max_string_len.min(MAX_STRING_LENGTH)
    }

    /// Effective `max_update_len`, clamped to [`MAX_STRING_LENGTH`].
    pub fn update_ceiling(&self) -> usize {
        self.max_update_len.min(MAX_STRING_LENGTH)
    }

    #[must_use]
    pub fn with_max_string_len(mut self, max: usize) -> Self {
        self.max_string_len = max.min(MAX_STRING_LENGTH);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    #[must_use]
    pub fn with_max_update_len(mut self, max: usize) -> Self {
        self.max_update_len = max.min(MAX_STRING_LENGTH);
        self
    }
}

/// `Limits` as written in a config file, before clamping.
#[derive(Deserialize)]
#[serde(default)]
struct LimitsConfig {
    max_string_len: usize,
    max_depth: usize,
    max_update_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = Limits::default();
        LimitsConfig {
            max_string_len: limits.max_string_len,
            max_depth: limits.max_depth,
            max_update_len: limits.max_update_len,
        }
    }
}

impl From<LimitsConfig> for Limits {
    fn from(config: LimitsConfig) -> Self {
        Limits::default()
            .with_max_string_len(config.max_string_len)
            .with_max_depth(config.max_depth)
            .with_max_update_len(config.max_update_len)
    }
}

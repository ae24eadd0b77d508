//! Well-known package directories exposed in the dependency directory.

/// Expose `source` (relative to the dependency directory) under the
/// dependency directory's `dest` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymlinkRule {
    pub source: &'static str,
    pub dest: &'static str,
}

impl SymlinkRule {
    const fn new(source: &'static str, dest: &'static str) -> Self {
        Self { source, dest }
    }
}

/// Evaluated in order on every run.
pub const SYMLINK_RULES: &[SymlinkRule] = &[
    SymlinkRule::new("usr/bin", "bin"),
    SymlinkRule::new("usr/lib", "lib"),
    SymlinkRule::new("usr/lib/i386-linux-gnu", "lib"),
    SymlinkRule::new("usr/lib/x86_64-linux-gnu", "lib"),
    SymlinkRule::new("lib/x86_64-linux-gnu", "lib"),
    SymlinkRule::new("usr/include", "include"),
    SymlinkRule::new("usr/lib/i386-linux-gnu/pkgconfig", "pkgconfig"),
    SymlinkRule::new("usr/lib/x86_64-linux-gnu/pkgconfig", "pkgconfig"),
    SymlinkRule::new("usr/lib/pkgconfig", "pkgconfig"),
];

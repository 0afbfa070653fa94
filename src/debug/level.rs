//! The debug level: a bitmask of independent trace facets, decoded from a flag string.
//!
//! | char | facet       |
//! |------|-------------|
//! | `a`  | `ARGS`      |
//! | `e`  | `EXPANSION` |
//! | `q`  | `QUOTE`     |
//! | `t`  | `ALL`       |
//! | `l`  | `LINE`      |
//! | `f`  | `FILE`      |
//! | `p`  | `PATH`      |
//! | `c`  | `CALL`      |
//! | `i`  | `INPUT`     |
//! | `x`  | `CALLID`    |
//! | `V`  | `VERBOSE`   |

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::DiagError;

/// Bitmask over the trace facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DebugLevel(u32);

impl DebugLevel {
    pub const NONE: DebugLevel = DebugLevel(0);
    /// Show the actual arguments of traced calls.
    pub const ARGS: DebugLevel = DebugLevel(1);
    /// Show the expansion of traced calls.
    pub const EXPANSION: DebugLevel = DebugLevel(2);
    /// Quote arguments and expansions in trace output.
    pub const QUOTE: DebugLevel = DebugLevel(4);
    /// Trace every macro call, not only the ones marked for tracing.
    pub const ALL: DebugLevel = DebugLevel(8);
    /// Add the current input line to trace headers.
    pub const LINE: DebugLevel = DebugLevel(16);
    /// Add the current input file to trace headers.
    pub const FILE: DebugLevel = DebugLevel(32);
    /// Report include path searches.
    pub const PATH: DebugLevel = DebugLevel(64);
    /// Trace the call before and after expansion, on separate lines.
    pub const CALL: DebugLevel = DebugLevel(128);
    /// Report changes of input file.
    pub const INPUT: DebugLevel = DebugLevel(256);
    /// Add the call id to trace headers.
    pub const CALLID: DebugLevel = DebugLevel(512);
    /// Every facet.
    pub const VERBOSE: DebugLevel = DebugLevel(1023);
    /// Level used when no flags (or an empty flag string) are given.
    pub const DEFAULT: DebugLevel = DebugLevel(1 | 2 | 4);

    /// Flag characters of the individual facets, in rendering order.
    const FACETS: [(char, DebugLevel); 10] = [
        ('a', Self::ARGS),
        ('e', Self::EXPANSION),
        ('q', Self::QUOTE),
        ('t', Self::ALL),
        ('l', Self::LINE),
        ('f', Self::FILE),
        ('p', Self::PATH),
        ('c', Self::CALL),
        ('i', Self::INPUT),
        ('x', Self::CALLID),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds a level from raw bits, dropping bits that name no facet.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        DebugLevel(bits & Self::VERBOSE.0)
    }

    pub const fn contains(self, other: DebugLevel) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn facet(flag: char) -> Option<DebugLevel> {
        if flag == 'V' {
            return Some(Self::VERBOSE);
        }
        Self::FACETS
            .iter()
            .find(|(c, _)| *c == flag)
            .map(|(_, level)| *level)
    }

    /// Decodes a flag string.
    ///
    /// `None` or `""` yields [`DebugLevel::DEFAULT`]. Any character outside the facet table aborts
    /// the scan with [`DiagError::InvalidDebugFlag`].
    pub fn decode(opts: Option<&str>) -> Result<DebugLevel, DiagError> {
        let flags = match opts {
            None | Some("") => return Ok(Self::DEFAULT),
            Some(flags) => flags,
        };
        let mut level = Self::NONE;
        for (position, flag) in flags.chars().enumerate() {
            match Self::facet(flag) {
                Some(facet) => level |= facet,
                None => {
                    return Err(DiagError::InvalidDebugFlag {
                        flag,
                        position,
                        flags: flags.to_string(),
                    })
                }
            }
        }
        Ok(level)
    }
}

impl BitOr for DebugLevel {
    type Output = DebugLevel;

    fn bitor(self, rhs: DebugLevel) -> DebugLevel {
        DebugLevel(self.0 | rhs.0)
    }
}

impl BitOrAssign for DebugLevel {
    fn bitor_assign(&mut self, rhs: DebugLevel) {
        self.0 |= rhs.0;
    }
}

/// Renders the level back into a flag string; `VERBOSE` renders as its individual facets.
impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, facet) in Self::FACETS {
            if self.contains(facet) {
                write!(f, "{flag}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for DebugLevel {
    type Err = DiagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(Some(s))
    }
}

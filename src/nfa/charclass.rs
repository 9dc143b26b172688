// src/nfa/charclass.rs
use std::fmt;

/// Largest Unicode scalar value.
pub const MAX_CHAR: u32 = 0x10FFFF;

/// A set of code points, kept as sorted, disjoint, non-adjacent inclusive ranges.
///
/// Every symbol transition in the NFA is labelled with one of these; a literal is
/// just a class with a single one-point range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CharClass {
    ranges: Vec<(u32, u32)>,
}

impl CharClass {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(c: char) -> Self {
        Self {
            ranges: vec![(c as u32, c as u32)],
        }
    }

    /// `lo..=hi`; callers check `lo <= hi` first.
    pub fn range(lo: char, hi: char) -> Self {
        Self::from_ranges([(lo as u32, hi as u32)])
    }

    /// `.` in a pattern: everything but `\n`.
    pub fn any_but_newline() -> Self {
        Self::single('\n').negate()
    }

    pub fn digit() -> Self {
        Self::range('0', '9')
    }

    pub fn word() -> Self {
        Self::from_ranges([
            ('0' as u32, '9' as u32),
            ('A' as u32, 'Z' as u32),
            ('_' as u32, '_' as u32),
            ('a' as u32, 'z' as u32),
        ])
    }

    pub fn space() -> Self {
        Self::from_ranges([(0x09, 0x0D), (0x20, 0x20)])
    }

    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut ranges: Vec<(u32, u32)> = ranges.into_iter().filter(|(lo, hi)| lo <= hi).collect();
        ranges.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
        for (lo, hi) in ranges {
            match merged.last_mut() {
                Some(prev) if lo <= prev.1.saturating_add(1) => prev.1 = prev.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        Self { ranges: merged }
    }

    pub fn union(&self, other: &CharClass) -> Self {
        Self::from_ranges(self.ranges.iter().chain(other.ranges.iter()).copied())
    }

    pub fn negate(&self) -> Self {
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = 0u32;
        for &(lo, hi) in &self.ranges {
            if lo > next {
                out.push((next, lo - 1));
            }
            next = hi.saturating_add(1);
        }
        if next <= MAX_CHAR {
            out.push((next, MAX_CHAR));
        }
        Self { ranges: out }
    }

    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.contains_u32(c as u32)
    }

    pub fn contains_u32(&self, cp: u32) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if cp < lo {
                    std::cmp::Ordering::Greater
                } else if cp > hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Splits the code-point space touched by `classes` into disjoint atoms.
///
/// Every class is a union of whole atoms, so one representative code point per
/// atom decides membership for the entire atom. Atoms that fall in a gap between
/// classes are still returned; callers skip the ones nothing covers.
pub fn partition<'a, I>(classes: I) -> Vec<(u32, u32)>
where
    I: IntoIterator<Item = &'a CharClass>,
{
    let mut bounds: Vec<u64> = Vec::new();
    for class in classes {
        for &(lo, hi) in class.ranges() {
            bounds.push(lo as u64);
            bounds.push(hi as u64 + 1);
        }
    }
    bounds.sort_unstable();
    bounds.dedup();

    bounds
        .windows(2)
        .map(|w| (w[0] as u32, (w[1] - 1) as u32))
        .collect()
}

fn write_cp(f: &mut fmt::Formatter<'_>, cp: u32) -> fmt::Result {
    match char::from_u32(cp) {
        Some(c) if c.is_ascii_graphic() && !matches!(c, '\\' | ']' | '-' | '^') => {
            write!(f, "{c}")
        }
        Some(' ') => write!(f, " "),
        _ => write!(f, "\\u{{{cp:X}}}"),
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [(lo, hi)] = self.ranges.as_slice() {
            if lo == hi {
                return write_cp(f, *lo);
            }
        }
        write!(f, "[")?;
        for &(lo, hi) in &self.ranges {
            write_cp(f, lo)?;
            if hi != lo {
                write!(f, "-")?;
                write_cp(f, hi)?;
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ranges_merges_overlap_and_adjacency() {
        let c = CharClass::from_ranges([(10, 20), (21, 30), (5, 12), (40, 41)]);
        assert_eq!(c.ranges(), &[(5, 30), (40, 41)]);
    }

    #[test]
    fn negate_twice_is_identity() {
        let w = CharClass::word();
        assert_eq!(w.negate().negate(), w);
        assert!(!w.negate().contains('a'));
        assert!(w.negate().contains('-'));
        assert!(CharClass::empty().negate().contains_u32(MAX_CHAR));
    }

    #[test]
    fn dot_excludes_newline_only() {
        let dot = CharClass::any_but_newline();
        assert!(!dot.contains('\n'));
        assert!(dot.contains('\r'));
        assert!(dot.contains('é'));
    }

    #[test]
    fn partition_separates_overlapping_classes() {
        let lower = CharClass::range('a', 'z');
        let i = CharClass::single('i');
        let atoms = partition([&lower, &i]);
        assert_eq!(
            atoms,
            vec![
                ('a' as u32, 'h' as u32),
                ('i' as u32, 'i' as u32),
                ('j' as u32, 'z' as u32)
            ]
        );
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(CharClass::single('x').to_string(), "x");
        assert_eq!(CharClass::digit().to_string(), "[0-9]");
    }
}

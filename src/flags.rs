use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Evidence about the input collected over a run.
    ///
    /// Bits only ever narrow the 8-bit candidate set or get forced, so a
    /// candidate that one line excludes stays excluded for the rest of the run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CapabilityFlags: u8 {
        const NON_ASCII = 0x01;
        const JIS_ESCAPE = 0x02;
        const ASSUMED = 0x04;
        const EUC = 0x08;
        const DEC = 0x10;
        const SJIS = 0x20;
        const JIS8 = 0x40;

        /// The 8-bit family.
        const BIT8 = Self::EUC.bits() | Self::DEC.bits() | Self::SJIS.bits() | Self::JIS8.bits();
    }
}

impl CapabilityFlags {
    /// Starting point for auto-detection: every 8-bit family is a candidate,
    /// except DEC unless the extended ranges are enabled.
    pub fn initial(extended: bool) -> Self {
        if extended {
            Self::BIT8
        } else {
            Self::BIT8.difference(Self::DEC)
        }
    }

    /// Folds one line's classification into the running state. JIS and
    /// non-ASCII evidence accumulates; the 8-bit candidates are narrowed to
    /// those the line still allows. Since a run starts with every candidate
    /// set, the first non-ASCII line effectively seeds the candidate set.
    pub fn merge_line(&mut self, line: CapabilityFlags) {
        self.insert(line & (Self::JIS_ESCAPE | Self::NON_ASCII));
        self.remove(Self::BIT8.difference(line));
    }

    /// Non-ASCII bytes have been seen and both the EUC/DEC family and
    /// Shift_JIS still explain all of them.
    pub fn is_ambiguous(self) -> bool {
        self.contains(Self::NON_ASCII)
            && self.intersects(Self::EUC | Self::DEC)
            && self.contains(Self::SJIS)
    }

    /// Whether the next line still has to go through the guesser.
    pub fn needs_guess(self) -> bool {
        (!self.contains(Self::NON_ASCII) && self.intersects(Self::BIT8))
            || (self.intersects(Self::EUC | Self::DEC)
                && self.contains(Self::SJIS)
                && !self.contains(Self::ASSUMED))
    }
}

/// Interpretation mode of a JIS byte stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserMode {
    Ascii,
    Kanji,
    Gaiji,
    /// Hankaku kana between SO and SI.
    ShiftOutKana,
    /// Hankaku kana after `ESC ( I`.
    EscIKana,
}

impl Default for ParserMode {
    fn default() -> Self {
        ParserMode::Ascii
    }
}

/// Final letters of the JIS escape sequences observed in the input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeenEscapes {
    /// `ESC $ x`
    pub shift_in: LetterSet,
    /// `ESC ( x`, including `I`.
    pub shift_out: LetterSet,
    /// `ESC & @ ESC $ x`
    pub kanji_1990: LetterSet,
    /// `ESC $ ( x`
    pub gaiji: LetterSet,
}

impl SeenEscapes {
    pub fn merge(&mut self, other: SeenEscapes) {
        self.shift_in.0 |= other.shift_in.0;
        self.shift_out.0 |= other.shift_out.0;
        self.kanji_1990.0 |= other.kanji_1990.0;
        self.gaiji.0 |= other.gaiji.0;
    }
}

/// A set of the letters `@` to `_`.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct LetterSet(u32);

impl LetterSet {
    pub fn insert(&mut self, letter: u8) {
        if let Some(bit) = Self::bit(letter) {
            self.0 |= bit;
        }
    }

    pub fn contains(self, letter: u8) -> bool {
        Self::bit(letter).map_or(false, |bit| self.0 & bit != 0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn bit(letter: u8) -> Option<u32> {
        match letter {
            b'@'..=b'_' => Some(1 << (letter - b'@')),
            _ => None,
        }
    }
}

impl fmt::Debug for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for letter in b'@'..=b'_' {
            if self.contains(letter) {
                set.entry(&char::from(letter));
            }
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_narrows() {
        let mut flags = CapabilityFlags::initial(false);
        flags.merge_line(CapabilityFlags::NON_ASCII.union(CapabilityFlags::EUC));
        assert!(flags.contains(CapabilityFlags::EUC));
        assert!(!flags.contains(CapabilityFlags::SJIS));
        // A later line allowing Shift_JIS again must not revive it.
        flags.merge_line(CapabilityFlags::BIT8);
        assert!(!flags.contains(CapabilityFlags::SJIS));
        assert!(flags.contains(CapabilityFlags::NON_ASCII));
    }

    #[test]
    fn test_ascii_line_keeps_candidates() {
        let mut flags = CapabilityFlags::initial(true);
        flags.merge_line(CapabilityFlags::BIT8);
        assert_eq!(flags, CapabilityFlags::BIT8);
        assert!(flags.needs_guess());
        assert!(!flags.is_ambiguous());
    }

    #[test]
    fn test_ambiguous() {
        let flags = CapabilityFlags::NON_ASCII
            .union(CapabilityFlags::EUC)
            .union(CapabilityFlags::SJIS);
        assert!(flags.is_ambiguous());
        assert!(flags.needs_guess());
        assert!(!flags.union(CapabilityFlags::ASSUMED).needs_guess());
    }

    #[test]
    fn test_family_and_debug() {
        assert_eq!(
            CapabilityFlags::initial(false),
            CapabilityFlags::EUC | CapabilityFlags::SJIS | CapabilityFlags::JIS8
        );
        assert_eq!(
            format!("{:?}", CapabilityFlags::NON_ASCII | CapabilityFlags::SJIS),
            "CapabilityFlags(NON_ASCII | SJIS)"
        );
    }

    #[test]
    fn test_letter_set() {
        let mut set = LetterSet::default();
        assert!(set.is_empty());
        set.insert(b'B');
        set.insert(b'z');
        assert!(set.contains(b'B'));
        assert!(!set.contains(b'J'));
        assert!(!set.contains(b'z'));
        assert_eq!(format!("{:?}", set), "{'B'}");
    }
}

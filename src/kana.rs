//! JIS X 0201 hankaku kana to zenkaku kana in 8-bit form, indexed by the
//! kana byte minus 0x20.

pub static KATAKANA: [u16; 64] = [
    0x0000, 0xA1A3, 0xA1D6, 0xA1D7, 0xA1A2, 0xA1A6, 0xA5F2, 0xA5A1, // 0x20
    0xA5A3, 0xA5A5, 0xA5A7, 0xA5A9, 0xA5E3, 0xA5E5, 0xA5E7, 0xA5C3, // 0x28
    0xA1BC, 0xA5A2, 0xA5A4, 0xA5A6, 0xA5A8, 0xA5AA, 0xA5AB, 0xA5AD, // 0x30
    0xA5AF, 0xA5B1, 0xA5B3, 0xA5B5, 0xA5B7, 0xA5B9, 0xA5BB, 0xA5BD, // 0x38
    0xA5BF, 0xA5C1, 0xA5C4, 0xA5C6, 0xA5C8, 0xA5CA, 0xA5CB, 0xA5CC, // 0x40
    0xA5CD, 0xA5CE, 0xA5CF, 0xA5D2, 0xA5D5, 0xA5D8, 0xA5DB, 0xA5DE, // 0x48
    0xA5DF, 0xA5E0, 0xA5E1, 0xA5E2, 0xA5E4, 0xA5E6, 0xA5E8, 0xA5E9, // 0x50
    0xA5EA, 0xA5EB, 0xA5EC, 0xA5ED, 0xA5EF, 0xA5F3, 0xA1AB, 0xA1AC, // 0x58
];

pub static HIRAGANA: [u16; 64] = [
    0x0000, 0xA1A3, 0xA1D6, 0xA1D7, 0xA1A2, 0xA1A6, 0xA4F2, 0xA4A1, // 0x20
    0xA4A3, 0xA4A5, 0xA4A7, 0xA4A9, 0xA4E3, 0xA4E5, 0xA4E7, 0xA4C3, // 0x28
    0xA1BC, 0xA4A2, 0xA4A4, 0xA4A6, 0xA4A8, 0xA4AA, 0xA4AB, 0xA4AD, // 0x30
    0xA4AF, 0xA4B1, 0xA4B3, 0xA4B5, 0xA4B7, 0xA4B9, 0xA4BB, 0xA4BD, // 0x38
    0xA4BF, 0xA4C1, 0xA4C4, 0xA4C6, 0xA4C8, 0xA4CA, 0xA4CB, 0xA4CC, // 0x40
    0xA4CD, 0xA4CE, 0xA4CF, 0xA4D2, 0xA4D5, 0xA4D8, 0xA4DB, 0xA4DE, // 0x48
    0xA4DF, 0xA4E0, 0xA4E1, 0xA4E2, 0xA4E4, 0xA4E6, 0xA4E8, 0xA4E9, // 0x50
    0xA4EA, 0xA4EB, 0xA4EC, 0xA4ED, 0xA4EF, 0xA4F3, 0xA1AB, 0xA1AC, // 0x58
];

/// Bit 0: takes dakuten (the next code point is the voiced form).
/// Bit 1: takes handakuten (two code points further on).
pub static DAKUON: [u8; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 0x20
    0, 0, 0, 0, 0, 0, 0, 0, // 0x28
    0, 0, 0, 0, 0, 0, 1, 1, // 0x30
    1, 1, 1, 1, 1, 1, 1, 1, // 0x38
    1, 1, 1, 1, 1, 0, 0, 0, // 0x40
    0, 0, 3, 3, 3, 3, 3, 0, // 0x48
    0, 0, 0, 0, 0, 0, 0, 0, // 0x50
    0, 0, 0, 0, 0, 0, 0, 0, // 0x58
];

pub const DAKUTEN: u8 = 0x5E;
pub const HANDAKUTEN: u8 = 0x5F;

/// Which zenkaku kana the DEC encoder widens hankaku kana to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KanaTable {
    Katakana,
    Hiragana,
}

impl Default for KanaTable {
    fn default() -> Self {
        KanaTable::Katakana
    }
}

impl KanaTable {
    pub fn lookup(self, index: u8) -> u16 {
        let table = match self {
            KanaTable::Katakana => &KATAKANA,
            KanaTable::Hiragana => &HIRAGANA,
        };
        table[usize::from(index & 0x3F)]
    }

    /// Widens the kana at `index`, merged with the combining `mark` if that
    /// kana takes it. Returns the code and whether the mark was absorbed.
    pub fn combine(self, index: u8, mark: u8) -> (u16, bool) {
        let code = self.lookup(index);
        let wanted = match mark {
            DAKUTEN => 1,
            HANDAKUTEN => 2,
            _ => return (code, false),
        };
        let step = DAKUON[usize::from(index & 0x3F)] & wanted;
        if step == 0 {
            (code, false)
        } else {
            (code + u16::from(step), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ka_takes_dakuten() {
        // ｶ + ﾞ -> ガ
        assert_eq!(KanaTable::Katakana.combine(0x36 - 0x20, DAKUTEN), (0xA5AC, true));
        // ｶ + ﾟ is not a thing.
        assert_eq!(KanaTable::Katakana.combine(0x36 - 0x20, HANDAKUTEN), (0xA5AB, false));
    }

    #[test]
    fn test_ha_takes_both() {
        // ﾊ + ﾞ -> バ, ﾊ + ﾟ -> パ
        assert_eq!(KanaTable::Katakana.combine(0x4A - 0x20, DAKUTEN), (0xA5D0, true));
        assert_eq!(KanaTable::Katakana.combine(0x4A - 0x20, HANDAKUTEN), (0xA5D1, true));
        assert_eq!(KanaTable::Hiragana.combine(0x4A - 0x20, HANDAKUTEN), (0xA4D1, true));
    }

    #[test]
    fn test_small_o_takes_nothing() {
        assert_eq!(KanaTable::Katakana.combine(0x2B - 0x20, DAKUTEN), (0xA5A9, false));
    }
}

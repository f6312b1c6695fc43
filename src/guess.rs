use crate::flags::CapabilityFlags;
use crate::flags::ParserMode;
use crate::flags::SeenEscapes;

pub const ESC: u8 = 0x1B;
pub const SO: u8 = 0x0E;
pub const SI: u8 = 0x0F;
pub const SS2: u8 = 0x8E;
pub const SS3: u8 = 0x8F;

/// A recognized JIS escape sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Escape {
    /// `ESC $ B` or `ESC $ @`
    KanjiIn(u8),
    /// `ESC & @ ESC $ B`
    Kanji1990,
    /// `ESC ( B`, `ESC ( J` or `ESC ( H`
    KanjiOut(u8),
    /// `ESC ( I`
    KanaIn,
    /// `ESC $ ( D`
    GaijiIn,
}

impl Escape {
    /// Recognizes the escape sequence at the start of `buffer`, which must
    /// begin with ESC. Returns the sequence and its length in bytes.
    pub fn parse(buffer: &[u8]) -> Option<(Escape, usize)> {
        let rest = buffer.get(1..)?;
        if rest.starts_with(b"$B") || rest.starts_with(b"$@") {
            Some((Escape::KanjiIn(rest[1]), 3))
        } else if rest.starts_with(b"&@\x1B$B") {
            Some((Escape::Kanji1990, 6))
        } else if rest.starts_with(b"(B") || rest.starts_with(b"(J") || rest.starts_with(b"(H") {
            Some((Escape::KanjiOut(rest[1]), 3))
        } else if rest.starts_with(b"(I") {
            Some((Escape::KanaIn, 3))
        } else if rest.starts_with(b"$(D") {
            Some((Escape::GaijiIn, 4))
        } else {
            None
        }
    }

    pub fn record(self, seen: &mut SeenEscapes) {
        match self {
            Escape::KanjiIn(letter) => seen.shift_in.insert(letter),
            Escape::Kanji1990 => seen.kanji_1990.insert(b'B'),
            Escape::KanjiOut(letter) => seen.shift_out.insert(letter),
            Escape::KanaIn => seen.shift_out.insert(b'I'),
            Escape::GaijiIn => seen.gaiji.insert(b'D'),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SubMachineState {
    ExpectFirstByte,
    ExpectSecondByte,
    Disqualified,
}

struct EucMachine {
    state: SubMachineState,
}

impl EucMachine {
    fn feed(&mut self, b: u8, prev: u8, extended: bool, zenkaku: bool) {
        match self.state {
            SubMachineState::ExpectFirstByte => {
                if b & 0x80 == 0 {
                    return;
                }
                if (0xA0 < b && b < 0xFF) || (!zenkaku && b == SS2) {
                    self.state = SubMachineState::ExpectSecondByte;
                    return;
                }
                if extended {
                    if b == SS3 {
                        self.state = SubMachineState::ExpectSecondByte;
                        return;
                    } else if b < 0xA0 {
                        return;
                    }
                }
                self.state = SubMachineState::Disqualified;
            }
            SubMachineState::ExpectSecondByte => {
                if prev == SS2 {
                    // Hankaku kana.
                    if 0xA0 < b && b < if extended { 0xFF } else { 0xE0 } {
                        self.state = SubMachineState::ExpectFirstByte;
                        return;
                    }
                } else if 0xA0 < b && b < 0xFF {
                    // The byte after SS3 is followed by one more.
                    if prev != SS3 {
                        self.state = SubMachineState::ExpectFirstByte;
                    }
                    return;
                }
                self.state = SubMachineState::Disqualified;
            }
            SubMachineState::Disqualified => {}
        }
    }
}

struct DecMachine {
    state: SubMachineState,
}

impl DecMachine {
    fn feed(&mut self, b: u8) {
        match self.state {
            SubMachineState::ExpectFirstByte => {
                if b & 0x80 == 0 {
                    return;
                }
                if 0xA0 < b && b < 0xFF {
                    self.state = SubMachineState::ExpectSecondByte;
                } else if b >= 0xA0 {
                    self.state = SubMachineState::Disqualified;
                }
            }
            SubMachineState::ExpectSecondByte => {
                let low = b & 0x7F;
                self.state = if 0x20 < low && low < 0x7F {
                    SubMachineState::ExpectFirstByte
                } else {
                    SubMachineState::Disqualified
                };
            }
            SubMachineState::Disqualified => {}
        }
    }
}

struct SjisMachine {
    state: SubMachineState,
    /// No zenkaku lead byte seen, so the line could be JIS with 8-bit kana.
    jis8: bool,
}

impl SjisMachine {
    fn feed(&mut self, b: u8, extended: bool, zenkaku: bool) {
        match self.state {
            SubMachineState::ExpectFirstByte => {
                if b & 0x80 == 0 {
                    return;
                }
                if 0xA0 < b && b < 0xE0 {
                    // Hankaku kana.
                    if !zenkaku {
                        return;
                    }
                } else if b != 0x80 && b != 0xA0 && b <= if extended { 0xFC } else { 0xEF } {
                    self.state = SubMachineState::ExpectSecondByte;
                    self.jis8 = false;
                    return;
                }
                self.state = SubMachineState::Disqualified;
            }
            SubMachineState::ExpectSecondByte => {
                self.state = if 0x40 <= b && b != 0x7F && b <= 0xFC {
                    SubMachineState::ExpectFirstByte
                } else {
                    SubMachineState::Disqualified
                };
            }
            SubMachineState::Disqualified => {}
        }
    }
}

/// Line classifier. The escape mode and the escapes seen persist across
/// lines; the per-encoding sub-machines restart on every line.
#[derive(Default)]
pub struct Guesser {
    mode: ParserMode,
    seen: SeenEscapes,
}

impl Guesser {
    pub fn new() -> Self {
        Guesser::default()
    }

    pub fn seen(&self) -> SeenEscapes {
        self.seen
    }

    /// Returns the encodings that explain every raw 8-bit byte of `line`,
    /// plus the JIS and non-ASCII evidence found in it.
    pub fn guess(&mut self, line: &[u8], extended: bool, zenkaku: bool) -> CapabilityFlags {
        let mut euc = EucMachine {
            state: SubMachineState::ExpectFirstByte,
        };
        let mut dec = DecMachine {
            state: if extended {
                SubMachineState::ExpectFirstByte
            } else {
                SubMachineState::Disqualified
            },
        };
        let mut sjis = SjisMachine {
            state: SubMachineState::ExpectFirstByte,
            jis8: true,
        };
        let mut code = CapabilityFlags::empty();
        let mut i = 0;
        while i < line.len() {
            let b = line[i];
            let mut advance = 1;
            // Whether `b` is classification evidence rather than payload
            // or part of a shift sequence.
            let evidence = match b {
                ESC => {
                    if self.mode == ParserMode::ShiftOutKana {
                        false
                    } else if let Some((escape, len)) = Escape::parse(&line[i..]) {
                        let old = self.mode;
                        self.mode = match escape {
                            Escape::KanjiOut(_) => ParserMode::Ascii,
                            _ => ParserMode::Kanji,
                        };
                        escape.record(&mut self.seen);
                        advance = len;
                        code.insert(CapabilityFlags::JIS_ESCAPE);
                        old == ParserMode::Ascii
                    } else {
                        true
                    }
                }
                SO => {
                    if self.mode == ParserMode::Ascii {
                        code.insert(CapabilityFlags::JIS_ESCAPE);
                        self.mode = ParserMode::ShiftOutKana;
                        true
                    } else {
                        false
                    }
                }
                SI if self.mode == ParserMode::ShiftOutKana => {
                    self.mode = ParserMode::Ascii;
                    false
                }
                _ => self.mode == ParserMode::Ascii,
            };
            if evidence {
                if b & 0x80 != 0 {
                    code.insert(CapabilityFlags::NON_ASCII);
                }
                let prev = if i > 0 { line[i - 1] } else { 0 };
                euc.feed(b, prev, extended, zenkaku);
                if extended {
                    dec.feed(b);
                }
                sjis.feed(b, extended, zenkaku);
            }
            i += advance;
        }
        if euc.state == SubMachineState::ExpectFirstByte {
            code.insert(CapabilityFlags::EUC);
        }
        if dec.state == SubMachineState::ExpectFirstByte {
            code.insert(CapabilityFlags::DEC);
        }
        if sjis.state == SubMachineState::ExpectFirstByte {
            code.insert(CapabilityFlags::SJIS);
            if !zenkaku && sjis.jis8 {
                code.insert(CapabilityFlags::JIS8);
            }
        }
        log::trace!("line of {} bytes classified as {:?}", line.len(), code);
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(line: &[u8], extended: bool, zenkaku: bool) -> CapabilityFlags {
        Guesser::new().guess(line, extended, zenkaku)
    }

    #[test]
    fn test_ascii_line() {
        let code = guess(b"hello, world\n", false, false);
        assert!(!code.contains(CapabilityFlags::NON_ASCII));
        assert_eq!(
            code,
            CapabilityFlags::EUC
                .union(CapabilityFlags::SJIS)
                .union(CapabilityFlags::JIS8)
        );
    }

    #[test]
    fn test_extended_enables_dec() {
        let code = guess(b"abc\n", true, false);
        assert!(code.contains(CapabilityFlags::DEC));
    }

    #[test]
    fn test_euc_and_sjis_kana_ambiguity() {
        // EUC hiragana A is also two Shift_JIS hankaku kana.
        let code = guess(b"\xA4\xA2\n", false, false);
        assert!(code.contains(CapabilityFlags::NON_ASCII));
        assert!(code.contains(CapabilityFlags::EUC));
        assert!(code.contains(CapabilityFlags::SJIS));
        assert!(code.contains(CapabilityFlags::JIS8));
    }

    #[test]
    fn test_zenkaku_drops_hankaku_sjis() {
        let code = guess(b"\xA4\xA2\n", false, true);
        assert!(code.contains(CapabilityFlags::EUC));
        assert!(!code.contains(CapabilityFlags::SJIS));
        assert!(!code.contains(CapabilityFlags::JIS8));
    }

    #[test]
    fn test_sjis_only() {
        // Shift_JIS hiragana small A.
        let code = guess(b"\x82\xA0", false, false);
        assert!(!code.contains(CapabilityFlags::EUC));
        assert!(code.contains(CapabilityFlags::SJIS));
        assert!(!code.contains(CapabilityFlags::JIS8));
    }

    #[test]
    fn test_euc_only() {
        // Lead byte above the Shift_JIS range.
        let code = guess(b"\xF4\xA1", false, false);
        assert!(code.contains(CapabilityFlags::EUC));
        assert!(!code.contains(CapabilityFlags::SJIS));
    }

    #[test]
    fn test_extended_sjis_leads() {
        // User-defined area lead byte.
        assert!(guess(b"\xF0\x40", true, false).contains(CapabilityFlags::SJIS));
        assert!(!guess(b"\xF0\x40", false, false).contains(CapabilityFlags::SJIS));
        assert!(guess(b"\xFC\xFC", true, false).contains(CapabilityFlags::SJIS));
    }

    #[test]
    fn test_truncated_pair() {
        let code = guess(b"\xB0", false, true);
        assert!(!code.contains(CapabilityFlags::EUC));
        assert!(!code.contains(CapabilityFlags::SJIS));
    }

    #[test]
    fn test_euc_ss2_and_ss3() {
        let code = guess(b"\x8E\xB1", false, false);
        assert!(code.contains(CapabilityFlags::EUC));
        assert!(!guess(b"\x8E\xB1", false, true).contains(CapabilityFlags::EUC));
        assert!(!guess(b"\x8F\xB0\xA1", false, false).contains(CapabilityFlags::EUC));
        assert!(guess(b"\x8F\xB0\xA1", true, false).contains(CapabilityFlags::EUC));
    }

    #[test]
    fn test_jis_payload_is_not_evidence() {
        let mut guesser = Guesser::new();
        let code = guesser.guess(b"\x1B$B0!\x1B(B\n", false, false);
        assert!(code.contains(CapabilityFlags::JIS_ESCAPE));
        assert!(!code.contains(CapabilityFlags::NON_ASCII));
        assert!(guesser.seen().shift_in.contains(b'B'));
        assert!(guesser.seen().shift_out.contains(b'B'));
    }

    #[test]
    fn test_mode_persists_across_lines() {
        let mut guesser = Guesser::new();
        guesser.guess(b"\x1B$B", false, false);
        // Still in kanji mode, so the 8-bit bytes are payload.
        let code = guesser.guess(b"\xFF\xFF", false, false);
        assert!(!code.contains(CapabilityFlags::NON_ASCII));
        assert!(code.contains(CapabilityFlags::EUC));
    }

    #[test]
    fn test_shift_out_kana() {
        let mut guesser = Guesser::new();
        let code = guesser.guess(b"\x0E\x31\x0F\xB1", false, false);
        assert!(code.contains(CapabilityFlags::JIS_ESCAPE));
        assert!(code.contains(CapabilityFlags::NON_ASCII));
        assert!(code.contains(CapabilityFlags::JIS8));
    }

    #[test]
    fn test_parse_escape() {
        assert_eq!(Escape::parse(b"\x1B$@"), Some((Escape::KanjiIn(b'@'), 3)));
        assert_eq!(Escape::parse(b"\x1B&@\x1B$B"), Some((Escape::Kanji1990, 6)));
        assert_eq!(Escape::parse(b"\x1B(H"), Some((Escape::KanjiOut(b'H'), 3)));
        assert_eq!(Escape::parse(b"\x1B(I"), Some((Escape::KanaIn, 3)));
        assert_eq!(Escape::parse(b"\x1B$(D"), Some((Escape::GaijiIn, 4)));
        assert_eq!(Escape::parse(b"\x1B$"), None);
        assert_eq!(Escape::parse(b"\x1B(Z"), None);
    }
}

use crate::flags::ParserMode;
use crate::guess::SI;
use crate::guess::SO;
use crate::guess::SS2;
use crate::guess::SS3;
use crate::kana::KanaTable;
use crate::shift::Code;
use crate::shift::JisVariant;
use crate::shift::ShiftConfig;

/// Zenkaku substitute for gaiji and unmappable kana.
const ZENKAKU_PAD: (u8, u8) = (0x22, 0x22);

/// Hankaku substitute for bytes outside the kana range.
const HANKAKU_PAD: u8 = 0x25;

const GAIJI_IN: &[u8] = b"\x1B$(D";

const KANA_IN: &[u8] = b"\x1B(I";

/// Writes JIS X 0208 text in one of the JIS variants. Shift sequences are
/// emitted only when the output mode changes.
pub struct JisEncoder {
    variant: JisVariant,
    shift: ShiftConfig,
    gaiji_disabled: bool,
    mode: ParserMode,
}

impl JisEncoder {
    fn new(variant: JisVariant, shift: ShiftConfig, gaiji_disabled: bool) -> Self {
        JisEncoder {
            variant,
            shift,
            gaiji_disabled,
            mode: ParserMode::Ascii,
        }
    }

    fn write_ascii(&mut self, out: &mut Vec<u8>, c: u8) {
        match self.mode {
            ParserMode::Ascii => {}
            ParserMode::ShiftOutKana => {
                out.push(SI);
                self.mode = ParserMode::Ascii;
            }
            _ => {
                out.extend_from_slice(self.shift.shift_out_bytes());
                self.mode = ParserMode::Ascii;
            }
        }
        out.push(c);
    }

    fn write_kanji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        if self.mode != ParserMode::Kanji {
            if self.mode == ParserMode::ShiftOutKana {
                out.push(SI);
            }
            out.extend_from_slice(self.shift.shift_in_bytes());
            self.mode = ParserMode::Kanji;
        }
        out.push(c1);
        out.push(c2);
    }

    fn write_gaiji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        if self.gaiji_disabled {
            self.write_kanji(out, ZENKAKU_PAD.0, ZENKAKU_PAD.1);
            return;
        }
        if self.mode != ParserMode::Gaiji {
            if self.mode == ParserMode::ShiftOutKana {
                out.push(SI);
            }
            out.extend_from_slice(GAIJI_IN);
            self.mode = ParserMode::Gaiji;
        }
        out.push(c1);
        out.push(c2);
    }

    /// Returns to single-byte mode at the end of the output.
    fn finish(&mut self, out: &mut Vec<u8>) {
        match self.mode {
            ParserMode::Ascii => {}
            ParserMode::ShiftOutKana => out.push(SI),
            _ => out.extend_from_slice(self.shift.shift_out_bytes()),
        }
        self.mode = ParserMode::Ascii;
    }

    fn kana_byte(&self, c: u8) -> u8 {
        if !self.gaiji_disabled || (0x20 < c && c < 0x60) {
            c
        } else {
            HANKAKU_PAD
        }
    }

    fn write_kana(&mut self, out: &mut Vec<u8>, c: u8) {
        match self.variant {
            JisVariant::ShiftOut => {
                if self.mode != ParserMode::ShiftOutKana {
                    if self.mode != ParserMode::Ascii {
                        out.extend_from_slice(self.shift.shift_out_bytes());
                    }
                    out.push(SO);
                    self.mode = ParserMode::ShiftOutKana;
                }
                out.push(self.kana_byte(c));
            }
            JisVariant::EscI => {
                if self.mode != ParserMode::EscIKana {
                    out.extend_from_slice(KANA_IN);
                    self.mode = ParserMode::EscIKana;
                }
                out.push(self.kana_byte(c));
            }
            JisVariant::Bit8 => {
                if self.mode != ParserMode::Ascii {
                    out.extend_from_slice(self.shift.shift_out_bytes());
                    self.mode = ParserMode::Ascii;
                }
                out.push(self.kana_byte(c) | 0x80);
            }
        }
    }
}

/// Writes EUC-JP. Stateless at the byte level.
pub struct EucEncoder {
    gaiji_disabled: bool,
}

impl EucEncoder {
    fn write_kanji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        out.push(c1 | 0x80);
        out.push(c2 | 0x80);
    }

    fn write_gaiji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        if self.gaiji_disabled {
            self.write_kanji(out, ZENKAKU_PAD.0, ZENKAKU_PAD.1);
        } else {
            out.push(SS3);
            out.push(c1 | 0x80);
            out.push(c2 | 0x80);
        }
    }

    fn write_kana(&mut self, out: &mut Vec<u8>, c: u8) {
        out.push(SS2);
        out.push(if !self.gaiji_disabled || (0x20 < c && c < 0x60) {
            c | 0x80
        } else {
            HANKAKU_PAD | 0x80
        });
    }
}

/// Converts a Shift_JIS byte pair to a 7-bit JIS row/cell pair. Lead bytes
/// above 0xEF land on rows past 94, the user-defined area.
pub fn sjis_to_jis(c1: u8, c2: u8) -> (u8, u8) {
    let (c1, c2) = (i32::from(c1), i32::from(c2));
    let mut row = c1 * 2
        - if c1 <= 0x9F {
            0x00E1
        } else if c1 < 0xF0 {
            0x0161
        } else {
            0x01BF
        };
    let cell = if c2 < 0x9F {
        c2 - if c2 > 0x7F { 0x20 } else { 0x1F }
    } else {
        row += 1;
        c2 - 0x7E
    };
    (row as u8, cell as u8)
}

/// Converts a 7-bit JIS row/cell pair to Shift_JIS, with rows above 0x5E
/// moving to the 0xE0 lead range. `base` is the lead byte of row 0x21.
fn jis_to_sjis(c1: u8, c2: u8, base: i32) -> (u8, u8) {
    let (c1, c2) = (i32::from(c1), i32::from(c2));
    let lead = ((c1 - 1) >> 1) + base;
    let trail = c2
        + if c1 & 1 != 0 {
            if c2 < 0x60 {
                0x1F
            } else {
                0x20
            }
        } else {
            0x7E
        };
    (lead as u8, trail as u8)
}

/// Writes Shift_JIS.
pub struct SjisEncoder {
    gaiji_disabled: bool,
}

impl SjisEncoder {
    /// Last JIS row whose gaiji still has a lead byte (0xFC).
    const LAST_GAIJI_ROW: u8 = 0x3A;

    fn write_kanji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        let (lead, trail) = jis_to_sjis(c1, c2, if c1 <= 0x5E { 0x71 } else { 0xB1 });
        out.push(lead);
        out.push(trail);
    }

    fn write_gaiji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        if self.gaiji_disabled || c1 < 0x21 || c1 > Self::LAST_GAIJI_ROW {
            self.write_kanji(out, ZENKAKU_PAD.0, ZENKAKU_PAD.1);
            return;
        }
        let (lead, trail) = jis_to_sjis(c1, c2, 0xE0);
        out.push(lead);
        out.push(trail);
    }

    fn write_kana(&mut self, out: &mut Vec<u8>, c: u8) {
        out.push(if !self.gaiji_disabled || (0x21..=0x5F).contains(&c) {
            c | 0x80
        } else {
            HANKAKU_PAD | 0x80
        });
    }
}

/// Writes DEC Kanji. Hankaku kana is widened to zenkaku, which needs one
/// kana of lookahead to fold a following dakuten or handakuten into it.
pub struct DecEncoder {
    gaiji_disabled: bool,
    table: KanaTable,
    last_kana: Option<u8>,
}

impl DecEncoder {
    fn flush_kana(&mut self, out: &mut Vec<u8>) {
        if let Some(index) = self.last_kana.take() {
            push_u16(out, self.table.lookup(index));
        }
    }

    fn write_ascii(&mut self, out: &mut Vec<u8>, c: u8) {
        self.flush_kana(out);
        out.push(c);
    }

    fn write_kanji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        self.flush_kana(out);
        out.push(c1 | 0x80);
        out.push(c2 | 0x80);
    }

    fn write_gaiji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        self.flush_kana(out);
        if self.gaiji_disabled {
            out.push(ZENKAKU_PAD.0 | 0x80);
            out.push(ZENKAKU_PAD.1 | 0x80);
        } else {
            out.push(c1 | 0x80);
            out.push(c2);
        }
    }

    fn write_kana(&mut self, out: &mut Vec<u8>, c: u8) {
        if let Some(index) = self.last_kana.take() {
            let (code, absorbed) = self.table.combine(index, c);
            push_u16(out, code);
            if absorbed {
                return;
            }
        }
        if c < 0x21 || 0x5F < c {
            if c != 0 {
                // 8-bit like every other DEC zenkaku code.
                out.push(ZENKAKU_PAD.0 | 0x80);
                out.push(ZENKAKU_PAD.1 | 0x80);
            }
        } else {
            self.last_kana = Some(c - 0x20);
        }
    }
}

fn push_u16(out: &mut Vec<u8>, code: u16) {
    out.push((code >> 8) as u8);
    out.push(code as u8);
}

/// The encoder bound to the output code of a run.
pub enum Encoder {
    Jis(JisEncoder),
    Euc(EucEncoder),
    Sjis(SjisEncoder),
    Dec(DecEncoder),
}

impl Encoder {
    pub fn new(code: Code, gaiji_disabled: bool, table: KanaTable) -> Self {
        match code {
            Code::Jis { variant, shift } => {
                Encoder::Jis(JisEncoder::new(variant, shift, gaiji_disabled))
            }
            Code::Euc => Encoder::Euc(EucEncoder { gaiji_disabled }),
            Code::Sjis => Encoder::Sjis(SjisEncoder { gaiji_disabled }),
            Code::Dec => Encoder::Dec(DecEncoder {
                gaiji_disabled,
                table,
                last_kana: None,
            }),
        }
    }

    pub fn write_ascii(&mut self, out: &mut Vec<u8>, c: u8) {
        match self {
            Encoder::Jis(e) => e.write_ascii(out, c),
            Encoder::Dec(e) => e.write_ascii(out, c),
            Encoder::Euc(_) | Encoder::Sjis(_) => out.push(c),
        }
    }

    /// Writes a JIS X 0208 character given as a 7-bit row/cell pair.
    pub fn write_kanji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        match self {
            Encoder::Jis(e) => e.write_kanji(out, c1, c2),
            Encoder::Euc(e) => e.write_kanji(out, c1, c2),
            Encoder::Sjis(e) => e.write_kanji(out, c1, c2),
            Encoder::Dec(e) => e.write_kanji(out, c1, c2),
        }
    }

    pub fn write_gaiji(&mut self, out: &mut Vec<u8>, c1: u8, c2: u8) {
        match self {
            Encoder::Jis(e) => e.write_gaiji(out, c1, c2),
            Encoder::Euc(e) => e.write_gaiji(out, c1, c2),
            Encoder::Sjis(e) => e.write_gaiji(out, c1, c2),
            Encoder::Dec(e) => e.write_gaiji(out, c1, c2),
        }
    }

    /// Writes a hankaku kana given as a 7-bit JIS X 0201 byte.
    pub fn write_kana(&mut self, out: &mut Vec<u8>, c: u8) {
        match self {
            Encoder::Jis(e) => e.write_kana(out, c),
            Encoder::Euc(e) => e.write_kana(out, c),
            Encoder::Sjis(e) => e.write_kana(out, c),
            Encoder::Dec(e) => e.write_kana(out, c),
        }
    }

    /// Passes an unrecognized C1 byte through, unless it would be mistaken
    /// for one of the output code's own single shifts. Shift_JIS has no C1
    /// area to pass it through to.
    pub fn write_control(&mut self, out: &mut Vec<u8>, c: u8) {
        match self {
            Encoder::Sjis(_) => {}
            Encoder::Euc(_) if c == SS2 || c == SS3 => {}
            Encoder::Dec(e) => {
                e.flush_kana(out);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    /// Flushes state held back for lookahead and leaves the output in its
    /// initial mode.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        match self {
            Encoder::Jis(e) => e.finish(out),
            Encoder::Dec(e) => e.flush_kana(out),
            Encoder::Euc(_) | Encoder::Sjis(_) => {}
        }
    }
}

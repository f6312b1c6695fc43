use crate::encoder::sjis_to_jis;
use crate::encoder::Encoder;
use crate::flags::CapabilityFlags;
use crate::flags::ParserMode;
use crate::flags::SeenEscapes;
use crate::guess::Escape;
use crate::guess::ESC;
use crate::guess::SI;
use crate::guess::SO;
use crate::guess::SS2;
use crate::guess::SS3;

fn is_euc_byte(b: u8) -> bool {
    0xA0 < b && b < 0xFF
}

/// Walks lines in the input code and hands each character to the encoder.
/// The input mode persists across lines.
#[derive(Default)]
pub struct Decoder {
    mode: ParserMode,
    seen: SeenEscapes,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder::default()
    }

    pub fn seen(&self) -> SeenEscapes {
        self.seen
    }

    /// Converts `line` into `out`. Raw 8-bit bytes are read as whichever
    /// family `code` still allows, and what they reveal narrows `code`.
    pub fn decode_line(
        &mut self,
        line: &[u8],
        code: &mut CapabilityFlags,
        encoder: &mut Encoder,
        out: &mut Vec<u8>,
    ) {
        let byte_at = |i: usize| line.get(i).copied().unwrap_or(0);
        let mut i = 0;
        while i < line.len() {
            let b = line[i];
            match b {
                ESC if self.mode != ParserMode::ShiftOutKana => {
                    if let Some((escape, len)) = Escape::parse(&line[i..]) {
                        self.mode = match escape {
                            Escape::KanjiIn(_) | Escape::Kanji1990 => ParserMode::Kanji,
                            Escape::KanjiOut(_) => ParserMode::Ascii,
                            Escape::KanaIn => ParserMode::EscIKana,
                            Escape::GaijiIn => ParserMode::Gaiji,
                        };
                        escape.record(&mut self.seen);
                        code.insert(CapabilityFlags::JIS_ESCAPE);
                        i += len;
                        continue;
                    }
                }
                SO if self.mode == ParserMode::Ascii => {
                    code.insert(CapabilityFlags::JIS_ESCAPE);
                    self.mode = ParserMode::ShiftOutKana;
                    i += 1;
                    continue;
                }
                SI if self.mode == ParserMode::ShiftOutKana => {
                    self.mode = ParserMode::Ascii;
                    i += 1;
                    continue;
                }
                _ => {}
            }

            if self.mode != ParserMode::Ascii {
                if 0x20 < b && b < 0x7F {
                    match self.mode {
                        ParserMode::Kanji => {
                            encoder.write_kanji(out, b, byte_at(i + 1) & 0x7F);
                            i += 2;
                        }
                        ParserMode::Gaiji => {
                            encoder.write_gaiji(out, b, byte_at(i + 1) & 0x7F);
                            i += 2;
                        }
                        _ => {
                            encoder.write_kana(out, b);
                            i += 1;
                        }
                    }
                    continue;
                }
            } else if b & 0x80 != 0 {
                code.insert(CapabilityFlags::NON_ASCII);
                if code.intersects(CapabilityFlags::EUC.union(CapabilityFlags::DEC)) {
                    i += self.decode_euc_or_dec(b, byte_at(i + 1), byte_at(i + 2), code, encoder, out);
                    continue;
                } else if code.intersects(CapabilityFlags::SJIS.union(CapabilityFlags::JIS8)) {
                    if !code.contains(CapabilityFlags::SJIS) || (0xA0 < b && b < 0xE0) {
                        encoder.write_kana(out, b & 0x7F);
                        i += 1;
                    } else {
                        code.remove(CapabilityFlags::JIS8);
                        let (c1, c2) = sjis_to_jis(b, byte_at(i + 1));
                        if b <= 0xEF {
                            encoder.write_kanji(out, c1, c2);
                        } else {
                            encoder.write_gaiji(out, c1, c2);
                        }
                        i += 2;
                    }
                    continue;
                }
            }
            encoder.write_ascii(out, b);
            i += 1;
        }
    }

    /// Handles one EUC or DEC character starting with the 8-bit byte `b`.
    /// Returns the number of bytes consumed.
    fn decode_euc_or_dec(
        &mut self,
        b: u8,
        next: u8,
        after_next: u8,
        code: &mut CapabilityFlags,
        encoder: &mut Encoder,
        out: &mut Vec<u8>,
    ) -> usize {
        if is_euc_byte(b) {
            if next & 0x80 == 0 && code.contains(CapabilityFlags::DEC) {
                // A 7-bit trail byte only occurs in DEC gaiji.
                code.remove(CapabilityFlags::EUC);
                encoder.write_gaiji(out, b & 0x7F, next);
            } else {
                encoder.write_kanji(out, b & 0x7F, next & 0x7F);
            }
            2
        } else if b == SS2 && code.contains(CapabilityFlags::EUC) && is_euc_byte(next) {
            code.remove(CapabilityFlags::DEC);
            encoder.write_kana(out, next & 0x7F);
            2
        } else if b == SS3
            && code.contains(CapabilityFlags::EUC)
            && is_euc_byte(next)
            && is_euc_byte(after_next)
        {
            code.remove(CapabilityFlags::DEC);
            encoder.write_gaiji(out, next & 0x7F, after_next & 0x7F);
            3
        } else {
            log::trace!("passing through unrecognized byte 0x{:02X}", b);
            encoder.write_control(out, b);
            1
        }
    }
}

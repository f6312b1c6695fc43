use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::flags::CapabilityFlags;

/// Escape sequence that switches a JIS stream into kanji.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftIn {
    /// `ESC $ B`
    Jis1983,
    /// `ESC $ @`
    Jis1978,
    /// `ESC & @ ESC $ B`
    Jis1990,
}

/// Escape sequence that switches a JIS stream back to single bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOut {
    /// `ESC ( B`
    Ascii,
    /// `ESC ( J`
    Roman,
    /// `ESC ( H`
    RomanH,
}

/// The pair of escape sequences a JIS encoder brackets kanji runs with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShiftConfig {
    pub shift_in: ShiftIn,
    pub shift_out: ShiftOut,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        ShiftConfig {
            shift_in: ShiftIn::Jis1983,
            shift_out: ShiftOut::Roman,
        }
    }
}

impl ShiftConfig {
    /// Parses a two-letter suffix such as `BB` or `+J`. Anything else
    /// yields the default pair.
    pub fn from_suffix(suffix: &[u8]) -> Self {
        let shift_in = match suffix.get(0) {
            Some(b'B') => ShiftIn::Jis1983,
            Some(b'@') => ShiftIn::Jis1978,
            Some(b'+') => ShiftIn::Jis1990,
            _ => return ShiftConfig::default(),
        };
        let shift_out = match suffix.get(1) {
            Some(b'B') => ShiftOut::Ascii,
            Some(b'J') => ShiftOut::Roman,
            Some(b'H') => ShiftOut::RomanH,
            _ => return ShiftConfig::default(),
        };
        ShiftConfig {
            shift_in,
            shift_out,
        }
    }

    pub fn shift_in_bytes(&self) -> &'static [u8] {
        match self.shift_in {
            ShiftIn::Jis1983 => b"\x1B$B",
            ShiftIn::Jis1978 => b"\x1B$@",
            ShiftIn::Jis1990 => b"\x1B&@\x1B$B",
        }
    }

    pub fn shift_out_bytes(&self) -> &'static [u8] {
        match self.shift_out {
            ShiftOut::Ascii => b"\x1B(B",
            ShiftOut::Roman => b"\x1B(J",
            ShiftOut::RomanH => b"\x1B(H",
        }
    }

    fn suffix(&self) -> [char; 2] {
        [
            match self.shift_in {
                ShiftIn::Jis1983 => 'B',
                ShiftIn::Jis1978 => '@',
                ShiftIn::Jis1990 => '+',
            },
            match self.shift_out {
                ShiftOut::Ascii => 'B',
                ShiftOut::Roman => 'J',
                ShiftOut::RomanH => 'H',
            },
        ]
    }
}

/// How a JIS encoder writes hankaku kana.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JisVariant {
    /// Between SO and SI.
    ShiftOut,
    /// After `ESC ( I`.
    EscI,
    /// As 8-bit bytes in single-byte mode.
    Bit8,
}

/// A code the engine reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    Jis {
        variant: JisVariant,
        shift: ShiftConfig,
    },
    Euc,
    Sjis,
    Dec,
}

impl Code {
    pub fn jis() -> Self {
        Code::Jis {
            variant: JisVariant::ShiftOut,
            shift: ShiftConfig::default(),
        }
    }

    /// Parses an input code name. `AUTO` yields `None`, meaning the input
    /// is to be detected.
    pub fn parse_input(name: &str) -> Result<Option<Code>, Error> {
        if name.eq_ignore_ascii_case("AUTO") {
            Ok(None)
        } else {
            name.parse().map(Some)
        }
    }

    /// Flags a run starts with when the input code is given rather than
    /// detected.
    pub fn input_flags(self) -> CapabilityFlags {
        match self {
            Code::Euc => CapabilityFlags::EUC,
            Code::Dec => CapabilityFlags::DEC,
            Code::Sjis => CapabilityFlags::SJIS,
            Code::Jis {
                variant: JisVariant::Bit8,
                ..
            } => CapabilityFlags::JIS8,
            Code::Jis { .. } => CapabilityFlags::JIS_ESCAPE,
        }
    }
}

impl FromStr for Code {
    type Err = Error;

    /// Parses `EUC`, `SJIS`, `DEC`, `JIS`, `JIS8` or `JISI`, the JIS names
    /// optionally followed by a shift-sequence suffix like `BB`.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let upper = name.to_ascii_uppercase();
        let bytes = upper.as_bytes();
        match &upper[..] {
            "EUC" => return Ok(Code::Euc),
            "SJIS" => return Ok(Code::Sjis),
            "DEC" => return Ok(Code::Dec),
            _ => {}
        }
        if !bytes.starts_with(b"JIS") {
            return Err(Error::UnknownCodeName(name.to_string()));
        }
        let (variant, suffix) = match bytes.get(3) {
            Some(b'8') => (JisVariant::Bit8, &bytes[4..]),
            Some(b'I') => (JisVariant::EscI, &bytes[4..]),
            _ => (JisVariant::ShiftOut, &bytes[3..]),
        };
        Ok(Code::Jis {
            variant,
            shift: ShiftConfig::from_suffix(suffix),
        })
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Euc => f.write_str("EUC"),
            Code::Sjis => f.write_str("SJIS"),
            Code::Dec => f.write_str("DEC"),
            Code::Jis { variant, shift } => {
                let [shift_in, shift_out] = shift.suffix();
                let infix = match variant {
                    JisVariant::ShiftOut => "",
                    JisVariant::EscI => "I",
                    JisVariant::Bit8 => "8",
                };
                write!(f, "JIS{}{}{}", infix, shift_in, shift_out)
            }
        }
    }
}

use std::fmt;

use encoding_rs::Encoding;
use encoding_rs::EUC_JP;
use encoding_rs::ISO_2022_JP;
use encoding_rs::SHIFT_JIS;

use crate::flags::CapabilityFlags;

/// The code a run decided its input was in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportedCode {
    Ascii,
    Jis,
    Euc,
    Dec,
    Sjis,
    /// JIS with 8-bit hankaku kana.
    Jis8,
    /// Non-ASCII bytes that no candidate explains.
    Binary,
}

impl ReportedCode {
    pub fn from_flags(flags: CapabilityFlags) -> Self {
        let euc_or_dec = || {
            if flags.contains(CapabilityFlags::EUC) {
                ReportedCode::Euc
            } else {
                ReportedCode::Dec
            }
        };
        let jis = flags.contains(CapabilityFlags::JIS_ESCAPE);
        if !flags.contains(CapabilityFlags::NON_ASCII) {
            if jis {
                ReportedCode::Jis
            } else {
                ReportedCode::Ascii
            }
        } else if flags.intersects(CapabilityFlags::EUC.union(CapabilityFlags::DEC)) {
            if !flags.contains(CapabilityFlags::SJIS) || flags.contains(CapabilityFlags::ASSUMED) {
                euc_or_dec()
            } else if flags.contains(CapabilityFlags::JIS8) && jis {
                ReportedCode::Jis8
            } else {
                euc_or_dec()
            }
        } else if flags.contains(CapabilityFlags::JIS8) {
            if jis {
                ReportedCode::Jis8
            } else {
                ReportedCode::Sjis
            }
        } else if flags.contains(CapabilityFlags::SJIS) {
            ReportedCode::Sjis
        } else {
            ReportedCode::Binary
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReportedCode::Ascii => "ASCII",
            ReportedCode::Jis => "JIS",
            ReportedCode::Euc => "EUC",
            ReportedCode::Dec => "DEC",
            ReportedCode::Sjis => "SJIS",
            ReportedCode::Jis8 => "JIS8",
            ReportedCode::Binary => "BINARY",
        }
    }

    /// The closest WHATWG encoding, if there is one. ASCII is left to the
    /// caller's default.
    pub fn encoding(self) -> Option<&'static Encoding> {
        match self {
            ReportedCode::Jis => Some(ISO_2022_JP),
            ReportedCode::Euc => Some(EUC_JP),
            ReportedCode::Sjis => Some(SHIFT_JIS),
            _ => None,
        }
    }
}

impl fmt::Display for ReportedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Detection and conversion of Japanese text between 7-bit JIS, 8-bit JIS,
//! EUC-JP, Shift_JIS and DEC Kanji.
//!
//! Detection works line by line: every line narrows the set of codes that
//! still explain all 8-bit bytes seen so far. Lines that both EUC and
//! Shift_JIS explain are held back until a later line decides, or until the
//! hold buffer fills up, at which point EUC is assumed.

mod decode;
mod encoder;
mod error;
mod flags;
mod guess;
mod hold;
mod kana;
mod lines;
mod report;
mod shift;

use decode::Decoder;
use encoder::Encoder;
use guess::Guesser;
use hold::HoldBuffer;
use lines::Lines;

pub use encoder::sjis_to_jis;
pub use error::Error;
pub use flags::CapabilityFlags;
pub use flags::LetterSet;
pub use flags::SeenEscapes;
pub use hold::DEFAULT_HOLD_CAPACITY;
pub use kana::KanaTable;
pub use report::ReportedCode;
pub use shift::Code;
pub use shift::JisVariant;
pub use shift::ShiftConfig;
pub use shift::ShiftIn;
pub use shift::ShiftOut;

/// Upper bound of output bytes per input byte, used to reserve output space
/// ahead of each line.
const MAX_EXPANSION: usize = 8;

const RESERVE_SLACK: usize = 16;

/// Knobs of a conversion run.
#[derive(Clone, Debug)]
pub struct Options {
    /// Accept the extended 8-bit ranges: DEC Kanji, EUC code set 3 and
    /// Shift_JIS lead bytes up to 0xFC.
    pub extended: bool,
    /// Assume the input has no hankaku kana.
    pub zenkaku: bool,
    /// Replace gaiji with a zenkaku substitute and out-of-range kana with a
    /// hankaku substitute.
    pub gaiji_disabled: bool,
    /// Bytes of undecided input held back before EUC is assumed.
    pub hold_capacity: usize,
    /// Zenkaku kana the DEC encoder widens hankaku kana to.
    pub dec_kana: KanaTable,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            extended: false,
            zenkaku: false,
            gaiji_disabled: false,
            hold_capacity: DEFAULT_HOLD_CAPACITY,
            dec_kana: KanaTable::Katakana,
        }
    }
}

/// State of one conversion run. Feed it the input line by line and call
/// `finish` at the end; a new run needs a new `Converter`.
pub struct Converter {
    extended: bool,
    zenkaku: bool,
    detect: bool,
    code: CapabilityFlags,
    guesser: Guesser,
    decoder: Decoder,
    encoder: Encoder,
    hold: HoldBuffer,
}

impl Converter {
    /// `input` of `None` detects the input code.
    pub fn new(input: Option<Code>, output: Code, options: &Options) -> Result<Self, Error> {
        Ok(Converter {
            extended: options.extended,
            zenkaku: options.zenkaku,
            detect: input.is_none(),
            code: input.map_or_else(|| CapabilityFlags::initial(options.extended), Code::input_flags),
            guesser: Guesser::new(),
            decoder: Decoder::new(),
            encoder: Encoder::new(output, options.gaiji_disabled, options.dec_kana),
            hold: HoldBuffer::with_capacity(options.hold_capacity)?,
        })
    }

    /// Converts one line into `out`, or holds it back while the input code
    /// is ambiguous.
    pub fn feed_line(&mut self, line: &[u8], out: &mut Vec<u8>) -> Result<(), Error> {
        if self.detect && self.code.needs_guess() {
            let line_code = self.guesser.guess(line, self.extended, self.zenkaku);
            self.code.merge_line(line_code);
            log::trace!("accumulated {:?}", self.code);
            if self.code.is_ambiguous() {
                if self.hold.append(line) {
                    return Ok(());
                }
                log::debug!(
                    "hold buffer full with {} bytes, assuming EUC",
                    self.hold.len()
                );
                self.code.insert(CapabilityFlags::ASSUMED);
            }
        }
        if !self.hold.is_empty() {
            self.flush_hold(out)?;
        }
        self.convert(line, out)
    }

    /// Flushes whatever is still held back and reports the input code.
    pub fn finish(mut self, out: &mut Vec<u8>) -> Result<ReportedCode, Error> {
        if !self.hold.is_empty() {
            log::debug!(
                "input ended with {} bytes undecided, assuming EUC",
                self.hold.len()
            );
            self.code.insert(CapabilityFlags::ASSUMED);
            self.flush_hold(out)?;
        }
        out.try_reserve(RESERVE_SLACK)?;
        self.encoder.finish(out);
        let reported = ReportedCode::from_flags(self.code);
        log::debug!("input classified as {} from {:?}", reported, self.code);
        Ok(reported)
    }

    /// Evidence gathered so far.
    pub fn flags(&self) -> CapabilityFlags {
        self.code
    }

    pub fn seen_escapes(&self) -> SeenEscapes {
        let mut seen = self.guesser.seen();
        seen.merge(self.decoder.seen());
        seen
    }

    fn flush_hold(&mut self, out: &mut Vec<u8>) -> Result<(), Error> {
        let held = self.hold.flush();
        self.convert(&held, out)
    }

    fn convert(&mut self, line: &[u8], out: &mut Vec<u8>) -> Result<(), Error> {
        out.try_reserve(line.len() * MAX_EXPANSION + RESERVE_SLACK)?;
        self.decoder.decode_line(line, &mut self.code, &mut self.encoder, out);
        Ok(())
    }
}

/// Detects the code of `bytes`. The input goes through the same conversion
/// as `transcode`, so the two agree, but the output is discarded.
pub fn classify(bytes: &[u8], extended: bool) -> Result<ReportedCode, Error> {
    let options = Options {
        extended,
        ..Options::default()
    };
    let mut converter = Converter::new(None, Code::Euc, &options)?;
    let mut sink = Vec::new();
    for line in Lines::new(bytes) {
        converter.feed_line(line, &mut sink)?;
        sink.clear();
    }
    converter.finish(&mut sink)
}

/// Converts `bytes` from `input` (`None` to detect it) to `output`.
pub fn transcode(
    bytes: &[u8],
    input: Option<Code>,
    output: Code,
    extended: bool,
    zenkaku: bool,
    gaiji_disabled: bool,
) -> Result<(Vec<u8>, ReportedCode), Error> {
    let options = Options {
        extended,
        zenkaku,
        gaiji_disabled,
        ..Options::default()
    };
    transcode_with_options(bytes, input, output, &options)
}

pub fn transcode_with_options(
    bytes: &[u8],
    input: Option<Code>,
    output: Code,
    options: &Options,
) -> Result<(Vec<u8>, ReportedCode), Error> {
    let mut converter = Converter::new(input, output, options)?;
    let mut out = Vec::new();
    out.try_reserve(bytes.len() + RESERVE_SLACK)?;
    for line in Lines::new(bytes) {
        converter.feed_line(line, &mut out)?;
    }
    let reported = converter.finish(&mut out)?;
    Ok((out, reported))
}

/// Like `transcode_with_options`, with the codes given by name, e.g.
/// `"AUTO"` to `"JISBB"`.
pub fn transcode_named(
    bytes: &[u8],
    input: &str,
    output: &str,
    options: &Options,
) -> Result<(Vec<u8>, ReportedCode), Error> {
    let input = Code::parse_input(input)?;
    let output = output.parse()?;
    transcode_with_options(bytes, input, output, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(input: &[u8], output: Code, expected: &[u8], code: ReportedCode) {
        let (out, reported) = transcode(input, None, output, false, false, false).unwrap();
        assert_eq!(out, expected);
        assert_eq!(reported, code);
    }

    #[test]
    fn test_empty() {
        assert_eq!(classify(b"", false).unwrap(), ReportedCode::Ascii);
        check(b"", Code::Euc, b"", ReportedCode::Ascii);
    }

    #[test]
    fn test_ascii_unchanged() {
        let text = b"Subject: hello\nworld\n";
        for output in &[Code::Euc, Code::Sjis, Code::Dec, Code::jis()] {
            check(text, *output, text, ReportedCode::Ascii);
        }
    }

    #[test]
    fn test_jis_to_euc() {
        check(
            b"\x1B$B4A;z\x1B(B\n",
            Code::Euc,
            b"\xB4\xC1\xBB\xFA\n",
            ReportedCode::Jis,
        );
    }

    #[test]
    fn test_sjis_to_jis() {
        check(
            b"\x8A\xBF\x8E\x9A\n",
            "JISBB".parse().unwrap(),
            b"\x1B$B4A;z\x1B(B\n",
            ReportedCode::Sjis,
        );
    }

    #[test]
    fn test_euc_to_sjis() {
        check(
            b"\xB4\xC1\xBB\xFA\n",
            Code::Sjis,
            b"\x8A\xBF\x8E\x9A\n",
            ReportedCode::Euc,
        );
    }

    #[test]
    fn test_held_lines_wait_for_evidence() {
        let mut converter = Converter::new(None, Code::jis(), &Options::default()).unwrap();
        let mut out = Vec::new();
        converter.feed_line(b"\xA4\xA2\n", &mut out).unwrap();
        converter.feed_line(b"\xB0\xA1\n", &mut out).unwrap();
        assert!(out.is_empty());
        assert!(converter.flags().is_ambiguous());
        // Lead byte 0xF4 rules Shift_JIS out.
        converter.feed_line(b"\xF4\xA1\n", &mut out).unwrap();
        assert_eq!(out, b"\x1B$B$\"\x1B(J\n\x1B$B0!\x1B(J\n\x1B$Bt!\x1B(J\n");
        assert_eq!(converter.finish(&mut out).unwrap(), ReportedCode::Euc);
    }

    #[test]
    fn test_hold_capacity_forces_euc() {
        let options = Options {
            hold_capacity: 8,
            ..Options::default()
        };
        let mut converter = Converter::new(None, Code::Euc, &options).unwrap();
        let mut out = Vec::new();
        converter.feed_line(b"\xA4\xA2\n", &mut out).unwrap();
        converter.feed_line(b"\xA4\xA4\n", &mut out).unwrap();
        assert!(out.is_empty());
        converter.feed_line(b"\xA4\xA6\n", &mut out).unwrap();
        assert_eq!(out, b"\xA4\xA2\n\xA4\xA4\n\xA4\xA6\n");
        assert!(converter.flags().contains(CapabilityFlags::ASSUMED));
        // No more holding once EUC has been assumed.
        converter.feed_line(b"\xA4\xA8\n", &mut out).unwrap();
        assert_eq!(out.len(), 12);
        assert_eq!(converter.finish(&mut out).unwrap(), ReportedCode::Euc);
    }

    #[test]
    fn test_fixed_input_skips_detection() {
        let (out, reported) =
            transcode(b"\xB1\xB2\n", Some(Code::Sjis), Code::Euc, false, false, false).unwrap();
        assert_eq!(out, b"\x8E\xB1\x8E\xB2\n");
        assert_eq!(reported, ReportedCode::Sjis);
    }

    #[test]
    fn test_dec_output_flushes_pending_kana() {
        let (out, _) = transcode(
            b"\x8E\xB6\x8E\xDE\x8E\xCA",
            Some(Code::Euc),
            Code::Dec,
            false,
            false,
            false,
        )
        .unwrap();
        assert_eq!(out, b"\xA5\xAC\xA5\xCF");
    }

    #[test]
    fn test_named() {
        let (out, reported) =
            transcode_named(b"\x1B$B0!\x1B(J", "AUTO", "sjis", &Options::default()).unwrap();
        assert_eq!(out, b"\x88\x9F");
        assert_eq!(reported, ReportedCode::Jis);
        assert!(matches!(
            transcode_named(b"", "AUTO", "KOI8-R", &Options::default()),
            Err(Error::UnknownCodeName(_))
        ));
    }

    #[test]
    fn test_seen_escapes() {
        let mut converter = Converter::new(None, Code::Euc, &Options::default()).unwrap();
        let mut out = Vec::new();
        converter.feed_line(b"\x1B&@\x1B$B0!\x1B(H\n", &mut out).unwrap();
        let seen = converter.seen_escapes();
        assert!(seen.kanji_1990.contains(b'B'));
        assert!(seen.shift_out.contains(b'H'));
        assert!(seen.gaiji.is_empty());
    }

    #[test]
    fn test_binary() {
        assert_eq!(classify(b"\x80\x80\n", false).unwrap(), ReportedCode::Binary);
    }
}

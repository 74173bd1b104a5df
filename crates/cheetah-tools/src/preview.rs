#![forbid(unsafe_code)]

//! Terminal preview of pixel frames.
//!
//! Each text cell shows two pixels stacked vertically: the upper one as the
//! foreground of `▀` (U+2580), the lower one as the background. Colors are
//! 24-bit SGR (`CSI 38;2;r;g;b m` / `CSI 48;2;r;g;b m`); an SGR is only
//! written when the color differs from the previous cell's. A frame with an
//! odd height gets a black bottom half on its last text row.
//!
//! Frames are wrapped in synchronized output (`CSI ? 2026 h` ... `l`) so
//! terminals that support it never show half a frame.

use std::io::{self, Write};

use cheetah_core::{PixelBuffer, Rgb};
use cheetah_runtime::{FrameSink, SinkError};

const UPPER_HALF: &str = "\u{2580}";
const SYNC_BEGIN: &[u8] = b"\x1b[?2026h";
const SYNC_END: &[u8] = b"\x1b[?2026l";
const SGR_RESET: &[u8] = b"\x1b[0m";
const CURSOR_HOME: &[u8] = b"\x1b[H";
const ERASE_DISPLAY: &[u8] = b"\x1b[2J";
const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

fn sgr_fg_rgb<W: Write>(w: &mut W, c: Rgb) -> io::Result<()> {
    write!(w, "\x1b[38;2;{};{};{}m", c.r, c.g, c.b)
}

fn sgr_bg_rgb<W: Write>(w: &mut W, c: Rgb) -> io::Result<()> {
    write!(w, "\x1b[48;2;{};{};{}m", c.r, c.g, c.b)
}

/// Write one frame as half-block rows, starting at the cursor.
pub fn render_frame<W: Write>(w: &mut W, frame: &PixelBuffer) -> io::Result<()> {
    for row in (0..frame.height()).step_by(2) {
        let mut fg = None;
        let mut bg = None;
        for x in 0..frame.width() {
            let upper = frame.pixel(x, row).unwrap_or(Rgb::BLACK);
            let lower = frame.pixel(x, row + 1).unwrap_or(Rgb::BLACK);
            if fg != Some(upper) {
                sgr_fg_rgb(w, upper)?;
                fg = Some(upper);
            }
            if bg != Some(lower) {
                sgr_bg_rgb(w, lower)?;
                bg = Some(lower);
            }
            w.write_all(UPPER_HALF.as_bytes())?;
        }
        w.write_all(SGR_RESET)?;
        w.write_all(b"\r\n")?;
    }
    Ok(())
}

/// [`FrameSink`] drawing every frame in place on a terminal.
#[derive(Debug)]
pub struct TerminalPreview<W: Write> {
    out: W,
    frames: u64,
}

impl TerminalPreview<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalPreview<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Restore the cursor and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.frames > 0 {
            self.out.write_all(SGR_RESET)?;
            self.out.write_all(CURSOR_SHOW)?;
            self.out.flush()?;
        }
        Ok(self.out)
    }

    fn draw(&mut self, frame: &PixelBuffer) -> io::Result<()> {
        if self.frames == 0 {
            self.out.write_all(CURSOR_HIDE)?;
            self.out.write_all(ERASE_DISPLAY)?;
        }
        self.out.write_all(SYNC_BEGIN)?;
        self.out.write_all(CURSOR_HOME)?;
        render_frame(&mut self.out, frame)?;
        self.out.write_all(SYNC_END)?;
        self.out.flush()
    }
}

impl<W: Write> FrameSink for TerminalPreview<W> {
    fn deliver(&mut self, frame: &PixelBuffer) -> Result<(), SinkError> {
        match self.draw(frame) {
            Ok(()) => {
                self.frames += 1;
                tracing::trace!(frame = self.frames, "preview drawn");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                Err(SinkError::transient(err.to_string()))
            }
            Err(err) => Err(SinkError::fatal(format!("terminal write failed: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(frame: &PixelBuffer) -> String {
        let mut out = Vec::new();
        render_frame(&mut out, frame).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn two_rows_share_one_line() {
        let mut frame = PixelBuffer::new(1, 2);
        frame.set_pixel(0, 0, Rgb::new(255, 0, 0));
        frame.set_pixel(0, 1, Rgb::new(0, 0, 255));
        assert_eq!(
            text(&frame),
            "\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m\u{2580}\x1b[0m\r\n"
        );
    }

    #[test]
    fn odd_height_pads_with_black() {
        let mut frame = PixelBuffer::new(1, 1);
        frame.fill(Rgb::WHITE);
        assert_eq!(
            text(&frame),
            "\x1b[38;2;255;255;255m\x1b[48;2;0;0;0m\u{2580}\x1b[0m\r\n"
        );
    }

    #[test]
    fn repeated_colors_are_not_re_emitted() {
        let mut frame = PixelBuffer::new(3, 2);
        frame.fill(Rgb::new(1, 2, 3));
        let out = text(&frame);
        assert_eq!(out.matches("\x1b[38;2;").count(), 1);
        assert_eq!(out.matches("\x1b[48;2;").count(), 1);
        assert_eq!(out.matches('\u{2580}').count(), 3);
    }

    #[test]
    fn line_count_is_half_the_height() {
        assert_eq!(text(&PixelBuffer::new(2, 5)).matches("\r\n").count(), 3);
        assert_eq!(text(&PixelBuffer::new(0, 4)).matches("\r\n").count(), 2);
        assert_eq!(text(&PixelBuffer::new(4, 0)), "");
    }

    #[test]
    fn sink_clears_once_and_counts_frames() {
        let mut preview = TerminalPreview::new(Vec::new());
        let frame = PixelBuffer::new(2, 2);
        preview.deliver(&frame).unwrap();
        preview.deliver(&frame).unwrap();
        assert_eq!(preview.frames(), 2);

        let out = String::from_utf8(preview.finish().unwrap()).unwrap();
        assert_eq!(out.matches("\x1b[2J").count(), 1);
        assert_eq!(out.matches("\x1b[?2026h").count(), 2);
        assert!(out.ends_with("\x1b[?25h"));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_terminal_is_fatal() {
        let mut preview = TerminalPreview::new(Broken);
        let err = preview.deliver(&PixelBuffer::new(1, 1)).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(preview.frames(), 0);
    }
}

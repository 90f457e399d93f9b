use std::io::Write;

/// Receives `(current, total)` after each unit of work.
pub trait ProgressReporter {
    fn report(&mut self, current: usize, total: usize) -> std::io::Result<()>;
}

/// Width of the bar in characters.
const BAR_WIDTH: usize = 100;
const FILL: char = '█';
const EMPTY: char = '-';

/// Render ` |████----| 50.0% ` for `current` out of `total`.
pub fn render_bar(current: usize, total: usize) -> String {
    let (filled, percent) = if total == 0 {
        (BAR_WIDTH, 100.0)
    } else {
        let current = current.min(total);
        (
            BAR_WIDTH * current / total,
            100.0 * current as f64 / total as f64,
        )
    };

    let mut bar = String::with_capacity(BAR_WIDTH * FILL.len_utf8());
    bar.extend(std::iter::repeat_n(FILL, filled));
    bar.extend(std::iter::repeat_n(EMPTY, BAR_WIDTH - filled));

    format!(" |{}| {:.1}% ", bar, percent)
}

/// Redraws a single-line bar in place with a carriage return, ending the
/// line once `current` reaches `total`.
pub struct TextProgressBar<W> {
    out: W,
}

impl<W: Write> TextProgressBar<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ProgressReporter for TextProgressBar<W> {
    fn report(&mut self, current: usize, total: usize) -> std::io::Result<()> {
        write!(self.out, "\r{}\r", render_bar(current, total))?;
        if current >= total {
            writeln!(self.out)?;
        }
        self.out.flush()
    }
}

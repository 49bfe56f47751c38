use kurbo::Point;

/// Width of a single line of text at a font size, in the same pixel space as the wrap limit.
pub trait TextMeasure {
    /// Advance width of `text` rendered at `size_px`.
    fn measure(&mut self, text: &str, size_px: f64) -> f64;
}

/// Fixed-advance measurer; every `char` is `advance_em * size_px` wide.
///
/// Used where no font is available (tests, dry runs).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
    /// Advance per character as a fraction of the font size.
    pub advance_em: f64,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self { advance_em: 0.5 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&mut self, text: &str, size_px: f64) -> f64 {
        text.chars().count() as f64 * size_px * self.advance_em
    }
}

/// Greedy word wrap.
///
/// Words (whitespace-separated) accumulate on a line while `measure(line)` stays within `limit`.
/// A word that does not fit starts the next line; a single word wider than `limit` occupies its
/// own line unmodified. The last line is always emitted, so blank text yields one empty line.
pub fn wrap(text: &str, limit: f64, mut measure: impl FnMut(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure(&candidate) <= limit {
            line = candidate;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_owned()));
        }
    }
    lines.push(line);
    lines
}

/// A wrapped line positioned on the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    /// Line content.
    pub text: String,
    /// Top-left corner of the line box.
    pub origin: Point,
    /// Measured line width.
    pub width: f64,
    /// Line box height (the stacking stride).
    pub height: f64,
}

/// Stack `lines` into a block centered on `anchor`.
///
/// The block is `lines.len() * line_height` tall with its vertical middle at `anchor.y`; each
/// line is horizontally centered on `anchor.x`.
pub fn stack_lines(
    lines: &[String],
    anchor: Point,
    line_height: f64,
    mut measure: impl FnMut(&str) -> f64,
) -> Vec<PlacedLine> {
    let total = line_height * lines.len() as f64;
    let start_y = anchor.y - total / 2.0;
    lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let width = measure(text);
            PlacedLine {
                text: text.clone(),
                origin: Point::new(anchor.x - width / 2.0, start_y + i as f64 * line_height),
                width,
                height: line_height,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;

//! Text measurement capability and line wrapping.

use crate::label_ir::TextStyle;

/// Text measurement supplied by the renderer.
///
/// Layout uses it to decide how many lines a label's name wraps to; the
/// renderer should measure with the same metrics it draws with.
pub trait TextMeasurer: Send + Sync {
    /// Rendered width of a single unwrapped run, in inches.
    fn measure_text_width(&self, text: &str, style: &TextStyle) -> f32;

    /// Number of lines `text` occupies when wrapped to `max_width` inches.
    ///
    /// Default wraps greedily with [`wrap_text_lines`].
    fn wrapped_line_count(&self, text: &str, max_width: f32, style: &TextStyle) -> usize {
        wrap_text_lines(text, max_width, |run| self.measure_text_width(run, style)).len()
    }
}

/// Font-free width estimate used when no renderer measurer is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure_text_width(&self, text: &str, style: &TextStyle) -> f32 {
        let em_sum: f32 = text.chars().map(glyph_em_width).sum();
        let weight = if style.bold { 1.06 } else { 1.0 };
        em_sum * weight * style.size_in()
    }
}

fn glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' => 0.28,
        'i' | 'j' | 'l' | '.' | ',' | '\'' | '!' | '|' | ':' | ';' => 0.28,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '-' | '"' => 0.36,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.86,
        'A'..='Z' => 0.68,
        '0'..='9' | '$' => 0.56,
        _ => 0.52,
    }
}

/// Greedy word wrap of `text` to `max_width`, measured with `measure`.
///
/// Runs of whitespace collapse to single spaces. A word wider than
/// `max_width` is broken between characters. Empty text yields one empty line.
pub fn wrap_text_lines<F>(text: &str, max_width: f32, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() {
            let committed = current.len();
            current.push(' ');
            current.push_str(word);
            if measure(&current) <= max_width {
                continue;
            }
            current.truncate(committed);
            lines.push(core::mem::take(&mut current));
        }
        push_word(&mut lines, &mut current, word, max_width, &mut measure);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Start a fresh line with `word`, splitting it when it alone overflows.
fn push_word<F>(
    lines: &mut Vec<String>,
    current: &mut String,
    word: &str,
    max_width: f32,
    measure: &mut F,
) where
    F: FnMut(&str) -> f32,
{
    if measure(word) <= max_width {
        current.push_str(word);
        return;
    }
    for ch in word.chars() {
        current.push(ch);
        if current.chars().count() > 1 && measure(current) > max_width {
            current.pop();
            lines.push(core::mem::take(current));
            current.push(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 0.1" wide.
    fn fixed(run: &str) -> f32 {
        run.chars().count() as f32 * 0.1
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text_lines("Aloe Vera", 1.0, fixed), ["Aloe Vera"]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(
            wrap_text_lines("Blue Star Creeper Groundcover", 1.05, fixed),
            ["Blue Star", "Creeper", "Groundcove", "r"]
        );
        assert_eq!(
            wrap_text_lines("one two three four", 0.9, fixed),
            ["one two", "three", "four"]
        );
    }

    #[test]
    fn empty_and_blank_text_yield_one_empty_line() {
        assert_eq!(wrap_text_lines("", 1.0, fixed), [""]);
        assert_eq!(wrap_text_lines("   ", 1.0, fixed), [""]);
    }

    #[test]
    fn overlong_word_breaks_between_characters() {
        assert_eq!(wrap_text_lines("abcdefg", 0.35, fixed), ["abc", "def", "g"]);
    }

    #[test]
    fn broken_word_tail_keeps_accepting_words() {
        assert_eq!(wrap_text_lines("abcdefg hi", 0.55, fixed), ["abcde", "fg hi"]);
    }

    #[test]
    fn default_line_count_uses_measured_widths() {
        struct Fixed;
        impl TextMeasurer for Fixed {
            fn measure_text_width(&self, text: &str, _style: &TextStyle) -> f32 {
                fixed(text)
            }
        }
        let style = TextStyle::regular(9.0);
        assert_eq!(Fixed.wrapped_line_count("Aloe", 1.0, &style), 1);
        assert_eq!(Fixed.wrapped_line_count("one two three four", 0.9, &style), 3);
    }

    #[test]
    fn heuristic_width_scales_with_size_and_weight() {
        let small = TextStyle::regular(9.0);
        let large = TextStyle::regular(18.0);
        let bold = TextStyle::bold(9.0);
        let m = HeuristicTextMeasurer;
        let w = m.measure_text_width("$4.99 - Aloe", &small);
        assert!(w > 0.0);
        assert!((m.measure_text_width("$4.99 - Aloe", &large) - 2.0 * w).abs() < 1e-4);
        assert!(m.measure_text_width("$4.99 - Aloe", &bold) > w);
        assert_eq!(m.measure_text_width("", &small), 0.0);
    }
}

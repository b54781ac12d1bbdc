//! SVG word cloud: words flow left to right in centred rows, sized by count.

use chatlens_core::domain::VocabularyEntry;

pub const WIDTH: f64 = 1000.0;
pub const HEIGHT: f64 = 800.0;

const MIN_FONT: f64 = 14.0;
const MAX_FONT: f64 = 96.0;
const MARGIN: f64 = 20.0;

// Sampled from the viridis colormap, dark to light.
const PALETTE: [&str; 8] = [
    "#440154", "#46327e", "#365c8d", "#277f8e", "#1fa187", "#4ac16d", "#a0da39", "#fde725",
];

struct Word<'a> {
    term: &'a str,
    size: f64,
    width: f64,
    color: &'static str,
}

struct Row<'a> {
    words: Vec<Word<'a>>,
    width: f64,
    height: f64,
}

fn font_size(count: usize, min: usize, max: usize) -> f64 {
    if max == min {
        return (MIN_FONT + MAX_FONT) / 2.0;
    }
    let ratio = (count - min) as f64 / (max - min) as f64;
    MIN_FONT + (MAX_FONT - MIN_FONT) * ratio
}

// Rough advance width for a proportional sans-serif face.
fn text_width(term: &str, size: f64) -> f64 {
    term.chars().count() as f64 * size * 0.6
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(entries: &[VocabularyEntry]) -> Vec<Row<'_>> {
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    let min = entries.iter().map(|e| e.count).min().unwrap_or(0);
    let usable = WIDTH - 2.0 * MARGIN;

    let mut rows: Vec<Row> = Vec::new();
    let mut current = Row {
        words: Vec::new(),
        width: 0.0,
        height: 0.0,
    };

    for (rank, entry) in entries.iter().enumerate() {
        let size = font_size(entry.count, min, max);
        // Overlong words shrink to fit a row on their own.
        let width = text_width(&entry.term, size).min(usable);
        let gap = if current.words.is_empty() { 0.0 } else { size * 0.4 };
        if !current.words.is_empty() && current.width + gap + width > usable {
            rows.push(std::mem::replace(
                &mut current,
                Row {
                    words: Vec::new(),
                    width: 0.0,
                    height: 0.0,
                },
            ));
        }
        let gap = if current.words.is_empty() { 0.0 } else { size * 0.4 };
        current.width += gap + width;
        current.height = current.height.max(size * 1.2);
        current.words.push(Word {
            term: &entry.term,
            size,
            width,
            color: PALETTE[rank * PALETTE.len() / entries.len()],
        });
    }
    if !current.words.is_empty() {
        rows.push(current);
    }
    rows
}

/// Renders the vocabulary as a standalone SVG document. Rows that would run
/// past the bottom edge are dropped.
pub fn render_svg(entries: &[VocabularyEntry]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">\n"
    ));
    output.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

    let mut y = MARGIN;
    for row in layout(entries) {
        if y + row.height > HEIGHT - MARGIN {
            break;
        }
        let baseline = y + row.height * 0.8;
        let mut x = (WIDTH - row.width) / 2.0;
        for (i, word) in row.words.iter().enumerate() {
            if i > 0 {
                x += word.size * 0.4;
            }
            output.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"{:.1}\" fill=\"{}\" textLength=\"{:.1}\" lengthAdjust=\"spacingAndGlyphs\">{}</text>\n",
                x,
                baseline,
                word.size,
                word.color,
                word.width,
                escape_xml(word.term)
            ));
            x += word.width;
        }
        y += row.height;
    }

    output.push_str("</svg>\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(term: &str, count: usize) -> VocabularyEntry {
        VocabularyEntry {
            term: term.to_string(),
            count,
        }
    }

    #[test]
    fn test_empty_vocabulary_renders_blank_canvas() {
        let svg = render_svg(&[]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("fill=\"white\""));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn test_every_word_is_rendered() {
        let svg = render_svg(&[entry("pizza", 10), entry("chai", 4), entry("cricket", 1)]);
        assert_eq!(svg.matches("<text").count(), 3);
        assert!(svg.contains(">pizza</text>"));
    }

    #[test]
    fn test_font_size_scales_with_count() {
        assert_eq!(font_size(10, 1, 10), MAX_FONT);
        assert_eq!(font_size(1, 1, 10), MIN_FONT);
        assert_eq!(font_size(5, 5, 5), (MIN_FONT + MAX_FONT) / 2.0);
    }

    #[test]
    fn test_terms_are_escaped() {
        let svg = render_svg(&[entry("a<b&c", 2)]);
        assert!(svg.contains(">a&lt;b&amp;c</text>"));
    }

    #[test]
    fn test_rows_stay_inside_canvas() {
        let entries: Vec<VocabularyEntry> = (0..100)
            .map(|i| entry(&format!("word{i}"), 100 - i))
            .collect();
        for row in layout(&entries) {
            assert!(row.width <= WIDTH - 2.0 * MARGIN + 1e-6);
        }
        let svg = render_svg(&entries);
        assert!(svg.matches("<text").count() <= entries.len());
    }
}

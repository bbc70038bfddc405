//! Append-only chat transcript with a viewport pinned to the newest line.

/// Default number of visible rows.
pub const DEFAULT_VIEWPORT_ROWS: usize = 24;

/// The transcript for one session.
///
/// Text is only ever appended. After every append the viewport is scrolled so
/// the last line is visible. The surface also tracks how much of its text a
/// view has already drawn, so a terminal can print just the new part.
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    text: String,
    viewport_rows: usize,
    scroll_top: usize,
    drawn: usize,
}

impl DisplaySurface {
    pub fn new(viewport_rows: usize) -> Self {
        Self {
            text: String::new(),
            viewport_rows: viewport_rows.max(1),
            scroll_top: 0,
            drawn: 0,
        }
    }

    pub fn content(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append text verbatim.
    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
        self.scroll_to_bottom();
    }

    /// Append `line`, preceded by a line break unless the surface is empty.
    pub fn append_separated(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
        self.scroll_to_bottom();
    }

    /// Append `line` so it starts on a fresh line and ends with a terminator.
    pub fn append_terminated(&mut self, line: &str) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(line);
        self.text.push('\n');
        self.scroll_to_bottom();
    }

    /// Number of lines as a text view would lay them out.
    ///
    /// A trailing terminator opens a new, empty last line.
    pub fn line_count(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.split('\n').count()
        }
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    /// Index of the first visible line.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.line_count().saturating_sub(self.viewport_rows);
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top == self.line_count().saturating_sub(self.viewport_rows)
    }

    /// Lines currently inside the viewport.
    pub fn visible_lines(&self) -> Vec<&str> {
        if self.text.is_empty() {
            return Vec::new();
        }
        self.text
            .split('\n')
            .skip(self.scroll_top)
            .take(self.viewport_rows)
            .collect()
    }

    /// Text appended since the last call, marking it as drawn.
    pub fn take_undrawn(&mut self) -> &str {
        let start = self.drawn;
        self.drawn = self.text.len();
        &self.text[start..]
    }
}

impl Default for DisplaySurface {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_separated_line_has_no_leading_break() {
        let mut s = DisplaySurface::default();
        s.append_separated("bob: hi");
        assert_eq!(s.content(), "bob: hi");
        s.append_separated("amy: yo");
        assert_eq!(s.content(), "bob: hi\namy: yo");
    }

    #[test]
    fn terminated_lines_start_fresh() {
        let mut s = DisplaySurface::default();
        s.append("partial");
        s.append_terminated("--- notice ---");
        assert_eq!(s.content(), "partial\n--- notice ---\n");
        s.append_terminated("next");
        assert_eq!(s.content(), "partial\n--- notice ---\nnext\n");
    }

    #[test]
    fn line_count_counts_trailing_empty_line() {
        let mut s = DisplaySurface::default();
        assert_eq!(s.line_count(), 0);
        s.append("a\nb\n");
        assert_eq!(s.line_count(), 3);
    }

    #[test]
    fn viewport_stays_pinned_to_bottom() {
        let mut s = DisplaySurface::new(3);
        for i in 0..10 {
            s.append_separated(&format!("line {i}"));
            assert!(s.is_scrolled_to_bottom());
        }
        assert_eq!(s.scroll_top(), 7);
        assert_eq!(s.visible_lines(), vec!["line 7", "line 8", "line 9"]);
    }

    #[test]
    fn short_transcript_does_not_scroll() {
        let mut s = DisplaySurface::new(5);
        s.append_separated("one");
        s.append_separated("two");
        assert_eq!(s.scroll_top(), 0);
        assert_eq!(s.visible_lines(), vec!["one", "two"]);
    }

    #[test]
    fn zero_rows_is_clamped_to_one() {
        let mut s = DisplaySurface::new(0);
        s.append_separated("a");
        s.append_separated("b");
        assert_eq!(s.viewport_rows(), 1);
        assert_eq!(s.visible_lines(), vec!["b"]);
    }

    #[test]
    fn take_undrawn_returns_only_new_text() {
        let mut s = DisplaySurface::default();
        s.append_separated("a");
        assert_eq!(s.take_undrawn(), "a");
        assert_eq!(s.take_undrawn(), "");
        s.append_separated("b");
        assert_eq!(s.take_undrawn(), "\nb");
    }
}

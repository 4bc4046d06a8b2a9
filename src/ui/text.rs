use std::{
    borrow::Cow,
    time::Instant,
};

/// A single line of text which scrolls back and forth when it does not fit.
/// Widths are counted in chars so paths with non ASCII names never get split within a char.
pub struct ScrollableText {
    baseline: Instant,

    /// The text scroll speed in characters per second
    scroll_speed: f32,

    /// Seconds to rest at either end
    pause: f32,

    text: String,
    char_count: usize,
}

impl ScrollableText {
    pub fn new(text: String) -> Self {
        Self {
            char_count: text.chars().count(),
            text,
            baseline: Instant::now(),

            scroll_speed: 6.0,
            pause: 1.0,
        }
    }

    pub fn reset_scroll(&mut self) {
        self.baseline = Instant::now();
    }

    fn char_slice(&self, offset: usize, width: usize) -> &str {
        let mut indices = self
            .text
            .char_indices()
            .map(|(index, _)| index)
            .chain([self.text.len()]);

        let start = indices.nth(offset).unwrap_or(self.text.len());
        let end = if width == 0 {
            start
        } else {
            indices.nth(width - 1).unwrap_or(self.text.len())
        };
        &self.text[start..end]
    }

    /// The currently visible window of the text.
    pub fn display_value(&self, max_width: usize) -> Cow<str> {
        if self.char_count <= max_width {
            return (&self.text).into();
        }

        let overflow = self.char_count - max_width;
        let travel = overflow as f32 / self.scroll_speed;
        let cycle = 2.0 * (travel + self.pause);

        let elapsed = self.baseline.elapsed().as_secs_f32() % cycle;
        let offset = if elapsed < self.pause {
            0
        } else if elapsed < self.pause + travel {
            ((elapsed - self.pause) * self.scroll_speed) as usize
        } else if elapsed < 2.0 * self.pause + travel {
            overflow
        } else {
            overflow.saturating_sub(((elapsed - 2.0 * self.pause - travel) * self.scroll_speed) as usize)
        };

        self.char_slice(offset.min(overflow), max_width).into()
    }

    /// The text cut off with an ellipsis when it does not fit.
    pub fn fixed_value(&self, max_width: usize) -> Cow<str> {
        if self.char_count <= max_width {
            (&self.text).into()
        } else if max_width >= 3 {
            format!("{}...", self.char_slice(0, max_width - 3)).into()
        } else {
            "..."[0..max_width].into()
        }
    }
}

#[cfg(test)]
mod test {
    use super::ScrollableText;

    #[test]
    fn fixed_value_truncates_on_char_boundaries() {
        let text = ScrollableText::new("./größe/node_modules".to_string());
        assert_eq!(text.fixed_value(100), "./größe/node_modules");
        assert_eq!(text.fixed_value(8), "./grö...");
        assert_eq!(text.fixed_value(2), "..");
    }

    #[test]
    fn display_value_starts_at_the_beginning() {
        let text = ScrollableText::new("ääääääääää".to_string());
        assert_eq!(text.display_value(4), "ääää");
        assert_eq!(text.display_value(10), "ääääääääää");
    }
}

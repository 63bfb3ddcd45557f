//! Windowing over a current row taller than the screen.

/// Scroll window over the wrapped lines of one over-long row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialView {
    active: bool,
    less: bool,
    more: bool,
    offset: usize,
    limit: usize,
}

impl PartialView {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Lines are hidden above the window.
    pub fn less(&self) -> bool {
        self.less
    }

    /// Lines are hidden below the window.
    pub fn more(&self) -> bool {
        self.more
    }

    /// First wrapped line shown.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Largest valid offset.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Activate, resize or deactivate the window for a row of `lines` wrapped lines.
    pub fn sync(&mut self, lines: usize, screen_height: usize) {
        if lines <= screen_height {
            if self.active {
                tracing::debug!(lines, screen_height, "partial view off");
            }
            *self = Self::default();
            return;
        }
        let limit = lines - screen_height;
        if !self.active {
            tracing::debug!(lines, screen_height, "partial view on");
            *self = Self {
                active: true,
                less: false,
                more: true,
                offset: 0,
                limit,
            };
            return;
        }
        self.limit = limit;
        self.offset = self.offset.min(limit);
        self.less = self.offset > 0;
        self.more = self.offset < limit;
    }

    /// Slide the window so `caret_line` is visible.
    pub fn follow(&mut self, caret_line: usize, screen_height: usize) {
        if !self.active || screen_height == 0 {
            return;
        }
        if caret_line < self.offset {
            self.offset = caret_line;
            self.more = true;
            self.less = self.offset > 0;
        } else if caret_line >= self.offset + screen_height {
            self.offset = (caret_line + 1 - screen_height).min(self.limit);
            self.less = true;
            self.more = self.offset < self.limit;
        }
    }

    /// Reveal one more line below. Returns `false` when already at the bottom.
    pub fn scroll_down(&mut self) -> bool {
        if !self.active || self.offset >= self.limit {
            return false;
        }
        self.offset += 1;
        self.less = true;
        self.more = self.offset < self.limit;
        true
    }

    /// Reveal one more line above. Returns `false` when already at the top.
    pub fn scroll_up(&mut self) -> bool {
        if !self.active || self.offset == 0 {
            return false;
        }
        self.offset -= 1;
        self.more = true;
        self.less = self.offset > 0;
        true
    }
}

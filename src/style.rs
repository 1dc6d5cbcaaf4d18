use crate::model::TextStyle;

/// Inline formatting a tag contributes on top of the enclosing style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Bold,
    Italic,
    Underline,
}

/// Active inline style while walking markup. Each push layers one emphasis on
/// top of the current style, so nested tags compose.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleStack {
    base: TextStyle,
    frames: Vec<(Emphasis, TextStyle)>,
}

impl StyleStack {
    pub fn new(base: TextStyle) -> Self {
        StyleStack {
            base,
            frames: Vec::new(),
        }
    }

    pub fn current(&self) -> TextStyle {
        self.frames.last().map(|(_, s)| *s).unwrap_or(self.base)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, emphasis: Emphasis) {
        let top = self.current();
        let style = match emphasis {
            Emphasis::Bold => top.bold(),
            Emphasis::Italic => top.italic(),
            Emphasis::Underline => top.underline(),
        };
        self.frames.push((emphasis, style));
    }

    /// Pops the innermost frame opened by `emphasis`, along with anything opened
    /// after it. A close with no matching open leaves the stack untouched.
    pub fn pop(&mut self, emphasis: Emphasis) {
        if let Some(pos) = self.frames.iter().rposition(|(e, _)| *e == emphasis) {
            self.frames.truncate(pos);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatAction {
    Bold,
    Italic,
    Heading1,
    Heading2,
    BulletList,
    NumberedList,
}

impl FormatAction {
    pub fn marker(&self) -> &'static str {
        match self {
            FormatAction::Bold => "**",
            FormatAction::Italic => "_",
            FormatAction::Heading1 => "# ",
            FormatAction::Heading2 => "## ",
            FormatAction::BulletList => "- ",
            FormatAction::NumberedList => "1. ",
        }
    }

    pub fn is_line_prefix(&self) -> bool {
        matches!(self, FormatAction::BulletList | FormatAction::NumberedList)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    pub text: String,
    /// Set only when the toggle decides the next caret itself; `None` means
    /// the host keeps tracking its own selection.
    pub selection: Option<Selection>,
}

pub fn apply_action(text: &str, selection: Selection, action: FormatAction) -> FormatOutcome {
    if action.is_line_prefix() {
        toggle_line_prefix(text, selection, action.marker())
    } else {
        toggle_wrap(text, selection, action.marker())
    }
}

/// Toggles a symmetric marker around the selection. Whether the selection is
/// already formatted is judged from the selected substring's own edges only;
/// markers sitting just outside the selection bounds are not considered.
pub fn toggle_wrap(text: &str, selection: Selection, marker: &str) -> FormatOutcome {
    check_selection(text, selection);
    let Selection { start, end } = selection;

    if selection.is_caret() {
        let mut out = String::with_capacity(text.len() + marker.len() * 2);
        out.push_str(&text[..start]);
        out.push_str(marker);
        out.push_str(marker);
        out.push_str(&text[start..]);
        // caret lands between the pair so typed text goes inside the markers
        return FormatOutcome {
            text: out,
            selection: Some(Selection::caret(start + marker.len())),
        };
    }

    let selected = &text[start..end];
    if selected.starts_with(marker) && selected.ends_with(marker) {
        // A selection of marker text shorter than two full markers counts as
        // formatted and unwraps to nothing.
        let inner_end = selected.len().saturating_sub(marker.len());
        let inner = if inner_end > marker.len() {
            &selected[marker.len()..inner_end]
        } else {
            ""
        };
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..start]);
        out.push_str(inner);
        out.push_str(&text[end..]);
        FormatOutcome {
            text: out,
            selection: None,
        }
    } else {
        let mut out = String::with_capacity(text.len() + marker.len() * 2);
        out.push_str(&text[..start]);
        out.push_str(marker);
        out.push_str(selected);
        out.push_str(marker);
        out.push_str(&text[end..]);
        FormatOutcome {
            text: out,
            selection: None,
        }
    }
}

/// Toggles a line prefix on the line containing the selection start. All
/// other lines are reproduced unchanged.
pub fn toggle_line_prefix(text: &str, selection: Selection, marker: &str) -> FormatOutcome {
    check_selection(text, selection);
    let line_ix = text[..selection.start].matches('\n').count();
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let toggled = match lines[line_ix].strip_prefix(marker) {
        Some(rest) => rest.to_string(),
        None => format!("{marker}{}", lines[line_ix]),
    };
    lines[line_ix] = toggled;
    FormatOutcome {
        text: lines.join("\n"),
        selection: None,
    }
}

fn check_selection(text: &str, selection: Selection) {
    assert!(
        selection.start <= selection.end,
        "selection start {} past end {}",
        selection.start,
        selection.end
    );
    assert!(
        selection.end <= text.len(),
        "selection end {} past buffer length {}",
        selection.end,
        text.len()
    );
    assert!(
        text.is_char_boundary(selection.start) && text.is_char_boundary(selection.end),
        "selection offsets must sit on char boundaries"
    );
}

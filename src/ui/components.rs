//! Element tree to terminal lines
//!
//! Block elements (`div`, `ul`, `h1`, `p`, `input`, `li`) start a new line.
//! Runs of inline siblings (`span`, `button`) share one line, so a list item
//! reads `+500 calories [ Edit ] [ Delete ]`.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::dom::{Document, NodeId};
use crate::theme::Theme;

fn is_inline(tag: &str) -> bool {
    matches!(tag, "span" | "button")
}

pub struct ElementPainter<'a, A> {
    doc: &'a Document<A>,
    theme: &'a Theme,
    focused: Option<NodeId>,
}

impl<'a, A> ElementPainter<'a, A> {
    pub fn new(doc: &'a Document<A>, theme: &'a Theme, focused: Option<NodeId>) -> Self {
        Self { doc, theme, focused }
    }

    pub fn lines(&self, root: NodeId) -> Vec<Line<'static>> {
        let mut out = Vec::new();
        self.block(root, &mut out);
        out
    }

    fn focus_style(&self, node: NodeId, style: Style) -> Style {
        if self.focused == Some(node) {
            style.bg(self.theme.bg_selected).add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    fn block(&self, node: NodeId, out: &mut Vec<Line<'static>>) {
        let el = match self.doc.get(node) {
            Some(el) => el,
            None => return,
        };
        let style = self.theme.style_for(el);

        match el.tag.as_str() {
            "h1" => {
                out.push(Line::from(Span::styled(el.text.clone(), style)));
                out.push(Line::from(""));
            }
            "p" => out.push(Line::from(Span::styled(el.text.clone(), style))),
            "input" => out.push(Line::from(self.input_spans(node))),
            "li" => {
                let mut spans = vec![Span::styled("  • ", Style::default().fg(self.theme.text_dim))];
                for child in el.children() {
                    spans.extend(self.inline(*child));
                }
                out.push(Line::from(spans));
            }
            tag if is_inline(tag) => out.push(Line::from(self.inline(node))),
            _ => {
                if !el.text.is_empty() {
                    out.push(Line::from(Span::styled(
                        el.text.clone(),
                        Style::default().fg(self.theme.text_dim),
                    )));
                }

                let mut run: Vec<Span<'static>> = Vec::new();
                for child in el.children() {
                    let inline = self
                        .doc
                        .get(*child)
                        .map(|c| is_inline(&c.tag))
                        .unwrap_or(false);
                    if inline {
                        run.extend(self.inline(*child));
                    } else {
                        if !run.is_empty() {
                            out.push(Line::from(std::mem::take(&mut run)));
                        }
                        self.block(*child, out);
                    }
                }
                if !run.is_empty() {
                    out.push(Line::from(run));
                }
            }
        }
    }

    fn inline(&self, node: NodeId) -> Vec<Span<'static>> {
        let el = match self.doc.get(node) {
            Some(el) => el,
            None => return Vec::new(),
        };
        let text = self.doc.text_content(node);

        if el.tag == "button" {
            let style = self.focus_style(node, self.theme.style_for(el));
            vec![Span::styled(format!("[ {} ]", text), style), Span::raw(" ")]
        } else {
            vec![Span::styled(format!("{} ", text), self.theme.record_style(&text))]
        }
    }

    fn input_spans(&self, node: NodeId) -> Vec<Span<'static>> {
        let el = match self.doc.get(node) {
            Some(el) => el,
            None => return Vec::new(),
        };
        let focused = self.focused == Some(node);
        let marker = if focused { "▸ " } else { "  " };

        let mut spans = vec![Span::styled(marker, Style::default().fg(self.theme.accent))];
        if el.value.is_empty() {
            let placeholder = el.placeholder.clone().unwrap_or_default();
            spans.push(Span::styled(placeholder, Style::default().fg(self.theme.text_dim)));
        } else {
            spans.push(Span::styled(el.value.clone(), self.theme.style_for(el)));
        }
        if focused {
            spans.push(Span::styled("_", Style::default().fg(self.theme.accent)));
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Renderer, MOUNT_POINT_ID};
    use crate::storage::MemoryStore;
    use crate::tracker::{CalorieTracker, STORAGE_KEY};

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_paints_form_and_records() {
        let store = MemoryStore::new()
            .with_item(STORAGE_KEY, r#"[{"type":"burned","amount":200},{"type":"gained","amount":500}]"#);
        let doc = Document::with_mount_point(MOUNT_POINT_ID);
        let mut renderer = Renderer::mount(doc, CalorieTracker::load(store)).unwrap();
        renderer.init().unwrap();

        let theme = Theme::default();
        let painter = ElementPainter::new(renderer.document(), &theme, None);
        let lines: Vec<String> = painter.lines(renderer.container()).iter().map(plain).collect();

        assert_eq!(lines[0], "Calorie Tracker");
        assert_eq!(lines[2], "  Enter calories");
        assert_eq!(lines[4], "[ Add Gained Calories ] [ Add Burned Calories ] ");
        assert_eq!(lines[5], "  • -200 calories [ Edit ] [ Delete ] ");
        assert_eq!(lines[6], "  • +500 calories [ Edit ] [ Delete ] ");
    }

    #[test]
    fn test_focused_input_shows_cursor() {
        let doc = Document::with_mount_point(MOUNT_POINT_ID);
        let mut renderer = Renderer::mount(doc, CalorieTracker::load(MemoryStore::new())).unwrap();
        renderer.init().unwrap();
        renderer.set_input_value(Some("42")).unwrap();

        let theme = Theme::default();
        let input = renderer.input().unwrap();
        let painter = ElementPainter::new(renderer.document(), &theme, Some(input));
        let lines: Vec<String> = painter.lines(renderer.container()).iter().map(plain).collect();

        assert_eq!(lines[2], "▸ 42_");
        assert_eq!(lines.last().unwrap(), "No calorie records found.");
    }
}

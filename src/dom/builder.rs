use super::{Document, Element, NodeId};

/// Fluent helper around one freshly created element.
///
/// The builder borrows the document for the length of the chain; the
/// element stays owned by the document and is handed out by [`build`].
///
/// [`build`]: ElementBuilder::build
pub struct ElementBuilder<'d, A> {
    doc: &'d mut Document<A>,
    node: NodeId,
}

impl<'d, A> ElementBuilder<'d, A> {
    pub fn create(doc: &'d mut Document<A>, tag: &str) -> Self {
        let node = doc.create_element(tag);
        Self { doc, node }
    }

    /// Builder over an element that already exists
    pub fn select(doc: &'d mut Document<A>, node: NodeId) -> Self {
        Self { doc, node }
    }

    fn with(self, f: impl FnOnce(&mut Element<A>)) -> Self {
        if let Some(el) = self.doc.get_mut(self.node) {
            f(el);
        }
        self
    }

    pub fn text(self, text: &str) -> Self {
        let node = self.node;
        self.doc.set_text(node, text);
        self
    }

    pub fn name(self, name: &str) -> Self {
        self.with(|el| el.name = Some(name.to_string()))
    }

    pub fn input_type(self, input_type: &str) -> Self {
        self.with(|el| el.input_type = Some(input_type.to_string()))
    }

    pub fn placeholder(self, placeholder: &str) -> Self {
        self.with(|el| el.placeholder = Some(placeholder.to_string()))
    }

    pub fn styles(self, classes: &[&str]) -> Self {
        self.with(|el| {
            for class in classes {
                el.add_class(class);
            }
        })
    }

    pub fn id(self, id: &str) -> Self {
        self.with(|el| el.id = Some(id.to_string()))
    }

    pub fn onclick(self, action: A) -> Self {
        self.with(|el| el.on_click = Some(action))
    }

    /// `None` clears the value
    pub fn set_value(self, value: Option<&str>) -> Self {
        self.with(|el| el.value = value.unwrap_or_default().to_string())
    }

    pub fn get_value(&self) -> String {
        self.doc
            .get(self.node)
            .map(|el| el.value.clone())
            .unwrap_or_default()
    }

    pub fn append_to(self, parent: NodeId) -> Self {
        self.doc.append(parent, self.node);
        self
    }

    pub fn build(self) -> NodeId {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Clicked,
    }

    #[test]
    fn test_chain_configures_element() {
        let mut doc: Document<Msg> = Document::new();
        let root = doc.root();
        let input = ElementBuilder::create(&mut doc, "input")
            .styles(&["inp"])
            .input_type("number")
            .name("amount")
            .placeholder("Enter calories")
            .append_to(root)
            .build();

        let el = doc.get(input).unwrap();
        assert_eq!(el.tag, "input");
        assert_eq!(el.input_type.as_deref(), Some("number"));
        assert_eq!(el.name.as_deref(), Some("amount"));
        assert_eq!(el.placeholder.as_deref(), Some("Enter calories"));
        assert_eq!(el.parent, Some(root));
    }

    #[test]
    fn test_styles_adds_all_tokens_once() {
        let mut doc: Document<Msg> = Document::new();
        let node = ElementBuilder::create(&mut doc, "button")
            .styles(&["tracker-button", "wide"])
            .styles(&["wide"])
            .build();
        assert_eq!(doc.get(node).unwrap().classes, vec!["tracker-button", "wide"]);
    }

    #[test]
    fn test_value_round_trip_and_clear() {
        let mut doc: Document<Msg> = Document::new();
        let builder = ElementBuilder::create(&mut doc, "input").set_value(Some("300"));
        assert_eq!(builder.get_value(), "300");
        let builder = builder.set_value(None);
        assert_eq!(builder.get_value(), "");
    }

    #[test]
    fn test_onclick_and_text() {
        let mut doc: Document<Msg> = Document::new();
        let root = doc.root();
        let button = ElementBuilder::create(&mut doc, "button")
            .text("Delete")
            .id("del")
            .onclick(Msg::Clicked)
            .append_to(root)
            .build();
        let el = doc.get(button).unwrap();
        assert_eq!(el.on_click, Some(Msg::Clicked));
        assert_eq!(doc.text_content(button), "Delete");
        assert_eq!(doc.get_element_by_id("del"), Some(button));
    }

    #[test]
    fn test_select_reads_and_writes_existing_element() {
        let mut doc: Document<Msg> = Document::new();
        let input = ElementBuilder::create(&mut doc, "input").build();

        ElementBuilder::select(&mut doc, input).set_value(Some("450"));
        assert_eq!(doc.get(input).unwrap().value, "450");
        assert_eq!(ElementBuilder::select(&mut doc, input).get_value(), "450");
    }
}

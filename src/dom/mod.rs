//! In-process element tree
//!
//! A small DOM model: elements live in an arena owned by [`Document`] and
//! are addressed by [`NodeId`]. Click handlers are plain action values of
//! type `A` that the owner of the document dispatches.

mod builder;

pub use builder::ElementBuilder;

/// Handle to an element inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Element<A> {
    pub tag: String,
    /// Own text, drawn before any children
    pub text: String,
    pub name: Option<String>,
    pub input_type: Option<String>,
    pub placeholder: Option<String>,
    pub classes: Vec<String>,
    pub id: Option<String>,
    pub value: String,
    pub on_click: Option<A>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl<A> Element<A> {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: String::new(),
            name: None,
            input_type: None,
            placeholder: None,
            classes: Vec::new(),
            id: None,
            value: String::new(),
            on_click: None,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Inputs and buttons can take keyboard focus
    pub fn is_focusable(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "button")
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of elements with a single `body` root
#[derive(Debug, Clone)]
pub struct Document<A> {
    nodes: Vec<Option<Element<A>>>,
    free: Vec<usize>,
    root: NodeId,
}

impl<A> Default for Document<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Document<A> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Element::new("body"))],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// Document whose body holds one `div` carrying `mount_id`
    pub fn with_mount_point(mount_id: &str) -> Self {
        let mut doc = Self::new();
        let div = doc.create_element("div");
        if let Some(el) = doc.get_mut(div) {
            el.id = Some(mount_id.to_string());
        }
        doc.append(doc.root, div);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let element = Element::new(tag);
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(element);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(element));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Element<A>> {
        self.nodes.get(id.0).and_then(|n| n.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element<A>> {
        self.nodes.get_mut(id.0).and_then(|n| n.as_mut())
    }

    /// Attach `child` as the last child of `parent`, moving it if it
    /// already has a parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn detach(&mut self, child: NodeId) {
        let old_parent = self.get(child).and_then(|c| c.parent);
        if let Some(old) = old_parent {
            if let Some(p) = self.get_mut(old) {
                p.children.retain(|c| *c != child);
            }
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = None;
        }
    }

    /// Drop every descendant of `id` and its own text
    pub fn clear_children(&mut self, id: NodeId) {
        let children = match self.get_mut(id) {
            Some(el) => {
                el.text.clear();
                std::mem::take(&mut el.children)
            }
            None => return,
        };
        for child in children {
            self.release(child);
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(el) = self.nodes.get_mut(id.0).and_then(|n| n.take()) {
            self.free.push(id.0);
            for child in el.children {
                self.release(child);
            }
        }
    }

    /// Replace the whole content of `id` with plain text
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if let Some(el) = self.get_mut(id) {
            el.text = text.to_string();
        }
    }

    /// Concatenated text of `id` and all its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(el) = self.get(node) {
                out.push_str(&el.text);
            }
        }
        out
    }

    /// `id` followed by all of its descendants in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(el) = self.get(node) {
                out.push(node);
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.get(*n).and_then(|el| el.id.as_deref()) == Some(id))
    }

    pub fn elements_by_class(&self, within: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(within)
            .into_iter()
            .filter(|n| self.get(*n).map(|el| el.has_class(class)).unwrap_or(false))
            .collect()
    }

    /// Focusable elements under `within` in document order
    pub fn focusable(&self, within: NodeId) -> Vec<NodeId> {
        self.descendants(within)
            .into_iter()
            .filter(|n| self.get(*n).map(Element::is_focusable).unwrap_or(false))
            .collect()
    }
}

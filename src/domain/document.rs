// Document model - the page containers charts are drawn into
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub const BODY_ID: &str = "body";

#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("element {0} already exists")]
    DuplicateId(String),
    #[error("element {0} does not exist")]
    UnknownElement(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub class: Option<String>,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub width: u32,
    pub height: u32,
    /// Absolute page position, set for floating elements such as tooltips.
    pub position: Option<(f64, f64)>,
    pub content: Option<String>,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: None,
            parent: None,
            children: Vec::new(),
            width: 0,
            height: 0,
            position: None,
            content: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// A page: elements addressed by id, rooted at the body.
#[derive(Debug, Clone)]
pub struct Document {
    elements: HashMap<String, Element>,
}

pub type SharedDocument = Arc<Mutex<Document>>;

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut elements = HashMap::new();
        elements.insert(BODY_ID.to_string(), Element::new(BODY_ID));
        Self { elements }
    }

    pub fn shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Append `element` as the last child of `parent_id`.
    pub fn append(&mut self, parent_id: &str, mut element: Element) -> Result<(), DocumentError> {
        if self.elements.contains_key(&element.id) {
            return Err(DocumentError::DuplicateId(element.id));
        }
        let parent = self
            .elements
            .get_mut(parent_id)
            .ok_or_else(|| DocumentError::UnknownElement(parent_id.to_string()))?;

        parent.children.push(element.id.clone());
        element.parent = Some(parent_id.to_string());
        self.elements.insert(element.id.clone(), element);
        Ok(())
    }

    /// Detach `id` from its parent and drop it with all descendants.
    pub fn remove(&mut self, id: &str) -> Option<Element> {
        if id == BODY_ID {
            return None;
        }
        let element = self.elements.remove(id)?;
        if let Some(parent) = element.parent.as_ref().and_then(|p| self.elements.get_mut(p)) {
            parent.children.retain(|child| child != id);
        }

        let mut pending = element.children.clone();
        while let Some(child_id) = pending.pop() {
            if let Some(child) = self.elements.remove(&child_id) {
                pending.extend(child.children);
            }
        }

        Some(element)
    }

    /// Whether `id` is reachable from the body.
    pub fn is_attached(&self, id: &str) -> bool {
        let mut current = id;
        // Bounded walk; a well-formed tree never needs more steps than elements.
        for _ in 0..=self.elements.len() {
            if current == BODY_ID {
                return true;
            }
            match self.elements.get(current).and_then(|e| e.parent.as_deref()) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    pub fn set_content(
        &mut self,
        id: &str,
        content: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or_else(|| DocumentError::UnknownElement(id.to_string()))?;
        element.content = Some(content.into());
        Ok(())
    }
}

/// Lock a shared document, recovering the data if a holder panicked.
pub fn lock_document(document: &SharedDocument) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

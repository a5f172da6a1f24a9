//! Labels attaching messages to program elements.

use bindery_core::element::ElementId;

/// A labeled reference to a program element.
///
/// - **Primary labels** mark the element the finding is about. There should
///   typically be one primary label per diagnostic.
/// - **Secondary labels** point at related elements, such as the enclosing
///   module or a conflicting declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    element: ElementId,
    message: String,
    is_primary: bool,
}

impl Label {
    pub fn primary(element: ElementId, message: impl Into<String>) -> Self {
        Self {
            element,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(element: ElementId, message: impl Into<String>) -> Self {
        Self {
            element,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the element this label refers to.
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

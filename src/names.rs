//! Component and attribute naming

use crate::ast::{Attribute, AttributeName, ElementName};

/// Resolve the dotted/namespaced component name of an element
///
/// `Button` -> `Button`, `Some.Provider` -> `Some.Provider`,
/// `Button:namespace` -> `Button:namespace`.
pub fn component_name(name: &ElementName) -> String {
    match name {
        ElementName::Identifier(ident) => ident.clone(),
        ElementName::Member { object, property } => {
            format!("{}.{}", component_name(object), property)
        }
        ElementName::Namespaced { namespace, name } => format!("{}:{}", namespace, name),
    }
}

/// Resolve the (possibly namespaced) attribute name
pub fn attribute_name(attribute: &Attribute) -> String {
    match &attribute.name {
        AttributeName::Plain(name) => name.clone(),
        AttributeName::Namespaced { namespace, name } => format!("{}:{}", namespace, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;

    fn ident(name: &str) -> ElementName {
        ElementName::Identifier(name.to_string())
    }

    #[test]
    fn test_component_identifier() {
        assert_eq!(component_name(&ident("Button")), "Button");
    }

    #[test]
    fn test_component_member_chain() {
        let name = ElementName::Member {
            object: Box::new(ElementName::Member {
                object: Box::new(ident("Ui")),
                property: "Menu".to_string(),
            }),
            property: "Item".to_string(),
        };
        assert_eq!(component_name(&name), "Ui.Menu.Item");
    }

    #[test]
    fn test_component_namespaced() {
        let name = ElementName::Namespaced {
            namespace: "Button".to_string(),
            name: "namespace".to_string(),
        };
        assert_eq!(component_name(&name), "Button:namespace");
    }

    #[test]
    fn test_attribute_names() {
        let plain = Attribute {
            name: AttributeName::Plain("aria-label".to_string()),
            value: None,
            span: Span::default(),
        };
        let namespaced = Attribute {
            name: AttributeName::Namespaced {
                namespace: "xlink".to_string(),
                name: "href".to_string(),
            },
            value: None,
            span: Span::default(),
        };
        assert_eq!(attribute_name(&plain), "aria-label");
        assert_eq!(attribute_name(&namespaced), "xlink:href");
    }
}

//! Parent constraints of every typed reference.

use wikiref_model::{
    AttachmentReference, ClassPropertyReference, DocumentReference, EntityReference, EntityType,
    LocalDocumentReference, LocalPageReference, ObjectPropertyReference, ObjectReference,
    PageAttachmentReference, PageClassPropertyReference, PageObjectPropertyReference,
    PageObjectReference, PageReference, ReferenceError, SpaceReference, TypedReference,
    WikiReference,
};

/// One reference of every type, each under valid parents.
fn samples() -> Vec<EntityReference> {
    let wiki = EntityReference::new("wiki", EntityType::Wiki).unwrap();
    let space = wiki.child("Space", EntityType::Space).unwrap();
    let document = space.child("Page", EntityType::Document).unwrap();
    let object = document.child("XWiki.Class[0]", EntityType::Object).unwrap();
    let page = wiki.child("page", EntityType::Page).unwrap();
    let page_object = page.child("obj", EntityType::PageObject).unwrap();
    vec![
        wiki.clone(),
        space.clone(),
        document.clone(),
        document.child("file.txt", EntityType::Attachment).unwrap(),
        object.clone(),
        object.child("prop", EntityType::ObjectProperty).unwrap(),
        document.child("prop", EntityType::ClassProperty).unwrap(),
        page.clone(),
        page.child("file.txt", EntityType::PageAttachment).unwrap(),
        page_object.clone(),
        page_object.child("prop", EntityType::PageObjectProperty).unwrap(),
        page.child("prop", EntityType::PageClassProperty).unwrap(),
    ]
}

fn build(entity_type: EntityType, parent: Option<&EntityReference>) -> Result<TypedReference, ReferenceError> {
    let reference = EntityReference::with_parent("name", entity_type, parent.cloned())?;
    TypedReference::try_from(reference)
}

#[test]
fn test_allowed_parents_accepted() {
    let samples = samples();
    for entity_type in EntityType::all() {
        for parent_type in entity_type.allowed_parents() {
            let parent = samples
                .iter()
                .find(|s| s.entity_type() == *parent_type)
                .unwrap();
            assert!(
                build(*entity_type, Some(parent)).is_ok(),
                "{entity_type} should accept a {parent_type} parent"
            );
        }
    }
}

#[test]
fn test_other_parents_rejected() {
    let samples = samples();
    for entity_type in EntityType::all() {
        for parent in &samples {
            if entity_type.allowed_parents().contains(&parent.entity_type()) {
                continue;
            }
            let result = build(*entity_type, Some(parent));
            assert!(
                matches!(result, Err(ReferenceError::InvalidParent { .. })),
                "{entity_type} should reject a {} parent",
                parent.entity_type()
            );
        }
    }
}

#[test]
fn test_missing_parent_rejected_except_wiki() {
    for entity_type in EntityType::all() {
        let result = build(*entity_type, None);
        if *entity_type == EntityType::Wiki {
            assert!(result.is_ok());
        } else {
            assert!(result.is_err(), "{entity_type} requires a parent");
        }
    }
}

#[test]
fn test_broken_ancestor_rejected() {
    // A space whose own parent is a document is invalid even two levels up.
    let wiki = EntityReference::new("wiki", EntityType::Wiki).unwrap();
    let document = wiki
        .child("Space", EntityType::Space)
        .and_then(|s| s.child("Page", EntityType::Document))
        .unwrap();
    let bad_space = document.child("Nested", EntityType::Space).unwrap();
    let bad_document = bad_space.child("Leaf", EntityType::Document).unwrap();
    assert!(DocumentReference::try_from(bad_document).is_err());
}

#[test]
fn test_object_reference_example() {
    let document = DocumentReference::new("wiki", "Space", "Page").unwrap();
    assert!(ObjectReference::new("obj", document).is_ok());

    let space_parent = EntityReference::new("wiki", EntityType::Wiki)
        .and_then(|w| w.child("Space", EntityType::Space))
        .and_then(|s| s.child("obj", EntityType::Object))
        .unwrap();
    assert!(ObjectReference::try_from(space_parent).is_err());
}

#[test]
fn test_constructors() {
    let wiki = WikiReference::new("wiki").unwrap();
    let space = SpaceReference::new("Space", wiki.clone()).unwrap();
    let nested = SpaceReference::new("Nested", space.clone()).unwrap();
    assert_eq!(nested, SpaceReference::from_path("wiki", &["Space", "Nested"]).unwrap());

    let document = DocumentReference::from_space("Page", nested.clone()).unwrap();
    assert_eq!(document.space_references(), vec![space, nested]);

    let attachment = AttachmentReference::new("a.png", document.clone()).unwrap();
    assert_eq!(attachment.document_reference(), document);

    let object = ObjectReference::new("obj", document.clone()).unwrap();
    let property = ObjectPropertyReference::new("prop", object.clone()).unwrap();
    assert_eq!(property.object_reference(), object);
    assert_eq!(property.document_reference(), document);

    let class_property = ClassPropertyReference::new("prop", document.clone()).unwrap();
    assert_eq!(class_property.document_reference(), document);

    let page = PageReference::from_parent("child", PageReference::new("wiki", &["parent"]).unwrap()).unwrap();
    assert_eq!(page.wiki_reference(), wiki);
    let page_attachment = PageAttachmentReference::new("a.png", page.clone()).unwrap();
    assert_eq!(page_attachment.page_reference(), page);
    let page_object = PageObjectReference::new("obj", page.clone()).unwrap();
    let page_property = PageObjectPropertyReference::new("prop", page_object).unwrap();
    assert_eq!(page_property.page_reference(), page);
    let page_class_property = PageClassPropertyReference::new("prop", page.clone()).unwrap();
    assert_eq!(page_class_property.page_reference(), page);
}

#[test]
fn test_empty_names_rejected() {
    assert!(matches!(WikiReference::new(""), Err(ReferenceError::EmptyName)));
    assert!(DocumentReference::with_spaces("wiki", &[], "Page").is_err());
    assert!(LocalDocumentReference::with_spaces(&[], "Page").is_err());
    assert!(LocalPageReference::new(&[]).is_err());
}

#[test]
fn test_local_references() {
    let local = LocalDocumentReference::with_spaces(&["A", "B"], "Page").unwrap();
    assert_eq!(local.size(), 3);
    assert_eq!(local.root().entity_type(), EntityType::Space);

    let page = LocalPageReference::new(&["a", "b"]).unwrap();
    assert_eq!(page.root().name(), "a");
    let absolute = PageReference::new("wiki", &["a", "b"]).unwrap();
    assert!(LocalPageReference::try_from(absolute.reference()).is_err());
}

use super::*;

#[test]
fn index_name_accepts_max_len() {
    let name = "a".repeat(MAX_INDEX_NAME_LEN);
    let parsed = IndexName::try_from_str(&name).unwrap();

    assert_eq!(parsed.as_str().len(), MAX_INDEX_NAME_LEN);
    assert_eq!(parsed.len(), MAX_INDEX_NAME_LEN);
}

#[test]
fn index_name_rejects_over_len() {
    let name = "a".repeat(MAX_INDEX_NAME_LEN + 1);

    let err = IndexName::try_from_str(&name).unwrap_err();
    assert!(matches!(err, IndexNameError::TooLong { len, max } if len == MAX_INDEX_NAME_LEN + 1 && max == MAX_INDEX_NAME_LEN));
}

#[test]
fn index_name_rejects_empty_and_non_ascii() {
    assert_eq!(IndexName::try_from_str(""), Err(IndexNameError::Empty));
    assert_eq!(IndexName::try_from_str("näme"), Err(IndexNameError::NonAscii));
}

#[test]
fn label_display_falls_back_for_unnamed() {
    let named = IndexLabel::from(Some(IndexName::try_from("by_n").unwrap()));

    assert_eq!(named.to_string(), "by_n");
    assert_eq!(IndexLabel::from(None).to_string(), "<unnamed>");
    assert_eq!(named.name().map(IndexName::as_str), Some("by_n"));
}

#[test]
fn container_tags_are_unique() {
    let a = ContainerTag::next();
    let b = ContainerTag::next();

    assert_ne!(a, b);
    assert_ne!(ValueId::new(a, 0), ValueId::new(b, 0));
}

#[test]
fn value_ids_order_by_sequence_within_container() {
    let tag = ContainerTag::next();
    let first = ValueId::new(tag, 1);
    let second = ValueId::new(tag, 2);

    assert!(first < second);
    assert_eq!(second.seq(), 2);
    assert_eq!(second.container(), tag);
}

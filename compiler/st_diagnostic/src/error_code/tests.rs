use super::*;

#[test]
fn category_follows_first_digit() {
    assert_eq!(ErrorCode::E1002.category(), ErrorCategory::Name);
    assert_eq!(ErrorCode::E2001.category(), ErrorCategory::Binding);
    assert_eq!(ErrorCode::E3001.category(), ErrorCategory::Structural);
    assert_eq!(ErrorCode::E4002.category(), ErrorCategory::Validation);
    assert_eq!(ErrorCode::E5001.category(), ErrorCategory::Recompile);
    assert_eq!(ErrorCode::E6001.category(), ErrorCategory::Runtime);
    assert_eq!(ErrorCode::E9001.category(), ErrorCategory::Internal);
}

#[test]
fn display_is_the_code() {
    assert_eq!(ErrorCode::E2002.to_string(), "E2002");
    assert_eq!(ErrorCode::E2002.description(), "assignment to a non-writable binding");
}

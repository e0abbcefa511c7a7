// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_domain::{RegistrationStatus, ResourceKind};

use crate::{
    ApiError, RequestValidationError, Role, parse_kind, parse_role, parse_status,
    require_non_blank, require_positive,
};

#[test]
fn test_parse_role_ignores_case() {
    assert_eq!(parse_role("Admin").unwrap(), Role::Admin);
    assert_eq!(parse_role(" registrant ").unwrap(), Role::Registrant);
    assert_eq!(
        parse_role("bidder").unwrap_err(),
        RequestValidationError::UnknownRole(String::from("bidder"))
    );
}

#[test]
fn test_parse_kind() {
    assert_eq!(parse_kind("FORMATION").unwrap(), ResourceKind::Formation);
    assert!(matches!(
        parse_kind("tournament"),
        Err(RequestValidationError::UnknownKind(_))
    ));
}

#[test]
fn test_parse_status() {
    assert_eq!(parse_status("waitlisted").unwrap(), RegistrationStatus::Waitlisted);
    assert_eq!(
        parse_status("accepted").unwrap_err().field(),
        "status"
    );
}

#[test]
fn test_required_fields() {
    assert!(require_non_blank("title", "Cup").is_ok());
    assert_eq!(
        require_non_blank("title", "   ").unwrap_err().to_string(),
        "title cannot be blank"
    );
    assert!(require_positive("resource_id", 1).is_ok());
    assert_eq!(
        require_positive("resource_id", 0).unwrap_err(),
        RequestValidationError::NotPositive {
            field: "resource_id",
            value: 0,
        }
    );
}

#[test]
fn test_validation_error_becomes_invalid_input() {
    let api_error: ApiError = RequestValidationError::UnknownKind(String::from("x")).into();
    assert!(matches!(
        api_error,
        ApiError::InvalidInput { ref field, .. } if field == "kind"
    ));
}

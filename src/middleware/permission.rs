//! Role checks shared by the route handlers.

use http::StatusCode;

use crate::entities::sea_orm_active_enums::RoleEnum;
use crate::extractor::TokenClaims;

pub fn require_admin(claims: &TokenClaims) -> Result<(), (StatusCode, String)> {
    if claims.role != RoleEnum::Admin {
        return Err((
            StatusCode::FORBIDDEN,
            "Admin access required".to_string(),
        ));
    }
    Ok(())
}

/// Faculty or admin.
pub fn require_staff(claims: &TokenClaims) -> Result<(), (StatusCode, String)> {
    if claims.role == RoleEnum::Student {
        return Err((
            StatusCode::FORBIDDEN,
            "Faculty or admin access required".to_string(),
        ));
    }
    Ok(())
}

pub fn require_student(claims: &TokenClaims) -> Result<(), (StatusCode, String)> {
    if claims.role != RoleEnum::Student {
        return Err((
            StatusCode::FORBIDDEN,
            "Only students can manage enrollments".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(role: RoleEnum) -> TokenClaims {
        TokenClaims::new(Uuid::new_v4(), role)
    }

    #[test]
    fn admin_passes_every_check() {
        let admin = claims(RoleEnum::Admin);
        assert!(require_admin(&admin).is_ok());
        assert!(require_staff(&admin).is_ok());
        assert!(require_student(&admin).is_err());
    }

    #[test]
    fn faculty_is_staff_but_not_admin() {
        let faculty = claims(RoleEnum::Faculty);
        assert!(require_admin(&faculty).is_err());
        assert!(require_staff(&faculty).is_ok());
    }

    #[test]
    fn students_fail_staff_checks_with_forbidden() {
        let student = claims(RoleEnum::Student);
        assert!(require_student(&student).is_ok());
        let err = require_staff(&student).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);
        let err = require_admin(&student).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);
    }
}

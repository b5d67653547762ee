use thiserror::Error;

/// 결정적 난수 생성기에서 발생하는 에러
///
/// 두 종류 모두 호출자의 입력이 잘못된 경우에만 발생하며,
/// API 계층에서는 400 계열 응답으로 변환된다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FortuneRngError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("cannot {operation} from an empty collection")]
    EmptyInput { operation: &'static str },
}

/// Result type alias for fortune randomness operations
pub type FortuneRngResult<T> = Result<T, FortuneRngError>;

impl FortuneRngError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn empty_input(operation: &'static str) -> Self {
        Self::EmptyInput { operation }
    }

    /// 문제가 된 입력 필드 이름 (Validation 에러인 경우)
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::EmptyInput { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let err = FortuneRngError::validation("date_key", "expected YYYY-MM-DD, got \"2025/01/09\"");
        assert_eq!(err.field(), Some("date_key"));
        assert_eq!(
            err.to_string(),
            "invalid date_key: expected YYYY-MM-DD, got \"2025/01/09\""
        );
    }

    #[test]
    fn empty_input_has_no_field() {
        let err = FortuneRngError::empty_input("pick an element");
        assert_eq!(err.field(), None);
        assert_eq!(err.to_string(), "cannot pick an element from an empty collection");
    }
}

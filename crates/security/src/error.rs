//! 보안 리포트 에러 타입
//!
//! 점수 계산은 실패하지 않습니다. [`SecurityError`]는 스캔 리포트, 검증 결과,
//! 사용 통계 픽스처를 읽는 경계에서만 발생하며, 데이터셋 에러로 상위 타입에
//! 전파됩니다.

use composegenie_core::error::{ComposeGenieError, DatasetError};

#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    /// JSON 파싱 실패
    #[error("fixture parse error: {0}")]
    Parse(String),

    /// 레코드가 필수 조건을 만족하지 않음 (`id`는 scanId, 검증 결과 id, 통계 날짜 등)
    #[error("invalid fixture record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },
}

impl From<SecurityError> for ComposeGenieError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::Parse(msg) => ComposeGenieError::Dataset(DatasetError::ParseFailed(msg)),
            SecurityError::InvalidRecord { id, reason } => ComposeGenieError::Dataset(
                DatasetError::InvalidRecord(format!("'{id}': {reason}")),
            ),
        }
    }
}

//! 에러 타입: 도메인별 에러 정의
//!
//! 코어 연산(검색, 선택 저장소 로드, compose 합성, 점수 계산)은 실패하지 않습니다.
//! 여기의 에러는 경계(설정 파일, 데이터셋 파일, 영속 저장소 백엔드)에서만 발생합니다.

/// ComposeGenie 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ComposeGenieError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 카탈로그 데이터셋 에러
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// 영속 저장소 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 카탈로그 데이터셋 에러
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// 데이터셋 파싱 실패
    #[error("parse failed: {0}")]
    ParseFailed(String),

    /// 데이터셋 레코드가 필수 조건을 만족하지 않음
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// 영속 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 읽기 실패
    #[error("read failed: {0}")]
    Read(String),

    /// 쓰기 실패
    #[error("write failed: {0}")]
    Write(String),
}

//! 카탈로그 에러 타입
//!
//! [`CatalogError`]는 카탈로그 데이터셋을 로드하는 경계에서 발생하는 에러입니다.
//! 검색 자체는 실패하지 않으므로 로딩 경로에서만 사용됩니다.
//! `From<CatalogError> for ComposeGenieError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.

use composegenie_core::error::{ComposeGenieError, DatasetError};

/// 카탈로그 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// JSON 파싱 실패
    #[error("dataset parse error: {0}")]
    Parse(String),

    /// 레코드가 불변 조건을 위반함
    #[error("invalid catalog record '{id}': {reason}")]
    InvalidRecord {
        /// 레코드 ID
        id: String,
        /// 위반 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: u64,
        /// 최대 허용 크기 (바이트)
        max: u64,
    },
}

impl From<CatalogError> for ComposeGenieError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Parse(msg) => ComposeGenieError::Dataset(DatasetError::ParseFailed(msg)),
            CatalogError::InvalidRecord { id, reason } => ComposeGenieError::Dataset(
                DatasetError::InvalidRecord(format!("'{id}': {reason}")),
            ),
            CatalogError::Io { source, .. } => ComposeGenieError::Io(source),
            CatalogError::FileTooBig { path, size, max } => {
                ComposeGenieError::Dataset(DatasetError::ParseFailed(format!(
                    "file too large: {path}: {size} bytes (max: {max})"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_record_display() {
        let err = CatalogError::InvalidRecord {
            id: "42".to_owned(),
            reason: "tags must not be empty".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("tags must not be empty"));
    }

    #[test]
    fn file_too_big_display() {
        let err = CatalogError::FileTooBig {
            path: "images.json".to_owned(),
            size: 20_000_000,
            max: 10_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("20000000"));
        assert!(msg.contains("10000000"));
    }

    #[test]
    fn converts_parse_to_dataset_error() {
        let err: ComposeGenieError = CatalogError::Parse("bad json".to_owned()).into();
        assert!(matches!(
            err,
            ComposeGenieError::Dataset(DatasetError::ParseFailed(_))
        ));
    }

    #[test]
    fn converts_invalid_record_to_dataset_error() {
        let err: ComposeGenieError = CatalogError::InvalidRecord {
            id: "1".to_owned(),
            reason: "empty".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            ComposeGenieError::Dataset(DatasetError::InvalidRecord(_))
        ));
    }

    #[test]
    fn converts_io_to_io_error() {
        let err: ComposeGenieError = CatalogError::Io {
            path: "/tmp/none".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        }
        .into();
        assert!(matches!(err, ComposeGenieError::Io(_)));
    }
}

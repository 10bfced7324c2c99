//! 디바운스 프리미티브: 입력이 멈춘 뒤에만 최신 값을 전달
//!
//! [`Debouncer`]에 값을 밀어 넣으면 지연 시간 `delay` 동안 새 입력이 없을 때
//! 마지막 값 하나만 [`DebouncedReceiver`]로 전달됩니다.
//! 지연 시간 안에 새 입력이 오면 대기 중인 타이머를 취소하고 다시 시작합니다.
//!
//! # 불변 조건
//!
//! - 인스턴스당 대기 중인 타이머는 최대 하나입니다.
//! - 중간 값은 큐에 쌓이지 않습니다.
//! - [`Debouncer::cancel`] 또는 drop 이후에는 어떤 값도 전달되지 않습니다.
//!
//! # 사용 예시
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use std::time::Duration;
//! use composegenie_core::debounce::Debouncer;
//!
//! let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(10));
//! debouncer.push("n");
//! debouncer.push("ng");
//! debouncer.push("ngi");
//! assert_eq!(rx.recv().await, Some("ngi"));
//! # }
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// 대기 중인 타이머 태스크
struct Pending {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// 취소 가능한 타이머 기반 디바운서
///
/// tokio 런타임 안에서 [`push`](Self::push)를 호출해야 합니다.
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<Pending>,
}

/// 디바운스된 값을 받는 수신자
pub struct DebouncedReceiver<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// 새 디바운서와 수신자 쌍을 생성합니다.
    pub fn new(delay: Duration) -> (Self, DebouncedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                tx,
                pending: None,
            },
            DebouncedReceiver { rx },
        )
    }

    /// 설정된 지연 시간
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 새 입력을 밀어 넣습니다.
    ///
    /// 대기 중인 타이머가 있으면 취소하고, `delay` 뒤에 `value`를 전달하는
    /// 새 타이머를 예약합니다.
    pub fn push(&mut self, value: T) {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    trace!("debounce timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    // 수신자가 이미 drop되었으면 전달할 곳이 없음
                    let _ = tx.send(value);
                }
            }
        });

        self.pending = Some(Pending { token, handle });
    }

    /// 대기 중인 타이머를 취소합니다. 대기 중인 타이머가 없으면 아무것도 하지 않습니다.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
            pending.handle.abort();
        }
    }

    /// 아직 전달되지 않은 타이머가 있는지 여부
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
            pending.handle.abort();
        }
    }
}

impl<T> DebouncedReceiver<T> {
    /// 다음으로 안정된 값을 기다립니다.
    ///
    /// 디바운서가 drop되고 대기 중인 타이머도 없으면 `None`을 반환합니다.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// 이미 안정된 값이 있으면 즉시 반환합니다.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

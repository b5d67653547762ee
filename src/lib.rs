//! 운세 콘텐츠용 결정적 난수.
//!
//! (subject, date, feature) 트리플이 같으면 언제 어디서 계산해도 같은 값이 나온다.
//! 기능 코드는 [`fortune::FortuneRandomness`] 로 생성기를 얻는다.

use std::io;

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::env::Settings;

pub mod clock;
pub mod env;
pub mod exception;
pub mod fortune;
pub mod random;
pub mod seed;

pub use exception::{FortuneRngError, FortuneRngResult};
pub use fortune::FortuneRandomness;
pub use random::DeterministicRandom;
pub use seed::{DateKey, Seed, SeedTriple};

/// 생성 함수. 날짜는 `"YYYY-MM-DD"` 문자열 또는 `NaiveDate` 로 받는다.
pub fn create_deterministic_random(
    subject_id: &str,
    date_key: impl TryInto<DateKey, Error = FortuneRngError>,
    feature_key: &str,
) -> FortuneRngResult<DeterministicRandom> {
    let triple = SeedTriple::new(subject_id, date_key.try_into()?, feature_key)?;
    Ok(DeterministicRandom::from_triple(&triple))
}

pub struct LoggerManager {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl LoggerManager {
    /// 로그 디렉터리를 만들 수 없으면 패닉 대신 에러를 돌려준다.
    pub fn setup(settings: &Settings) -> Result<Self, InitError> {
        // 1. 파일 로거 설정
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(settings.logging.filename.as_str())
            .build(&settings.logging.directory)?;
        let (non_blocking_file_writer, guard) = tracing_appender::non_blocking(file_appender);

        // 2. 로그 레벨 필터 (RUST_LOG 우선, 없으면 설정값)
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

        // 3. 콘솔 레이어. 설정으로 끌 수 있다
        let console_layer = settings.logging.console.then(|| {
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true)
                .with_target(false)
        });

        // 4. 파일 레이어
        let file_layer = fmt::layer()
            .with_writer(non_blocking_file_writer)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(false);

        // 이미 전역 subscriber 가 있으면 (테스트 등) 그대로 둔다
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init();

        Ok(Self { _guard: guard })
    }
}

use std::path::Path;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// 실행 환경 설정.
///
/// 시드 유도, PRNG, 기준 시간대처럼 결정성에 영향을 주는 값은 여기에 두지 않는다.
/// 노드마다 설정이 달라지면 같은 트리플이 다른 결과를 낼 수 있기 때문이다.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: String,
    pub filename: String,
    pub level: String,
    /// 콘솔(stderr) 출력 여부. stdout 은 CLI 결과 전용이다. 파일 로그는 항상 남긴다.
    pub console: bool,
}

impl Settings {
    /// 로드 순서: 기본값 -> config/{RUN_MODE}.toml (없어도 됨) -> extra_file -> APP__* 환경변수
    pub fn new(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Self::defaults()?.add_source(
            File::with_name(&format!("config/{}", run_mode))
                .format(FileFormat::Toml)
                .required(false),
        );
        if let Some(path) = extra_file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder
            // 예: APP__LOGGING__LEVEL=debug
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(s, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("logging.directory", "logs")?
            .set_default("logging.filename", "fortune_seed.log")?
            .set_default("logging.level", "info")?
            .set_default("logging.console", true)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingSettings {
                directory: "logs".to_string(),
                filename: "fortune_seed.log".to_string(),
                level: "info".to_string(),
                console: true,
            },
        }
    }
}

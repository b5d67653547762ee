/// 로거 초기화 테스트
///
/// 로그 디렉터리를 만들 수 없을 때 패닉하지 않고 에러로 돌아오는지 확인한다.
use fortune_seed::{env::Settings, LoggerManager};

fn settings_in(directory: &str) -> Settings {
    let mut settings = Settings::default();
    settings.logging.directory = directory.to_string();
    settings.logging.console = false;
    settings
}

#[test]
fn uncreatable_log_directory_is_an_error() {
    // procfs 아래에는 root 라도 디렉터리를 만들 수 없다
    let result = LoggerManager::setup(&settings_in("/proc/fortune_seed_logs"));
    assert!(result.is_err());
}

#[test]
fn writable_log_directory_sets_up() {
    let dir = std::env::temp_dir().join(format!("fortune_seed_logs_{}", std::process::id()));
    let result = LoggerManager::setup(&settings_in(&dir.to_string_lossy()));
    assert!(result.is_ok());
    drop(result);
    let _ = std::fs::remove_dir_all(&dir);
}

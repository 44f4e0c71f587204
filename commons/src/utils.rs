//! Универсальные утилиты.

use std::path::PathBuf;
use std::time::SystemTime;

/// Количество секунд в минуте.
pub const SECS_PER_MINUTE: u64 = 60;

/// Возвращает количество секунд от начала эпохи UNIX, на основе системного
/// времени.
///
/// Возможна паника, если системные часы выставлены на время ранее
/// 1 января 1970 года 0:00:00 UTC.
pub fn get_timestamp() -> u64 {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs(),
        Err(_) => panic!("Системное время раньше 01.01.1970 0:00:00 UTC"),
    }
}

/// Начало окна `[now − window_minutes, now]` в секундах UNIX.
///
/// Не уходит ниже нуля.
pub fn window_start(now: u64, window_minutes: u64) -> u64 {
    now.saturating_sub(window_minutes.saturating_mul(SECS_PER_MINUTE))
}

/// Предоставить родительский каталог крейта.
///
/// Для `debug` это будет директория расположения `Cargo.toml`, а для
/// `release` расположение скомпилированного файла.
#[cfg(debug_assertions)]
pub fn get_project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

#[cfg(not(debug_assertions))]
pub fn get_project_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Предоставить корневую директорию всего проекта (`workspace` для `debug`,
/// каталог исполняемого файла для `release`).
pub fn get_workspace_root() -> PathBuf {
    let project_root = get_project_root();
    if cfg!(debug_assertions) {
        project_root
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or(project_root)
    } else {
        project_root
    }
}

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::RwLock;

/// 北京时间相对 UTC 的偏移（秒）
const BEIJING_OFFSET_SECS: i32 = 8 * 3600;

/// # Summary
/// 时间供给器接口，用于隔离物理系统时钟。
/// 快照的抓取时间戳必须通过此接口获取，便于测试注入固定时间。
pub trait TimeProvider: Send + Sync {
    /// 获取当前时间
    fn now(&self) -> DateTime<Utc>;
}

/// # Summary
/// 正常运行使用的真实时钟，直接返回操作系统当前时间。
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 测试专用虚拟时钟，允许主动设定当前时间。
///
/// # Invariants
/// - 并发安全：内部利用 `RwLock` 提供多线程安全的读写。
pub struct FakeClockProvider {
    current_time: RwLock<DateTime<Utc>>,
}

impl FakeClockProvider {
    /// 使用指定的初始时间创建虚拟时钟
    pub fn new(initial_time: DateTime<Utc>) -> Self {
        Self {
            current_time: RwLock::new(initial_time),
        }
    }

    /// 强制修改时钟的当前时间
    pub fn set_time(&self, new_time: DateTime<Utc>) {
        if let Ok(mut time) = self.current_time.write() {
            *time = new_time;
        }
    }
}

impl TimeProvider for FakeClockProvider {
    fn now(&self) -> DateTime<Utc> {
        match self.current_time.read() {
            Ok(time) => *time,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// # Summary
/// 将 UTC 时间格式化为北京时间字符串 (`%Y-%m-%d %H:%M:%S`)。
pub fn format_beijing(time: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(BEIJING_OFFSET_SECS) {
        Some(offset) => time.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => time.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_beijing_format_crosses_midnight() {
        let utc = Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 5).unwrap();
        assert_eq!(format_beijing(utc), "2026-03-02 02:30:05");
    }

    #[test]
    fn test_fake_clock_set_time() {
        let start = Utc.timestamp_opt(0, 0).unwrap();
        let clock = FakeClockProvider::new(start);
        assert_eq!(clock.now(), start);

        let later = Utc.timestamp_opt(3600, 0).unwrap();
        clock.set_time(later);
        assert_eq!(clock.now(), later);
    }
}

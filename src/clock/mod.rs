//! 서비스 기준 시간대(KST)의 "오늘 날짜" 계산.
//!
//! 날짜는 UTC 자정이 아니라 한국 시간 자정에 바뀐다. 오프셋은 설정이 아니라
//! 컴파일된 상수여야 모든 노드가 같은 날짜 키를 만든다.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::seed::DateKey;

/// UTC+09:00. 한국은 서머타임이 없다.
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

const MIN_DATE: NaiveDate = match NaiveDate::from_ymd_opt(0, 1, 1) {
    Some(d) => d,
    None => panic!("valid date"),
};
const MAX_DATE: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31) {
    Some(d) => d,
    None => panic!("valid date"),
};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 항상 같은 시각을 돌려주는 시계 (테스트, 과거 날짜 재생성용)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("KST offset is in range")
}

/// 주어진 순간의 KST 기준 날짜 키
pub fn date_key_at(instant: DateTime<Utc>) -> DateKey {
    let local = instant.with_timezone(&kst()).date_naive();
    // chrono 의 표현 범위는 네 자리 연도보다 넓다
    let clamped = local.clamp(MIN_DATE, MAX_DATE);
    if clamped != local {
        tracing::warn!("instant {} is outside the YYYY-MM-DD range, clamping", instant);
    }
    DateKey::try_from(clamped).expect("clamped date fits in YYYY-MM-DD")
}

pub fn today_date_key() -> DateKey {
    date_key_at(SystemClock.now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kst_midnight_is_the_day_boundary() {
        // 2025-01-09 14:59:59 UTC == 2025-01-09 23:59:59 KST
        let before = Utc.with_ymd_and_hms(2025, 1, 9, 14, 59, 59).unwrap();
        // 2025-01-09 15:00:00 UTC == 2025-01-10 00:00:00 KST
        let after = Utc.with_ymd_and_hms(2025, 1, 9, 15, 0, 0).unwrap();

        assert_eq!(date_key_at(before).as_str(), "2025-01-09");
        assert_eq!(date_key_at(after).as_str(), "2025-01-10");
    }

    #[test]
    fn early_utc_morning_is_already_kst_day() {
        let t = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(date_key_at(t).as_str(), "2025-01-01");
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let clock = FixedClock(t);
        assert_eq!(clock.now(), t);
        assert_eq!((&clock).now(), t);
    }

    #[test]
    fn today_has_date_key_shape() {
        let today = today_date_key();
        assert_eq!(today.as_str().len(), 10);
        assert!(DateKey::parse(today.as_str()).is_ok());
    }
}

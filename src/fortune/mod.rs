//! 운세 기능 코드가 난수를 얻는 유일한 진입점.
//!
//! 운세 콘텐츠에 영향을 주는 경로에서는 항상 여기서 만든 `DeterministicRandom` 만
//! 사용한다. 같은 사용자, 같은 날, 같은 기능이면 캐시가 비어 다시 계산하더라도
//! 처음과 똑같은 결과가 나와야 하기 때문이다.

use tracing::debug;

use crate::clock::{date_key_at, Clock, SystemClock};
use crate::exception::FortuneRngResult;
use crate::random::DeterministicRandom;
use crate::seed::{DateKey, SeedTriple};

/// 로그인하지 않은 요청의 subject
pub const GUEST_SUBJECT: &str = "guest";
/// 배치, 크론 등 사용자와 무관한 계산의 subject
pub const SYSTEM_SUBJECT: &str = "system";

/// AI 분석 실패 시 보여주는 점수 범위
pub const FALLBACK_SCORE_MIN: i64 = 70;
pub const FALLBACK_SCORE_MAX: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct FortuneRandomness<C: Clock = SystemClock> {
    clock: C,
}

impl FortuneRandomness<SystemClock> {
    pub fn system() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> FortuneRandomness<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// KST 기준 오늘
    pub fn today(&self) -> DateKey {
        date_key_at(self.clock.now())
    }

    /// 오늘 날짜로 생성기를 만든다. subject 가 없거나 비어 있으면 guest 로 본다.
    pub fn for_subject(&self, subject: Option<&str>, feature: &str) -> FortuneRngResult<DeterministicRandom> {
        self.for_date(resolve_subject(subject), self.today(), feature)
    }

    pub fn for_system(&self, feature: &str) -> FortuneRngResult<DeterministicRandom> {
        self.for_date(SYSTEM_SUBJECT, self.today(), feature)
    }

    /// 날짜를 직접 지정 (과거 운세 재생성, 배치 백필)
    pub fn for_date(&self, subject: &str, date_key: DateKey, feature: &str) -> FortuneRngResult<DeterministicRandom> {
        let triple = SeedTriple::new(subject, date_key, feature)?;
        Ok(DeterministicRandom::from_triple(&triple))
    }

    /// AI 분석이 실패했을 때 대신 보여줄 종합 점수.
    /// 원래 기능과 스트림이 겹치지 않도록 `{fortune_type}-fallback` 을 feature 로 쓴다.
    pub fn fallback_score(&self, subject: Option<&str>, fortune_type: &str) -> FortuneRngResult<i64> {
        let feature = format!("{}-fallback", fortune_type.trim());
        let mut rng = self.for_subject(subject, &feature)?;
        let score = rng.random_int(FALLBACK_SCORE_MIN, FALLBACK_SCORE_MAX)?;
        debug!("fallback score {} for {}", score, feature);
        Ok(score)
    }
}

fn resolve_subject(subject: Option<&str>) -> &str {
    match subject.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => GUEST_SUBJECT,
    }
}

// 예전 호출부를 위한 함수형 헬퍼들

/// 호출할 때마다 다음 값을 돌려주는 [0, 1) 난수 함수
pub fn seeded_random(subject: &str, date_key: &str, feature: &str) -> FortuneRngResult<impl FnMut() -> f64> {
    let mut rng = DeterministicRandom::new(subject, date_key, feature)?;
    Ok(move || rng.random())
}

/// 트리플의 첫 번째 0..=100 점수
pub fn random_score(subject: &str, date_key: &str, feature: &str) -> FortuneRngResult<i64> {
    Ok(DeterministicRandom::new(subject, date_key, feature)?.random_score())
}

pub fn shuffle_array<T: Clone>(items: &[T], subject: &str, date_key: &str, feature: &str) -> FortuneRngResult<Vec<T>> {
    DeterministicRandom::new(subject, date_key, feature)?.shuffle(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn at_kst_noon() -> FortuneRandomness<FixedClock> {
        // 2025-01-09 03:00 UTC == 2025-01-09 12:00 KST
        FortuneRandomness::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 9, 3, 0, 0).unwrap()))
    }

    #[test]
    fn today_follows_the_clock() {
        assert_eq!(at_kst_noon().today().as_str(), "2025-01-09");
    }

    #[test]
    fn missing_or_blank_subject_is_guest() {
        let svc = at_kst_noon();
        let explicit = svc.for_subject(Some(GUEST_SUBJECT), "daily").unwrap().random();
        assert_eq!(svc.for_subject(None, "daily").unwrap().random(), explicit);
        assert_eq!(svc.for_subject(Some("  "), "daily").unwrap().random(), explicit);
    }

    #[test]
    fn subject_matches_explicit_construction() {
        let svc = at_kst_noon();
        let a = svc.for_subject(Some("user_42"), "daily").unwrap().random_int(60, 95).unwrap();
        let b = DeterministicRandom::new("user_42", "2025-01-09", "daily")
            .unwrap()
            .random_int(60, 95)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn system_uses_system_subject() {
        let svc = at_kst_noon();
        let a = svc.for_system("fortune-scores").unwrap().random();
        let b = DeterministicRandom::new(SYSTEM_SUBJECT, "2025-01-09", "fortune-scores")
            .unwrap()
            .random();
        assert_eq!(a, b);
    }

    #[test]
    fn fallback_score_in_range_and_stable() {
        let svc = at_kst_noon();
        let a = svc.fallback_score(Some("user_42"), "saju").unwrap();
        let b = svc.fallback_score(Some("user_42"), "saju").unwrap();
        assert_eq!(a, b);
        assert!((FALLBACK_SCORE_MIN..=FALLBACK_SCORE_MAX).contains(&a));
    }

    #[test]
    fn blank_feature_is_rejected() {
        let err = at_kst_noon().for_subject(Some("user_42"), " ").unwrap_err();
        assert_eq!(err.field(), Some("feature_key"));
    }

    #[test]
    fn seeded_random_advances() {
        let mut next = seeded_random("test-user-123", "2025-01-07", "daily").unwrap();
        let first = next();
        let second = next();
        assert!((0.0..1.0).contains(&first));
        assert_ne!(first, second);
    }

    #[test]
    fn legacy_helpers_are_deterministic() {
        let a = random_score("test-user-123", "2025-01-07", "daily").unwrap();
        let b = random_score("test-user-123", "2025-01-07", "daily").unwrap();
        assert_eq!(a, b);
        assert!((0..=100).contains(&a));

        let items = [1, 2, 3, 4, 5];
        let x = shuffle_array(&items, "test-user-123", "2025-01-07", "daily").unwrap();
        let y = shuffle_array(&items, "test-user-123", "2025-01-07", "daily").unwrap();
        assert_eq!(x, y);
        let mut sorted = x.clone();
        sorted.sort();
        assert_eq!(sorted, items);
    }

    #[test]
    fn legacy_helpers_validate_dates() {
        assert!(random_score("u", "2025-02-30", "daily").is_err());
        assert!(seeded_random("u", "yesterday", "daily").is_err());
    }
}

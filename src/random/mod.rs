//! 시드 트리플로부터 재현 가능한 난수 스트림을 만드는 생성기.
//!
//! 같은 트리플과 같은 호출 순서라면 어느 프로세스, 어느 머신, 어느 시각에서든
//! 완전히 같은 값이 나온다. 드로우 시점에는 벽시계를 읽지 않는다.

use chrono::{Days, NaiveDate};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, warn};

use crate::exception::{FortuneRngError, FortuneRngResult};
use crate::seed::{Seed, SeedTriple};

/// 2^-53. u64 상위 53비트를 [0, 1) 실수로 바꿀 때 사용
const F64_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

pub struct DeterministicRandom {
    rng: ChaCha20Rng,
    draws: u64,
}

impl DeterministicRandom {
    /// 문자열 트리플로 생성. 날짜 형식이 잘못되었거나 빈 값이면 Validation 에러.
    pub fn new(subject_id: &str, date_key: &str, feature_key: &str) -> FortuneRngResult<Self> {
        let triple = SeedTriple::parse(subject_id, date_key, feature_key)?;
        Ok(Self::from_triple(&triple))
    }

    pub fn from_triple(triple: &SeedTriple) -> Self {
        let seed = triple.seed();
        debug!(
            "deterministic random for {} (seed {}..)",
            triple,
            &seed.to_hex()[..12]
        );
        Self::from_seed(seed)
    }

    pub fn from_seed(seed: Seed) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(*seed.as_bytes()),
            draws: 0,
        }
    }

    /// 지금까지 소비한 원시 드로우 수
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// 다른 모든 드로우의 기반. 스트림의 다음 u64 상위 53비트를 2^53 으로 나눈 값.
    pub fn next_raw(&mut self) -> f64 {
        self.draws += 1;
        (self.rng.next_u64() >> 11) as f64 * F64_UNIT
    }

    /// [0, 1) 범위의 실수
    pub fn random(&mut self) -> f64 {
        self.next_raw()
    }

    /// [min, max] 양 끝을 포함하는 정수. min > max 이면 Validation 에러.
    pub fn random_int(&mut self, min: i64, max: i64) -> FortuneRngResult<i64> {
        self.check_range(min, max)?;
        Ok(self.draw_between(min, max))
    }

    /// 0..=100 점수
    pub fn random_score(&mut self) -> i64 {
        self.draw_between(0, 100)
    }

    pub fn random_score_in(&mut self, min: i64, max: i64) -> FortuneRngResult<i64> {
        self.random_int(min, max)
    }

    pub fn random_scores(&mut self, count: usize, min: i64, max: i64) -> FortuneRngResult<Vec<i64>> {
        // count 가 0 이어도 범위는 검사한다
        self.check_range(min, max)?;
        Ok((0..count).map(|_| self.draw_between(min, max)).collect())
    }

    /// probability 확률로 true. probability 는 [0, 1] 이어야 한다.
    pub fn random_boolean(&mut self, probability: f64) -> FortuneRngResult<bool> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(FortuneRngError::validation(
                "probability",
                format!("{} is outside [0, 1]", probability),
            ));
        }
        Ok(self.next_raw() < probability)
    }

    pub fn random_element<'a, T>(&mut self, items: &'a [T]) -> FortuneRngResult<&'a T> {
        if items.is_empty() {
            return Err(FortuneRngError::empty_input("pick an element"));
        }
        let idx = self.draw_index(items.len() - 1);
        Ok(&items[idx])
    }

    /// 서로 다른 위치의 원소 count 개를 뽑는다 (부분 Fisher-Yates).
    pub fn random_elements<T: Clone>(&mut self, items: &[T], count: usize) -> FortuneRngResult<Vec<T>> {
        if items.is_empty() && count > 0 {
            return Err(FortuneRngError::empty_input("pick elements"));
        }
        if count > items.len() {
            return Err(FortuneRngError::validation(
                "count",
                format!("cannot pick {} of {} elements", count, items.len()),
            ));
        }

        let mut pool = items.to_vec();
        let len = pool.len();
        for i in 0..count {
            let j = i + self.draw_index(len - 1 - i);
            pool.swap(i, j);
        }
        pool.truncate(count);
        Ok(pool)
    }

    /// 입력의 복사본을 Fisher-Yates 로 섞어서 돌려준다. 입력은 건드리지 않는다.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> FortuneRngResult<Vec<T>> {
        if items.is_empty() {
            return Err(FortuneRngError::empty_input("shuffle"));
        }

        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = self.draw_index(i);
            out.swap(i, j);
        }
        Ok(out)
    }

    /// [start, end] 양 끝을 포함하는 날짜
    pub fn random_date(&mut self, start: NaiveDate, end: NaiveDate) -> FortuneRngResult<NaiveDate> {
        if start > end {
            return Err(FortuneRngError::validation(
                "date_range",
                format!("start {} is after end {}", start, end),
            ));
        }
        let span = (end - start).num_days();
        let offset = self.draw_between(0, span) as u64;
        Ok(start.checked_add_days(Days::new(offset)).unwrap_or(end))
    }

    fn check_range(&self, min: i64, max: i64) -> FortuneRngResult<()> {
        if min > max {
            warn!("range with min {} > max {}", min, max);
            return Err(FortuneRngError::validation(
                "range",
                format!("min {} is greater than max {}", min, max),
            ));
        }
        Ok(())
    }

    /// min + floor(next_raw * (max - min + 1)). 호출자가 min <= max 를 보장한다.
    fn draw_between(&mut self, min: i64, max: i64) -> i64 {
        let span = (max as i128 - min as i128 + 1) as f64;
        let offset = (self.next_raw() * span).floor() as i128;
        // 범위가 2^53 을 넘으면 반올림으로 span 에 닿을 수 있다
        (min as i128 + offset).min(max as i128) as i64
    }

    fn draw_index(&mut self, upper_inclusive: usize) -> usize {
        self.draw_between(0, upper_inclusive as i64) as usize
    }
}

impl std::fmt::Debug for DeterministicRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeterministicRandom")
            .field("draws", &self.draws)
            .finish_non_exhaustive()
    }
}

/// `rand::Rng` 기반 코드에 그대로 넘길 수 있도록.
///
/// 원시 스트림은 고정되어 있지만 `gen_range`, `choose` 같은 `rand` 쪽 샘플링은
/// `rand` 버전에 따라 바뀔 수 있다. 사용자에게 보여지는 운세 값은 이 타입의 고유
/// 메서드(`random_int`, `shuffle` 등)로만 뽑는다.
impl RngCore for DeterministicRandom {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws += words_for(dest.len());
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws += words_for(dest.len());
        self.rng.try_fill_bytes(dest)
    }
}

/// 바이트 수를 u64 드로우 단위로 환산 (올림)
fn words_for(len: usize) -> u64 {
    (len as u64 + 7) / 8
}

//! 시드 트리플 (subject, date, feature) 검증과 시드 유도.
//!
//! 시드 유도 방식은 한 번 배포되면 바뀌어서는 안 된다. 바뀌는 순간 이미 캐시되었거나
//! 사용자에게 보여진 모든 "오늘의 운세" 결과가 소급해서 달라진다.

use std::fmt;

use blake3::Hasher;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::exception::{FortuneRngError, FortuneRngResult};

/// BLAKE3 derive-key 모드의 컨텍스트 문자열. 변경 금지.
pub const SEED_CONTEXT: &str = "fortune_seed 2025-01-09 seed triple v1";

static DATE_KEY_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date regex"));

/// `YYYY-MM-DD` 형식이면서 실제로 존재하는 날짜
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey {
    date: NaiveDate,
    text: String,
}

impl DateKey {
    pub fn parse(raw: &str) -> FortuneRngResult<Self> {
        if !DATE_KEY_SHAPE.is_match(raw) {
            warn!("rejected date_key with bad shape: {:?}", raw);
            return Err(FortuneRngError::validation(
                "date_key",
                format!("expected YYYY-MM-DD, got {:?}", raw),
            ));
        }

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            warn!("rejected date_key that is not a calendar date: {:?}", raw);
            FortuneRngError::validation("date_key", format!("{:?} is not a calendar date", raw))
        })?;

        Ok(Self {
            date,
            text: raw.to_string(),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl TryFrom<NaiveDate> for DateKey {
    type Error = FortuneRngError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        // 네 자리 연도 밖은 YYYY-MM-DD 로 표현할 수 없다
        if !(0..=9999).contains(&date.year()) {
            return Err(FortuneRngError::validation(
                "date_key",
                format!("year {} does not fit in YYYY-MM-DD", date.year()),
            ));
        }
        Ok(Self {
            date,
            text: date.format("%Y-%m-%d").to_string(),
        })
    }
}

impl TryFrom<&str> for DateKey {
    type Error = FortuneRngError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl std::str::FromStr for DateKey {
    type Err = FortuneRngError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 난수 스트림 하나를 식별하는 (subject, date, feature) 트리플
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeedTriple {
    subject_id: String,
    date_key: DateKey,
    feature_key: String,
}

impl SeedTriple {
    pub fn new(subject_id: &str, date_key: DateKey, feature_key: &str) -> FortuneRngResult<Self> {
        Ok(Self {
            subject_id: non_blank("subject_id", subject_id)?,
            date_key,
            feature_key: non_blank("feature_key", feature_key)?,
        })
    }

    /// 날짜를 문자열로 받는 편의 생성자
    pub fn parse(subject_id: &str, date_key: &str, feature_key: &str) -> FortuneRngResult<Self> {
        Self::new(subject_id, DateKey::parse(date_key)?, feature_key)
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn date_key(&self) -> &DateKey {
        &self.date_key
    }

    pub fn feature_key(&self) -> &str {
        &self.feature_key
    }

    /// 트리플로부터 32바이트 시드를 유도한다.
    ///
    /// 각 파트를 (u64 LE 길이, UTF-8 바이트) 순서로 해시에 넣는다. 길이 접두사가
    /// 구분자 역할을 하므로 파트 안에 어떤 문자가 들어 있어도 서로 다른 트리플이
    /// 같은 입력 바이트열이 되지 않는다.
    pub fn seed(&self) -> Seed {
        let mut h = Hasher::new_derive_key(SEED_CONTEXT);
        for part in [
            self.subject_id.as_str(),
            self.date_key.as_str(),
            self.feature_key.as_str(),
        ] {
            h.update(&(part.len() as u64).to_le_bytes());
            h.update(part.as_bytes());
        }
        Seed(*h.finalize().as_bytes())
    }
}

impl fmt::Display for SeedTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.subject_id, self.date_key, self.feature_key)
    }
}

fn non_blank(field: &'static str, value: &str) -> FortuneRngResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        warn!("rejected blank {}", field);
        return Err(FortuneRngError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// 생성기 초기 상태로 쓰이는 32바이트 시드
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed([u8; 32]);

impl Seed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({})", self.to_hex())
    }
}

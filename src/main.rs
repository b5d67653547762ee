use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fortune_seed::{
    clock::today_date_key, env::Settings, DateKey, DeterministicRandom, LoggerManager, SeedTriple,
};
use serde::Serialize;
use tracing::info;

/// 사용자가 특정 날짜에 본 운세 난수를 그대로 재현한다.
#[derive(Parser)]
#[command(
    name = "fortune_seed",
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,
)]
struct Args {
    /// 사용자 ID (비로그인은 guest, 배치는 system)
    #[arg(long, default_value = "guest")]
    subject: String,

    /// 운세 기능 이름 (daily, celebrity-match, ...)
    #[arg(long)]
    feature: String,

    /// YYYY-MM-DD. 생략하면 KST 기준 오늘
    #[arg(long)]
    date: Option<String>,

    /// random_int(min, max) 드로우 횟수
    #[arg(long, default_value_t = 1)]
    count: usize,

    #[arg(long, default_value_t = 0)]
    min: i64,

    #[arg(long, default_value_t = 100)]
    max: i64,

    /// 시드만 출력
    #[arg(long)]
    seed_only: bool,

    /// 추가 설정 파일 (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct DrawReport {
    subject: String,
    date: String,
    feature: String,
    seed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    draws: Option<Vec<i64>>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::new(args.config.as_deref()).context("failed to load settings")?;
    let _logger = LoggerManager::setup(&settings).with_context(|| {
        format!("failed to open log directory {}", settings.logging.directory)
    })?;

    let date_key = match args.date.as_deref() {
        Some(raw) => DateKey::parse(raw)?,
        None => today_date_key(),
    };
    let triple = SeedTriple::new(&args.subject, date_key, &args.feature)?;
    let seed = triple.seed();
    info!("reproducing {} (seed {})", triple, seed.to_hex());

    let draws = if args.seed_only {
        None
    } else {
        let mut rng = DeterministicRandom::from_seed(seed);
        Some(rng.random_scores(args.count, args.min, args.max)?)
    };

    let report = DrawReport {
        subject: triple.subject_id().to_string(),
        date: triple.date_key().to_string(),
        feature: triple.feature_key().to_string(),
        seed: seed.to_hex(),
        draws,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

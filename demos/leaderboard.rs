//! Season Leaderboards
//!
//! Builds a synthetic season of player stats with tier ratings, then runs
//! the pipeline the CLI uses: normalize, rank, summarize, regress.
//!
//! Run with: cargo run --example leaderboard --release

use statboard::config::RegressionConfig;
use statboard::metric::Metric;
use statboard::normalize::normalize;
use statboard::rank::rank;
use statboard::record::{Cell, PlayerRecord};
use statboard::regression::{fit, RegressionRequest};
use statboard::stats::{bar_series, summarize};
use std::time::Instant;

const TIERS: [&str; 7] = [
    "Radiant #12",
    "Immortal 3",
    "Immortal 1",
    "Diamond 2",
    "Platinum 3",
    "Gold 1",
    "Unranked",
];

fn main() -> statboard::Result<()> {
    println!();
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  🎯 SEASON LEADERBOARDS - statboard pipeline  ║");
    println!("╚═══════════════════════════════════════════════╝");
    println!();

    let raw = generate_players(10_000);
    let start = Instant::now();
    let rows = normalize(&raw);
    println!(
        "⏳ Normalized {} rows ({} kept) in {:.2?}",
        raw.len(),
        rows.len(),
        start.elapsed()
    );
    println!();

    for metric in [Metric::Rating, Metric::KdRatio, Metric::HeadshotPercent] {
        let start = Instant::now();
        let top = rank(&rows, metric, 10)?;
        let elapsed = start.elapsed();

        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("🏆 Top {} by {} ({} eligible, {elapsed:.2?})", top.len(), metric.label(), top.eligible());
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for (name, value) in bar_series(&top) {
            println!("  {name:<14} {value:>8.2}");
        }
        println!();
    }

    if let Some(dist) = summarize(&rows, Metric::HeadshotPercent) {
        println!("📦 Headshot % box plot");
        println!(
            "  min {:.1} │ q1 {:.1} │ median {:.1} │ q3 {:.1} │ max {:.1}",
            dist.min, dist.q1, dist.median, dist.q3, dist.max
        );
        println!();
    }

    let request = RegressionRequest::new(
        Metric::Rating,
        vec![Metric::KdRatio, Metric::HeadshotPercent],
    )?;
    match fit(&rows, &request, &RegressionConfig::default())? {
        Some(report) => {
            println!("📈 rating ~ kd_ratio + headshot_percent");
            println!(
                "  intercept {:.3}, kd {:.3}, hs {:.3}, R² {:.3} ({} train / {} test)",
                report.intercept,
                report.coefficient(Metric::KdRatio).unwrap_or_default(),
                report.coefficient(Metric::HeadshotPercent).unwrap_or_default(),
                report.r_squared,
                report.train_rows,
                report.test_rows
            );
            for player in rows.iter().take(3) {
                if let (Some(actual), Some(predicted)) =
                    (player.rating, report.predict(player))
                {
                    println!(
                        "  {:<14} rating {actual:.0}, predicted {predicted:.2}",
                        player.name
                    );
                }
            }
        }
        None => println!("📈 Not enough rows for regression"),
    }
    println!();
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn generate_players(count: usize) -> Vec<PlayerRecord> {
    (0..count)
        .map(|i| {
            let tier = TIERS[(i * 7919) % TIERS.len()];
            let kd = 0.4 + ((i * 31) % 200) as f64 / 100.0;
            let headshot: Cell = if i % 97 == 0 {
                "n/a".into()
            } else {
                (8.0 + ((i * 449) % 350) as f64 / 10.0).into()
            };
            PlayerRecord::named(format!("Player_{i:05}"))
                .with(Metric::Rating, tier)
                .with(Metric::KdRatio, kd)
                .with(Metric::HeadshotPercent, headshot)
        })
        .collect()
}

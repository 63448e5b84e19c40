use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sportsplex_matches::api::SportsPlexClient;
use sportsplex_matches::config::Config;
use sportsplex_matches::models::LifecyclePhase;
use sportsplex_matches::status::{parse_timestamp, MatchBoard};

const PHASES: [LifecyclePhase; 4] = [
    LifecyclePhase::Live,
    LifecyclePhase::Upcoming,
    LifecyclePhase::Completed,
    LifecyclePhase::Cancelled,
];

#[derive(Debug, Default)]
struct Args {
    at: Option<DateTime<Utc>>,
    sport: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapshot=info,sportsplex_matches=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args(env::args().skip(1))?;
    let config = Config::from_env()?;

    let client = SportsPlexClient::new(
        &config.api_url,
        config.api_token.clone(),
        Duration::from_secs(config.request_timeout),
    )
    .context("Failed to build SportsPlex client")?;

    let records = match &args.sport {
        Some(sport) => client.fetch_matches_for_sport(sport).await?,
        None => client.fetch_matches().await?,
    };

    let now = args.at.unwrap_or_else(Utc::now);
    info!("Classifying {} matches at {}", records.len(), now.to_rfc3339());

    let board = MatchBoard::classify(now, records);
    print!("{}", render(&board));

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--at" => {
                let raw = args.next().context("--at needs a timestamp")?;
                let at = parse_timestamp(&raw)
                    .with_context(|| format!("--at: cannot parse timestamp {raw:?}"))?;
                parsed.at = Some(at);
            }
            "--sport" => {
                parsed.sport = Some(args.next().context("--sport needs a name")?);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(parsed)
}

fn render(board: &MatchBoard) -> String {
    let mut out = String::new();

    for phase in &PHASES {
        let matches: Vec<_> = board.filter(phase).collect();
        out.push_str(&format!("{} ({})\n", phase.as_str().to_uppercase(), matches.len()));
        for m in matches {
            out.push_str(&format!(
                "  {}  {}\n",
                m.record.match_date.as_deref().unwrap_or("-"),
                m.record.label()
            ));
        }
    }

    let others: Vec<_> = board
        .matches
        .iter()
        .filter(|m| matches!(m.phase, LifecyclePhase::Other(_)))
        .collect();
    if !others.is_empty() {
        out.push_str(&format!("OTHER ({})\n", others.len()));
        for m in others {
            out.push_str(&format!("  [{}]  {}\n", m.phase, m.record.label()));
        }
    }

    if !board.invalid.is_empty() {
        out.push_str(&format!("INVALID ({})\n", board.invalid.len()));
        for m in &board.invalid {
            out.push_str(&format!("  {}\n", m.reason));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sportsplex_matches::models::MatchRecord;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--at", "2026-05-01T12:00:00Z", "--sport", "Cricket"]).unwrap();

        assert_eq!(
            parsed.at,
            Some(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(parsed.sport.as_deref(), Some("Cricket"));
        assert!(args(&["--at"]).is_err());
        assert!(args(&["--at", "tomorrow"]).is_err());
        assert!(args(&["--verbose"]).is_err());
    }

    #[test]
    fn test_render_groups() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let board = MatchBoard::classify(
            now,
            vec![
                MatchRecord {
                    id: Some("a".to_string()),
                    match_date: Some("2026-05-01T11:30:00Z".to_string()),
                    sport: "Football".to_string(),
                    ..Default::default()
                },
                MatchRecord {
                    id: Some("b".to_string()),
                    match_date: Some("2026-05-01T11:30:00Z".to_string()),
                    sport: "Football".to_string(),
                    status: Some("postponed".to_string()),
                    ..Default::default()
                },
                MatchRecord {
                    id: Some("c".to_string()),
                    ..Default::default()
                },
            ],
        );

        let text = render(&board);

        assert!(text.contains("LIVE (1)\n  2026-05-01T11:30:00Z  a (Football)\n"));
        assert!(text.contains("UPCOMING (0)"));
        assert!(text.contains("OTHER (1)\n  [postponed]  b (Football)\n"));
        assert!(text.contains("INVALID (1)"));
    }
}

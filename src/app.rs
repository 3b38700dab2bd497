use std::future::Future;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};

use crate::core::{
    alerts::store::AlertView,
    config::{ConfigManager, Settings},
    dashboard::Dashboard,
    model::Alert,
    quiz::{self, Answer, Quiz},
    stats::Stats,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(250);

/// Renders the alert list into the log. The newest alert is the interesting one.
struct LogView;

impl AlertView for LogView {
    fn render_alerts(&self, alerts: &[Alert]) {
        match alerts.first() {
            Some(newest) => log::debug!(
                "alert list: {} shown, newest {} [{}] {}: {} - {}",
                alerts.len(),
                newest.created_at().format("%H:%M:%S"),
                newest.category(),
                newest.source().display_name(),
                newest.title(),
                newest.description()
            ),
            None => log::debug!("alert list: empty"),
        }
    }

    fn update_badge(&self, unread: usize) {
        log::debug!("unread alerts: {unread}");
    }
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_manager = ConfigManager::from_env();
    let settings = config_manager.load();
    log::info!("settings loaded from {}", config_manager.path().display());

    if std::env::args().nth(1).as_deref() == Some("quiz") {
        if let Err(e) = run_quiz() {
            log::error!("quiz aborted: {e}");
            std::process::exit(1);
        }
        return;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("failed to start runtime: {e}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async {
        drive(settings, interrupted()).await;
    });
}

/// Resolves on the first Ctrl-C. A failed handler install also stops the run.
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("interrupted"),
        Err(e) => log::warn!("ctrl-c handler failed: {e}"),
    }
}

/// Event loop: one frame timer plus the producer cadences, until the
/// configured run time elapses or `stop` resolves. Returns the final counters.
async fn drive<F: Future<Output = ()>>(settings: Settings, stop: F) -> Stats {
    let mut rng = match settings.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let deadline = settings.run_time().map(|run| Instant::now() + run);

    let mut dashboard = Dashboard::new(settings.clone(), Box::new(LogView), &mut rng, Instant::now().into_std());
    if settings.autostart_wargame {
        dashboard.start_wargame(Instant::now().into_std());
    }
    log::info!("dashboard running, {} alerts on board", dashboard.alerts().len());

    let mut frame = interval(FRAME_INTERVAL);
    let mut producer = interval(settings.producer_interval());
    let mut stats = interval(settings.stats_interval());
    let mut audio = interval(settings.audio_interval());
    for timer in [&mut frame, &mut producer, &mut stats, &mut audio] {
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    }

    let shutdown = async {
        match deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(shutdown);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("run time elapsed");
                break;
            }
            () = &mut stop => break,
            now = frame.tick() => {
                let output = dashboard.tick(now.into_std(), &mut rng);
                for line in output.logs {
                    log::info!("{line}");
                }
            }
            now = producer.tick() => {
                dashboard.on_producer_interval(&mut rng, now.into_std());
            }
            _ = stats.tick() => {
                let snapshot = dashboard.on_stats_interval(&mut rng);
                log::debug!("stats: {snapshot:?}");
            }
            _ = audio.tick() => {
                if let Some(event) = dashboard.on_audio_interval(&mut rng) {
                    log::debug!("sound: {} ({:.0}% confidence)", event.kind.label(), event.confidence);
                    if let Some(estimate) = dashboard.audio().triangulate() {
                        log::debug!(
                            "sound source near ({:.0}, {:.0}), {:.0}% confidence",
                            estimate.location.x,
                            estimate.location.y,
                            estimate.confidence
                        );
                    }
                }
            }
        }
    }

    let stats = dashboard.stats();
    match serde_json::to_string(&stats) {
        Ok(json) => log::info!("final stats: {json}"),
        Err(e) => log::warn!("could not serialise stats: {e}"),
    }
    log::info!(
        "{} alerts on board, {} unread",
        dashboard.alerts().len(),
        dashboard.alerts().unread_count()
    );
    dashboard.shutdown();
    stats
}

fn run_quiz() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    let mut game = Quiz::new();

    writeln!(stdout, "Human or AI? Answer with 'human' or 'ai'.")?;
    while let Some(question) = game.current_question().copied() {
        write!(stdout, "\n{}\n> ", question.text)?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match Answer::parse(&line) {
            Some(answer) => {
                if let Some(feedback) = game.check_answer(answer) {
                    writeln!(stdout, "{}", feedback.message())?;
                }
                game.next_question();
            }
            None => {
                if let Some(reply) = quiz::try_answer(&line) {
                    writeln!(stdout, "{reply}")?;
                }
            }
        }
    }
    writeln!(stdout, "\nScore: {}/{}", game.score(), game.total())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Settings {
        Settings {
            rng_seed: Some(11),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_drive_stops_when_stop_resolves() {
        let started = Instant::now();
        drive(seeded(), tokio::time::sleep(Duration::from_millis(600))).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(600));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_drive_honours_run_time() {
        let settings = Settings {
            run_seconds: 1,
            ..seeded()
        };
        let started = Instant::now();
        drive(settings, std::future::pending::<()>()).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(5));
    }
}

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bananagame_client::models::LoginRequest;
use bananagame_client::round::{
    Resolution, RoundController, RoundFault, RoundNotice, RoundPhase, SystemClock,
};
use bananagame_client::services::auth_service::AuthService;
use bananagame_client::services::game_service::GameService;
use bananagame_client::{AppState, Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bananagame_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Banana Game terminal client");

    let config = Config::load().expect("Failed to load configuration");
    let state = Arc::new(AppState::new(config).expect("Failed to initialize client state"));

    let auth = AuthService::new(&state);
    if !auth.is_authenticated() {
        let username = std::env::var("BANANA_USERNAME").expect("BANANA_USERNAME must be set");
        let password = std::env::var("BANANA_PASSWORD").expect("BANANA_PASSWORD must be set");
        auth.login(&LoginRequest { username, password })
            .await
            .expect("Login failed");
    }
    if let Some(user) = auth.current_user() {
        println!("Playing as {}", user.username);
    }

    let game = Arc::new(GameService::new(&state));
    let clock = Arc::new(SystemClock::with_period(Duration::from_millis(
        state.config.tick_interval_ms,
    )));
    let controller = RoundController::new(game.clone(), game, clock);
    let mut notices = controller.subscribe();
    controller.start();

    println!("Type your answer and press Enter. Ctrl-D quits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            notice = notices.recv() => {
                let Some(notice) = notice else { break };
                render(&controller, notice);
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(answer)) => {
                        // After a failed fetch the controller sits in Idle;
                        // Enter retries instead of submitting.
                        if controller.snapshot().phase == RoundPhase::Idle {
                            controller.start();
                        } else {
                            controller.submit(answer);
                        }
                    }
                    _ => break,
                }
            }
        }
    }

    let stats = controller.snapshot().stats;
    println!(
        "Session over: {} correct, {} wrong, score {}",
        stats.correct, stats.wrong, stats.score
    );
}

fn render(controller: &RoundController, notice: RoundNotice) {
    match notice {
        RoundNotice::Transition(RoundPhase::Active) => {
            let snap = controller.snapshot();
            if let Some(puzzle) = snap.puzzle {
                println!(
                    "New puzzle [{}] worth {} points, {}s on the clock: {}",
                    puzzle.difficulty.as_str(),
                    puzzle.points_value,
                    snap.remaining,
                    puzzle.image_url
                );
            }
        }
        RoundNotice::Transition(_) => {}
        RoundNotice::Tick { remaining } => {
            if remaining % 10 == 0 || remaining <= 5 {
                println!("  {}s left", remaining);
            }
        }
        RoundNotice::Resolved(Resolution::Correct {
            points_awarded,
            new_score,
        }) => println!("Correct! +{} points (total {})", points_awarded, new_score),
        RoundNotice::Resolved(Resolution::Incorrect) => println!("Wrong answer!"),
        RoundNotice::Resolved(Resolution::Timeout) => println!("Time's up!"),
        RoundNotice::Fault(RoundFault::PuzzleFetchFailed) => {
            println!("Could not load a puzzle; press Enter to retry");
        }
        RoundNotice::Fault(fault) => println!("{}", fault),
    }
}

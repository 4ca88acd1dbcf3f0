//! Plays a session in the terminal as a field of dots.
//!
//! ```text
//! cargo run -p pointlight-core --example ascii_walker -- walk 3
//! ```
//! Arguments: action name (default `walk`), seconds to play (default 2).

use std::{env, thread, time::Duration};

use pointlight_core::{get_action, AsciiCanvas, Session, SessionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "pointlight_core=info".into()))
        .init();

    let mut args = env::args().skip(1);
    let action = args.next().unwrap_or_else(|| "walk".to_string());
    let seconds: f64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(2.0);

    let mut config = SessionConfig::new(action.as_str()).with_seed(1);
    if !get_action(&action)?.is_looping() {
        config = config.with_duration(seconds);
    }
    let mut session = Session::new(config)?;
    let fps = session.config().fps;
    let mut canvas = AsciiCanvas::new(60, 28);
    let viewport = canvas.viewport(12.0);

    for _ in 0..(seconds * fps as f64).round() as usize {
        session.render_next(&mut canvas, &viewport)?;
        // clear screen and home the cursor
        println!("\x1b[2J\x1b[H{}", canvas.output());
        thread::sleep(Duration::from_secs_f64(1.0 / fps as f64));
    }
    Ok(())
}

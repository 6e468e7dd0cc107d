use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// ログレベル文字列を解釈する。解釈できなければINFO
pub fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

/// tracingのsubscriberを1度だけ初期化する
pub fn init_logging(level: &str) {
    let level = parse_level(level);
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt().with_max_level(level).init();
        });
    }
}

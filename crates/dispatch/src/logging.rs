//! Diagnostic output setup.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs a `fmt` subscriber at `INFO` as the global default.
///
/// Route registrations are logged as they happen, so call this before registering routes.
/// Later calls leave the first subscriber in place.
pub fn init() {
    init_with_level(Level::INFO);
}

pub fn init_with_level(level: Level) {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global subscriber already set");
    }
}

#[cfg(test)]
mod tests {
    use super::{init, init_with_level};
    use tracing::Level;

    #[test]
    fn test_init_twice() {
        init();
        init_with_level(Level::DEBUG);
    }
}

use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    Handle,
};

/// Install a console logger at the given level.
///
/// Intended for host binaries and test harnesses; embedders that already run
/// their own `log` backend should skip this.
///
/// # Panics
/// Panics if a logger is already installed.
pub fn init_logging(level: LevelFilter) -> Handle {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .expect("Failed to build logging config");
    log4rs::init_config(config).expect("Failed to initialise logging")
}

use busgen_logger::{LevelFilter, Logger};

#[test]
fn init_console_keeps_the_name() {
    let logger = Logger::builder()
        .name("integration-console")
        .level(LevelFilter::INFO)
        .ansi(false)
        .init()
        .expect("logger should initialize");

    assert_eq!(logger.name(), "integration-console");
    tracing::info!("hello from integration test");
}

use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;
use tokio::sync::Mutex;

use lucky_wheel::{
    AppError,
    config::Config,
    database::create_storage,
    services::{SpinService, WheelEvent, WheelStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml()?;

    // 恢复转盘状态
    let storage = create_storage(&config.storage)?;
    let store = WheelStore::load(storage, &config.storage);
    let store = Arc::new(Mutex::new(store));

    let spin_service = SpinService::new(store.clone(), &config.spin);
    let mut events = spin_service.subscribe();

    let ticket = match spin_service.initiate_spin().await {
        Ok(ticket) => ticket,
        Err(AppError::NothingToSpin) => {
            log::info!("No option with remaining quantity, add options before spinning");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    log::info!(
        "Spinning to {:.1} degrees, result in {} ms",
        ticket.rotation,
        config.spin.duration_ms
    );

    let result = ticket.finished().await?;
    while let Ok(event) = events.try_recv() {
        if let WheelEvent::SpinFinalized {
            reveal: Some(reveal),
            ..
        } = event
        {
            log::info!("Congratulations! {}", reveal.name);
            if let Some(message) = reveal.remaining_message() {
                log::info!("{message}");
            }
        }
    }
    log::info!("Recorded {} at {}", result.winner, result.time.with_timezone(&Local));

    Ok(())
}

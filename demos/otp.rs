//! OTP Example - A six digit passcode row, fullscreen
//!
//! - Type digits; focus advances on its own
//! - Backspace clears and walks back
//! - Click a cell past the first gap: focus snaps back to the gap
//! - Tab / Shift+Tab move between cells, Ctrl+C quits
//!
//! Logs go to `otp-demo.log` (stdout belongs to the UI), filtered by RUST_LOG:
//!
//! Run with: RUST_LOG=spark_otp=debug cargo run --example otp

use std::fs::File;
use std::sync::Mutex;

use spark_otp::pipeline::mount;
use spark_otp::{otp_input, BorderStyle, ContainerStyle, OtpConfig, OtpInputProps, Rgba};
use tracing_subscriber::EnvFilter;

fn init_logging() -> std::io::Result<()> {
    let file = File::create("otp-demo.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> spark_otp::Result<()> {
    init_logging()?;

    let secure = std::env::args().any(|arg| arg == "--secure");
    let mut config = OtpConfig::new(6)
        .with_secure(secure)
        .with_cursor_color(Rgba::CYAN)
        .with_auto_focus(true)
        .with_container_style(ContainerStyle {
            border: BorderStyle::Rounded,
            padding: 1,
            ..ContainerStyle::default()
        });
    config.input_style.focused_border_color = Rgba::CYAN;

    let props = OtpInputProps::new(config).on_change(|code| tracing::info!(code, "otp changed"));
    let otp = otp_input(props)?;

    let handle = mount::mount(&otp)?;
    while mount::tick(&handle)? {
        if otp.is_complete() {
            break;
        }
    }
    handle.unmount();

    let code = otp.code();
    otp.unmount();
    println!("code: {code}");
    Ok(())
}

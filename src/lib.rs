pub mod config;
pub mod data_uri;
pub mod error;
pub mod host;
pub mod inverter;
pub mod pane;
pub mod status;
pub mod transfer;

pub use config::AppConfig;
pub use data_uri::DataUri;
pub use error::{InvertError, Result};
pub use host::Host;
pub use inverter::{invert, invert_async, invert_with, InvertedImage, InverterSettings};
pub use pane::Pane;
pub use status::{LogReporter, Status, StatusReporter};
pub use transfer::{
    ClipboardSink, FileSink, HostSelectionSink, ImageSink, ImageSource, SinkKind, SourceKind,
    TransferItem,
};

/// Initializes the logger with a `[time LEVEL file line] message` format.
///
/// `default_filter` applies when `RUST_LOG` is unset.
pub fn init_logger(default_filter: &str) {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

//! Task pane flow
//!
//! One user action = one call to [`Pane::process`]: pick the image out of the
//! source, invert it off the async thread, hand it to the sink, and report
//! each step. Failures are reported once and returned; nothing is retried.
//! Overlapping calls are not queued or ordered against each other.

use crate::config::AppConfig;
use crate::error::{InvertError, Result};
use crate::host::Host;
use crate::inverter::{self, InvertedImage, InverterSettings};
use crate::status::{Status, StatusReporter};
use crate::transfer::{ImageSink, ImageSource, SinkKind, SourceKind};

#[derive(Debug, Clone, Default)]
pub struct Pane {
    host: Host,
    settings: InverterSettings,
}

impl Pane {
    pub fn new(host: Host, settings: InverterSettings) -> Self {
        Self { host, settings }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.host, config.inverter.clone())
    }

    pub fn host(&self) -> Host {
        self.host
    }

    pub fn settings(&self) -> &InverterSettings {
        &self.settings
    }

    pub fn default_source_kind(&self) -> SourceKind {
        self.host.default_source()
    }

    pub fn default_sink_kind(&self) -> SinkKind {
        self.host.default_sink()
    }

    /// Whether this pane's host can feed images from `source`
    pub fn accepts(&self, source: SourceKind) -> bool {
        self.host.accepts(source)
    }

    /// Run one inversion from `source` into `sink`
    pub async fn process<S, R>(
        &self,
        source: ImageSource,
        sink: &mut S,
        reporter: &R,
    ) -> Result<InvertedImage>
    where
        S: ImageSink,
        R: StatusReporter + ?Sized,
    {
        let source_kind = source.kind();
        let result = self.run(source, sink, reporter).await;

        match &result {
            Ok(image) => {
                log::info!(
                    "inverted {}x{} image from {} into {}",
                    image.width,
                    image.height,
                    source_kind,
                    sink.kind()
                );
                reporter.report(&Status::Delivered(sink.kind()));
            }
            Err(InvertError::NoImage(reason)) => {
                log::warn!("{}: {}", source_kind, reason);
                reporter.report(&Status::NoImage(source_kind));
            }
            Err(e) => {
                log::warn!("inversion from {} failed: {}", source_kind, e);
                reporter.report(&Status::Failed(e.to_string()));
            }
        }

        result
    }

    async fn run<S, R>(
        &self,
        source: ImageSource,
        sink: &mut S,
        reporter: &R,
    ) -> Result<InvertedImage>
    where
        S: ImageSink,
        R: StatusReporter + ?Sized,
    {
        let source_kind = source.kind();
        if !self.accepts(source_kind) {
            return Err(InvertError::InvalidParameter(format!(
                "{} does not provide a {} source",
                self.host, source_kind
            )));
        }

        // A drop is acknowledged before its contents are inspected
        if source_kind == SourceKind::Drop {
            reporter.report(&Status::Captured(source_kind));
        }
        let loaded = source.load_async().await?;
        if source_kind != SourceKind::Drop {
            reporter.report(&Status::Captured(source_kind));
        }

        reporter.report(&Status::Inverting);
        let image = inverter::invert_async(loaded.input, self.settings.clone()).await?;

        sink.deliver(&image).await?;
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_uri::DataUri;
    use crate::transfer::{ClipboardSink, FileSink, HostSelectionSink, TransferItem};
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;

    fn png_bytes(pixel: [u8; 4]) -> Vec<u8> {
        inverter::encode_png(&RgbaImage::from_pixel(2, 2, Rgba(pixel))).unwrap()
    }

    #[tokio::test]
    async fn test_clipboard_flow_reports_each_step() {
        let seen = Mutex::new(Vec::new());
        let reporter = |s: &Status| seen.lock().unwrap().push(s.clone());
        let pane = Pane::new(Host::PowerPoint, InverterSettings::default());
        let mut sink = ClipboardSink::new();

        let source = ImageSource::Clipboard(vec![
            TransferItem::new("text/plain", b"hi".to_vec()),
            TransferItem::new("image/png", png_bytes([0, 0, 0, 255])),
        ]);
        let image = pane.process(source, &mut sink, &reporter).await.unwrap();

        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Status::Captured(SourceKind::Clipboard),
                Status::Inverting,
                Status::Delivered(SinkKind::Clipboard),
            ]
        );

        let written = image::load_from_memory(&sink.items()[0].bytes).unwrap().to_rgba8();
        assert_eq!(written.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn test_word_selection_flow() {
        let seen = Mutex::new(Vec::new());
        let reporter = |s: &Status| seen.lock().unwrap().push(s.clone());
        let pane = Pane::new(Host::Word, InverterSettings::default());
        assert_eq!(pane.default_source_kind(), SourceKind::HostSelection);
        assert_eq!(pane.default_sink_kind(), SinkKind::HostSelection);

        let selected = DataUri::from_bytes("image/png", &png_bytes([10, 20, 30, 40])).payload;
        let mut sink = HostSelectionSink::new(Vec::new());
        pane.process(ImageSource::HostSelection(selected), &mut sink, &reporter)
            .await
            .unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let bytes = DataUri::parse(&written).decode_payload().unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(1, 1), &Rgba([245, 235, 225, 40]));
        assert_eq!(
            seen.lock().unwrap().last(),
            Some(&Status::Delivered(SinkKind::HostSelection))
        );
    }

    #[tokio::test]
    async fn test_no_image_reported_once() {
        let seen = Mutex::new(Vec::new());
        let reporter = |s: &Status| seen.lock().unwrap().push(s.clone());
        let pane = Pane::default();
        let mut sink = ClipboardSink::new();

        let source = ImageSource::Clipboard(vec![TransferItem::new("text/plain", b"hi".to_vec())]);
        let err = pane.process(source, &mut sink, &reporter).await.unwrap_err();

        assert!(matches!(err, InvertError::NoImage(_)));
        assert_eq!(*seen.lock().unwrap(), vec![Status::NoImage(SourceKind::Clipboard)]);
        assert!(sink.items().is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_leaves_sink_untouched() {
        let seen = Mutex::new(Vec::new());
        let reporter = |s: &Status| seen.lock().unwrap().push(s.clone());
        let pane = Pane::default();
        let mut sink = ClipboardSink::new();

        let source =
            ImageSource::Clipboard(vec![TransferItem::new("image/png", b"garbage".to_vec())]);
        let err = pane.process(source, &mut sink, &reporter).await.unwrap_err();

        assert!(err.is_decode());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[2], Status::Failed(_)));
        assert!(sink.items().is_empty());
    }

    #[tokio::test]
    async fn test_selection_inverted_in_every_office_host() {
        let selected = DataUri::from_bytes("image/png", &png_bytes([0, 0, 0, 255])).payload;

        for host in [Host::PowerPoint, Host::Excel] {
            let pane = Pane::new(host, InverterSettings::default());
            assert!(pane.accepts(SourceKind::HostSelection));
            assert_eq!(pane.default_source_kind(), SourceKind::Clipboard);
            assert_eq!(pane.default_sink_kind(), SinkKind::Clipboard);

            let mut sink = HostSelectionSink::new(Vec::new());
            let image = pane
                .process(ImageSource::HostSelection(selected.clone()), &mut sink, &|_: &Status| {})
                .await
                .unwrap();
            assert_eq!((image.width, image.height), (2, 2));
            assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), image.base64_payload());
        }
    }

    #[tokio::test]
    async fn test_selection_rejected_without_host() {
        let pane = Pane::default();
        assert!(!pane.accepts(SourceKind::HostSelection));

        let mut sink = ClipboardSink::new();
        let err = pane
            .process(ImageSource::HostSelection("AAAA".to_string()), &mut sink, &|_: &Status| {})
            .await
            .unwrap_err();
        assert!(matches!(err, InvertError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_drop_captured_before_image_lookup() {
        let seen = Mutex::new(Vec::new());
        let reporter = |s: &Status| seen.lock().unwrap().push(s.clone());
        let pane = Pane::new(Host::PowerPoint, InverterSettings::default());
        let mut sink = ClipboardSink::new();

        let source = ImageSource::Drop(vec![std::path::PathBuf::from("notes.txt")]);
        let err = pane.process(source, &mut sink, &reporter).await.unwrap_err();

        assert!(matches!(err, InvertError::NoImage(_)));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Status::Captured(SourceKind::Drop), Status::NoImage(SourceKind::Drop)]
        );
    }

    #[tokio::test]
    async fn test_drop_into_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out").join("inverted.png");
        std::fs::write(&input, png_bytes([200, 150, 100, 0])).unwrap();

        let seen = Mutex::new(Vec::new());
        let reporter = |s: &Status| seen.lock().unwrap().push(s.clone());
        let pane = Pane::default();
        let mut sink = FileSink::new(&output);
        pane.process(ImageSource::Drop(vec![input]), &mut sink, &reporter)
            .await
            .unwrap();

        let written = image::open(&output).unwrap().to_rgba8();
        assert_eq!(written.get_pixel(0, 0), &Rgba([55, 105, 155, 0]));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Status::Captured(SourceKind::Drop),
                Status::Inverting,
                Status::Delivered(SinkKind::File),
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig {
            host: Host::Word,
            ..Default::default()
        };
        let pane = Pane::from_config(&config);
        assert_eq!(pane.host(), Host::Word);
        assert_eq!(pane.settings().max_dimension, config.inverter.max_dimension);
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use invert_pane_lib::{
    init_logger, inverter, AppConfig, FileSink, Host, HostSelectionSink, ImageSource,
    InvertedImage, LogReporter, Pane, SinkKind, SourceKind,
};

#[derive(Parser)]
#[command(name = "invert-pane", about = "Invert the colors of document images", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Office host: word, powerpoint or excel
    #[arg(long, value_name = "NAME", global = true)]
    host: Option<Host>,

    /// Print a JSON report instead of the image
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Invert a data URI or bare base64 image and print the PNG data URI
    Text {
        /// Image text; read from stdin when absent or "-"
        input: Option<String>,
    },
    /// Read the selected picture's base64 from stdin and write the replacement to stdout
    Selection,
    /// Invert the first image among dropped files into a PNG file
    File {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct InvertReport {
    width: u32,
    height: u32,
    source: Option<SourceKind>,
    sink: Option<SinkKind>,
    bytes: usize,
}

impl InvertReport {
    fn new(image: &InvertedImage, source: Option<SourceKind>, sink: Option<SinkKind>) -> Self {
        Self {
            width: image.width,
            height: image.height,
            source,
            sink,
            bytes: image.png.len(),
        }
    }

    fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", cli.config))?;
    if let Some(host) = cli.host {
        config.host = host;
    }

    init_logger(&config.log_level);
    log::debug!("host: {}", config.host);

    match cli.command {
        Command::Text { input } => {
            let input = match input {
                Some(text) if text != "-" => text,
                _ => read_stdin()?,
            };
            let image = inverter::invert_async(input, config.inverter.clone()).await?;

            if cli.json {
                InvertReport::new(&image, None, None).print()?;
            } else {
                println!("{}", image.data_uri);
            }
        }
        Command::Selection => {
            // An unknown host has no selection API; treat it as Word
            if config.host == Host::Unknown {
                config.host = Host::Word;
            }
            let pane = Pane::from_config(&config);
            let source = ImageSource::HostSelection(read_stdin()?);
            let mut sink = HostSelectionSink::new(io::stdout().lock());

            pane.process(source, &mut sink, &LogReporter).await?;
            let mut stdout = sink.into_inner();
            writeln!(stdout)?;
        }
        Command::File { inputs, output } => {
            let pane = Pane::from_config(&config);
            let mut sink = FileSink::new(&output);

            let image = pane
                .process(ImageSource::Drop(inputs), &mut sink, &LogReporter)
                .await?;

            if cli.json {
                InvertReport::new(&image, Some(SourceKind::Drop), Some(SinkKind::File)).print()?;
            } else {
                println!("{}", output.display());
            }
        }
    }

    Ok(())
}

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ec3k_rs::ec3k::{calc_ec3k_crc, encode_row, DeviceFlags};
use ec3k_rs::logging::{init_logger_with_level, log_debug};
use ec3k_rs::util::hex::decode_hex;
use ec3k_rs::{
    log_info, BitRow, Capture, CaptureMeta, DecoderConfig, EncodeOptions, FrameBuilder,
    JsonLinesSink, Receiver, RecordSink,
};

#[derive(Parser)]
#[command(name = "ec3k-cli")]
#[command(about = "CLI tool for EnergyCounter 3000 radio frames")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode bit rows, one per line, and print accepted records as JSON lines
    Decode {
        /// Input file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        #[arg(short, long, default_value = "1000000")]
        sample_rate: u32,
        /// Tone separation in Hz
        #[arg(long, default_value = "50000", conflicts_with_all = ["f1", "f2"])]
        separation: i32,
        /// Lower tone estimate in Hz
        #[arg(long, requires = "f2", allow_hyphen_values = true)]
        f1: Option<f32>,
        /// Upper tone estimate in Hz
        #[arg(long, requires = "f1", allow_hyphen_values = true)]
        f2: Option<f32>,
        /// JSON decoder configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Synthesise a bit row carrying the given readings
    Encode {
        #[arg(long)]
        id: u16,
        /// Instantaneous power in W
        #[arg(long, default_value = "0")]
        power: f64,
        /// Maximum power in W
        #[arg(long, default_value = "0")]
        power_max: f64,
        /// Cumulative energy in Ws
        #[arg(long, default_value = "0")]
        energy: u64,
        /// Seconds since power-up
        #[arg(long, default_value = "0")]
        time_total: u32,
        /// Seconds the load was on
        #[arg(long, default_value = "0")]
        time_on: u32,
        #[arg(long, default_value = "0")]
        reset_counter: u8,
        /// Set the drawing-power flag
        #[arg(long)]
        drawing: bool,
        #[arg(long, default_value = "64")]
        preamble: usize,
        #[arg(long, default_value = "64")]
        trailer: usize,
        #[arg(long, value_enum, default_value = "bits")]
        format: RowFormat,
    },
    /// Print the EC3K CRC of hex-encoded bytes
    Crc { hex: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum RowFormat {
    /// Plain 0/1 string
    Bits,
    /// `{len}hex` dump
    Dump,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger_with_level(match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    });

    match cli.command {
        Commands::Decode {
            input,
            sample_rate,
            separation,
            f1,
            f2,
            config,
        } => {
            let config = match config {
                Some(path) => DecoderConfig::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => DecoderConfig::default(),
            };
            let meta = match (f1, f2) {
                (Some(f1), Some(f2)) => CaptureMeta::from_tones(sample_rate, f1, f2),
                _ => CaptureMeta::new(sample_rate, separation),
            };
            decode(&input, meta, config)?;
        }
        Commands::Encode {
            id,
            power,
            power_max,
            energy,
            time_total,
            time_on,
            reset_counter,
            drawing,
            preamble,
            trailer,
            format,
        } => {
            let flags = if drawing {
                DeviceFlags::DRAWING_POWER
            } else {
                DeviceFlags::empty()
            };
            let frame = FrameBuilder::new(id)
                .power_raw(tenths_of_watt(power)?)
                .power_max_raw(tenths_of_watt(power_max)?)
                .energy_ws(energy)
                .time_total(time_total)
                .time_on(time_on)
                .reset_counter(reset_counter)
                .flags(flags)
                .build()
                .context("building frame")?;
            log_debug(&format!("Frame: {frame:?}"));

            let row = encode_row(&frame, &EncodeOptions::new(preamble, trailer));
            match format {
                RowFormat::Bits => println!("{row}"),
                RowFormat::Dump => println!("{}", row.to_dump()),
            }
        }
        Commands::Crc { hex } => {
            let bytes = decode_hex(&hex).context("parsing hex input")?;
            println!("{:04X}", calc_ec3k_crc(&bytes));
        }
    }

    Ok(())
}

fn tenths_of_watt(watts: f64) -> Result<u16> {
    let tenths = (watts * 10.0).round();
    if !(0.0..=f64::from(u16::MAX)).contains(&tenths) {
        bail!("power {watts} W out of range");
    }
    Ok(tenths as u16)
}

fn decode(input: &str, meta: CaptureMeta, config: DecoderConfig) -> Result<()> {
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(input).with_context(|| format!("opening {input}"))?;
        Box::new(BufReader::new(file))
    };

    let mut receiver = Receiver::new(config, JsonLinesSink::new(io::stdout().lock()))?;
    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", number + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row: BitRow = line
            .parse()
            .with_context(|| format!("parsing row on line {}", number + 1))?;
        receiver.process(&Capture::single(row, meta))?;
    }

    let stats = *receiver.stats();
    receiver.into_sink().flush()?;
    log_info(&format!(
        "{} captures, {} records, {} rejected, {} without frame, {} padding errors, {} CRC errors, {} buffer overruns",
        stats.captures,
        stats.records,
        stats.rejected,
        stats.no_frame,
        stats.padding_errors,
        stats.crc_errors,
        stats.buffer_exhausted
    ));
    Ok(())
}

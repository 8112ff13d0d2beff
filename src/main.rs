use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};

use rawprobe::logger;
use rawprobe::raw_analysis::{
    ChannelReport, Crop, DprawAction, DprawConfig, DprawMode, FilterCode, GammaTable, LoadConfig,
    OutputConfig, RawImage, RawImagePipeline, ReadNoise, TiffCompression, auto_levels, build_histogram,
    calibrate_black_levels, channel_reports, dpraw_process, flat_pair, highlight_clipping, histogram_table,
    masked_reports, read_noise, save_raw, save_rgb, sensor_gain, set_black_levels, set_white_level,
    write_histogram_csv, write_stats_csv,
};

use tracing::{info, warn};

/// Sensor characterisation toolkit for uncompressed RAW captures.
#[derive(Parser)]
#[command(name = "rawprobe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct LoadOptions {
    /// Optical black border in pixels, LEFT,TOP
    #[arg(long, value_parser = parse_masked)]
    masked: Option<(usize, usize)>,

    /// Dimensions of a headerless 16-bit big-endian dump, WIDTHxHEIGHT
    #[arg(long, value_parser = parse_dimensions)]
    dat: Option<(usize, usize)>,

    /// Black level, one value or four (R,G1,G2,B)
    #[arg(long, value_delimiter = ',', num_args = 1..=4)]
    black: Vec<f64>,

    /// White level
    #[arg(long)]
    white: Option<u16>,
}

#[derive(Args, Clone)]
struct OutputOptions {
    /// TIFF compression
    #[arg(long, value_enum, default_value = "none")]
    compression: Compression,

    /// Horizontal differencing predictor for compressed TIFF
    #[arg(long)]
    predictor: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Compression {
    None,
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-channel histogram as CSV (DN;R;G1;G2;B)
    Histogram {
        input: PathBuf,

        /// Channel window, X,Y,WIDTH,HEIGHT in logical pixels
        #[arg(long)]
        crop: Option<Crop>,

        /// CSV destination, standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        load: LoadOptions,
    },

    /// Per-channel statistics, clipping and automatic levels
    Stats {
        input: PathBuf,

        #[arg(long)]
        crop: Option<Crop>,

        /// Write CSV instead of a text report
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        load: LoadOptions,
    },

    /// Statistics of the optical black band
    Masked {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        load: LoadOptions,
    },

    /// Merge a dual pixel pair (A+B combined frame and B subframe)
    Dpraw {
        combined: PathBuf,
        secondary: PathBuf,

        /// Destination (.dat, .pgm, .tif)
        #[arg(short, long)]
        output: PathBuf,

        /// geta or blend
        #[arg(long, default_value = "geta")]
        action: DprawAction,

        /// plain or bayer
        #[arg(long, default_value = "plain")]
        mode: DprawMode,

        /// Exposure shift of the combined frame when blending (EV)
        #[arg(long, allow_negative_numbers = true)]
        ev: Option<f64>,

        #[command(flatten)]
        load: LoadOptions,

        #[command(flatten)]
        save: OutputOptions,
    },

    /// Quick-look image with clipped cells painted in their filter colour
    Highlight {
        input: PathBuf,

        /// Destination (.ppm, .tif)
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = GammaTable::DEFAULT_GAMMA)]
        gamma: f64,

        #[command(flatten)]
        load: LoadOptions,

        #[command(flatten)]
        save: OutputOptions,
    },

    /// Read noise from a dark pair, photon noise and gain from flat pairs
    Noise {
        dark_a: PathBuf,
        dark_b: PathBuf,

        /// Flat pair, may be repeated
        #[arg(long, num_args = 2, value_names = ["A", "B"])]
        flat: Vec<PathBuf>,

        #[command(flatten)]
        load: LoadOptions,
    },
}

fn parse_pair(s: &str, separator: char) -> Result<(usize, usize), String> {
    let (first, second) = s
        .split_once(separator)
        .ok_or_else(|| format!("expected two values separated by '{}'", separator))?;
    let first = first.trim().parse().map_err(|e| format!("{}: {}", first, e))?;
    let second = second.trim().parse().map_err(|e| format!("{}: {}", second, e))?;
    Ok((first, second))
}

fn parse_masked(s: &str) -> Result<(usize, usize), String> {
    parse_pair(s, ',')
}

fn parse_dimensions(s: &str) -> Result<(usize, usize), String> {
    parse_pair(&s.to_ascii_lowercase(), 'x')
}

impl LoadOptions {
    fn load(&self, path: &Path) -> anyhow::Result<RawImage> {
        let (masked_left, masked_top) = self.masked.unwrap_or((0, 0));
        let config = LoadConfig::builder()
            .masked_area(masked_left, masked_top)
            .dat_dimensions(self.dat)
            .build();
        let mut image = RawImagePipeline::new(config)
            .load_file(path)
            .with_context(|| format!("loading {}", path.display()))?;

        if !self.black.is_empty() {
            set_black_levels(&mut image, &self.black)?;
        }
        if self.white.is_some() {
            set_white_level(&mut image, self.white);
        }
        Ok(image)
    }
}

impl OutputOptions {
    fn config(&self) -> OutputConfig {
        let compression = match self.compression {
            Compression::None => TiffCompression::None,
            Compression::Lzw => TiffCompression::Lzw,
            Compression::DeflateFast => TiffCompression::DeflateFast,
            Compression::DeflateBalanced => TiffCompression::DeflateBalanced,
            Compression::DeflateBest => TiffCompression::DeflateBest,
        };
        OutputConfig::builder()
            .compression(compression)
            .predictor(self.predictor.then_some(2))
            .build()
    }
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    })
}

fn print_reports(reports: &[ChannelReport]) {
    for report in reports {
        println!("{}: {} pixels", report.code, report.pixels);
        println!(
            "  minDN={}, maxDN={}, meanDN={:.3}, stdevDN={:.3}",
            report.stats.min, report.stats.max, report.stats.mean, report.stats.stdev
        );
        println!(
            "  mode={}, whiteLevel={} ({:.4}% clipped)",
            report.mode,
            report.highlights.white_level,
            report.clipped_percent()
        );
        println!(
            "  auto levels: black={}, white={} ({} clipped)",
            report.auto_levels.black_level, report.auto_levels.white_level, report.auto_levels.clipped_count
        );
    }
}

fn write_reports(reports: &[ChannelReport], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(_) => {
            let mut out = open_output(output)?;
            write_stats_csv(reports, &mut out)?;
            out.flush()?;
        }
        None => print_reports(reports),
    }
    Ok(())
}

/// Calibrates from the masked border unless black points were given.
fn ensure_black_levels(image: &mut RawImage, load: &LoadOptions) -> anyhow::Result<()> {
    if load.black.is_empty() {
        calibrate_black_levels(image).with_context(|| {
            format!("{}: no black points given and no usable masked border", image.name())
        })?;
    }
    Ok(())
}

fn run_dpraw(
    combined: &Path,
    secondary: &Path,
    output: &Path,
    config: DprawConfig,
    load: &LoadOptions,
    save: &OutputOptions,
) -> anyhow::Result<()> {
    let mut combined = load.load(combined)?;
    let mut secondary = load.load(secondary)?;
    ensure_black_levels(&mut combined, load)?;
    ensure_black_levels(&mut secondary, load)?;

    let white_level = match combined.white_level() {
        Some(white_level) => white_level,
        None => {
            warn!("No white level known, clipping is only detected at full scale");
            u16::MAX
        }
    };
    let config = DprawConfig {
        white_level,
        ..config
    };

    let merged = dpraw_process(&combined, &secondary, &config)?;
    save_raw(&merged, output, &save.config())?;
    Ok(())
}

fn run_highlight(input: &Path, output: &Path, gamma: f64, load: &LoadOptions, save: &OutputOptions) -> anyhow::Result<()> {
    let image = load.load(input)?;
    let white_level = match image.white_level() {
        Some(white_level) => white_level,
        None => {
            let whole = image.channel(FilterCode::All).select_all()?;
            let estimate = auto_levels(&build_histogram(&whole)?)?.white_level;
            warn!("No white level known, using estimate {}", estimate);
            estimate
        }
    };

    let table = GammaTable::new(white_level, gamma)?;
    let preview = highlight_clipping(&image, white_level, &table)?;
    save_rgb(&preview, output, &save.config())?;
    Ok(())
}

fn run_noise(dark_a: &Path, dark_b: &Path, flats: &[PathBuf], load: &LoadOptions) -> anyhow::Result<()> {
    let dark_a = load.load(dark_a)?;
    let dark_b = load.load(dark_b)?;
    let dark: ReadNoise = read_noise(
        &dark_a.channel(FilterCode::All).select_all()?,
        &dark_b.channel(FilterCode::All).select_all()?,
    )?;
    println!("read noise (DN) whole frame: {:.4}", dark.noise);
    println!("black level (DN): {:.3}", dark.black_level);

    let mut pairs = Vec::new();
    for flat in flats.chunks(2) {
        let [path_a, path_b] = flat else {
            bail!("flat frames come in pairs");
        };
        let white_a = load.load(path_a)?;
        let white_b = load.load(path_b)?;

        for code in FilterCode::BAYER {
            let pair = flat_pair(
                &white_a.channel(code).select_all()?,
                &white_b.channel(code).select_all()?,
                &dark,
            )?;
            println!("-------------------");
            println!("Colour filter {} ({})", code, path_a.display());
            println!("pixels: {}", pair.pixels);
            println!("noise (DN): {:.4}", pair.noise);
            println!("photon noise (DN): {:.4}", pair.photon_noise);
            for (label, frame) in ["Image A", "Image B"].iter().zip(&pair.frames) {
                println!("{}", label);
                println!(
                    "  minDN={}, maxDN={}, meanDN={:.3}, stdevDN={:.3}",
                    frame.stats.min, frame.stats.max, frame.stats.mean, frame.stats.stdev
                );
                println!(
                    "  mode={}, whiteLevel={} ({} clipped)",
                    frame.mode, frame.highlights.white_level, frame.highlights.clipped_count
                );
                if let Some(exposure) = frame.exposure {
                    println!("  mean saturation (DN): {:.3}", exposure.saturation);
                    println!("  image dynamic range (stops): {:.3}", exposure.dynamic_range_stops);
                    println!("  snr: {:.3} ({:.2} dB)", exposure.snr, exposure.snr_db);
                    println!("  signal (e-): {:.1}", exposure.signal);
                }
            }
            pairs.push(pair);
        }
    }

    if !pairs.is_empty() {
        println!("-------------------");
        match sensor_gain(&pairs, &dark) {
            Some(gain) => {
                println!("sensor full well (e-): {:.0}", gain.full_well);
                println!("gain (e-/DN): {:.4}", gain.gain);
                println!(
                    "sensor dynamic range (stops): {:.3}",
                    (gain.full_well / (dark.noise * gain.gain)).log2()
                );
            }
            None => warn!("Every flat frame is clipped, no gain estimate"),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Commands::Histogram { input, crop, output, load } => {
            let image = load.load(&input)?;
            let table = histogram_table(&image, crop)?;
            let mut out = open_output(output.as_deref())?;
            write_histogram_csv(&table, &mut out)?;
            out.flush()?;
        }
        Commands::Stats { input, crop, output, load } => {
            let image = load.load(&input)?;
            let reports = channel_reports(&image, crop)?;
            write_reports(&reports, output.as_deref())?;
        }
        Commands::Masked { input, output, load } => {
            let image = load.load(&input)?;
            let reports = masked_reports(&image)
                .with_context(|| format!("{}: masked border required, see --masked", input.display()))?;
            write_reports(&reports, output.as_deref())?;
        }
        Commands::Dpraw { combined, secondary, output, action, mode, ev, load, save } => {
            let config = DprawConfig::builder()
                .ev_shift(ev)
                .action(action)
                .mode(mode)
                .build();
            run_dpraw(&combined, &secondary, &output, config, &load, &save)?;
        }
        Commands::Highlight { input, output, gamma, load, save } => {
            run_highlight(&input, &output, gamma, &load, &save)?;
        }
        Commands::Noise { dark_a, dark_b, flat, load } => {
            run_noise(&dark_a, &dark_b, &flat, &load)?;
        }
    }

    info!("Done");
    Ok(())
}

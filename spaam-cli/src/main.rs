use arrsac::Arrsac;
use log::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use spaam_calib::{
    CalibrationError, CalibrationSettings, CalibrationStore, Calibrator, StorageError, TapOutcome,
};
use spaam_core::{
    sample_consensus::Consensus, ClipProjection, CorrespondencePair, Eye, TrackerSample,
};
use spaam_dlt::{build_clip_projection, Conditioning, ReprojectionError, SolveError, SpaamDlt};
use std::{fs::File, io, path::PathBuf, process};
use structopt::StructOpt;
use thiserror::Error;

#[derive(StructOpt, Clone)]
#[structopt(
    name = "spaam",
    about = "A tool for calibrating see-through displays with SPAAM"
)]
struct Opt {
    /// The file where settings are specified.
    ///
    /// This is in the format of `spaam_calib::CalibrationSettings`.
    #[structopt(short, long, default_value = "spaam-settings.json")]
    settings: PathBuf,
    /// The directory holding the per-eye calibration records.
    #[structopt(short, long, default_value = ".")]
    directory: PathBuf,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Clone)]
enum Command {
    /// Solve for a projection from recorded alignments.
    Solve {
        /// JSON list of `{ "world": [x, y, z], "screen": [u, v] }` in meters and pixels.
        ///
        /// The first alignment decides which side of the display is the front.
        #[structopt(parse(from_os_str))]
        input: PathBuf,
        /// Reject misaligned taps with ARRSAC before solving, using this pixel threshold.
        #[structopt(long)]
        robust: Option<f64>,
        /// Store the result as the calibration of this eye (left or right).
        #[structopt(long)]
        eye: Option<Eye>,
    },
    /// Replay recorded confirmations for one eye, storing the calibration as it improves.
    Replay {
        /// The eye being calibrated (left or right).
        #[structopt(long)]
        eye: Eye,
        /// JSON list of `{ "tracking": bool, "position": [x, y, z] }` in tracker units.
        #[structopt(parse(from_os_str))]
        input: PathBuf,
    },
    /// Print the stored calibration of both eyes.
    Show,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("unable to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("unable to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no consensus among the alignments")]
    NoConsensus,
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let settings = File::open(&opt.settings)
        .ok()
        .and_then(|file| serde_json::from_reader(file).ok());
    if settings.is_some() {
        info!("loaded existing settings");
    } else {
        info!("used default settings");
    }
    let settings: CalibrationSettings = settings.unwrap_or_default();
    let store = CalibrationStore::from_settings(&opt.directory, &settings);

    let result = match opt.command {
        Command::Solve { input, robust, eye } => solve(&settings, &store, input, robust, eye),
        Command::Replay { eye, input } => replay(settings, store, eye, input),
        Command::Show => show(&store),
    };
    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<T, CliError> {
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(source) => return Err(CliError::Open { path, source }),
    };
    serde_json::from_reader(io::BufReader::new(file))
        .map_err(|source| CliError::Parse { path, source })
}

fn solve(
    settings: &CalibrationSettings,
    store: &CalibrationStore,
    input: PathBuf,
    robust: Option<f64>,
    eye: Option<Eye>,
) -> Result<(), CliError> {
    let mut pairs: Vec<CorrespondencePair> = read_json(input)?;
    info!("read {} alignments", pairs.len());
    let dlt = SpaamDlt::new();

    if let Some(threshold) = robust {
        let mut arrsac = Arrsac::new(threshold, Pcg64::from_seed([5; 32]));
        let (_, mut inliers) = arrsac
            .model_inliers(&dlt, pairs.iter().copied())
            .ok_or(CliError::NoConsensus)?;
        info!("{} of {} alignments agree", inliers.len(), pairs.len());
        // Keep the input order so the earliest alignment still decides the front.
        inliers.sort_unstable();
        pairs = inliers.into_iter().map(|ix| pairs[ix]).collect();
    }

    let solution = match dlt.solve(&pairs) {
        Ok(solution) => solution,
        Err(e) => {
            if e == SolveError::Degenerate {
                warn!("{}", Conditioning::inspect_axes(&pairs));
            }
            return Err(e.into());
        }
    };
    let conditioning = Conditioning::inspect(&pairs, &solution.denormalized);
    if !conditioning.is_well_conditioned() {
        warn!("{}", conditioning);
    }
    let clip = build_clip_projection(
        &solution.projection,
        settings.near,
        settings.far,
        &settings.viewport(),
    );

    println!("projection:{}", solution.projection.0);
    println!("clip projection:{}", clip.matrix());
    println!("column-major: {:?}", clip.0);
    println!("conditioning: {}", conditioning);
    if let Some(error) = ReprojectionError::measure(&solution.projection, &pairs) {
        println!("reprojection error: {}", error);
    }

    if let Some(eye) = eye {
        store.save(eye, &clip)?;
        info!("stored the {} eye calibration at {}", eye, store.path(eye).display());
    }
    Ok(())
}

fn replay(
    settings: CalibrationSettings,
    store: CalibrationStore,
    eye: Eye,
    input: PathBuf,
) -> Result<(), CliError> {
    let samples: Vec<TrackerSample> = read_json(input)?;
    let mut calibrator = Calibrator::new(settings, store);
    calibrator.select_eye(eye);

    let mut ignored = 0;
    let mut degenerate = 0;
    let mut unsaved = 0;
    for sample in samples {
        match calibrator.confirm(sample) {
            Ok(TapOutcome::Ignored) => ignored += 1,
            Ok(TapOutcome::Degenerate { .. }) => degenerate += 1,
            Ok(TapOutcome::NotReady { .. }) | Ok(TapOutcome::Solved(_)) => {}
            // Already logged, and the calibration in memory is still current.
            Err(CalibrationError::Storage(_)) => unsaved += 1,
            Err(e) => return Err(e.into()),
        }
    }
    if ignored != 0 {
        info!("ignored {} confirmations without tracking", ignored);
    }
    if degenerate != 0 {
        warn!("{} confirmations could not be solved", degenerate);
    }
    if unsaved != 0 {
        warn!("{} solves could not be stored", unsaved);
    }

    let collected = calibrator
        .session()
        .map(|session| session.correspondences().len())
        .unwrap_or(0);
    println!("{} eye: {} alignments", eye, collected);
    print_projection(eye, calibrator.projection(eye));
    Ok(())
}

fn show(store: &CalibrationStore) -> Result<(), CliError> {
    for eye in Eye::ALL {
        match store.load(eye)? {
            Some(projection) => {
                println!("{}", store.path(eye).display());
                print_projection(eye, &projection);
            }
            None => println!("{} eye: no calibration stored, using identity", eye),
        }
    }
    Ok(())
}

fn print_projection(eye: Eye, projection: &ClipProjection) {
    println!("{} eye clip projection:{}", eye, projection.matrix());
}

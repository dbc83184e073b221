use anyhow::Context;
use clap::{load_yaml, value_t, App};
use serde::Serialize;

use steenroder::persistence::ValuedBarcodes;
use steenroder::utils::{init_logging, load_filtration_json};
use steenroder::{compute_barcodes, Barcode, Barcodes, Config, Mode};

#[derive(Serialize)]
struct Representative {
    birth: usize,
    dimension: usize,
    cocycle: String,
    square: String,
}

#[derive(Serialize)]
struct Output<'a> {
    k: usize,
    mode: Mode,
    barcode: &'a Barcode,
    steenrod_barcode: &'a Barcode,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<&'a ValuedBarcodes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    representatives: Option<Vec<Representative>>,
}

fn representatives(result: &Barcodes) -> Vec<Representative> {
    result
        .representatives()
        .map(|(dimension, bar, cocycle, square)| Representative {
            birth: bar.birth,
            dimension,
            cocycle: cocycle.display(&result.filtration).to_string(),
            square: square.display(&result.filtration).to_string(),
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let yaml = load_yaml!("cli.yml");
    let matches = App::from_yaml(yaml).get_matches();

    let mut config = match matches.value_of("config") {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if matches.is_present("k") {
        config.k = value_t!(matches, "k", usize).context("Invalid value of k")?;
    }
    if matches.is_present("relative") {
        config.mode = Mode::Relative;
    }
    if matches.is_present("values") {
        config.return_filtration_values = true;
    }
    if matches.is_present("verbose") {
        config.verbose = true;
    }
    if matches.is_present("timeout") {
        config.timeout_ms = Some(value_t!(matches, "timeout", u64).context("Invalid timeout")?);
    }

    init_logging(config.verbose)?;

    let path = matches
        .value_of("FILTRATION")
        .context("No filtration given")?;
    let filtration = load_filtration_json(path)?;
    tracing::info!(num_simplices = filtration.len(), "loaded {path}");

    let result = compute_barcodes(&filtration, &config)?;

    let output = Output {
        k: result.k,
        mode: result.mode,
        barcode: &result.barcode,
        steenrod_barcode: &result.steenrod_barcode,
        values: result.values.as_ref(),
        representatives: matches
            .is_present("reps")
            .then(|| representatives(&result)),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

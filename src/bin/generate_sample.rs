use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

use spotfit::config::{ReferenceSource, RunConfig};
use spotfit::correction::locate::ReferenceWindow;
use spotfit::correction::{contamination, resample};
use spotfit::data::model::{Spectrum, VariabilityLevel, WavelengthGrid};

/// Writes blackbody reference spectra, a synthetic transmission spectrum and
/// a run configuration that ties them together.
#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Generate a self-contained sample run for spotfit")]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = "sample_run")]
    out: PathBuf,

    /// Spot temperature the synthetic data is drawn from
    #[arg(long, default_value_t = 2800)]
    true_spot: u32,

    /// Variability amplitude the synthetic data is drawn from
    #[arg(long, default_value_t = 0.05)]
    true_delta_f: f64,

    /// Noise seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const T_PHOT: u32 = 3300;
const T_SPOTS: [u32; 3] = [3000, 2800, 2600];
const MEAN_DEPTH_PPM: f64 = 1914.0;
const ERR_PPM: f64 = 25.0;

/// hc/k in cm·K
const SECOND_RADIATION_CONSTANT: f64 = 1.438_776_877;

/// Planck spectral radiance up to a constant factor, λ in Ångström.
fn planck(wavelength_aa: f64, temperature: f64) -> f64 {
    let lambda_cm = wavelength_aa * 1e-8;
    let x = SECOND_RADIATION_CONSTANT / (lambda_cm * temperature);
    1.0 / (lambda_cm.powi(5) * x.exp_m1())
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_reference(path: &Path, wavelengths: &[f64], temperature: u32) -> Result<Vec<f64>> {
    let flux: Vec<f64> = wavelengths
        .iter()
        .map(|&w| planck(w, temperature as f64))
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("WAVELENGTH", DataType::Float64, false),
        Field::new("g50", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(wavelengths.to_vec())),
            Arc::new(Float64Array::from(flux.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(flux)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    // 2000 – 20000 Å at 0.5 Å
    let wavelengths: Vec<f64> = (0..36_000).map(|i| 2000.0 + 0.5 * i as f64).collect();
    let grid = WavelengthGrid::new(wavelengths.clone())?;

    let phot_flux = write_reference(&args.out.join("phoenix_3300.parquet"), &wavelengths, T_PHOT)?;
    let mut true_spot_flux = None;
    for t in T_SPOTS {
        let flux = write_reference(&args.out.join(format!("phoenix_{t}.parquet")), &wavelengths, t)?;
        if t == args.true_spot {
            true_spot_flux = Some(flux);
        }
    }
    let true_spot_flux = true_spot_flux
        .with_context(|| format!("true spot {} K is not one of {T_SPOTS:?}", args.true_spot))?;

    // Synthetic data: true model binned to 40 channels between 0.32 and 1.66 µm.
    let reference = ReferenceWindow::new(7999.9, 8000.1)?;
    let ref_index = reference.locate(&grid)?;
    let photosphere = Spectrum::new(grid.clone(), phot_flux)?;
    let spot = Spectrum::new(grid.clone(), true_spot_flux)?;
    let model = contamination::compute(&photosphere, &spot, args.true_delta_f, ref_index)?;
    let model = contamination::to_absolute_depth(&model, MEAN_DEPTH_PPM);
    let offset = MEAN_DEPTH_PPM - model.flux()[ref_index];

    let n_channels = 40;
    let wvl_um: Vec<f64> = (0..n_channels)
        .map(|i| 0.32 + (1.66 - 0.32) * i as f64 / (n_channels - 1) as f64)
        .collect();
    let half_width = 0.5 * (wvl_um[1] - wvl_um[0]);
    let data_grid_aa = WavelengthGrid::new(wvl_um.iter().map(|w| w * 1e4).collect())?;
    let truth = resample::resample(&data_grid_aa, model.grid(), model.flux())?;

    let mut rng = SimpleRng::new(args.seed);
    let obs_path = args.out.join("observed.csv");
    let mut writer = csv::Writer::from_path(&obs_path)
        .with_context(|| format!("creating {}", obs_path.display()))?;
    writer.write_record(["wvl", "wvl_width", "depth", "err"])?;
    for (w, t) in wvl_um.iter().zip(&truth) {
        let depth_ppm = rng.gauss(t + offset, ERR_PPM);
        writer.write_record(&[
            format!("{w:.5}"),
            format!("{half_width:.5}"),
            format!("{:.8}", depth_ppm * 1e-6),
            format!("{:.8}", ERR_PPM * 1e-6),
        ])?;
    }
    writer.flush()?;

    let config = RunConfig {
        photosphere: ReferenceSource {
            temperature: T_PHOT,
            path: "phoenix_3300.parquet".into(),
        },
        spots: T_SPOTS
            .iter()
            .map(|&t| ReferenceSource {
                temperature: t,
                path: format!("phoenix_{t}.parquet").into(),
            })
            .collect(),
        variability: vec![
            VariabilityLevel {
                label: "low".into(),
                delta_f: 0.025,
            },
            VariabilityLevel {
                label: "high".into(),
                delta_f: 0.1,
            },
        ],
        observed: "observed.csv".into(),
        reference,
        coarse_reference: None,
        mean_depth: MEAN_DEPTH_PPM,
        alignment_depth: None,
        free_parameters: 3,
        coarsen_levels: 4,
        model_to_data_wavelength: 1e-4,
        depth_scale: 1e6,
        wavelength_column: "WAVELENGTH".into(),
        flux_column: "g50".into(),
        flat_depth: Some(MEAN_DEPTH_PPM),
        export: Some("models.csv".into()),
    };
    let config_path = args.out.join("run.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("writing {}", config_path.display()))?;

    println!(
        "Wrote {} reference spectra ({} samples each), {n_channels} observed channels and {}",
        T_SPOTS.len() + 1,
        wavelengths.len(),
        config_path.display()
    );
    Ok(())
}

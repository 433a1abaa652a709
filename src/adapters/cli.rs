use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read};

use crate::error::AppError;
use crate::models::{CarbonateSystem, SolverOptions, SystemInput};
use crate::solver::AlkalinityBreakdown;

/// mol/kg and atm to µmol/kg and µatm.
const TO_MICRO: f64 = 1e6;

#[derive(Parser, Debug)]
#[command(author, version, about = "Marine carbonate-system solver with optional JSON output", long_about = None)]
pub struct Args {
    #[arg(long)]
    json: bool,
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON file with the input pair, totals, constants and optional options; '-' reads from stdin"
    )]
    input: Option<String>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON for the input pair, totals and constants (overrides --input)"
    )]
    inputs_json: Option<String>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON for solver options (overrides options in the input document)"
    )]
    options_json: Option<String>,
    #[arg(long, help = "Also report the individual alkalinity contributions")]
    pub components: bool,
}

#[derive(Deserialize)]
struct CmdInput {
    #[serde(flatten)]
    system: SystemInput,
    #[serde(default)]
    options: Option<SolverOptions>,
}

fn parse_options(options_json: &str) -> Result<SolverOptions, AppError> {
    serde_json::from_str(options_json).map_err(|source| AppError::ParseOptionsJson { source })
}

fn parse_cmd_input_doc(doc: &str) -> Result<(SystemInput, SolverOptions), AppError> {
    let parsed: CmdInput =
        serde_json::from_str(doc).map_err(|source| AppError::ParseCmdInputJson { source })?;
    Ok((parsed.system, parsed.options.unwrap_or_default()))
}

pub fn parse_inputs(args: &Args) -> Result<(SystemInput, SolverOptions), AppError> {
    let (input, options) = match (&args.inputs_json, &args.input) {
        (Some(inputs_json), _) => {
            let input: SystemInput = serde_json::from_str(inputs_json)
                .map_err(|source| AppError::ParseInputsJson { source })?;
            (input, SolverOptions::default())
        }
        (None, Some(path)) if path == "-" => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .map_err(|source| AppError::ReadStdin { source })?;
            parse_cmd_input_doc(&s)?
        }
        (None, Some(path)) => {
            let s = fs::read_to_string(path).map_err(|source| AppError::ReadFile {
                path: path.clone(),
                source,
            })?;
            parse_cmd_input_doc(&s)?
        }
        (None, None) => return Err(AppError::MissingInputData),
    };
    let options = match &args.options_json {
        Some(s) => parse_options(s)?,
        None => options,
    };
    Ok((input, options))
}

fn micro(values: &ndarray::Array1<f64>) -> Vec<f64> {
    values.iter().map(|v| v * TO_MICRO).collect()
}

/// Alkalinity contributions in µmol/kg-sw.
#[derive(Serialize)]
struct ComponentsReport {
    hco3: Vec<f64>,
    co3: Vec<f64>,
    borate: Vec<f64>,
    hydroxide: Vec<f64>,
    phosphate: Vec<f64>,
    silicate: Vec<f64>,
    ammonia: Vec<f64>,
    sulfide: Vec<f64>,
    h_free: Vec<f64>,
    hso4: Vec<f64>,
    hf: Vec<f64>,
}

impl From<&AlkalinityBreakdown> for ComponentsReport {
    fn from(b: &AlkalinityBreakdown) -> Self {
        Self {
            hco3: micro(&b.hco3),
            co3: micro(&b.co3),
            borate: micro(&b.borate),
            hydroxide: micro(&b.hydroxide),
            phosphate: micro(&b.phosphate),
            silicate: micro(&b.silicate),
            ammonia: micro(&b.ammonia),
            sulfide: micro(&b.sulfide),
            h_free: micro(&b.h_free),
            hso4: micro(&b.hso4),
            hf: micro(&b.hf),
        }
    }
}

/// The solved system in user units: µmol/kg-sw, µatm and pH.
#[derive(Serialize)]
struct SystemReport {
    ph: Vec<f64>,
    dic: Vec<f64>,
    alkalinity: Vec<f64>,
    fco2: Vec<f64>,
    bicarbonate: Vec<f64>,
    carbonate: Vec<f64>,
    aqueous_co2: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<ComponentsReport>,
}

impl SystemReport {
    fn new(s: &CarbonateSystem, components: Option<&AlkalinityBreakdown>) -> Self {
        Self {
            ph: s.ph.to_vec(),
            dic: micro(&s.dic),
            alkalinity: micro(&s.alkalinity),
            fco2: micro(&s.fco2),
            bicarbonate: micro(&s.bicarbonate),
            carbonate: micro(&s.carbonate),
            aqueous_co2: micro(&s.aqueous_co2),
            components: components.map(ComponentsReport::from),
        }
    }
}

pub fn print_output(
    system: &CarbonateSystem,
    components: Option<&AlkalinityBreakdown>,
    args: &Args,
) -> Result<(), AppError> {
    let out = SystemReport::new(system, components);
    if args.json {
        let s = serde_json::to_string_pretty(&out)
            .map_err(|source| AppError::SerializeOutput { source })?;
        println!("{}", s);
        return Ok(());
    }

    for i in 0..out.ph.len() {
        if out.ph.len() > 1 {
            println!("Sample {}:", i + 1);
        }
        println!("pH: {:.4}", out.ph[i]);
        println!("DIC: {:.2} umol/kg", out.dic[i]);
        println!("Alkalinity: {:.2} umol/kg", out.alkalinity[i]);
        println!("fCO2: {:.2} uatm", out.fco2[i]);
        println!("HCO3: {:.2} umol/kg", out.bicarbonate[i]);
        println!("CO3: {:.2} umol/kg", out.carbonate[i]);
        println!("CO2(aq): {:.3} umol/kg", out.aqueous_co2[i]);
        if let Some(c) = &out.components {
            println!("Borate alkalinity: {:.2} umol/kg", c.borate[i]);
            println!("Hydroxide alkalinity: {:.3} umol/kg", c.hydroxide[i]);
            println!("Phosphate alkalinity: {:.3} umol/kg", c.phosphate[i]);
            println!("Silicate alkalinity: {:.3} umol/kg", c.silicate[i]);
            println!("Ammonia alkalinity: {:.3} umol/kg", c.ammonia[i]);
            println!("Sulfide alkalinity: {:.3} umol/kg", c.sulfide[i]);
            println!("Free H+: {:.4} umol/kg", c.h_free[i]);
            println!("HSO4: {:.4} umol/kg", c.hso4[i]);
            println!("HF: {:.4} umol/kg", c.hf[i]);
        }
    }

    Ok(())
}

//! Handling the TUBETRACE CLI
//!
//! This module handles the command line parsing as well as the interactive prompting for
//! parameters that were not (or not validly) given on the command line.
use crate::error::{TtResult, TubeTraceError};
use crate::{degree, millimeter};
use std::io::{BufReader, BufWriter};

use clap::Parser;
use rprompt::prompt_reply_from_bufread;
use std::path::PathBuf;
use std::{
    io::{stdin, stdout, BufRead, Write},
    string::String,
};
use strum::{EnumIter, IntoEnumIterator};
use uom::si::f64::{Angle, Length};

/// default maximum lateral excursion in millimeters
pub const DEFAULT_EXCURSION_MM: f64 = 1.5;
/// default exit-angle tolerance in degrees
pub const DEFAULT_TOLERANCE_DEG: f64 = 1.0;

/// Preset liquid-tube diameters of the assembly family.
#[derive(Debug, Clone, Copy, PartialEq, EnumIter)]
pub enum TubePreset {
    /// Φ6 mm tube
    Phi6,
    /// Φ12 mm tube
    Phi12,
    /// Φ24.5 mm tube
    Phi24_5,
}
impl TubePreset {
    /// Returns the tube diameter of this preset in millimeters.
    #[must_use]
    pub const fn diameter_mm(self) -> f64 {
        match self {
            Self::Phi6 => 6.0,
            Self::Phi12 => 12.0,
            Self::Phi24_5 => 24.5,
        }
    }
}

/// Command line arguments for the TUBETRACE application.
pub struct Args {
    /// diameter of the liquid tube
    pub tube_diameter: Length,

    /// maximum lateral excursion of the entry-offset scan
    pub max_excursion: Length,

    /// allowed deviation of the exit angle from the ideal angle
    pub tolerance: Angle,

    /// step size of the entry-offset scan
    pub step: Length,

    /// destination of the sweep chart
    pub plot_path: PathBuf,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct PartialArgs {
    /// tube diameter in mm: one of the presets (6, 12, 24.5) or a free value in (0, 25]
    #[arg(short, long)]
    diameter: Option<String>,

    /// maximum lateral excursion of the scan in mm (0..=5)
    #[arg(short, long)]
    excursion: Option<String>,

    /// allowed exit-angle deviation in degrees (0..=15)
    #[arg(short, long)]
    tolerance: Option<String>,

    /// scan step size in mm
    #[arg(short, long, default_value_t = 0.001)]
    step: f64,

    /// destination of the sweep chart (svg)
    #[arg(short, long, default_value = "sweep.svg")]
    plot_path: String,
}

/// Evaluates if the passed diameter string is valid.
/// # Attributes
/// * `diameter_input`: String description of the tube diameter in millimeters
/// # Returns
/// * `Some(f64)` with the diameter if it is within `(0, 25]` mm
/// * None if the diameter string is invalid
fn eval_diameter_input(diameter_input: &str) -> Option<f64> {
    let diameter: f64 = diameter_input.trim().parse().ok()?;
    (diameter > 0.0 && diameter <= 25.0).then_some(diameter)
}

/// Evaluates if the passed excursion string is valid.
/// An empty input selects the default of 1.5 mm.
fn eval_excursion_input(excursion_input: &str) -> Option<f64> {
    let trimmed = excursion_input.trim();
    if trimmed.is_empty() {
        return Some(DEFAULT_EXCURSION_MM);
    }
    let excursion: f64 = trimmed.parse().ok()?;
    (0.0..=5.0).contains(&excursion).then_some(excursion)
}

/// Evaluates if the passed tolerance string is valid.
/// An empty input selects the default of 1°.
fn eval_tolerance_input(tolerance_input: &str) -> Option<f64> {
    let trimmed = tolerance_input.trim();
    if trimmed.is_empty() {
        return Some(DEFAULT_TOLERANCE_DEG);
    }
    let tolerance: f64 = trimmed.parse().ok()?;
    (0.0..=15.0).contains(&tolerance).then_some(tolerance)
}

/// Creates the prompt string that is displayed in the console, depending on the flag and if the
/// passed input for the respective flag is valid
/// # Attributes
/// * `flag`:       Respective argument flag. "d" for the tube diameter, "e" for the maximum
///   excursion and "t" for the exit-angle tolerance.
/// * `init_str`:   Prepended String. Used if some messages should be displayed beforehand.
/// # Returns
/// * Returns an [`TtResult<String>`] containing the prompt message.
/// # Errors
/// Errors if an invalid flag type has been used
fn create_prompt_str(flag: &str, init_str: &str) -> TtResult<String> {
    let mut prompt_str = init_str.to_owned();
    match flag {
        "d" => {
            prompt_str += "Please insert a tube diameter in mm. Presets:\n";
            for preset in TubePreset::iter() {
                prompt_str += &format!("{}\n", preset.diameter_mm());
            }
            prompt_str += "or any value in (0, 25]\n";
            Ok(prompt_str)
        }
        "e" => Ok(prompt_str
            + "Please insert the maximum lateral excursion in mm (0..=5) or nothing for the default of 1.5 mm\n"),
        "t" => Ok(prompt_str
            + "Please insert the exit-angle tolerance in degrees (0..=15) or nothing for the default of 1 deg\n"),
        _ => Err(TubeTraceError::Console(
            "Invalid flag type! Cannot create prompt string!".into(),
        )),
    }
}

/// Extracts the arguments from the [`PartialArgs`] struct
/// # Attributes
/// * `func`:       Function to evaluate the input string of the given argument.
/// * `input`:      String-Option of the argument
/// * `arg_flag`:   Respective argument flag. "d" for the tube diameter, "e" for the maximum
///   excursion and "t" for the exit-angle tolerance.
/// * `reader`:     Type that implements the `BufRead` trait to read from. May be stdin().lock()
///   for user input or a `BufReader` from a static String for tests
/// * `writer`:     Type that implements the Write trait to write into.
/// # Returns
/// * Returns an [`TtResult<T>`] containing the extracted argument. The specific type of T
///   depends on the used function.
/// # Errors
/// Returns an [`TubeTraceError::Console`] if func returns a non-None Option that creates an
/// error. In theory not possible
fn get_args<T>(
    func: fn(&str) -> Option<T>,
    input: Option<&str>,
    arg_flag: &str,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> TtResult<T> {
    if let Some(i) = input {
        let arg = func(i);
        if arg.is_none() {
            let prompt_str = create_prompt_str(arg_flag, "Invalid input!\n")?;
            let input: String = prompt_reply_from_bufread(reader, writer, prompt_str).unwrap();
            get_args(func, Some(input.as_str()), arg_flag, reader, writer)
        } else {
            arg.ok_or_else(|| TubeTraceError::Console("Could not extract argument!".into()))
        }
    } else {
        let prompt_str = create_prompt_str(arg_flag, "")?;
        let input: String = prompt_reply_from_bufread(reader, writer, prompt_str).unwrap();
        get_args(func, Some(input.as_str()), arg_flag, reader, writer)
    }
}

impl TryFrom<PartialArgs> for Args {
    type Error = TubeTraceError;

    fn try_from(part_args: PartialArgs) -> TtResult<Self> {
        let mut reader = BufReader::new(stdin().lock());
        let mut writer = BufWriter::new(stdout().lock());
        //intro only shown when neither the help, nor the version flag is specified
        show_intro();

        let diameter = get_args(
            eval_diameter_input,
            part_args.diameter.as_deref(),
            "d",
            &mut reader,
            &mut writer,
        )?;
        println!("Tube diameter: Φ{diameter} mm");

        let excursion = get_args(
            eval_excursion_input,
            part_args.excursion.as_deref(),
            "e",
            &mut reader,
            &mut writer,
        )?;
        println!("Maximum excursion: ±{excursion} mm");

        let tolerance = get_args(
            eval_tolerance_input,
            part_args.tolerance.as_deref(),
            "t",
            &mut reader,
            &mut writer,
        )?;
        drop(reader);
        println!("Tolerance: {tolerance} deg");

        if !part_args.step.is_finite() || part_args.step <= 0.0 {
            return Err(TubeTraceError::Console(
                "the step size must be positive and finite".into(),
            ));
        }
        let plot_path = PathBuf::from(&part_args.plot_path);
        if plot_path.extension() != Some(std::ffi::OsStr::new("svg")) {
            return Err(TubeTraceError::Console(
                "the chart destination must end in .svg".into(),
            ));
        }
        println!("Chart destination: {}", plot_path.display());

        Ok(Self {
            tube_diameter: millimeter!(diameter),
            max_excursion: millimeter!(excursion),
            tolerance: degree!(tolerance),
            step: millimeter!(part_args.step),
            plot_path,
        })
    }
}

/// Show the TUBETRACE intro and the CLI version information.
pub fn show_intro() {
    println!(
        "{: ^79}",
        "TUBETRACE - ray-trace tolerance analysis for liquid-tube holder assemblies"
    );
    println!(
        "{: ^79}",
        "version ".to_owned() + env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn tube_presets() {
        let diameters: Vec<f64> = TubePreset::iter().map(TubePreset::diameter_mm).collect();
        assert_eq!(diameters, vec![6.0, 12.0, 24.5]);
    }
    #[test]
    fn eval_diameter_input_test() {
        assert_eq!(eval_diameter_input("24.5"), Some(24.5));
        assert_eq!(eval_diameter_input(" 6 "), Some(6.0));
        assert_eq!(eval_diameter_input("25"), Some(25.0));
        assert_eq!(eval_diameter_input("0"), None);
        assert_eq!(eval_diameter_input("-1"), None);
        assert_eq!(eval_diameter_input("25.1"), None);
        assert_eq!(eval_diameter_input("not_a_number"), None);
        assert_eq!(eval_diameter_input(""), None);
    }
    #[test]
    fn eval_excursion_input_test() {
        assert_eq!(eval_excursion_input("2.5"), Some(2.5));
        assert_eq!(eval_excursion_input("0"), Some(0.0));
        assert_eq!(eval_excursion_input("5"), Some(5.0));
        assert_eq!(eval_excursion_input(""), Some(DEFAULT_EXCURSION_MM));
        assert_eq!(eval_excursion_input("5.1"), None);
        assert_eq!(eval_excursion_input("-0.1"), None);
        assert_eq!(eval_excursion_input("nope"), None);
    }
    #[test]
    fn eval_tolerance_input_test() {
        assert_eq!(eval_tolerance_input("0.3"), Some(0.3));
        assert_eq!(eval_tolerance_input("15"), Some(15.0));
        assert_eq!(eval_tolerance_input(""), Some(DEFAULT_TOLERANCE_DEG));
        assert_eq!(eval_tolerance_input("15.1"), None);
        assert_eq!(eval_tolerance_input("-1"), None);
    }
    #[test]
    fn create_prompt_str_test() {
        assert_eq!(
            create_prompt_str("d", "test_str\r\n").unwrap(),
            "test_str\r\nPlease insert a tube diameter in mm. Presets:\n6\n12\n24.5\nor any value in (0, 25]\n"
        );
        assert!(create_prompt_str("e", "").unwrap().contains("1.5 mm"));
        assert!(create_prompt_str("t", "").unwrap().contains("degrees"));
        assert!(create_prompt_str("invalid_flag", "").is_err());
    }
    #[test]
    fn get_args_test() {
        let diameter_str = b"24.5\r\n";
        let excursion_str = b"1.0\r\n";

        let mut writer = Vec::new();
        let mut reader = BufReader::new(&diameter_str[..]);
        let diameter =
            get_args(eval_diameter_input, Some("24.5"), "d", &mut reader, &mut writer).unwrap();
        assert_eq!(diameter, 24.5);

        // invalid input falls back to prompting
        let mut reader = BufReader::new(&diameter_str[..]);
        let diameter = get_args(
            eval_diameter_input,
            Some("not_a_diameter"),
            "d",
            &mut reader,
            &mut writer,
        )
        .unwrap();
        assert_eq!(diameter, 24.5);

        // missing input prompts directly
        let mut reader = BufReader::new(&diameter_str[..]);
        let diameter =
            get_args(eval_diameter_input, None, "d", &mut reader, &mut writer).unwrap();
        assert_eq!(diameter, 24.5);

        let mut reader = BufReader::new(&excursion_str[..]);
        let excursion =
            get_args(eval_excursion_input, None, "e", &mut reader, &mut writer).unwrap();
        assert_eq!(excursion, 1.0);
    }
    #[test]
    fn parser_test() {
        let arg_vec = vec![
            "tubetrace",
            "-d",
            "24.5",
            "-e",
            "1.5",
            "-t",
            "1",
            "-p",
            "./out/sweep.svg",
        ];
        let part_args = PartialArgs::parse_from(arg_vec);
        assert_eq!(part_args.diameter.unwrap(), "24.5");
        assert_eq!(part_args.excursion.unwrap(), "1.5");
        assert_eq!(part_args.tolerance.unwrap(), "1");
        assert_eq!(part_args.step, 0.001);
        assert_eq!(part_args.plot_path, "./out/sweep.svg");
    }
}

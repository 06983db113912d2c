use clap::Parser;
use tubetrace::error::TtResult;
use tubetrace::plot::SweepPlot;
use tubetrace::{
    console::{Args, PartialArgs},
    OffsetSweep, SweepConfig, TubeAssembly,
};
use std::io::{self, Write};
use uom::si::length::millimeter;

fn main() -> TtResult<()> {
    env_logger::init();

    //parse CLI arguments, prompting for anything missing
    let args = Args::try_from(PartialArgs::parse())?;

    //set up the scenario
    let assembly = TubeAssembly::from_tube_diameter(args.tube_diameter)?;
    let mut config = SweepConfig::default();
    config.set_max_excursion(args.max_excursion)?;
    config.set_tolerance(args.tolerance)?;
    config.set_step(args.step)?;

    //scan the entry offset in both directions
    print!("\nSweeping entry offset...");
    let _ = io::stdout().flush();
    let result = OffsetSweep::new(config).analyze(&assembly)?;
    println!("Success ({} samples)", result.samples().len());

    match result.valid_band() {
        Some((low, high)) => println!(
            "Usable offset band: {:.3} mm ..= {:.3} mm",
            low.get::<millimeter>(),
            high.get::<millimeter>()
        ),
        None => println!("No scanned offset keeps the exit ray within tolerance"),
    }

    //render the swept curves
    print!("Write chart to {}...", args.plot_path.display());
    let _ = io::stdout().flush();
    SweepPlot::new(&args.plot_path).plot(&result)?;
    println!("Success");
    Ok(())
}

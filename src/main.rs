//! Writes `scaling_loglog.pdf` in the working directory: the Mira
//! benchmark runs against the ideal linear-scaling reference on
//! log-log axes, typeset for inclusion in slides.

use scaling_plot::{self as plt, dataset};

fn main() -> Result<(), plt::Error> {
    // Latin Modern Type 1 fonts, all text set by LaTeX.
    let rc = plt::RcParams::new()
        .ps_useafm(true)
        .pdf_use14corefonts(true)
        .usetex(true)
        .latex_preamble(r"\usepackage[bitstream-charter]{mathdesign}")
        .serif(&["Computer Modern"]);
    let (fig, mut ax) = plt::subplots_with(&rc)?;

    let cores = dataset::core_counts(&dataset::MIRA_RUNS);
    let rate = dataset::throughputs(&dataset::MIRA_RUNS);
    let ideal = dataset::ideal_curve(&cores, &rate);

    ax.loglog(&cores, &rate).fmt("bo").label("Measured").plot();
    ax.loglog(&cores, &ideal).fmt("k--").label("Ideal").plot();
    ax.set_xlabel("Number of Cores", 16.)
        .set_ylabel("Particles per second", 16.)
        .grid_both()
        .legend("upper left")
        .set_title("Parallel scaling on ALCF Mira");

    fig.save().bbox_tight().to_file("scaling_loglog.pdf")?;
    Ok(())
}

//! Renders the Mira parallel-scaling benchmark chart through the
//! Python [Matplotlib][] visualization library.
//!
//! The binding is deliberately narrow: it exposes exactly what the
//! log-log scaling chart needs — an explicit rendering configuration
//! ([`RcParams`]), one figure with one axes, log-log series with
//! format and label options, axis labels, grid, legend, title and a
//! tightly cropped save.  The configuration is carried by the
//! [`Figure`] and applied around the save, so two figures rendered in
//! one process cannot interfere through Matplotlib's global state.
//!
//! [Matplotlib]: https://matplotlib.org/

pub mod dataset;

use std::{
    fmt::{Display, Formatter},
    path::Path,
};
use lazy_static::lazy_static;
use pyo3::{
    prelude::*,
    intern,
    exceptions::{PyFileNotFoundError, PyPermissionError},
    types::{IntoPyDict, PyDict},
};
use numpy::PyArray1;

macro_rules! getattr {
    ($py: ident, $lib: expr, $f: literal) => {
        $lib.getattr($py, intern!($py, $f)).unwrap()
    };
}

macro_rules! meth {
    ($obj: expr, $m: ident, $py: ident -> $args: expr, $kwargs: expr) => {
        Python::with_gil(|py| {
            let $py = py;
            $obj.call_method(py, intern!(py, stringify!($m)), $args, $kwargs)
        })
    };
    ($obj: expr, $m: ident, $args: expr) => {
        Python::with_gil(|py| {
            $obj.call_method1(py, intern!(py, stringify!($m)), $args)
        })
    };
}

/// Possible errors of the chart rendering.
#[derive(Debug)]
pub enum Error {
    /// The Python library "matplotlib" was not found.
    NoMatplotlib,
    /// The output path contains an element that is not a directory or
    /// does not exist.
    FileNotFoundError,
    /// Permission denied to access or create the filesystem path.
    PermissionError,
    /// Other Python errors (including LaTeX or font failures raised
    /// while rendering text).
    Python(PyErr),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::NoMatplotlib =>
                write!(f, "The matplotlib library has not been found.\n\
Please install it.  See https://matplotlib.org/\n\
If you use Anaconda, see https://github.com/PyO3/pyo3/issues/1554"),
            Error::FileNotFoundError =>
                write!(f, "A path contains an element that is not a \
                           directory or does not exist"),
            Error::PermissionError =>
                write!(f, "Permission denied to access or create the \
                           filesystem path"),
            Error::Python(e) =>
                write!(f, "Python error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

/// Import and return a handle to the module `$m`.
macro_rules! pyimport { ($m: literal) => {
    Python::with_gil(|py|
        PyModule::import(py, intern!(py, $m)).map(|m| m.into()))
}}

lazy_static! {
    // Import matplotlib modules.
    static ref MATPLOTLIB: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib")
    };
    static ref PYPLOT: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.pyplot")
    };
}

/// Return a handle to the module `$m`.
/// ⚠ This may try to lock Python's GIL.  Make sure it is executed
/// outside a call to `Python::with_gil`.
macro_rules! pymod { ($m: ident) => {
    $m.as_ref().map_err(|_| Error::NoMatplotlib)
}}

/// Rendering options for a figure, the Rust side of Matplotlib's
/// `rcParams`.
///
/// The options are handed to [`subplots_with`] and applied through
/// `matplotlib.rc_context` when the figure is saved, not written into
/// the process-wide `rcParams`.
#[derive(Debug, Clone, Default)]
pub struct RcParams {
    ps_useafm: bool,
    pdf_use14corefonts: bool,
    usetex: bool,
    latex_preamble: Option<String>,
    serif: Vec<String>,
}

impl RcParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use AFM metrics and Type 1 outline fonts in PostScript output.
    #[must_use]
    pub fn ps_useafm(mut self, b: bool) -> Self {
        self.ps_useafm = b;
        self
    }

    /// Restrict PDF output to the 14 core fonts.
    #[must_use]
    pub fn pdf_use14corefonts(mut self, b: bool) -> Self {
        self.pdf_use14corefonts = b;
        self
    }

    /// Typeset all labels and titles with LaTeX.  A TeX installation
    /// must be present on the system; a missing one surfaces as
    /// [`Error::Python`] when the figure is saved.
    #[must_use]
    pub fn usetex(mut self, b: bool) -> Self {
        self.usetex = b;
        self
    }

    /// Preamble prepended to every LaTeX-rendered text fragment.
    #[must_use]
    pub fn latex_preamble(mut self, preamble: &str) -> Self {
        self.latex_preamble = Some(preamble.to_string());
        self
    }

    /// Select the serif font family and the fonts searched for it, in
    /// order of preference.
    #[must_use]
    pub fn serif(mut self, fonts: &[&str]) -> Self {
        self.serif = fonts.iter().map(|f| f.to_string()).collect();
        self
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> &'py PyDict {
        let d = PyDict::new(py);
        d.set_item("ps.useafm", self.ps_useafm).unwrap();
        d.set_item("pdf.use14corefonts", self.pdf_use14corefonts).unwrap();
        d.set_item("text.usetex", self.usetex).unwrap();
        if let Some(p) = &self.latex_preamble {
            d.set_item("text.latex.preamble", p).unwrap();
        }
        if !self.serif.is_empty() {
            d.set_item("font.family", "serif").unwrap();
            d.set_item("font.serif", self.serif.clone()).unwrap();
        }
        d
    }
}

/// The top level container for all the plot elements.
#[derive(Debug)]
pub struct Figure {
    fig: PyObject, // instance of matplotlib.figure.Figure
    rc: RcParams,
}

#[derive(Debug, Clone)]
pub struct Axes {
    ax: PyObject,
}

/// Create a figure with a single axes, rendered under the options in
/// `rc`.
///
/// Return an error if Matplotlib is not present on the system.
///
/// # Example
///
/// ```no_run
/// use scaling_plot as plt;
/// let (fig, mut ax) = plt::subplots_with(&plt::RcParams::new())?;
/// ax.loglog(&[1., 10., 100.], &[2., 20., 200.]).plot();
/// fig.save().to_file("target/loglog.pdf")?;
/// # Ok::<(), plt::Error>(())
/// ```
pub fn subplots_with(rc: &RcParams) -> Result<(Figure, Axes), Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        let fig = getattr!(py, pyplot, "figure")
            .call0(py).map_err(Error::Python)?;
        let ax = fig.call_method0(py, intern!(py, "add_subplot"))
            .map_err(Error::Python)?;
        Ok((Figure { fig, rc: rc.clone() }, Axes { ax }))
    })
}

impl Figure {
    pub fn save(&self) -> Savefig {
        Savefig {
            fig: self.fig.clone(),
            rc: self.rc.clone(),
            dpi: None,
            bbox_tight: false,
        }
    }
}

pub struct Savefig {
    fig: PyObject,
    rc: RcParams,
    dpi: Option<f64>,
    bbox_tight: bool,
}

impl Savefig {
    pub fn dpi(&mut self, dpi: f64) -> &mut Self {
        if dpi > 0. {
            self.dpi = Some(dpi);
        } else {
            self.dpi = None;
        }
        self
    }

    /// Crop the output bounding box tightly to the drawn content.
    pub fn bbox_tight(&mut self) -> &mut Self {
        self.bbox_tight = true;
        self
    }

    /// Write the figure to `path`, overwriting any existing file.
    /// Text layout and font loading happen here, under the figure's
    /// [`RcParams`], so font and LaTeX problems surface from this
    /// call.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let matplotlib = pymod!(MATPLOTLIB)?;
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            if let Some(dpi) = self.dpi {
                kwargs.set_item("dpi", dpi).unwrap()
            }
            if self.bbox_tight {
                kwargs.set_item("bbox_inches", "tight").unwrap()
            }
            // matplotlib.rc_context(rc): scopes the options to this
            // save instead of mutating the global rcParams.
            let ctx = getattr!(py, matplotlib, "rc_context")
                .call1(py, (self.rc.to_dict(py),))
                .map_err(Error::Python)?;
            ctx.call_method0(py, intern!(py, "__enter__"))
                .map_err(Error::Python)?;
            let saved = self.fig.call_method(
                py, intern!(py, "savefig"), (path.as_ref(),), Some(kwargs));
            ctx.call_method1(py, intern!(py, "__exit__"),
                             (py.None(), py.None(), py.None()))
                .map_err(Error::Python)?;
            saved.map_err(|e| {
                if e.is_instance_of::<PyFileNotFoundError>(py) {
                    Error::FileNotFoundError
                } else if e.is_instance_of::<PyPermissionError>(py) {
                    Error::PermissionError
                } else {
                    Error::Python(e)
                }
            })
        })?;
        Ok(())
    }
}

impl Axes {
    /// Plot `y` versus `x` on logarithmic scales on both axes.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use scaling_plot as plt;
    /// let (fig, mut ax) = plt::subplots_with(&plt::RcParams::new())?;
    /// ax.loglog(&[1., 10., 100.], &[2., 20., 200.])
    ///     .fmt("bo").label("Measured").plot();
    /// fig.save().to_file("target/loglog.pdf")?;
    /// # Ok::<(), plt::Error>(())
    /// ```
    #[must_use]
    pub fn loglog<'a>(&'a mut self, x: &'a [f64], y: &'a [f64])
                      -> LogLog<'a> {
        // We mutably borrow `self` to reflect that the final `.plot()`
        // will mutate the underlying Python object.
        LogLog { axes: self,
                 options: PlotOptions::new(),
                 x, y }
    }

    pub fn set_title(&mut self, v: &str) -> &mut Self {
        meth!(self.ax, set_title, (v,)).unwrap();
        self
    }

    pub fn set_xlabel(&mut self, label: &str, fontsize: f64) -> &mut Self {
        meth!(self.ax, set_xlabel, py -> (label,),
              Some([("fontsize", fontsize)].into_py_dict(py))).unwrap();
        self
    }

    pub fn set_ylabel(&mut self, label: &str, fontsize: f64) -> &mut Self {
        meth!(self.ax, set_ylabel, py -> (label,),
              Some([("fontsize", fontsize)].into_py_dict(py))).unwrap();
        self
    }

    /// Draw gridlines at both major and minor ticks on both axes.
    pub fn grid_both(&mut self) -> &mut Self {
        meth!(self.ax, grid, py -> (true,),
              Some([("which", "both")].into_py_dict(py))).unwrap();
        self
    }

    /// Place a legend of the labeled series at `loc`, e.g.
    /// "upper left".
    pub fn legend(&mut self, loc: &str) -> &mut Self {
        meth!(self.ax, legend, py -> (),
              Some([("loc", loc)].into_py_dict(py))).unwrap();
        self
    }
}

#[derive(Clone)]
struct PlotOptions<'a> {
    fmt: &'a str,
    label: &'a str,
}

impl<'a> PlotOptions<'a> {
    fn new() -> PlotOptions<'static> {
        PlotOptions { fmt: "", label: "" }
    }

    fn kwargs(&'a self, py: Python<'a>) -> &'a PyDict {
        let kwargs = PyDict::new(py);
        if !self.label.is_empty() {
            kwargs.set_item("label", self.label).unwrap()
        }
        kwargs
    }
}

/// A log-log series waiting for its options before being drawn with
/// [`LogLog::plot`].
#[must_use]
pub struct LogLog<'a> {
    axes: &'a Axes,
    options: PlotOptions<'a>,
    x: &'a [f64],
    y: &'a [f64],
}

impl<'a> LogLog<'a> {
    /// Matplotlib format string for the series, e.g. "bo" for blue
    /// circular markers or "k--" for a black dashed line.
    #[must_use]
    pub fn fmt(mut self, fmt: &'a str) -> Self {
        self.options.fmt = fmt;
        self
    }

    /// Name of the series in the legend.
    #[must_use]
    pub fn label(mut self, label: &'a str) -> Self {
        self.options.label = label;
        self
    }

    /// Plot the data with the options specified in [`LogLog`].
    pub fn plot(self) {
        Python::with_gil(|py| {
            let xn = PyArray1::from_slice(py, self.x);
            let yn = PyArray1::from_slice(py, self.y);
            self.axes.ax.call_method(
                py, intern!(py, "loglog"),
                (xn, yn, self.options.fmt),
                Some(self.options.kwargs(py)))
                .unwrap();
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc_params_dict() {
        let rc = RcParams::new()
            .usetex(true)
            .serif(&["Computer Modern"]);
        Python::with_gil(|py| {
            let d = rc.to_dict(py);
            let usetex: bool = d.get_item("text.usetex")
                .unwrap().unwrap().extract().unwrap();
            assert!(usetex);
            let family: String = d.get_item("font.family")
                .unwrap().unwrap().extract().unwrap();
            assert_eq!(family, "serif");
        })
    }

    #[test]
    fn rc_params_dict_omits_unset() {
        Python::with_gil(|py| {
            let d = RcParams::new().to_dict(py);
            assert!(d.get_item("text.latex.preamble").unwrap().is_none());
            assert!(d.get_item("font.family").unwrap().is_none());
        })
    }

    #[test]
    fn loglog_pdf() -> Result<(), Error> {
        let (fig, mut ax) = subplots_with(&RcParams::new())?;
        let x = [2048., 4096., 8192.];
        let y = [1.97094e6, 3.95749e6, 7.88299e6];
        ax.loglog(&x, &y).fmt("bo").label("Measured").plot();
        ax.set_xlabel("Number of Cores", 16.)
            .set_ylabel("Particles per second", 16.)
            .grid_both()
            .legend("upper left")
            .set_title("loglog output");
        fig.save().bbox_tight().to_file("target/loglog_smoke.pdf")?;
        Ok(())
    }
}

//! Benchmark measurements from the Mira runs and the series derived
//! from them for plotting.

/// One benchmark run: number of nodes and measured simulation
/// throughput in particles per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementPoint {
    pub nodes: u32,
    pub throughput: f64,
}

/// Mira has 16 cores per node.  The runs are recorded per node but
/// the chart's x-axis is per core.
pub const CORES_PER_NODE: f64 = 16.;

/// Throughput measured on the ALCF Mira runs, in increasing node
/// order.
pub const MIRA_RUNS: [MeasurementPoint; 10] = [
    MeasurementPoint { nodes: 128, throughput: 1.97094e6 },
    MeasurementPoint { nodes: 256, throughput: 3.95749e6 },
    MeasurementPoint { nodes: 512, throughput: 7.88299e6 },
    MeasurementPoint { nodes: 1024, throughput: 1.58193e7 },
    MeasurementPoint { nodes: 2048, throughput: 3.13780e7 },
    MeasurementPoint { nodes: 4096, throughput: 6.25105e7 },
    MeasurementPoint { nodes: 8192, throughput: 1.25958e8 },
    MeasurementPoint { nodes: 16384, throughput: 2.51868e8 },
    MeasurementPoint { nodes: 32768, throughput: 4.82503e8 },
    MeasurementPoint { nodes: 49152, throughput: 7.40938e8 },
];

/// Core count of each run.
pub fn core_counts(runs: &[MeasurementPoint]) -> Vec<f64> {
    runs.iter().map(|p| CORES_PER_NODE * p.nodes as f64).collect()
}

/// Measured throughput of each run.
pub fn throughputs(runs: &[MeasurementPoint]) -> Vec<f64> {
    runs.iter().map(|p| p.throughput).collect()
}

/// Linear-scaling reference anchored at the first measurement, so
/// both curves intersect there by construction:
/// `ideal[i] = cores[i] * rates[0] / cores[0]`.
///
/// The anchor point is deliberate (the chart shows divergence from
/// ideal scaling); do not replace it with a least-squares fit.
pub fn ideal_curve(cores: &[f64], rates: &[f64]) -> Vec<f64> {
    match (cores.first(), rates.first()) {
        (Some(&c0), Some(&r0)) =>
            cores.iter().map(|c| c * r0 / c0).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cores_are_sixteen_per_node() {
        let cores = core_counts(&MIRA_RUNS);
        for (p, c) in MIRA_RUNS.iter().zip(&cores) {
            assert_eq!(*c, 16. * p.nodes as f64);
        }
        assert_eq!(cores[0], 2048.);
        assert_eq!(cores[9], 786432.);
    }

    #[test]
    fn runs_strictly_increasing() {
        for w in MIRA_RUNS.windows(2) {
            assert!(w[0].nodes < w[1].nodes);
            assert!(w[0].throughput < w[1].throughput);
        }
    }

    #[test]
    fn ideal_anchored_at_first_measurement() {
        let cores = core_counts(&MIRA_RUNS);
        let rates = throughputs(&MIRA_RUNS);
        let ideal = ideal_curve(&cores, &rates);
        assert_eq!(ideal[0], rates[0]);
    }

    #[test]
    fn ideal_follows_linear_scaling_law() {
        let cores = core_counts(&MIRA_RUNS);
        let rates = throughputs(&MIRA_RUNS);
        let ideal = ideal_curve(&cores, &rates);
        for i in 0..ideal.len() {
            let expected = ideal[0] * cores[i] / cores[0];
            assert!((ideal[i] - expected).abs() <= 1e-9 * expected.abs());
        }
    }

    #[test]
    fn second_run_deviates_from_ideal() {
        let runs = [MIRA_RUNS[0], MIRA_RUNS[1]];
        let cores = core_counts(&runs);
        let rates = throughputs(&runs);
        let ideal = ideal_curve(&cores, &rates);
        assert_eq!(cores, [2048., 4096.]);
        assert_eq!(ideal[0], 1.97094e6);
        assert!((ideal[1] - 3.94188e6).abs() < 1.);
        // The measured second point sits near, but not on, the ideal
        // line.
        assert!(rates[1] != ideal[1]);
        assert!((rates[1] - ideal[1]).abs() / ideal[1] < 0.01);
    }

    #[test]
    fn ideal_curve_of_empty_input_is_empty() {
        assert!(ideal_curve(&[], &[]).is_empty());
    }
}

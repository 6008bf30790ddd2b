#![allow(deprecated)]

use plotters::element::Path as PlotPath;
use plotters::prelude::*;

use log::{debug, info};

use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::error::AnalysisError;
use crate::results;
use crate::stats;

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            (($colour & 0x0000FF) >> 0) as u8,
        )
    };
}

// one colour per algorithm, in roster order
const COLOURS: &[RGBColor] = &[
    hexcolour!(0xCC0000),
    hexcolour!(0x0000CC),
    hexcolour!(0x117733),
    hexcolour!(0xEE8800),
];

const GREY: RGBColor = hexcolour!(0x888888);

/// Result files to plot, in display order. `p<N>` names carry the payload
/// size; `identity` and `math` are the non-payload workloads.
pub const PAYLOADS: &[&str] = &[
    "identity", "math", "p1", "p2", "p4", "p6", "p8", "p12", "p16", "p20", "p24", "p28", "p32",
    "p64", "p128",
];

pub const ALGORITHMS: &[&str] = &["no batch", "batch only", "batch prefetch", "locations batch"];

const BASELINE: &str = "no batch";
const BATCHED: &[&str] = &["batch only", "batch prefetch", "locations batch"];

// number of batch-size points to display, and the x-axis clip
const MAX_POINTS: usize = 40;
const X_LIMIT: f64 = 80.0;

fn result_path(results: &Path, payload: &str) -> PathBuf {
    results.join(format!("{}.txt", payload))
}

fn clipped_points(series: &BTreeMap<u64, f64>) -> Vec<(f64, f64)> {
    series
        .iter()
        .take(MAX_POINTS)
        .map(|(&x, &y)| (x as f64, y))
        .collect()
}

/// Latency as a function of batch size, one panel per payload.
pub fn results_side_by_side(results: &Path) -> Result<(), Box<dyn Error>> {
    info!("rendering results-side-by-side.png");

    let root = BitMapBackend::new("results-side-by-side.png", (1500, 1100)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((5, 3));

    for (panel, payload) in panels.iter().zip(PAYLOADS) {
        let table = results::read_summary(&result_path(results, payload))?;
        let baseline = *table.value(BASELINE, 0)?;

        let mut y_max = baseline;
        let mut series = Vec::with_capacity(BATCHED.len());
        for algorithm in BATCHED {
            let points = clipped_points(table.series(algorithm)?);
            for &(_, y) in &points {
                if y > y_max {
                    y_max = y;
                }
            }
            series.push(points);
        }

        let mut chart = ChartBuilder::on(panel)
            .caption(*payload, ("Arial", 18))
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 30)
            .build_ranged(2.0..X_LIMIT, 0.0..y_max * 1.05)?;

        chart
            .configure_mesh()
            .x_desc("batch size")
            .y_desc("latency (ms)")
            .x_label_style(("Arial", 12))
            .y_label_style(("Arial", 12))
            .draw()?;

        chart.draw_series(LineSeries::new(
            vec![(0.0, baseline), (X_LIMIT, baseline)],
            COLOURS[0].stroke_width(2),
        ))?;

        for (i, points) in series.into_iter().enumerate() {
            chart.draw_series(LineSeries::new(points, COLOURS[i + 1].stroke_width(2)))?;
        }
    }

    Ok(())
}

/// Speedup as a function of payload size: full range on the left, zoomed on
/// the right.
pub fn speedups_for_payloads(results: &Path) -> Result<(), Box<dyn Error>> {
    info!("rendering speedups-for-payloads.png");

    let mut matrix: Vec<(f64, Vec<f64>)> = Vec::new();
    for payload in PAYLOADS {
        let size: u64 = match payload.strip_prefix('p') {
            Some(digits) => digits.parse()?,
            None => continue,
        };
        let table = results::read_summary(&result_path(results, payload))?;
        let baseline = *table.value(BASELINE, 0)?;

        let mut speedups = Vec::with_capacity(BATCHED.len());
        for algorithm in BATCHED {
            let (batch_size, best) = stats::best_batch_size(table.series(algorithm)?)?;
            let speedup = stats::speedup(baseline, best)?;
            debug!(
                "{}: {}: best batch size {} at {:.3} ms, speedup {:.2}",
                payload, algorithm, batch_size, best, speedup
            );
            speedups.push(speedup);
        }
        matrix.push((size as f64, speedups));
    }
    info!("speedups by payload: {:?}", matrix);

    let y_max = matrix
        .iter()
        .flat_map(|(_, speedups)| speedups.iter())
        .fold(1.0f64, |max, &s| max.max(s));

    let root = BitMapBackend::new("speedups-for-payloads.png", (1500, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    for (index, (panel, &x_max)) in panels.iter().zip([128.0f64, 20.0].iter()).enumerate() {
        let mut chart = ChartBuilder::on(panel)
            .caption("speedup by payload size", ("Arial", 24))
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_ranged(2.0..x_max, 1.0..y_max * 1.05)?;

        chart
            .configure_mesh()
            .x_desc("payload size")
            .y_desc("speedup")
            .x_label_style(("Arial", 16))
            .y_label_style(("Arial", 16))
            .draw()?;

        for (i, algorithm) in BATCHED.iter().enumerate() {
            let points: Vec<(f64, f64)> = matrix.iter().map(|(x, s)| (*x, s[i])).collect();
            chart
                .draw_series(LineSeries::new(points, COLOURS[i + 1].stroke_width(2)))?
                .label(*algorithm)
                .legend(move |(x, y)| PlotPath::new(vec![(x, y), (x + 20, y)], &COLOURS[i + 1]));
        }

        // mark the p4 payload
        chart.draw_series(LineSeries::new(
            vec![(4.0, 0.0), (4.0, y_max * 1.05)],
            &COLOURS[0].mix(0.4),
        ))?;

        if index == 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.filled())
                .draw()?;
        }
    }

    Ok(())
}

/// Latency as a function of batch size for the p4 payload, with the best
/// `batch prefetch` operating point marked on both panels.
pub fn speedups_for_p4(results: &Path) -> Result<(), Box<dyn Error>> {
    info!("rendering speedups-for-p4.png");

    let table = results::read_summary(&result_path(results, "p4"))?;
    let baseline = *table.value(BASELINE, 0)?;
    let (best_batch, best_latency) = stats::best_batch_size(table.series("batch prefetch")?)?;
    info!(
        "p4 batch prefetch: best batch size {} at {:.3} ms ({:.2}x)",
        best_batch,
        best_latency,
        stats::speedup(baseline, best_latency)?
    );

    let mut y_max = baseline;
    let mut series = Vec::with_capacity(BATCHED.len());
    for algorithm in BATCHED {
        let points = clipped_points(table.series(algorithm)?);
        for &(_, y) in &points {
            if y > y_max {
                y_max = y;
            }
        }
        series.push(points);
    }
    let y_max = y_max * 1.05;

    let root = BitMapBackend::new("speedups-for-p4.png", (1500, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    for (index, (panel, &x_max)) in panels.iter().zip([X_LIMIT, 32.0].iter()).enumerate() {
        let mut chart = ChartBuilder::on(panel)
            .caption("p4 latency by batch size", ("Arial", 24))
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_ranged(2.0..x_max, 0.0..y_max)?;

        chart
            .configure_mesh()
            .x_desc("batch size")
            .y_desc("latency (ms)")
            .x_label_style(("Arial", 16))
            .y_label_style(("Arial", 16))
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                vec![(0.0, baseline), (x_max, baseline)],
                COLOURS[0].stroke_width(2),
            ))?
            .label(BASELINE)
            .legend(move |(x, y)| PlotPath::new(vec![(x, y), (x + 20, y)], &COLOURS[0]));

        for (i, points) in series.iter().enumerate() {
            chart
                .draw_series(LineSeries::new(
                    points.clone(),
                    COLOURS[i + 1].stroke_width(2),
                ))?
                .label(BATCHED[i])
                .legend(move |(x, y)| PlotPath::new(vec![(x, y), (x + 20, y)], &COLOURS[i + 1]));
        }

        // best operating point
        chart.draw_series(LineSeries::new(
            vec![(best_batch as f64, 0.0), (best_batch as f64, y_max)],
            &COLOURS[0].mix(0.4),
        ))?;
        chart.draw_series(LineSeries::new(
            vec![(0.0, best_latency), (x_max, best_latency)],
            &COLOURS[0].mix(0.4),
        ))?;

        if index == 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.filled())
                .draw()?;
        }
    }

    Ok(())
}

/// Per-sample speedup curves for `batch prefetch` on the p4 payload, with
/// percentile bands to give a sense of the deviations.
pub fn speedups_for_p4_with_deviations(results: &Path) -> Result<(), Box<dyn Error>> {
    info!("rendering speedups-for-p4-with-deviations.png");

    let table = results::read_raw(&result_path(results, "p4"))?;
    let baseline = table.value(BASELINE, 0)?;
    let series = table.series("batch prefetch")?;

    // speedup of every sample against the matching baseline sample
    let mut batches: Vec<f64> = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (&batch_size, samples) in series.iter().take(MAX_POINTS) {
        if samples.len() != baseline.len() {
            return Err(AnalysisError::SampleCountMismatch {
                file: table.file().to_string(),
                batch_size,
                baseline: baseline.len(),
                got: samples.len(),
            }
            .into());
        }
        let mut row = Vec::with_capacity(samples.len());
        for (b, s) in baseline.iter().zip(samples) {
            row.push(stats::speedup(*b, *s)?);
        }
        batches.push(batch_size as f64);
        rows.push(row);
    }

    const BANDS: &[(f64, &str, usize)] = &[
        (5.0, "5th", 1),
        (25.0, "25th", 2),
        (50.0, "50th", 0),
        (75.0, "75th", 2),
        (95.0, "95th", 0),
    ];

    let mut bands: Vec<Vec<(f64, f64)>> = Vec::with_capacity(BANDS.len());
    for &(p, _, _) in BANDS {
        let mut band = Vec::with_capacity(rows.len());
        for (x, row) in batches.iter().zip(&rows) {
            band.push((*x, stats::percentile(row, p)?));
        }
        bands.push(band);
    }

    let max_speedup = rows
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |max, &s| max.max(s));

    // where the median speedup peaks; ties break toward the smaller batch
    let mut peak = (batches[0], 0.0f64);
    for &(x, y) in &bands[2] {
        if y > peak.1 {
            peak = (x, y);
        }
    }
    info!(
        "p4 batch prefetch: median speedup peaks at batch size {} ({:.2}x, max sample {:.2}x)",
        peak.0, peak.1, max_speedup
    );

    let y_max = max_speedup * 1.05;

    let root =
        BitMapBackend::new("speedups-for-p4-with-deviations.png", (1100, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("p4 batch prefetch speedup with deviations", ("Arial", 24))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_ranged(2.0..X_LIMIT, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("batch size")
        .y_desc("speedup")
        .x_label_style(("Arial", 16))
        .y_label_style(("Arial", 16))
        .draw()?;

    for i in 0..baseline.len() {
        let curve: Vec<(f64, f64)> = batches
            .iter()
            .zip(&rows)
            .map(|(&x, row)| (x, row[i]))
            .collect();
        chart.draw_series(LineSeries::new(curve, &GREY.mix(0.2)))?;
    }

    for (band, &(_, label, colour)) in bands.into_iter().zip(BANDS) {
        chart
            .draw_series(LineSeries::new(band, COLOURS[colour].stroke_width(2)))?
            .label(label)
            .legend(move |(x, y)| PlotPath::new(vec![(x, y), (x + 20, y)], &COLOURS[colour]));
    }

    chart.draw_series(LineSeries::new(
        vec![(peak.0, 0.0), (peak.0, y_max)],
        &COLOURS[0].mix(0.4),
    ))?;
    chart.draw_series(LineSeries::new(
        vec![(2.0, max_speedup), (X_LIMIT, max_speedup)],
        &COLOURS[0].mix(0.4),
    ))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.filled())
        .draw()?;

    Ok(())
}

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::chart::{Annotation, Axis, Figure, Font, Layout, Line, Marker, Mode, Shape, Title, Trace};
use crate::summary::IpoSummary;

/// Plotly's qualitative "Dark2" palette.
pub const DARK2: [&str; 8] = [
    "rgb(27,158,119)",
    "rgb(217,95,2)",
    "rgb(117,112,179)",
    "rgb(231,41,138)",
    "rgb(102,166,30)",
    "rgb(230,171,2)",
    "rgb(166,118,29)",
    "rgb(102,102,102)",
];

pub const TITLE: &str = "SaaS Company IPO Trends: Faster Path from Founding to Market";
const REFERENCE_STEP: usize = 5;
const GRID: &str = "lightgray";

pub fn build_figure(summary: &IpoSummary) -> Figure {
    let mut data = Vec::new();

    for (i, group) in summary.groups.iter().enumerate() {
        let color = DARK2[i % DARK2.len()];
        let year = group.year as f64;

        data.push(
            Trace::scatter(
                vec![year, group.last_ipo as f64],
                vec![year, year],
                Mode::Lines,
            )
            .line(Line {
                width: 1.5,
                color: color.to_string(),
                dash: None,
            }),
        );

        // ascending IPO year; draw order has no visual effect
        for (ipo_year, count) in &group.ipo_counts {
            data.push(
                Trace::scatter(vec![*ipo_year as f64], vec![year], Mode::MarkersText)
                    .marker(Marker {
                        size: 8.0,
                        color: color.to_string(),
                        opacity: 0.8,
                    })
                    .text(count.to_string(), "middle center"),
            );
        }
    }

    let (trailing, founded): (Vec<f64>, Vec<f64>) = summary
        .groups
        .iter()
        .filter_map(|g| g.trailing.map(|t| (t, g.year as f64)))
        .unzip();
    data.push(
        Trace::scatter(trailing, founded, Mode::Markers)
            .marker(Marker {
                size: 8.0,
                color: "darkred".to_string(),
                opacity: 0.8,
            })
            .axes("x2", "y"),
    );

    let (lo, hi) = (summary.min_founded as f64, summary.max_ipo as f64);
    for year in (summary.min_founded..=summary.max_ipo).step_by(REFERENCE_STEP) {
        let x = year as f64;
        data.push(
            Trace::scatter(vec![x, x], vec![lo, hi], Mode::Lines).line(Line {
                width: 1.0,
                color: GRID.to_string(),
                dash: Some("dot"),
            }),
        );
    }

    Figure {
        data,
        layout: layout(summary),
    }
}

fn bold(text: &str) -> Title {
    Title::plain(format!("<b>{text}</b>"))
}

fn heading_font(size: f64, color: &'static str) -> Font {
    Font {
        family: "Arial Black, sans-serif",
        size,
        color,
    }
}

fn panel_annotation(text: &str, x: f64) -> Annotation {
    Annotation {
        text: text.to_string(),
        xref: "paper",
        yref: "paper",
        x,
        y: 1.01,
        xanchor: "left",
        yanchor: Some("bottom"),
        font: heading_font(14.0, "Teal"),
        showarrow: false,
    }
}

fn layout(summary: &IpoSummary) -> Layout {
    Layout {
        title: Some(Title {
            text: TITLE.to_string(),
            font: Some(heading_font(18.0, "black")),
            x: Some(0.082),
            xanchor: Some("left"),
        }),
        font: Some(Font {
            family: "Arial, sans-serif",
            size: 12.0,
            color: "black",
        }),
        xaxis: Axis {
            title: Some(bold("IPO Year")),
            range: Some([summary.min_founded as f64, summary.max_ipo as f64 + 1.0]),
            domain: Some([0.0, 0.72]),
            anchor: Some("y"),
            gridcolor: Some(GRID),
            zerolinecolor: Some(GRID),
            ..Default::default()
        },
        xaxis2: Axis {
            title: Some(bold("Median IPO Time (Trailing 5)")),
            domain: Some([0.82, 1.0]),
            anchor: Some("y"),
            gridcolor: Some(GRID),
            zerolinecolor: Some(GRID),
            ..Default::default()
        },
        yaxis: Axis {
            title: Some(bold("Founding Year")),
            autorange: Some("reversed"),
            gridcolor: Some(GRID),
            zerolinecolor: Some(GRID),
            ..Default::default()
        },
        height: Some(800),
        plot_bgcolor: Some("white"),
        paper_bgcolor: Some("white"),
        annotations: vec![
            panel_annotation("Rising IPO Activity", 0.0),
            panel_annotation("Shrinking Wait Times", 0.81),
            Annotation {
                text: "<i>Source: https://publicsaascompanies.com/</i>".to_string(),
                xref: "paper",
                yref: "paper",
                x: 0.01,
                y: -0.08,
                xanchor: "left",
                yanchor: None,
                font: Font {
                    family: "Arial, sans-serif",
                    size: 10.0,
                    color: "gray",
                },
                showarrow: false,
            },
        ],
        shapes: vec![Shape {
            kind: "line",
            xref: "paper",
            yref: "paper",
            x0: 0.0,
            x1: 1.0,
            y0: 1.07,
            y1: 1.07,
            line: Line {
                width: 2.0,
                color: "black".to_string(),
                dash: None,
            },
        }],
    }
}

pub fn write_html(fig: &Figure, file_path: impl AsRef<Path>) -> Result<()> {
    let file_path = file_path.as_ref();
    let html = fig.to_html()?;

    let mut file = File::create(file_path)
        .with_context(|| format!("could not create {}", file_path.display()))?;
    file.write_all(html.as_bytes())
        .context("could not write to file")?;

    info!(path = %file_path.display(), traces = fig.data.len(), "wrote chart");

    Ok(())
}

/// Opens the written chart in the default browser.
pub fn show(file_path: impl AsRef<Path>) -> Result<()> {
    let file_path = file_path.as_ref();
    opener::open(file_path)
        .with_context(|| format!("could not open {}", file_path.display()))?;

    Ok(())
}
